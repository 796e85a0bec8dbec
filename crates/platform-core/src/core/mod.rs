pub mod builder;
pub mod physics;
pub mod registry;
pub mod simulation;
pub mod time;
