//! Collision-rule core of a 2D platformer, layered over Rapier2D.
//!
//! A [`LevelBuilder`] creates one simulation space and its bodies; the
//! resulting [`Simulation`] is stepped once per tick and reports game
//! outcomes (pickups, kills, player death) through a [`NotificationSink`].

pub mod api;
pub mod core;
pub mod components;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{PlayerTuning, SimulationConfig};
pub use api::error::{LevelError, Result};
pub use api::types::{BodyId, EntityKind, EntityState, GameEvent, Notification, PowerUpKind};
pub use components::body::{BodyPose, BodyShape, BodyView, ShapeKind};
pub use components::player::{HitOutcome, PlayerStatus};
pub use core::builder::{BodySpec, LevelBuilder};
pub use core::simulation::{PlayerCommand, Simulation};
pub use core::time::FixedTimestep;
pub use systems::contact_filter::ContactResponse;
pub use systems::notify::{EventQueue, NotificationSink};
