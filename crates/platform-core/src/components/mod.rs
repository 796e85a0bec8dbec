pub mod body;
pub mod player;
