use thiserror::Error;

use crate::api::types::{BodyId, EntityKind};
use crate::components::body::ShapeKind;

/// Errors raised while building a level.
///
/// State errors are sequencing mistakes by the caller; argument errors reject a
/// malformed body before it ever reaches the registry. Stepping never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("simulation space has already been created")]
    SpaceAlreadyCreated,

    #[error("simulation space has not been created yet")]
    SpaceNotCreated,

    #[error("a player body already exists")]
    PlayerAlreadyCreated,

    #[error("no body registered under {0:?}")]
    UnknownBody(BodyId),

    #[error("{kind} bodies cannot use a {shape} shape")]
    ShapeNotAllowed { kind: EntityKind, shape: ShapeKind },

    #[error("circle bodies must be square, got {width}x{height}")]
    CircleNotSquare { width: f32, height: f32 },

    #[error("body dimensions must be positive, got {width}x{height}")]
    NonPositiveSize { width: f32, height: f32 },

    #[error("initial position ({x}, {y}) lies outside the world")]
    OutOfBounds { x: f32, y: f32 },
}

impl LevelError {
    /// Misuse of the construction sequence (wrong order, unknown handle).
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            LevelError::SpaceAlreadyCreated
                | LevelError::SpaceNotCreated
                | LevelError::PlayerAlreadyCreated
                | LevelError::UnknownBody(_)
        )
    }

    /// An invalid construction request.
    pub fn is_argument_error(&self) -> bool {
        !self.is_state_error()
    }
}

/// Result type for level construction.
pub type Result<T> = std::result::Result<T, LevelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_split() {
        assert!(LevelError::SpaceAlreadyCreated.is_state_error());
        assert!(LevelError::SpaceNotCreated.is_state_error());
        assert!(LevelError::UnknownBody(BodyId(3)).is_state_error());
        assert!(LevelError::OutOfBounds { x: -1.0, y: 0.0 }.is_argument_error());
        assert!(LevelError::CircleNotSquare { width: 1.0, height: 2.0 }.is_argument_error());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = LevelError::ShapeNotAllowed {
            kind: EntityKind::Player,
            shape: ShapeKind::Circle,
        };
        assert_eq!(err.to_string(), "player bodies cannot use a circle shape");
    }
}
