use std::fmt;

use glam::Vec2;

use crate::api::types::{BodyId, EntityKind, EntityState};
use crate::core::physics::PhysicsBody;

/// Collision shape family, as requested by level construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Rectangle,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Circle => f.write_str("circle"),
            ShapeKind::Rectangle => f.write_str("rectangle"),
        }
    }
}

/// The single collision shape attached to a body, in world units.
/// Rectangles are axis-aligned before the body's rotation is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Circle { diameter: f32 },
    Rectangle { width: f32, height: f32 },
}

impl BodyShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            BodyShape::Circle { .. } => ShapeKind::Circle,
            BodyShape::Rectangle { .. } => ShapeKind::Rectangle,
        }
    }

    pub fn width(&self) -> f32 {
        match *self {
            BodyShape::Circle { diameter } => diameter,
            BodyShape::Rectangle { width, .. } => width,
        }
    }

    pub fn height(&self) -> f32 {
        match *self {
            BodyShape::Circle { diameter } => diameter,
            BodyShape::Rectangle { height, .. } => height,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width(), self.height()) * 0.5
    }
}

/// Where a body is right now, plus its shape. Input to the geometry predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub center: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    pub shape: BodyShape,
}

impl BodyPose {
    pub fn new(center: Vec2, angle: f32, shape: BodyShape) -> Self {
        Self { center, angle, shape }
    }

    /// Pose of an unrotated rectangle; handy for tests and axis-aligned checks.
    pub fn rect(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center, 0.0, BodyShape::Rectangle { width, height })
    }

    pub fn circle(center: Vec2, diameter: f32) -> Self {
        Self::new(center, 0.0, BodyShape::Circle { diameter })
    }

    pub fn width(&self) -> f32 {
        self.shape.width()
    }

    pub fn height(&self) -> f32 {
        self.shape.height()
    }

    /// Y coordinate of the top edge, ignoring rotation.
    pub fn top(&self) -> f32 {
        self.center.y + self.height() * 0.5
    }
}

/// A registry entry: one simulated shape and its game tag.
#[derive(Debug, Clone)]
pub struct LogicalBody {
    pub kind: EntityKind,
    pub shape: BodyShape,
    pub handle: PhysicsBody,
    /// Cleared once the body is killed, collected or otherwise taken out of play.
    pub active: bool,
}

/// Read-only snapshot of a body for rendering and inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub id: BodyId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub angle: f32,
    pub width: f32,
    pub height: f32,
    pub velocity: Vec2,
    /// Behavioural state; only the player has one.
    pub state: Option<EntityState>,
    pub active: bool,
}
