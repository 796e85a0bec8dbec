use glam::Vec2;
use log::{debug, info};

use crate::api::config::SimulationConfig;
use crate::api::error::{LevelError, Result};
use crate::api::types::{BodyId, EntityKind};
use crate::components::body::{BodyShape, ShapeKind};
use crate::core::physics::BodyDesc;
use crate::core::simulation::Simulation;

/// Request for one level body. Sizes are full extents; `position` is the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub kind: EntityKind,
    pub shape: ShapeKind,
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl BodySpec {
    pub fn new(kind: EntityKind, shape: ShapeKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            shape,
            position: Vec2::ZERO,
            width,
            height,
            angle: 0.0,
        }
    }

    pub fn rect(kind: EntityKind, width: f32, height: f32) -> Self {
        Self::new(kind, ShapeKind::Rectangle, width, height)
    }

    pub fn circle(kind: EntityKind, diameter: f32) -> Self {
        Self::new(kind, ShapeKind::Circle, diameter, diameter)
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Check the request against the level rules, in order: shape for kind,
    /// positive size, square circles, centre inside the world.
    fn validate(&self, config: &SimulationConfig) -> Result<BodyShape> {
        if !shape_allowed(self.kind, self.shape) {
            return Err(LevelError::ShapeNotAllowed {
                kind: self.kind,
                shape: self.shape,
            });
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LevelError::NonPositiveSize {
                width: self.width,
                height: self.height,
            });
        }
        let shape = match self.shape {
            ShapeKind::Circle if self.width != self.height => {
                return Err(LevelError::CircleNotSquare {
                    width: self.width,
                    height: self.height,
                })
            }
            ShapeKind::Circle => BodyShape::Circle {
                diameter: self.width,
            },
            ShapeKind::Rectangle => BodyShape::Rectangle {
                width: self.width,
                height: self.height,
            },
        };
        if !config.contains(self.position) {
            return Err(LevelError::OutOfBounds {
                x: self.position.x,
                y: self.position.y,
            });
        }
        Ok(shape)
    }
}

/// Which shapes each kind may take.
pub fn shape_allowed(kind: EntityKind, shape: ShapeKind) -> bool {
    match shape {
        ShapeKind::Rectangle => matches!(
            kind,
            EntityKind::Player
                | EntityKind::Platform
                | EntityKind::Ladder
                | EntityKind::PowerUp(_)
                | EntityKind::WalkingEnemy
        ),
        ShapeKind::Circle => matches!(kind, EntityKind::RollingEnemy | EntityKind::EnemyGenerator),
    }
}

/// Engine description for a validated body.
fn body_desc(spec: &BodySpec, shape: BodyShape) -> BodyDesc {
    let collider = shape.into();
    let desc = match spec.kind {
        EntityKind::Player | EntityKind::WalkingEnemy => {
            BodyDesc::dynamic(collider).with_fixed_rotation(true)
        }
        EntityKind::RollingEnemy => BodyDesc::dynamic(collider),
        EntityKind::Ladder => BodyDesc::fixed(collider).as_sensor(),
        EntityKind::Platform | EntityKind::PowerUp(_) | EntityKind::EnemyGenerator => {
            BodyDesc::fixed(collider)
        }
    };
    desc.with_position(spec.position).with_rotation(spec.angle)
}

/// Level construction: one simulation space, then its bodies.
///
/// ```ignore
/// let mut builder = LevelBuilder::new();
/// builder.create_space(SimulationConfig::default())?;
/// let player = builder.create_body(&BodySpec::rect(EntityKind::Player, 1.0, 1.0).at(Vec2::new(2.0, 2.0)))?;
/// let mut sim = builder.build()?;
/// ```
#[derive(Default)]
pub struct LevelBuilder {
    simulation: Option<Simulation>,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the simulation space. Only one space per builder.
    pub fn create_space(&mut self, config: SimulationConfig) -> Result<()> {
        if self.simulation.is_some() {
            return Err(LevelError::SpaceAlreadyCreated);
        }
        info!(
            "space created: {}x{} world, gravity {:?}, dt {}",
            config.world_width, config.world_height, config.gravity, config.fixed_dt
        );
        self.simulation = Some(Simulation::new(config));
        Ok(())
    }

    /// Validate and create one body. Rejected requests leave the level untouched.
    pub fn create_body(&mut self, spec: &BodySpec) -> Result<BodyId> {
        let simulation = self
            .simulation
            .as_mut()
            .ok_or(LevelError::SpaceNotCreated)?;
        let shape = spec.validate(simulation.config())?;
        if spec.kind == EntityKind::Player && simulation.player_id().is_some() {
            return Err(LevelError::PlayerAlreadyCreated);
        }

        let id = simulation.insert_body(spec.kind, shape, &body_desc(spec, shape));
        debug!("created {} {:?} at {:?}", spec.kind, id, spec.position);
        Ok(id)
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.simulation.as_mut()
    }

    /// Finish construction and hand over the simulation.
    pub fn build(self) -> Result<Simulation> {
        let simulation = self.simulation.ok_or(LevelError::SpaceNotCreated)?;
        info!("level built with {} bodies", simulation.registry().len());
        Ok(simulation)
    }
}
