use glam::Vec2;
use rapier2d::parry::query;
use rapier2d::prelude::*;

use crate::components::body::{BodyPose, BodyShape};

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }
}

impl From<BodyShape> for ColliderDesc {
    fn from(shape: BodyShape) -> Self {
        match shape {
            BodyShape::Circle { diameter } => ColliderDesc::Ball { radius: diameter * 0.5 },
            BodyShape::Rectangle { width, height } => ColliderDesc::Cuboid {
                half_width: width * 0.5,
                half_height: height * 0.5,
            },
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub collider: ColliderDesc,
    /// Sensors report overlaps but never produce contacts.
    pub sensor: bool,
    /// Route this body's contacts through the pre-solve hook.
    pub contact_hooks: bool,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            fixed_rotation: false,
            collider,
            sensor: false,
            contact_hooks: true,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: 0.0,
            fixed_rotation: true,
            collider,
            sensor: false,
            contact_hooks: true,
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    /// Turn the collider into a sensor. Sensors skip the contact hooks.
    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self.contact_hooks = false;
        self
    }
}

/// Closest features of two colliders, measured from their current poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    /// On the first collider's surface, world space.
    pub point1: Vec2,
    /// On the second collider's surface, world space.
    pub point2: Vec2,
    /// Unit normal from the first collider towards the second.
    pub normal: Vec2,
    /// Signed gap between the surfaces; negative while penetrating.
    pub dist: f32,
}

/// Handle pair owned by a registry entry, referencing Rapier internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single struct.
/// Owned exclusively by one [`Simulation`](crate::core::simulation::Simulation).
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector (y-up).
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Create a rigid body + collider and return handles.
    pub fn create_body(&mut self, desc: &BodyDesc, material: ColliderMaterial) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .active_hooks(if desc.contact_hooks {
                ActiveHooks::MODIFY_SOLVER_CONTACTS
            } else {
                ActiveHooks::empty()
            })
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the simulation by one fixed step.
    /// `hooks` runs synchronously inside the step for every candidate contact.
    pub fn step(&mut self, hooks: &dyn PhysicsHooks) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            hooks,
            &(),
        );
    }

    /// Enable or disable a body. Disabled bodies and their colliders drop out of
    /// the simulation without being deleted.
    pub fn set_enabled(&mut self, body: &PhysicsBody, enabled: bool) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_enabled(enabled);
        }
    }

    pub fn is_enabled(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.is_enabled())
            .unwrap_or(false)
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_gravity_scale(&mut self, body: &PhysicsBody, scale: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_gravity_scale(scale, true);
        }
    }

    pub fn gravity_scale(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.gravity_scale())
            .unwrap_or(0.0)
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Pose of a body's collider, combined with its registered shape.
    pub fn pose(&self, body: &PhysicsBody, shape: BodyShape) -> BodyPose {
        let (center, angle) = collider_pose(&self.colliders, body.collider_handle)
            .unwrap_or_else(|| self.body_position(body));
        BodyPose::new(center, angle, shape)
    }

    /// Whether the colliders of two bodies currently overlap or touch.
    pub fn intersects(&self, a: &PhysicsBody, b: &PhysicsBody) -> bool {
        let (Some(ca), Some(cb)) = (
            self.colliders.get(a.collider_handle),
            self.colliders.get(b.collider_handle),
        ) else {
            return false;
        };
        query::intersection_test(ca.position(), ca.shape(), cb.position(), cb.shape())
            .unwrap_or(false)
    }

    /// Contact between the colliders of two bodies, if they are within `prediction`.
    pub fn contact(&self, a: &PhysicsBody, b: &PhysicsBody, prediction: f32) -> Option<SurfaceContact> {
        surface_contact(&self.colliders, a.collider_handle, b.collider_handle, prediction)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// World position and rotation of a collider, if it still exists.
pub(crate) fn collider_pose(colliders: &ColliderSet, handle: ColliderHandle) -> Option<(Vec2, f32)> {
    colliders
        .get(handle)
        .map(|collider| na_iso_to_pos_rot(collider.position()))
}

/// Contact between two colliders computed from scratch, independent of the
/// narrow phase's cached manifolds.
pub(crate) fn surface_contact(
    colliders: &ColliderSet,
    a: ColliderHandle,
    b: ColliderHandle,
    prediction: f32,
) -> Option<SurfaceContact> {
    let (ca, cb) = (colliders.get(a)?, colliders.get(b)?);
    let contact = query::contact(ca.position(), ca.shape(), cb.position(), cb.shape(), prediction)
        .ok()
        .flatten()?;
    Some(SurfaceContact {
        point1: Vec2::new(contact.point1.x, contact.point1.y),
        point2: Vec2::new(contact.point2.x, contact.point2.y),
        normal: na_to_vec2(&contact.normal1),
        dist: contact.dist,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> ColliderDesc {
        ColliderDesc::Cuboid {
            half_width: 0.5,
            half_height: 0.5,
        }
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(&BodyDesc::dynamic(unit_box()), ColliderMaterial::default());
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            &BodyDesc::dynamic(unit_box()).with_position(Vec2::new(0.0, 10.0)),
            ColliderMaterial::default(),
        );

        for _ in 0..10 {
            world.step(&());
        }
        let (pos, _) = world.body_position(&body);
        assert!(pos.y < 10.0, "Body should fall in y-up space: y={}", pos.y);
    }

    #[test]
    fn fixed_body_does_not_move() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -10.0));
        let body = world.create_body(
            &BodyDesc::fixed(unit_box()).with_position(Vec2::new(3.0, 4.0)),
            ColliderMaterial::default(),
        );
        for _ in 0..10 {
            world.step(&());
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos - Vec2::new(3.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn set_velocity_directly() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(&BodyDesc::dynamic(unit_box()), ColliderMaterial::default());
        world.set_velocity(&body, Vec2::new(2.0, -3.0));
        let vel = world.velocity(&body);
        assert!((vel.x - 2.0).abs() < 0.001);
        assert!((vel.y + 3.0).abs() < 0.001);
    }

    #[test]
    fn disabled_body_stays_registered() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(&BodyDesc::dynamic(unit_box()), ColliderMaterial::default());
        assert!(world.is_enabled(&body));
        world.set_enabled(&body, false);
        assert!(!world.is_enabled(&body));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn intersects_detects_sensor_overlap() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let sensor = world.create_body(
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: 0.5,
                half_height: 3.0,
            })
            .with_position(Vec2::new(5.0, 5.0))
            .as_sensor(),
            ColliderMaterial::default(),
        );
        let near = world.create_body(
            &BodyDesc::dynamic(unit_box()).with_position(Vec2::new(5.2, 4.0)),
            ColliderMaterial::default(),
        );
        let far = world.create_body(
            &BodyDesc::dynamic(unit_box()).with_position(Vec2::new(9.0, 4.0)),
            ColliderMaterial::default(),
        );
        assert!(world.intersects(&near, &sensor));
        assert!(!world.intersects(&far, &sensor));
    }

    #[test]
    fn contact_reports_surfaces_of_overlapping_boxes() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let top = world.create_body(
            &BodyDesc::dynamic(unit_box()).with_position(Vec2::new(0.0, 0.9)),
            ColliderMaterial::default(),
        );
        let bottom = world.create_body(&BodyDesc::fixed(unit_box()), ColliderMaterial::default());

        let contact = world.contact(&top, &bottom, 0.1).unwrap();
        assert!(contact.normal.y < -0.99, "normal={:?}", contact.normal);
        assert!((contact.dist + 0.1).abs() < 1e-4, "dist={}", contact.dist);
        assert!((contact.point1.y - 0.4).abs() < 1e-4);
        assert!((contact.point2.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn contact_is_none_beyond_prediction() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let a = world.create_body(&BodyDesc::fixed(unit_box()), ColliderMaterial::default());
        let b = world.create_body(
            &BodyDesc::fixed(unit_box()).with_position(Vec2::new(3.0, 0.0)),
            ColliderMaterial::default(),
        );
        assert!(world.contact(&a, &b, 0.1).is_none());
    }

    #[test]
    fn pose_reports_rotation_and_shape() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let shape = BodyShape::Rectangle { width: 4.0, height: 0.5 };
        let body = world.create_body(
            &BodyDesc::fixed(shape.into())
                .with_position(Vec2::new(2.0, 1.0))
                .with_rotation(0.25),
            ColliderMaterial::default(),
        );
        let pose = world.pose(&body, shape);
        assert!((pose.center - Vec2::new(2.0, 1.0)).length() < 1e-5);
        assert!((pose.angle - 0.25).abs() < 1e-5);
        assert_eq!(pose.shape, shape);
    }

    #[test]
    fn shape_converts_to_collider() {
        let ball: ColliderDesc = BodyShape::Circle { diameter: 2.0 }.into();
        assert_eq!(ball, ColliderDesc::Ball { radius: 1.0 });
        let cuboid: ColliderDesc = BodyShape::Rectangle { width: 2.0, height: 1.0 }.into();
        assert_eq!(
            cuboid,
            ColliderDesc::Cuboid {
                half_width: 1.0,
                half_height: 0.5
            }
        );
    }

    #[test]
    fn builder_pattern() {
        let desc = BodyDesc::dynamic(unit_box())
            .with_position(Vec2::new(10.0, 20.0))
            .with_velocity(Vec2::new(1.0, 2.0))
            .with_fixed_rotation(true);
        assert_eq!(desc.body_type, BodyType::Dynamic);
        assert_eq!(desc.position, Vec2::new(10.0, 20.0));
        assert!(desc.fixed_rotation);
        assert!(desc.contact_hooks);
        let sensor = BodyDesc::fixed(unit_box()).as_sensor();
        assert!(sensor.sensor);
        assert!(!sensor.contact_hooks);
    }
}
