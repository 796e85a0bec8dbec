use glam::Vec2;
use log::{debug, info};

use crate::api::config::SimulationConfig;
use crate::api::error::Result;
use crate::api::types::{BodyId, EntityKind, EntityState, Notification};
use crate::components::body::{BodyPose, BodyShape, BodyView, LogicalBody};
use crate::components::player::{Player, PlayerStatus};
use crate::core::physics::{BodyDesc, ColliderMaterial, PhysicsWorld};
use crate::core::registry::BodyRegistry;
use crate::core::time::FixedTimestep;
use crate::systems::collision::StepOutcome;
use crate::systems::geometry::is_inside;
use crate::systems::hooks::CollisionRules;
use crate::systems::notify::NotificationSink;

/// Vertical speed below which the player counts as standing, for jumps.
const JUMP_REST_SPEED: f32 = 0.05;

/// Movement requests for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Idle,
    MoveLeft,
    MoveRight,
    Jump,
    ClimbUp,
    ClimbDown,
}

/// One simulation space: the engine world, the body registry and the player.
///
/// Single-threaded and fixed-step: call [`Simulation::step`] once per game
/// tick. Contact rules run synchronously inside the engine step.
pub struct Simulation {
    world: PhysicsWorld,
    registry: BodyRegistry,
    player: Option<Player>,
    colliding_ladder: Option<BodyId>,
    config: SimulationConfig,
    timestep: FixedTimestep,
    tick: u64,
}

impl Simulation {
    pub(crate) fn new(config: SimulationConfig) -> Self {
        let mut world = PhysicsWorld::new(config.gravity);
        world.set_dt(config.fixed_dt);
        let timestep = FixedTimestep::new(config.fixed_dt, config.max_catch_up_ticks);
        Self {
            world,
            registry: BodyRegistry::new(),
            player: None,
            colliding_ladder: None,
            config,
            timestep,
            tick: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Ticks stepped so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Create an engine body from an already validated description and register it.
    pub(crate) fn insert_body(&mut self, kind: EntityKind, shape: BodyShape, desc: &BodyDesc) -> BodyId {
        let handle = self.world.create_body(desc, ColliderMaterial::default());
        match kind {
            EntityKind::Player => {
                let id = self.registry.register_player_body(handle, shape);
                if self.player.is_none() {
                    self.player = Some(Player::new(id, &self.config));
                }
                id
            }
            _ => self.registry.register_body(handle, kind, shape),
        }
    }

    /// Discard a body for good: deleted from the engine and the registry.
    pub fn remove(&mut self, id: BodyId) -> Result<()> {
        let removed = self.registry.remove(id, &mut self.world)?;
        if self.player.as_ref().is_some_and(|p| p.id == id) {
            self.player = None;
        }
        if self.colliding_ladder == Some(id) {
            self.colliding_ladder = None;
        }
        debug!("removed {} {:?}", removed.kind, id);
        Ok(())
    }

    // -- Read-only accessors --

    pub fn player_id(&self) -> Option<BodyId> {
        self.player.as_ref().map(|p| p.id)
    }

    pub fn player_status(&self) -> Option<&PlayerStatus> {
        self.player.as_ref().map(|p| &p.status)
    }

    pub fn player_state(&self) -> Option<EntityState> {
        self.player.as_ref().map(|p| p.state)
    }

    /// The ladder the player overlapped at the start of the last tick.
    pub fn colliding_ladder(&self) -> Option<BodyId> {
        self.colliding_ladder
    }

    pub fn body(&self, id: BodyId) -> Option<BodyView> {
        self.registry.get(id).map(|body| self.view(id, body))
    }

    /// Snapshot every registered body, in id order.
    pub fn bodies(&self) -> impl Iterator<Item = BodyView> + '_ {
        self.registry.iter().map(move |(id, body)| self.view(id, body))
    }

    fn view(&self, id: BodyId, body: &LogicalBody) -> BodyView {
        let (position, angle) = self.world.body_position(&body.handle);
        BodyView {
            id,
            kind: body.kind,
            position,
            angle,
            width: body.shape.width(),
            height: body.shape.height(),
            velocity: self.world.velocity(&body.handle),
            state: self
                .player
                .as_ref()
                .filter(|p| p.id == id)
                .map(|p| p.state),
            active: body.active,
        }
    }

    fn pose_of(&self, id: BodyId) -> Option<BodyPose> {
        self.registry
            .get(id)
            .map(|body| self.world.pose(&body.handle, body.shape))
    }

    // -- Stepping --

    /// Feed a variable frame time and run as many whole ticks as it covers.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, frame_dt: f32, sink: &mut dyn NotificationSink) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.step(sink);
        }
        steps
    }

    /// Run one tick: refresh the colliding ladder, advance status timers,
    /// check for a fall out of the level, then step the engine once.
    pub fn step(&mut self, sink: &mut dyn NotificationSink) {
        self.tick += 1;

        self.colliding_ladder = self.find_colliding_ladder();
        if self.colliding_ladder.is_none()
            && self.player_state().is_some_and(EntityState::is_climbing)
        {
            debug!("player left the ladder at tick {}", self.tick);
            self.set_player_state(EntityState::Idle);
        }

        if let Some(player) = self.player.as_mut() {
            let expired = player.status.tick();
            if expired.invulnerability {
                debug!("player invulnerability ended at tick {}", self.tick);
            }
            if expired.invincibility {
                debug!("player invincibility ended at tick {}", self.tick);
            }
        }

        self.check_fall(sink);
        self.clamp_player_velocity();

        let rules = CollisionRules::new(
            &self.registry,
            self.player.as_ref(),
            self.colliding_ladder,
            self.config.contact_tolerance,
        );
        self.world.step(&rules);
        if let Some(outcome) = rules.into_outcome() {
            self.apply_outcome(outcome, sink);
        }
    }

    /// First active ladder overlapping the live player, if any.
    fn find_colliding_ladder(&self) -> Option<BodyId> {
        let player = self.registry.get(self.player.as_ref()?.id)?;
        if !player.active {
            return None;
        }
        self.registry
            .ladders()
            .filter(|(_, ladder)| ladder.active)
            .find(|(_, ladder)| self.world.intersects(&player.handle, &ladder.handle))
            .map(|(id, _)| id)
    }

    /// Kill the player once its extent has left the level past the origin.
    fn check_fall(&mut self, sink: &mut dyn NotificationSink) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        if !player.status.is_alive() {
            return;
        }
        let id = player.id;
        let Some(body) = self.registry.get(id) else {
            return;
        };
        let (pos, _) = self.world.body_position(&body.handle);
        let reach = pos + body.shape.half_extents();
        if reach.x >= 0.0 && reach.y >= 0.0 {
            return;
        }

        if let Some(player) = self.player.as_mut() {
            player.status.kill();
        }
        self.deactivate(id);
        info!("player fell out of the level at {:?}", pos);
        sink.notify(Notification::PlayerKilled);
    }

    fn clamp_player_velocity(&mut self) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let Some(handle) = self.registry.get(player.id).map(|b| b.handle) else {
            return;
        };
        let velocity = self.world.velocity(&handle);
        let clamped = player.status.clamp_velocity(velocity);
        if clamped != velocity {
            self.world.set_velocity(&handle, clamped);
        }
    }

    fn apply_outcome(&mut self, outcome: StepOutcome, sink: &mut dyn NotificationSink) {
        let (status, state, deactivated, notifications) = outcome.into_parts();
        for id in deactivated {
            self.deactivate(id);
        }
        if let Some(player) = self.player.as_mut() {
            player.status = status;
        }
        self.set_player_state(state);
        for notification in notifications {
            sink.notify(notification);
        }
    }

    /// Take a body out of play without deleting it.
    fn deactivate(&mut self, id: BodyId) {
        if let Some(handle) = self.registry.get(id).map(|b| b.handle) {
            self.world.set_enabled(&handle, false);
        }
        self.registry.set_active(id, false);
    }

    /// Change the player's state, switching gravity off while on a ladder.
    /// Leaving a climb drops the climb's vertical velocity.
    fn set_player_state(&mut self, state: EntityState) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let was_climbing = player.state.is_climbing();
        player.state = state;
        let id = player.id;
        if was_climbing == state.is_climbing() {
            return;
        }
        let Some(handle) = self.registry.get(id).map(|b| b.handle) else {
            return;
        };
        if state.is_climbing() {
            self.world.set_gravity_scale(&handle, 0.0);
        } else {
            self.world.set_gravity_scale(&handle, 1.0);
            let velocity = self.world.velocity(&handle);
            self.world.set_velocity(&handle, Vec2::new(velocity.x, 0.0));
        }
    }

    // -- Movement --

    /// Apply a movement command to the player. Returns `false` when the
    /// command has no effect (no live player, mid-air jump, no ladder to climb).
    pub fn command(&mut self, command: PlayerCommand) -> bool {
        let Some(player) = self.player.as_ref() else {
            return false;
        };
        if !player.status.is_alive() {
            return false;
        }
        let id = player.id;
        let current = player.state;
        let Some(handle) = self.registry.get(id).map(|b| b.handle) else {
            return false;
        };

        let tuning = &self.config.player;
        let mut velocity = self.world.velocity(&handle);
        let state = match command {
            PlayerCommand::Idle => {
                velocity.x = 0.0;
                if current.is_climbing() {
                    velocity.y = 0.0;
                }
                EntityState::Idle
            }
            PlayerCommand::MoveLeft => {
                velocity.x = -tuning.move_speed;
                EntityState::MovingLeft
            }
            PlayerCommand::MoveRight => {
                velocity.x = tuning.move_speed;
                EntityState::MovingRight
            }
            PlayerCommand::Jump => {
                if current.is_climbing() || velocity.y.abs() > JUMP_REST_SPEED {
                    return false;
                }
                velocity.y = tuning.jump_speed;
                EntityState::Jumping
            }
            PlayerCommand::ClimbUp | PlayerCommand::ClimbDown => {
                if !self.can_climb(id) {
                    return false;
                }
                let (speed, state) = if command == PlayerCommand::ClimbUp {
                    (tuning.climb_speed, EntityState::ClimbingUp)
                } else {
                    (-tuning.climb_speed, EntityState::ClimbingDown)
                };
                velocity = Vec2::new(0.0, speed);
                state
            }
        };

        let velocity = match self.player.as_ref() {
            Some(player) => player.status.clamp_velocity(velocity),
            None => velocity,
        };
        self.world.set_velocity(&handle, velocity);
        self.set_player_state(state);
        true
    }

    /// The player overlaps a ladder and is roughly centred on it.
    fn can_climb(&self, player: BodyId) -> bool {
        let Some(ladder) = self.colliding_ladder.or_else(|| self.find_colliding_ladder()) else {
            return false;
        };
        match (self.pose_of(player), self.pose_of(ladder)) {
            (Some(player), Some(ladder)) => is_inside(&player, &ladder),
            _ => false,
        }
    }
}
