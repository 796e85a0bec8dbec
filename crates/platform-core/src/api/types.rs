use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Index of a logical body in the registry arena.
/// Indices are never reused, so an id stays valid for the body's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a power-up does when the player touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Reaching it finishes the level.
    Goal,
    ExtraLife,
    Invincibility,
}

impl PowerUpKind {
    /// The notification the outer game receives when this power-up is collected.
    pub fn notification(self) -> Notification {
        match self {
            PowerUpKind::Goal => Notification::GoalHit,
            PowerUpKind::ExtraLife => Notification::PowerUpHit,
            PowerUpKind::Invincibility => Notification::InvincibilityHit,
        }
    }
}

/// Entity type tag attached to every physical body at creation time.
/// Power-ups carry their flavour so the resolver can match on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Platform,
    Ladder,
    PowerUp(PowerUpKind),
    WalkingEnemy,
    RollingEnemy,
    EnemyGenerator,
}

impl EntityKind {
    /// Every kind, with the power-up flavour set to `Goal`.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Player,
        EntityKind::Platform,
        EntityKind::Ladder,
        EntityKind::PowerUp(PowerUpKind::Goal),
        EntityKind::WalkingEnemy,
        EntityKind::RollingEnemy,
        EntityKind::EnemyGenerator,
    ];

    pub fn is_enemy(self) -> bool {
        matches!(self, EntityKind::WalkingEnemy | EntityKind::RollingEnemy)
    }

    /// Notification emitted when a body of this kind is killed by the player.
    pub fn kill_notification(self) -> Option<Notification> {
        match self {
            EntityKind::WalkingEnemy => Some(Notification::WalkingEnemyKilled),
            EntityKind::RollingEnemy => Some(Notification::RollingEnemyKilled),
            _ => None,
        }
    }

    pub fn power_up(self) -> Option<PowerUpKind> {
        match self {
            EntityKind::PowerUp(kind) => Some(kind),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Platform => "platform",
            EntityKind::Ladder => "ladder",
            EntityKind::PowerUp(_) => "power-up",
            EntityKind::WalkingEnemy => "walking enemy",
            EntityKind::RollingEnemy => "rolling enemy",
            EntityKind::EnemyGenerator => "enemy generator",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behavioural state of an entity. Only the player changes state in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityState {
    #[default]
    Idle,
    MovingLeft,
    MovingRight,
    Jumping,
    ClimbingUp,
    ClimbingDown,
}

impl EntityState {
    pub fn is_climbing(self) -> bool {
        matches!(self, EntityState::ClimbingUp | EntityState::ClimbingDown)
    }
}

/// Game-semantic outcome reported to the outer game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    GoalHit,
    PowerUpHit,
    InvincibilityHit,
    WalkingEnemyKilled,
    RollingEnemyKilled,
    PlayerKilled,
}

impl Notification {
    /// Stable numeric code used when the notification crosses a host boundary.
    pub fn code(self) -> u32 {
        match self {
            Notification::GoalHit => 1,
            Notification::PowerUpHit => 2,
            Notification::InvincibilityHit => 3,
            Notification::WalkingEnemyKilled => 4,
            Notification::RollingEnemyKilled => 5,
            Notification::PlayerKilled => 6,
        }
    }
}

/// A notification flattened for a host that reads events out of a float buffer.
/// `kind` is [`Notification::code`], `a` is a running sequence number, `b/c` are reserved.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}
