//! Player status machine: lives, post-hit invulnerability and the
//! invincibility power-up window.
//!
//! Timed statuses run on tick counters advanced by the stepper, never on
//! wall-clock time, so a replay at the same tick rate is bit-for-bit identical.

use glam::Vec2;

use crate::api::config::SimulationConfig;
use crate::api::types::{BodyId, EntityState, PowerUpKind};

/// Counts ticks modulo a fixed period while armed.
/// Wrapping back to zero disarms the counter and reports expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter {
    period: u32,
    count: u32,
    armed: bool,
}

impl TickCounter {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            count: 0,
            armed: false,
        }
    }

    /// Restart the window from zero.
    pub fn arm(&mut self) {
        self.count = 0;
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.count = 0;
        self.armed = false;
    }

    /// Advance one tick. Returns `true` on the tick the counter wraps.
    pub fn advance(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.count = (self.count + 1) % self.period;
        if self.count == 0 {
            self.armed = false;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Result of registering a hit on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Player was invulnerable or already dead; nothing changed.
    Ignored,
    Wounded { lives: u32 },
    Killed,
}

/// Statuses that ended during one call to [`PlayerStatus::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expired {
    pub invulnerability: bool,
    pub invincibility: bool,
}

/// Lives, invulnerability and invincibility of the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    lives: u32,
    invulnerable: bool,
    invincible: bool,
    base_caps: Vec2,
    caps: Vec2,
    invincibility_multiplier: f32,
    hit_cooldown: TickCounter,
    invincibility: TickCounter,
}

impl PlayerStatus {
    pub fn new(config: &SimulationConfig) -> Self {
        let tuning = &config.player;
        Self {
            lives: tuning.initial_lives,
            invulnerable: false,
            invincible: false,
            base_caps: tuning.max_velocity,
            caps: tuning.max_velocity,
            invincibility_multiplier: tuning.invincibility_velocity_multiplier,
            hit_cooldown: TickCounter::new(config.hit_cooldown_ticks),
            invincibility: TickCounter::new(config.invincibility_ticks),
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Current absolute velocity cap per axis.
    pub fn velocity_caps(&self) -> Vec2 {
        self.caps
    }

    /// Take a hit. A no-op while invulnerable; otherwise costs one life and
    /// starts the cooldown. Losing the last life kills the player.
    pub fn hit(&mut self) -> HitOutcome {
        if self.invulnerable || !self.is_alive() {
            return HitOutcome::Ignored;
        }
        self.lives -= 1;
        self.invulnerable = true;
        self.hit_cooldown.arm();
        if self.lives == 0 {
            self.kill();
            HitOutcome::Killed
        } else {
            HitOutcome::Wounded { lives: self.lives }
        }
    }

    /// Force the player dead. Returns `true` if the player was alive before.
    pub fn kill(&mut self) -> bool {
        let was_alive = self.is_alive();
        self.lives = 0;
        was_alive
    }

    pub fn give_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Goal => {}
            PowerUpKind::ExtraLife => self.lives += 1,
            PowerUpKind::Invincibility => {
                self.invincible = true;
                self.caps = self.base_caps * self.invincibility_multiplier;
                self.invincibility.arm();
            }
        }
    }

    pub fn end_invulnerability(&mut self) {
        self.invulnerable = false;
        self.hit_cooldown.disarm();
    }

    /// End the invincibility window and drop the velocity caps back to baseline.
    pub fn end_invincibility(&mut self) {
        self.invincible = false;
        self.caps = self.base_caps;
        self.invincibility.disarm();
    }

    /// Advance both status timers by one tick, ending any that wrap.
    pub fn tick(&mut self) -> Expired {
        let mut expired = Expired::default();
        if self.invincibility.advance() {
            self.end_invincibility();
            expired.invincibility = true;
        }
        if self.hit_cooldown.advance() {
            self.end_invulnerability();
            expired.invulnerability = true;
        }
        expired
    }

    pub fn clamp_velocity(&self, velocity: Vec2) -> Vec2 {
        velocity.clamp(-self.caps, self.caps)
    }
}

/// The player's registry id together with its status and behavioural state.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: BodyId,
    pub status: PlayerStatus,
    pub state: EntityState,
}

impl Player {
    pub fn new(id: BodyId, config: &SimulationConfig) -> Self {
        Self {
            id,
            status: PlayerStatus::new(config),
            state: EntityState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_with_lives(lives: u32) -> PlayerStatus {
        PlayerStatus::new(&SimulationConfig::default().with_initial_lives(lives))
    }

    #[test]
    fn counter_wraps_after_period() {
        let mut counter = TickCounter::new(3);
        assert!(!counter.advance(), "disarmed counter never fires");
        counter.arm();
        assert!(!counter.advance());
        assert!(!counter.advance());
        assert!(counter.advance());
        assert!(!counter.is_armed());
    }

    #[test]
    fn second_hit_in_cooldown_is_ignored() {
        let mut status = status_with_lives(3);
        assert_eq!(status.hit(), HitOutcome::Wounded { lives: 2 });
        assert_eq!(status.hit(), HitOutcome::Ignored);
        assert_eq!(status.lives(), 2);
        assert!(status.is_invulnerable());
    }

    #[test]
    fn last_life_hit_kills() {
        let mut status = status_with_lives(1);
        assert_eq!(status.hit(), HitOutcome::Killed);
        assert_eq!(status.lives(), 0);
        assert!(!status.is_alive());
    }

    #[test]
    fn kill_reports_only_first_death() {
        let mut status = status_with_lives(2);
        assert!(status.kill());
        assert!(!status.kill());
        assert_eq!(status.lives(), 0);
    }

    #[test]
    fn cooldown_ends_after_configured_ticks() {
        let mut status = status_with_lives(3);
        status.hit();
        for _ in 0..59 {
            assert_eq!(status.tick(), Expired::default());
        }
        let expired = status.tick();
        assert!(expired.invulnerability);
        assert!(!status.is_invulnerable());
        assert_eq!(status.hit(), HitOutcome::Wounded { lives: 1 });
    }

    #[test]
    fn invincibility_widens_caps_until_it_expires() {
        let mut status = status_with_lives(1);
        let base = status.velocity_caps();
        status.give_power_up(PowerUpKind::Invincibility);
        assert!(status.is_invincible());
        assert_eq!(status.velocity_caps(), base * 1.5);

        for _ in 0..399 {
            status.tick();
        }
        assert!(status.is_invincible());
        assert!(status.tick().invincibility);
        assert!(!status.is_invincible());
        assert_eq!(status.velocity_caps(), base);
    }

    #[test]
    fn extra_life_and_goal() {
        let mut status = status_with_lives(1);
        status.give_power_up(PowerUpKind::ExtraLife);
        assert_eq!(status.lives(), 2);
        status.give_power_up(PowerUpKind::Goal);
        assert_eq!(status.lives(), 2);
        assert!(!status.is_invincible());
    }

    #[test]
    fn clamp_respects_caps() {
        let status = status_with_lives(1);
        let caps = status.velocity_caps();
        let clamped = status.clamp_velocity(Vec2::new(100.0, -100.0));
        assert_eq!(clamped, Vec2::new(caps.x, -caps.y));
    }
}
