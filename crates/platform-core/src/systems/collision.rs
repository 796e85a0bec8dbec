//! Post-collision resolver: turns a confirmed player collision into a game
//! outcome (enemy kill, player hit, power-up pickup, end of climb).
//!
//! Side effects are collected in a [`StepOutcome`] and applied by the stepper
//! once the engine step returns.

use log::{debug, info, warn};

use crate::api::types::{BodyId, EntityKind, EntityState, Notification, PowerUpKind};
use crate::components::body::BodyShape;
use crate::components::player::{HitOutcome, Player, PlayerStatus};
use crate::systems::contact_filter::{at_ladder_end, ContactResponse, PlayerContact};
use crate::systems::geometry::is_above;

/// Everything the resolver changed during one engine step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub player: BodyId,
    /// Working copy of the player status, written back after the step.
    pub status: PlayerStatus,
    pub state: EntityState,
    deactivated: Vec<BodyId>,
    notifications: Vec<Notification>,
}

impl StepOutcome {
    pub fn new(player: &Player) -> Self {
        Self {
            player: player.id,
            status: player.status.clone(),
            state: player.state,
            deactivated: Vec::new(),
            notifications: Vec::new(),
        }
    }

    /// Queue a body for deactivation. Queuing twice is harmless.
    pub fn deactivate(&mut self, id: BodyId) {
        if !self.deactivated.contains(&id) {
            self.deactivated.push(id);
        }
    }

    pub fn is_deactivated(&self, id: BodyId) -> bool {
        self.deactivated.contains(&id)
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Bodies to take out of play, in the order they were hit.
    pub fn deactivated(&self) -> &[BodyId] {
        &self.deactivated
    }

    /// Notifications in emission order.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Split into (status, state, deactivated bodies, notifications).
    pub fn into_parts(self) -> (PlayerStatus, EntityState, Vec<BodyId>, Vec<Notification>) {
        (self.status, self.state, self.deactivated, self.notifications)
    }
}

/// Decide the outcome of a confirmed collision between the player and another body.
pub fn resolve_collision(contact: &PlayerContact, outcome: &mut StepOutcome) -> ContactResponse {
    if !outcome.status.is_alive() {
        return ContactResponse::Solve;
    }
    if outcome.is_deactivated(contact.other) {
        return ContactResponse::Ignore;
    }

    match contact.other_kind {
        EntityKind::PowerUp(kind) => collect_power_up(contact.other, kind, outcome),
        EntityKind::WalkingEnemy | EntityKind::RollingEnemy => meet_enemy(contact, outcome),
        EntityKind::Platform => {
            end_climb_on_platform(contact, outcome);
            ContactResponse::Solve
        }
        EntityKind::Player | EntityKind::Ladder | EntityKind::EnemyGenerator => {
            ContactResponse::Solve
        }
    }
}

fn collect_power_up(id: BodyId, kind: PowerUpKind, outcome: &mut StepOutcome) -> ContactResponse {
    outcome.deactivate(id);
    if kind != PowerUpKind::Goal {
        outcome.status.give_power_up(kind);
    }
    outcome.notify(kind.notification());
    match kind {
        PowerUpKind::Goal => info!("goal {:?} reached", id),
        _ => debug!("collected {:?} from {:?}", kind, id),
    }
    // Power-ups are never solid.
    ContactResponse::Ignore
}

fn meet_enemy(contact: &PlayerContact, outcome: &mut StepOutcome) -> ContactResponse {
    if outcome.state.is_climbing() {
        return ContactResponse::Ignore;
    }

    let stomped = match contact.other_pose.shape {
        BodyShape::Rectangle { .. } => contact.player_on_top(),
        BodyShape::Circle { .. } => is_above(
            &contact.touching_player(),
            &contact.other_pose,
            contact.point,
            contact.tolerance,
        ),
    };

    if outcome.status.is_invincible() || stomped {
        outcome.deactivate(contact.other);
        if let Some(notification) = contact.other_kind.kill_notification() {
            outcome.notify(notification);
        }
        debug!("{} {:?} killed", contact.other_kind, contact.other);
        return ContactResponse::Solve;
    }

    if outcome.status.is_invulnerable() {
        return ContactResponse::Ignore;
    }

    match outcome.status.hit() {
        HitOutcome::Wounded { lives } => {
            debug!("player hit by {:?}, {} lives left", contact.other, lives);
        }
        HitOutcome::Killed => {
            outcome.deactivate(outcome.player);
            outcome.notify(Notification::PlayerKilled);
            info!("player killed by {}", contact.other_kind);
        }
        HitOutcome::Ignored => {}
    }
    ContactResponse::Solve
}

fn end_climb_on_platform(contact: &PlayerContact, outcome: &mut StepOutcome) {
    if !outcome.state.is_climbing() {
        return;
    }
    let Some(ladder) = contact.ladder else {
        warn!("player climbing without a colliding ladder; treating as absent");
        return;
    };
    if contact.player_on_top() && at_ladder_end(outcome.state, &contact.player, &ladder) {
        debug!("climb ended on platform {:?}", contact.other);
        outcome.state = EntityState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    use crate::api::config::SimulationConfig;
    use crate::components::body::BodyPose;
    use crate::systems::geometry::DEFAULT_TOLERANCE;

    const PLAYER: BodyId = BodyId(0);
    const OTHER: BodyId = BodyId(1);

    fn outcome_with_lives(lives: u32) -> StepOutcome {
        let config = SimulationConfig::default().with_initial_lives(lives);
        StepOutcome::new(&Player::new(PLAYER, &config))
    }

    /// Player standing squarely on a unit box enemy.
    fn stomp(kind: EntityKind) -> PlayerContact {
        PlayerContact {
            player: BodyPose::rect(Vec2::new(0.0, 1.0), 1.0, 1.0),
            state: EntityState::Idle,
            ladder: None,
            other: OTHER,
            other_kind: kind,
            other_pose: BodyPose::rect(Vec2::ZERO, 1.0, 1.0),
            point: Vec2::new(0.0, 0.5),
            separation: Vec2::ZERO,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Player running into the side of a unit box enemy.
    fn side(kind: EntityKind) -> PlayerContact {
        PlayerContact {
            player: BodyPose::rect(Vec2::new(1.0, 0.0), 1.0, 1.0),
            point: Vec2::new(0.5, 0.0),
            ..stomp(kind)
        }
    }

    #[test]
    fn stomping_kills_walking_enemy() {
        let mut outcome = outcome_with_lives(1);
        let response = resolve_collision(&stomp(EntityKind::WalkingEnemy), &mut outcome);
        assert_eq!(response, ContactResponse::Solve);
        assert_eq!(outcome.deactivated(), &[OTHER]);
        assert_eq!(outcome.notifications(), &[Notification::WalkingEnemyKilled]);
        assert_eq!(outcome.status.lives(), 1);
    }

    #[test]
    fn stomping_round_enemy_uses_above_test() {
        let mut outcome = outcome_with_lives(1);
        let contact = PlayerContact {
            other_pose: BodyPose::circle(Vec2::ZERO, 1.0),
            ..stomp(EntityKind::RollingEnemy)
        };
        resolve_collision(&contact, &mut outcome);
        assert_eq!(outcome.notifications(), &[Notification::RollingEnemyKilled]);
    }

    #[test]
    fn falling_stomp_counts_despite_penetration() {
        // One tick of a fast fall: the player's bottom is 0.1 inside the enemy.
        let sunk = PlayerContact {
            player: BodyPose::rect(Vec2::new(0.0, 0.9), 1.0, 1.0),
            separation: Vec2::new(0.0, 0.1),
            ..stomp(EntityKind::WalkingEnemy)
        };
        let mut outcome = outcome_with_lives(3);
        resolve_collision(&sunk, &mut outcome);
        assert_eq!(outcome.notifications(), &[Notification::WalkingEnemyKilled]);
        assert_eq!(outcome.status.lives(), 3);

        let round = PlayerContact {
            other_kind: EntityKind::RollingEnemy,
            other_pose: BodyPose::circle(Vec2::ZERO, 1.0),
            ..sunk
        };
        let mut outcome = outcome_with_lives(3);
        resolve_collision(&round, &mut outcome);
        assert_eq!(outcome.notifications(), &[Notification::RollingEnemyKilled]);
    }

    #[test]
    fn side_contact_costs_a_life() {
        let mut outcome = outcome_with_lives(3);
        let response = resolve_collision(&side(EntityKind::WalkingEnemy), &mut outcome);
        assert_eq!(response, ContactResponse::Solve);
        assert_eq!(outcome.status.lives(), 2);
        assert!(outcome.status.is_invulnerable());
        assert!(outcome.notifications().is_empty());
        assert!(outcome.deactivated().is_empty());
    }

    #[test]
    fn invulnerable_player_passes_through() {
        let mut outcome = outcome_with_lives(3);
        resolve_collision(&side(EntityKind::WalkingEnemy), &mut outcome);
        let response = resolve_collision(&side(EntityKind::WalkingEnemy), &mut outcome);
        assert_eq!(response, ContactResponse::Ignore);
        assert_eq!(outcome.status.lives(), 2);
    }

    #[test]
    fn lethal_hit_deactivates_player_once() {
        let mut outcome = outcome_with_lives(1);
        resolve_collision(&side(EntityKind::RollingEnemy), &mut outcome);
        resolve_collision(&side(EntityKind::RollingEnemy), &mut outcome);
        assert_eq!(outcome.status.lives(), 0);
        assert_eq!(outcome.deactivated(), &[PLAYER]);
        assert_eq!(outcome.notifications(), &[Notification::PlayerKilled]);
    }

    #[test]
    fn invincible_player_kills_from_the_side() {
        let mut outcome = outcome_with_lives(1);
        outcome.status.give_power_up(PowerUpKind::Invincibility);
        resolve_collision(&side(EntityKind::WalkingEnemy), &mut outcome);
        assert_eq!(outcome.notifications(), &[Notification::WalkingEnemyKilled]);
        assert_eq!(outcome.status.lives(), 1);
    }

    #[test]
    fn climbing_player_ignores_enemies() {
        let mut outcome = outcome_with_lives(1);
        outcome.state = EntityState::ClimbingDown;
        let response = resolve_collision(&side(EntityKind::WalkingEnemy), &mut outcome);
        assert_eq!(response, ContactResponse::Ignore);
        assert_eq!(outcome.status.lives(), 1);
    }

    #[test]
    fn power_ups_apply_once_and_vanish() {
        let mut outcome = outcome_with_lives(1);
        let contact = side(EntityKind::PowerUp(PowerUpKind::ExtraLife));
        assert_eq!(resolve_collision(&contact, &mut outcome), ContactResponse::Ignore);
        assert_eq!(resolve_collision(&contact, &mut outcome), ContactResponse::Ignore);
        assert_eq!(outcome.status.lives(), 2);
        assert_eq!(outcome.notifications(), &[Notification::PowerUpHit]);
        assert_eq!(outcome.deactivated(), &[OTHER]);
    }

    #[test]
    fn goal_leaves_status_untouched() {
        let mut outcome = outcome_with_lives(1);
        resolve_collision(&side(EntityKind::PowerUp(PowerUpKind::Goal)), &mut outcome);
        assert_eq!(outcome.status.lives(), 1);
        assert_eq!(outcome.notifications(), &[Notification::GoalHit]);
    }

    #[test]
    fn reaching_ladder_top_ends_climb() {
        let mut outcome = outcome_with_lives(1);
        outcome.state = EntityState::ClimbingUp;
        let contact = PlayerContact {
            player: BodyPose::rect(Vec2::new(5.0, 8.5), 1.0, 1.0),
            state: EntityState::ClimbingUp,
            ladder: Some(BodyPose::rect(Vec2::new(5.0, 5.0), 1.0, 6.0)),
            other: OTHER,
            other_kind: EntityKind::Platform,
            other_pose: BodyPose::rect(Vec2::new(5.0, 7.75), 4.0, 0.5),
            point: Vec2::new(5.0, 8.0),
            separation: Vec2::ZERO,
            tolerance: DEFAULT_TOLERANCE,
        };
        assert_eq!(resolve_collision(&contact, &mut outcome), ContactResponse::Solve);
        assert_eq!(outcome.state, EntityState::Idle);
    }

    #[test]
    fn platform_mid_ladder_keeps_climbing() {
        let mut outcome = outcome_with_lives(1);
        outcome.state = EntityState::ClimbingUp;
        let contact = PlayerContact {
            player: BodyPose::rect(Vec2::new(5.0, 5.2), 1.0, 1.0),
            state: EntityState::ClimbingUp,
            ladder: Some(BodyPose::rect(Vec2::new(5.0, 5.0), 1.0, 6.0)),
            other: OTHER,
            other_kind: EntityKind::Platform,
            other_pose: BodyPose::rect(Vec2::new(5.0, 5.0), 4.0, 0.5),
            point: Vec2::new(5.0, 4.975),
            separation: Vec2::ZERO,
            tolerance: DEFAULT_TOLERANCE,
        };
        resolve_collision(&contact, &mut outcome);
        assert_eq!(outcome.state, EntityState::ClimbingUp);
    }
}
