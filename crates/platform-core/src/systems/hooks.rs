//! Bridge between Rapier's pre-solve hook and the collision rules.
//!
//! Rapier calls [`PhysicsHooks::modify_solver_contacts`] once per contact
//! manifold, synchronously inside the step. For every player contact the
//! contact filter runs first; contacts it keeps that carry solver points are
//! handed to the resolver. Hooks only get shared access, so resolver side
//! effects land in a mutex-guarded [`StepOutcome`].
//!
//! The contact point is recomputed from the colliders' current poses rather
//! than taken from the cached manifold, which lags behind fast or deep
//! penetrations.

use std::sync::{Mutex, PoisonError};

use glam::Vec2;
use log::warn;
use rapier2d::prelude::*;

use crate::api::types::{BodyId, EntityKind};
use crate::components::body::BodyPose;
use crate::components::player::Player;
use crate::core::physics::{collider_pose, surface_contact};
use crate::core::registry::BodyRegistry;
use crate::systems::collision::{resolve_collision, StepOutcome};
use crate::systems::contact_filter::{filter_contact, PlayerContact};

/// Collision rules for one engine step.
pub struct CollisionRules<'a> {
    registry: &'a BodyRegistry,
    ladder: Option<BodyId>,
    tolerance: f32,
    /// `None` when there is no player: every contact is solved as-is.
    outcome: Option<Mutex<StepOutcome>>,
}

impl<'a> CollisionRules<'a> {
    pub fn new(
        registry: &'a BodyRegistry,
        player: Option<&Player>,
        ladder: Option<BodyId>,
        tolerance: f32,
    ) -> Self {
        Self {
            registry,
            ladder,
            tolerance,
            outcome: player.map(|p| Mutex::new(StepOutcome::new(p))),
        }
    }

    /// Side effects gathered during the step.
    pub fn into_outcome(self) -> Option<StepOutcome> {
        self.outcome
            .map(|outcome| outcome.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    /// Contact point on the other body's surface and the player's way out of
    /// penetration. Falls back to the solver points when the shapes cannot be queried.
    fn measure(
        &self,
        colliders: &ColliderSet,
        player: BodyId,
        other: BodyId,
        solver_contacts: &[SolverContact],
    ) -> (Vec2, Vec2) {
        let handles = self
            .registry
            .get(player)
            .zip(self.registry.get(other))
            .map(|(p, o)| (p.handle.collider_handle, o.handle.collider_handle));
        match handles.and_then(|(p, o)| surface_contact(colliders, p, o, CONTACT_PREDICTION)) {
            Some(contact) => (contact.point2, contact.normal * contact.dist),
            None => (contact_point(solver_contacts), Vec2::ZERO),
        }
    }

    fn pose(&self, colliders: &ColliderSet, id: BodyId) -> Option<(BodyPose, EntityKind)> {
        let body = self.registry.get(id)?;
        let (center, angle) = collider_pose(colliders, body.handle.collider_handle)?;
        Some((BodyPose::new(center, angle, body.shape), body.kind))
    }
}

/// Search distance for the recomputed contact; the narrow phase only reports
/// pairs far closer than this.
const CONTACT_PREDICTION: f32 = 0.1;

/// Mean of the solver contact points, in world space.
fn contact_point(solver_contacts: &[SolverContact]) -> Vec2 {
    let sum = solver_contacts
        .iter()
        .fold(Vec2::ZERO, |acc, c| acc + Vec2::new(c.point.x, c.point.y));
    sum / solver_contacts.len() as f32
}

impl PhysicsHooks for CollisionRules<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let Some(outcome) = &self.outcome else {
            return;
        };
        let mut outcome = outcome.lock().unwrap_or_else(PoisonError::into_inner);

        let (Some(id1), Some(id2)) = (
            self.registry.try_lookup(context.collider1),
            self.registry.try_lookup(context.collider2),
        ) else {
            warn!(
                "contact between unregistered colliders {:?} and {:?}",
                context.collider1, context.collider2
            );
            return;
        };

        // Anything taken out of play, earlier or during this step, is gone.
        let retired = |id: BodyId| !self.registry.is_active(id) || outcome.is_deactivated(id);
        if retired(id1) || retired(id2) {
            context.solver_contacts.clear();
            return;
        }

        let other = if id1 == outcome.player {
            id2
        } else if id2 == outcome.player {
            id1
        } else {
            return;
        };

        if context.solver_contacts.is_empty() {
            return;
        }

        let (Some((player, _)), Some((other_pose, other_kind))) = (
            self.pose(context.colliders, outcome.player),
            self.pose(context.colliders, other),
        ) else {
            return;
        };
        let ladder = self
            .ladder
            .and_then(|id| self.pose(context.colliders, id))
            .map(|(pose, _)| pose);
        let (point, separation) = self.measure(
            context.colliders,
            outcome.player,
            other,
            &context.solver_contacts[..],
        );

        let contact = PlayerContact {
            player,
            state: outcome.state,
            ladder,
            other,
            other_kind,
            other_pose,
            point,
            separation,
            tolerance: self.tolerance,
        };

        if !filter_contact(&contact).is_solved() {
            context.solver_contacts.clear();
            return;
        }
        if !resolve_collision(&contact, &mut outcome).is_solved() {
            context.solver_contacts.clear();
        }
    }
}
