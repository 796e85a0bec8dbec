//! Pre-solve contact filter.
//!
//! Runs before the engine resolves a contact and decides whether the contact
//! is solved at all this step. Only player/platform contacts are ever dropped:
//! a climbing player passes through platforms along the ladder and still
//! stands on the one at the end of the climb.

use glam::Vec2;

use crate::api::types::{BodyId, EntityKind, EntityState};
use crate::components::body::BodyPose;
use crate::systems::geometry::{is_at_bottom_half, is_on_top};

/// Whether the engine should produce a physical response for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactResponse {
    Solve,
    /// Drop the contact for this step; the bodies pass through each other.
    Ignore,
}

impl ContactResponse {
    pub fn is_solved(self) -> bool {
        self == ContactResponse::Solve
    }
}

/// One contact seen from the player's side, assembled by the hook bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerContact {
    pub player: BodyPose,
    pub state: EntityState,
    /// The ladder the player overlapped at the start of the tick.
    pub ladder: Option<BodyPose>,
    pub other: BodyId,
    pub other_kind: EntityKind,
    pub other_pose: BodyPose,
    /// World-space contact point on the other body's surface.
    pub point: Vec2,
    /// Translation that moves the player out of penetration until the two
    /// surfaces just touch at `point`.
    pub separation: Vec2,
    pub tolerance: f32,
}

impl PlayerContact {
    /// The player pose pushed back along the contact normal to touching distance.
    pub fn touching_player(&self) -> BodyPose {
        BodyPose {
            center: self.player.center + self.separation,
            ..self.player
        }
    }

    /// The player stands on the other body at the contact point.
    pub fn player_on_top(&self) -> bool {
        is_on_top(
            &self.touching_player(),
            &self.other_pose,
            self.point,
            self.tolerance,
        )
    }
}

/// The player is at the end of the ladder it is heading for: in the bottom half
/// while climbing down, centre at or above the ladder's top edge while climbing up.
pub fn at_ladder_end(state: EntityState, player: &BodyPose, ladder: &BodyPose) -> bool {
    match state {
        EntityState::ClimbingDown => is_at_bottom_half(player, ladder),
        EntityState::ClimbingUp => is_at_bottom_half(ladder, player),
        _ => false,
    }
}

/// Decide whether a player contact is solved this step.
pub fn filter_contact(contact: &PlayerContact) -> ContactResponse {
    if contact.other_kind != EntityKind::Platform || !contact.state.is_climbing() {
        return ContactResponse::Solve;
    }
    let Some(ladder) = contact.ladder else {
        return ContactResponse::Solve;
    };

    if contact.player_on_top() && at_ladder_end(contact.state, &contact.player, &ladder) {
        ContactResponse::Solve
    } else {
        ContactResponse::Ignore
    }
}
