//! Geometric predicates that classify how two bodies meet at a contact point.
//!
//! These decide "landed on it" versus "ran into its side". Edges are taken in
//! each body's own rotated frame, so a contact on a tilted platform is
//! measured against the tilted top edge rather than a horizontal line.

use glam::Vec2;

use crate::components::body::BodyPose;

/// Default contact tolerance in world units.
pub const DEFAULT_TOLERANCE: f32 = 0.03;

/// The body's local up axis in world space.
fn up_axis(pose: &BodyPose) -> Vec2 {
    Vec2::from_angle(pose.angle).perp()
}

/// Perpendicular distance from `point` to the line carrying the body's top
/// (`side = 1.0`) or bottom (`side = -1.0`) edge.
///
/// Equivalent to intersecting the line through `point` perpendicular to the
/// edge with the edge's own line; for an unrotated body it reduces to
/// `|point.y - edge_y|`.
fn edge_distance(pose: &BodyPose, side: f32, point: Vec2) -> f32 {
    let normal = up_axis(pose);
    let edge_origin = pose.center + normal * (side * pose.height() * 0.5);
    (point - edge_origin).dot(normal).abs()
}

/// Distance from `point` to the bottom edge of `pose`.
pub fn bottom_edge_distance(pose: &BodyPose, point: Vec2) -> f32 {
    edge_distance(pose, -1.0, point)
}

/// Distance from `point` to the top edge of `pose`.
pub fn top_edge_distance(pose: &BodyPose, point: Vec2) -> f32 {
    edge_distance(pose, 1.0, point)
}

/// `above` rests on `below`: the contact point lies on both the underside of
/// `above` and the topside of `below`, within `tolerance`.
pub fn is_on_top(above: &BodyPose, below: &BodyPose, contact: Vec2, tolerance: f32) -> bool {
    bottom_edge_distance(above, contact) <= tolerance
        && top_edge_distance(below, contact) <= tolerance
}

/// `bottom` sits in the lower half of `top`: its top edge is at or below
/// `top`'s centre. Rotation is ignored.
pub fn is_at_bottom_half(bottom: &BodyPose, top: &BodyPose) -> bool {
    bottom.top() <= top.center.y
}

/// On-top test against a round `below`: the contact is on the underside of
/// `above` and no lower than the upper quarter of `below`.
pub fn is_above(above: &BodyPose, below: &BodyPose, contact: Vec2, tolerance: f32) -> bool {
    bottom_edge_distance(above, contact) <= tolerance
        && contact.y >= below.center.y + below.height() * 0.25
}

/// `inner` is horizontally centred on `outer`, within a quarter of `outer`'s width.
pub fn is_inside(inner: &BodyPose, outer: &BodyPose) -> bool {
    (inner.center.x - outer.center.x).abs() <= outer.width() * 0.25
}
