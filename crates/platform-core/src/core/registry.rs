use log::warn;
use rapier2d::prelude::ColliderHandle;

use crate::api::error::{LevelError, Result};
use crate::api::types::{BodyId, EntityKind, PowerUpKind};
use crate::components::body::{BodyShape, LogicalBody};
use crate::core::physics::{PhysicsBody, PhysicsWorld};

/// Association between engine handles and logical bodies.
///
/// Logical bodies live in an append-only arena indexed by [`BodyId`]. A side
/// table indexed by the collider's arena slot maps engine handles back to ids,
/// so nothing opaque ever gets hashed. Removal empties both slots.
pub struct BodyRegistry {
    bodies: Vec<Option<LogicalBody>>,
    /// Collider slot → (collider generation, body id).
    by_collider: Vec<Option<(u32, BodyId)>>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self {
            bodies: Vec::with_capacity(64),
            by_collider: Vec::with_capacity(64),
        }
    }

    /// Register an engine body under a fresh id. Registering the same handle
    /// again returns the existing id and changes nothing.
    pub fn register_body(
        &mut self,
        handle: PhysicsBody,
        kind: EntityKind,
        shape: BodyShape,
    ) -> BodyId {
        if let Some(id) = self.try_lookup(handle.collider_handle) {
            if let Some(existing) = self.get(id) {
                if existing.kind != kind {
                    warn!(
                        "body {:?} re-registered as {} but is tagged {}; keeping original tag",
                        id, kind, existing.kind
                    );
                }
            }
            return id;
        }

        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(Some(LogicalBody {
            kind,
            shape,
            handle,
            active: true,
        }));

        let (slot, generation) = handle.collider_handle.into_raw_parts();
        let slot = slot as usize;
        if self.by_collider.len() <= slot {
            self.by_collider.resize(slot + 1, None);
        }
        self.by_collider[slot] = Some((generation, id));
        id
    }

    /// Register the player body. Which player is in play is tracked by the
    /// simulation that owns the registry.
    pub fn register_player_body(&mut self, handle: PhysicsBody, shape: BodyShape) -> BodyId {
        self.register_body(handle, EntityKind::Player, shape)
    }

    /// Id for an engine collider, if it is registered.
    pub fn try_lookup(&self, collider: ColliderHandle) -> Option<BodyId> {
        let (slot, generation) = collider.into_raw_parts();
        match self.by_collider.get(slot as usize) {
            Some(Some((stored_generation, id))) if *stored_generation == generation => Some(*id),
            _ => None,
        }
    }

    /// Id for an engine collider.
    ///
    /// # Panics
    /// If the collider was never registered. Callers only pass handles the
    /// engine itself reported for registered bodies.
    pub fn lookup_logical(&self, collider: ColliderHandle) -> BodyId {
        match self.try_lookup(collider) {
            Some(id) => id,
            None => panic!("collider {:?} is not registered", collider),
        }
    }

    /// Entity tag for an engine collider. Panics like [`Self::lookup_logical`].
    pub fn lookup_type(&self, collider: ColliderHandle) -> EntityKind {
        let id = self.lookup_logical(collider);
        match self.get(id) {
            Some(body) => body.kind,
            None => panic!("body {:?} was removed while its collider lived on", id),
        }
    }

    /// Power-up flavour for an engine collider; `None` for anything else.
    pub fn lookup_power_up_type(&self, collider: ColliderHandle) -> Option<PowerUpKind> {
        self.lookup_type(collider).power_up()
    }

    pub fn get(&self, id: BodyId) -> Option<&LogicalBody> {
        self.bodies.get(id.index()).and_then(Option::as_ref)
    }

    pub fn is_active(&self, id: BodyId) -> bool {
        self.get(id).is_some_and(|body| body.active)
    }

    pub(crate) fn set_active(&mut self, id: BodyId, active: bool) {
        if let Some(Some(body)) = self.bodies.get_mut(id.index()) {
            body.active = active;
        }
    }

    /// Delete a body from the engine and drop every registry entry for it.
    pub fn remove(&mut self, id: BodyId, world: &mut PhysicsWorld) -> Result<LogicalBody> {
        let body = self
            .bodies
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(LevelError::UnknownBody(id))?;

        let (slot, _) = body.handle.collider_handle.into_raw_parts();
        if let Some(entry) = self.by_collider.get_mut(slot as usize) {
            *entry = None;
        }
        world.remove_body(&body.handle);
        Ok(body)
    }

    /// All live registry entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &LogicalBody)> {
        self.bodies
            .iter()
            .enumerate()
            .filter_map(|(i, body)| body.as_ref().map(|b| (BodyId(i as u32), b)))
    }

    /// Registered ladders in id order.
    pub fn ladders(&self) -> impl Iterator<Item = (BodyId, &LogicalBody)> {
        self.iter().filter(|(_, body)| body.kind == EntityKind::Ladder)
    }

    /// Number of live registry entries.
    pub fn len(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
