use log::warn;

use crate::api::types::{GameEvent, Notification};

/// Receives game outcomes from the simulation, synchronously and exactly once
/// per event. Implementations must not block or call back into the stepper.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Queue of notifications encoded as [`GameEvent`] records, ready to be
/// copied into a host-side float buffer.
///
/// `capacity` is the size of the host buffer. The queue never drops an
/// event: if the host falls behind it grows past `capacity` and logs a
/// warning, and the host is expected to drain it at least once per frame.
pub struct EventQueue {
    events: Vec<GameEvent>,
    capacity: usize,
    sequence: u32,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            sequence: 0,
        }
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events as a flat `kind, a, b, c, ...` float slice.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Host buffer size, in events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// More events are pending than the host buffer holds.
    pub fn is_overflowing(&self) -> bool {
        self.events.len() > self.capacity
    }
}

impl NotificationSink for EventQueue {
    fn notify(&mut self, notification: Notification) {
        self.sequence = self.sequence.wrapping_add(1);
        if self.events.len() == self.capacity {
            warn!(
                "event queue past its {} slots at {:?}; drain it every frame",
                self.capacity, notification
            );
        }
        self.events.push(GameEvent {
            kind: notification.code() as f32,
            a: self.sequence as f32,
            b: 0.0,
            c: 0.0,
        });
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(32)
    }
}
