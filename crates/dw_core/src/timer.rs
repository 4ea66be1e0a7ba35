//! Elapsed-time cooldowns.
//!
//! A cooldown stores the time it has left rather than a start timestamp, and
//! is advanced by the same `dt` the simulation step receives. It counts as
//! expired once the accumulated time reaches its duration.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    duration: f32,
    remaining: f32,
}

impl Cooldown {
    pub const fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    /// Starts (or restarts) the full duration.
    pub fn arm(&mut self) {
        self.remaining = self.duration;
    }

    pub fn cancel(&mut self) {
        self.remaining = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}
