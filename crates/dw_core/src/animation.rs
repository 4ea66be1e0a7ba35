//! Frame-index animation driven by the fixed-step `dt`.
//!
//! A clip is just a frame count owned by whoever holds the images; the state
//! here tracks a fractional position that advances by `dt * speed` frames per
//! tick. Looping clips wrap and report it so callers can hook cycle ends
//! (the shell re-arms its cooldown there); one-shot clips stop on their last
//! frame and report `Finished` once.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Loop,
    Once,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStep {
    Running,
    /// A looping clip passed its last frame this tick and restarted.
    Wrapped,
    /// A one-shot clip reached its end this tick.
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    position: f32,
    /// Frames per second.
    pub speed: f32,
    pub playback: Playback,
    finished: bool,
}

impl AnimationState {
    pub fn new(speed: f32, playback: Playback) -> Self {
        Self {
            position: 0.0,
            speed,
            playback,
            finished: false,
        }
    }

    pub fn looping(speed: f32) -> Self {
        Self::new(speed, Playback::Loop)
    }

    pub fn once(speed: f32) -> Self {
        Self::new(speed, Playback::Once)
    }

    pub fn tick(&mut self, dt: f32, frame_count: usize) -> AnimationStep {
        if frame_count == 0 || self.finished {
            return AnimationStep::Running;
        }

        self.position += dt * self.speed;
        let len = frame_count as f32;
        if self.position < len {
            return AnimationStep::Running;
        }

        match self.playback {
            Playback::Loop => {
                self.position %= len;
                AnimationStep::Wrapped
            }
            Playback::Once => {
                self.position = len - 1.0;
                self.finished = true;
                AnimationStep::Finished
            }
        }
    }

    /// Current frame, clamped into `0..frame_count`.
    pub fn frame_index(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        (self.position.max(0.0) as usize).min(frame_count - 1)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
        self.finished = false;
    }
}
