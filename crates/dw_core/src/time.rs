//! Fixed-step frame clock.
//!
//! Wall-clock time is measured once per rendered frame and fed into an
//! accumulator; the simulation then consumes it in `fixed_dt` slices. Every
//! editor and level update receives that slice as its `dt`, so cooldowns and
//! animation never read a global clock.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

pub struct FrameClock {
    pub fixed_dt: f32,
    /// Upper bound on wall time fed into one frame (spiral-of-death guard).
    pub max_frame_time: f32,
    accumulator: f32,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f32,
    last_instant: Instant,

    fps_samples: [f32; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f32,
    pub smoothed_frame_time_ms: f32,
}

impl FrameClock {
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_frame_time: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / fixed_dt,
            smoothed_frame_time_ms: fixed_dt * 1000.0,
        }
    }

    /// Measure the wall time since the previous frame and feed the accumulator.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Feed an explicit amount of wall time. `begin_frame` calls this; tests
    /// call it directly to stay independent of the real clock.
    pub fn advance(&mut self, elapsed: f32) {
        self.real_dt = elapsed;
        if self.real_dt > self.max_frame_time {
            log::warn!(
                "Frame took {:.1}ms, capping to {:.0}ms",
                self.real_dt * 1000.0,
                self.max_frame_time * 1000.0
            );
            self.real_dt = self.max_frame_time;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt = self.fps_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    /// Returns the next simulation slice, or `None` once the accumulator is
    /// drained for this frame.
    pub fn next_step(&mut self) -> Option<f32> {
        if self.accumulator < self.fixed_dt {
            return None;
        }
        self.accumulator -= self.fixed_dt;
        self.total_time += f64::from(self.fixed_dt);
        self.fixed_step_count += 1;
        self.steps_this_frame += 1;
        Some(self.fixed_dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
