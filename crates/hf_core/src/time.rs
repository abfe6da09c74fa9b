use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Fixed-step clock. Real frame time feeds an accumulator that is drained in
/// `fixed_dt` slices; time beyond `max_accumulator` in a single frame is
/// dropped rather than caught up.
pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    /// Wall time discarded by the frame cap since startup, in seconds.
    pub dropped_time: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_tick_rate(60)
    }

    pub fn with_tick_rate(ticks_per_second: u32) -> Self {
        let fixed_dt = 1.0 / f64::from(ticks_per_second.max(1));
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            dropped_time: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / fixed_dt,
            smoothed_frame_time_ms: fixed_dt * 1000.0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feeds `real_dt` seconds of wall time into the accumulator.
    pub fn advance(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, dropping {:.1}ms of simulation time",
                self.real_dt * 1000.0,
                (self.real_dt - self.max_accumulator) * 1000.0
            );
            self.dropped_time += self.real_dt - self.max_accumulator;
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
