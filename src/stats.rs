//! Frame-rate statistics.
//!
//! [`FrameMeter`] is the two-call contract the frame loop brackets every tick
//! with. [`FrameStats`] implements it by counting frames and turning them into
//! one frames-per-second sample per second, keeping a short history that the
//! on-screen overlay draws as a graph.

use std::collections::VecDeque;

use instant::{Duration, Instant};

/// Number of samples kept for the overlay graph.
pub const HISTORY_LEN: usize = 74;

const SAMPLE_WINDOW: Duration = Duration::from_millis(1000);

pub trait FrameMeter {
    /// Marks the start of a frame.
    fn begin(&mut self);

    /// Marks the end of a frame.
    fn end(&mut self);
}

#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_start: Option<Instant>,
    window_start: Instant,
    frames: u32,
    fps: Option<f32>,
    min_fps: f32,
    max_fps: f32,
    frame_time_ms: f32,
    history: VecDeque<f32>,
    fresh_sample: bool,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            frame_start: None,
            window_start: now,
            frames: 0,
            fps: None,
            min_fps: f32::INFINITY,
            max_fps: 0.0,
            frame_time_ms: 0.0,
            history: VecDeque::with_capacity(HISTORY_LEN),
            fresh_sample: false,
        }
    }

    pub fn begin_at(&mut self, now: Instant) {
        self.frame_start = Some(now);
    }

    /// Returns `true` when this frame completed a one second sample.
    pub fn end_at(&mut self, now: Instant) -> bool {
        self.frames += 1;
        if let Some(start) = self.frame_start.take() {
            self.frame_time_ms = now.duration_since(start).as_secs_f32() * 1000.0;
        }

        let elapsed = now.duration_since(self.window_start);
        if elapsed < SAMPLE_WINDOW {
            return false;
        }

        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.fps = Some(fps);
        self.min_fps = self.min_fps.min(fps);
        self.max_fps = self.max_fps.max(fps);
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(fps);
        log::debug!("{}", self.label());

        self.window_start = now;
        self.frames = 0;
        true
    }

    /// Latest frames-per-second sample, once a full second has been measured.
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    pub fn min_fps(&self) -> Option<f32> {
        self.fps.map(|_| self.min_fps)
    }

    pub fn max_fps(&self) -> Option<f32> {
        self.fps.map(|_| self.max_fps)
    }

    /// Duration of the last bracketed frame in milliseconds.
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Oldest sample first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    /// Whether a new sample arrived since the last call.
    pub fn take_fresh_sample(&mut self) -> bool {
        std::mem::take(&mut self.fresh_sample)
    }

    pub fn label(&self) -> String {
        match self.fps {
            Some(fps) => format!(
                "{} FPS ({}-{})",
                fps.round(),
                self.min_fps.round(),
                self.max_fps.round()
            ),
            None => "-- FPS".to_string(),
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMeter for FrameStats {
    fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    fn end(&mut self) {
        if self.end_at(Instant::now()) {
            self.fresh_sample = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frames(stats: &mut FrameStats, start: Instant, frames: u32, frame_ms: u64) -> u32 {
        let mut samples = 0;
        for frame in 0..frames {
            let begin = start + Duration::from_millis(frame as u64 * frame_ms);
            stats.begin_at(begin);
            if stats.end_at(begin + Duration::from_millis(frame_ms)) {
                samples += 1;
            }
        }
        samples
    }

    #[test]
    fn no_sample_before_a_full_second() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        assert_eq!(run_frames(&mut stats, start, 10, 16), 0);
        assert_eq!(stats.fps(), None);
        assert_eq!(stats.label(), "-- FPS");
    }

    #[test]
    fn samples_frames_per_elapsed_second() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        // frame 63 ends at 1008 ms
        assert_eq!(run_frames(&mut stats, start, 63, 16), 1);
        let fps = stats.fps().unwrap();
        assert!((fps - 63.0 * 1000.0 / 1008.0).abs() < 0.01, "{}", fps);
        assert!((stats.frame_time_ms() - 16.0).abs() < 0.01);
    }

    #[test]
    fn label_shows_current_min_and_max() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        assert_eq!(run_frames(&mut stats, start, 50, 20), 1);
        assert_eq!(stats.label(), "50 FPS (50-50)");
    }

    #[test]
    fn tracks_min_and_max_across_samples() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        run_frames(&mut stats, start, 100, 10);
        let later = start + Duration::from_millis(1000);
        run_frames(&mut stats, later, 50, 20);
        assert_eq!(stats.history().count(), 2);
        assert!((stats.max_fps().unwrap() - 100.0).abs() < 0.5);
        assert!((stats.min_fps().unwrap() - 50.0).abs() < 0.5);
    }

    #[test]
    fn history_is_bounded() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        // one frame per second
        assert_eq!(
            run_frames(&mut stats, start, HISTORY_LEN as u32 + 10, 1000),
            HISTORY_LEN as u32 + 10
        );
        assert_eq!(stats.history().count(), HISTORY_LEN);
    }

    #[test]
    fn meter_flags_fresh_samples_once() {
        let mut stats = FrameStats::starting_at(Instant::now() - Duration::from_secs(2));
        stats.begin();
        stats.end();
        assert!(stats.take_fresh_sample());
        assert!(!stats.take_fresh_sample());
    }
}
