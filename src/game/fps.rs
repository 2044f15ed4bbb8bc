//! Frames-per-second sampling for the debug overlay

/// Convert a millisecond timestamp to a seconds sample rounded to the millisecond
pub fn sample_seconds(now_ms: f64) -> f64 {
    now_ms.round() / 1000.0
}

/// FPS from two consecutive samples in seconds.
///
/// The gap is rounded to whole milliseconds before dividing. A gap that
/// rounds to zero or below has no meaningful rate and yields `None`.
pub fn calculate_fps(earlier: f64, later: f64) -> Option<u32> {
    let gap_ms = ((later - earlier) * 1000.0).round();
    if gap_ms <= 0.0 {
        return None;
    }
    Some((1000.0 / gap_ms).round() as u32)
}

/// Tracks the previous sample and the last computed rate
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    last_sample: Option<f64>,
    fps: Option<u32>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample. Returns `false` for the very first sample, which only
    /// establishes a baseline.
    pub fn sample(&mut self, seconds: f64) -> bool {
        let Some(previous) = self.last_sample.replace(seconds) else {
            return false;
        };
        self.fps = calculate_fps(previous, seconds);
        true
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    pub fn has_baseline(&self) -> bool {
        self.last_sample.is_some()
    }

    /// Forget the baseline so a gap (e.g. a pause) is never reported
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.fps = None;
    }
}
