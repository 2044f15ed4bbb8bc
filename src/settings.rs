//! Engine settings
//!
//! Supplied at bootstrap, optionally as JSON. Nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::consts::{HELD_DOWN_INTERVAL_MS, TICK_INTERVAL_MS};
use crate::error::PodiumError;
use crate::game::GameMode;

/// Drawable cap presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    Medium,
    High,
    /// No cap; stages grow for as long as the page lives
    #[default]
    Unbounded,
}

impl QualityPreset {
    /// Maximum drawables per stage for this preset
    pub fn max_drawables(&self) -> Option<usize> {
        match self {
            QualityPreset::Low => Some(500),
            QualityPreset::Medium => Some(2000),
            QualityPreset::High => Some(8000),
            QualityPreset::Unbounded => None,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Release or debug (FPS overlay)
    pub mode: GameMode,
    /// Render loop period
    pub tick_interval_ms: u32,
    /// Held-down repeat period
    pub held_down_interval_ms: u32,
    /// Drawable cap preset
    pub quality: QualityPreset,
    /// Particle RNG seed; the bootstrap picks one from the clock when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GameMode::Debug,
            tick_interval_ms: TICK_INTERVAL_MS,
            held_down_interval_ms: HELD_DOWN_INTERVAL_MS,
            quality: QualityPreset::Unbounded,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, PodiumError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), PodiumError> {
        if self.tick_interval_ms == 0 {
            return Err(PodiumError::InvalidSettings(
                "tick_interval_ms must be positive".into(),
            ));
        }
        if self.held_down_interval_ms == 0 {
            return Err(PodiumError::InvalidSettings(
                "held_down_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn max_drawables(&self) -> Option<usize> {
        self.quality.max_drawables()
    }
}
