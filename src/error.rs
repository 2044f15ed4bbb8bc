//! Engine error type

/// Errors surfaced by the engine.
///
/// Missing input handlers and an unset observer are not errors: those
/// events are dropped with a debug log line.
#[derive(Debug, thiserror::Error)]
pub enum PodiumError {
    #[error("invalid stage index {index} (have {count} stages)")]
    InvalidStageIndex { index: usize, count: usize },
    #[error("at least one stage is required")]
    NoStages,
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("malformed settings: {0}")]
    SettingsFormat(#[from] serde_json::Error),
    #[error("platform call failed: {0}")]
    Platform(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_stage_index_message() {
        let err = PodiumError::InvalidStageIndex { index: 3, count: 1 };
        assert_eq!(err.to_string(), "invalid stage index 3 (have 1 stages)");
    }

    #[test]
    fn test_settings_format_from_serde() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: PodiumError = parse.into();
        assert!(matches!(err, PodiumError::SettingsFormat(_)));
    }
}
