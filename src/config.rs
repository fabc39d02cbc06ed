//! TOML configuration.
//!
//! Every table and key is optional:
//!
//! ```toml
//! # spectra.toml
//! [loader]
//! text_decoding = "full"      # or "minimal"
//!
//! [processing]
//! smoothing_window = 7
//! steps = ["baseline", "smooth:9"]
//!
//! [peaks]
//! prominence = 0.01
//! min_distance = 5
//! max_peaks = 20
//!
//! [render]
//! decimation_threshold = 5000
//! target_points = 1000
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::loader::TextDecoding;
use crate::processing::pipeline::DEFAULT_SMOOTHING_WINDOW;
use crate::processing::{PeakParams, ProcessingStep};
use crate::view::RenderSettings;

/// Root of a `spectra.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loader: LoaderConfig,
    pub processing: ProcessingConfig,
    pub peaks: PeakParams,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub text_decoding: TextDecoding,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Window used by interactive smoothing.
    pub smoothing_window: usize,
    /// Steps applied when none are given on the command line.
    pub steps: Vec<ProcessingStep>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            steps: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [loader]
            text_decoding = "minimal"

            [processing]
            smoothing_window = 11
            steps = ["baseline", "smooth:9", "snv"]

            [peaks]
            prominence = 0.05
            min_distance = 3
            max_peaks = 20

            [render]
            decimation_threshold = 8000
            target_points = 1500
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.loader.text_decoding, TextDecoding::Minimal);
        assert_eq!(config.processing.smoothing_window, 11);
        assert_eq!(
            config.processing.steps,
            vec![
                ProcessingStep::Baseline,
                ProcessingStep::Smooth { window: 9 },
                ProcessingStep::Snv,
            ]
        );
        assert_eq!(config.peaks.min_distance, 3);
        assert_eq!(config.peaks.max_peaks, Some(20));
        assert_eq!(config.render.decimation_threshold, 8000);
        assert_eq!(config.render.target_points, 1500);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [peaks]
            prominence = 0.2
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.peaks.prominence, 0.2);
        assert_eq!(config.peaks.min_distance, PeakParams::default().min_distance);
        assert_eq!(config.render, RenderSettings::default());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.loader.text_decoding, TextDecoding::Full);
        assert_eq!(config.processing.smoothing_window, DEFAULT_SMOOTHING_WINDOW);
        assert!(config.processing.steps.is_empty());
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let err = Config::from_str("[processing]\nsteps = [\"fourier\"]").unwrap_err();
        assert!(format!("{err:#}").contains("fourier"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectra.toml");
        std::fs::write(&path, "[render]\ntarget_points = 64\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.render.target_points, 64);
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
