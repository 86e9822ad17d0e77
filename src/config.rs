//! Session configuration.
//!
//! Settings are read from TOML. Every field has a default, so an empty file
//! is a valid configuration:
//!
//! ```toml
//! [remap]
//! invert = false
//!
//! [remap.curve]
//! kind = "linear"
//! gain = 1.5
//!
//! [pipeline]
//! parallel = true
//! ```

use crate::core::error::{ConfigError, HeatmapError};
use crate::execution::pipeline::PipelineOptions;
use crate::heatmap::curve::RemapConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Process rows on the rayon pool.
    pub parallel: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl PipelineSettings {
    /// Pipeline options for these settings.
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions::new().with_parallel(self.parallel)
    }
}

/// Everything a session can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Heatmap adjustment.
    pub remap: RemapConfig,
    /// Pipeline behaviour.
    pub pipeline: PipelineSettings,
}

impl SessionConfig {
    /// Read a TOML file. Value ranges are checked by [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config {}", path.display());
        Ok(config)
    }

    /// Parse a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check values that parse but are out of range.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        self.remap.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::curve::RemapCurve;
    use std::io::Write;

    #[test]
    fn test_empty_is_default() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert!(config.pipeline.parallel);
        assert_eq!(config.remap.curve, RemapCurve::Identity);
    }

    #[test]
    fn test_full_config() {
        let config = SessionConfig::from_toml_str(
            r#"
            [remap]
            invert = true

            [remap.curve]
            kind = "threshold"
            threshold = 0.3

            [pipeline]
            parallel = false
            "#,
        )
        .unwrap();

        assert!(config.remap.invert);
        assert_eq!(config.remap.curve, RemapCurve::Threshold { threshold: 0.3 });
        assert!(!config.pipeline.options().parallel);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SessionConfig::from_toml_str("[remap.curve]\nkind = \"spiral\""),
            Err(ConfigError::Parse(_))
        ));

        let invalid = SessionConfig::from_toml_str("[remap.curve]\nkind = \"gamma\"\ngamma = -1.0").unwrap();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[remap.curve]\nkind = \"linear\"\ngain = 2.0").unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.remap.curve, RemapCurve::Linear { gain: 2.0, offset: 0.0 });

        assert!(matches!(
            SessionConfig::load("/nonexistent/gazeblur.toml"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SessionConfig {
            remap: RemapConfig::new(RemapCurve::Gamma { gamma: 2.0 }).with_invert(true),
            pipeline: PipelineSettings { parallel: false },
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(SessionConfig::from_toml_str(&text).unwrap(), config);
    }
}
