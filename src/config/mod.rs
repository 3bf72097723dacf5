use anyhow::Result;
use std::env;

pub mod rules;

pub use rules::*;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
        })
    }

    /// Get server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Analysis tunables overridable from the environment
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub normalizer: NormalizerConfig,
}

impl AnalysisSettings {
    /// Read normalizer overrides from the environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = NormalizerConfig::default();
        Ok(Self {
            normalizer: NormalizerConfig {
                confidence_threshold: env::var("KEYPOINT_CONFIDENCE_THRESHOLD")
                    .map(|v| v.parse())
                    .unwrap_or(Ok(defaults.confidence_threshold))?,
                max_gap_frames: env::var("KEYPOINT_MAX_GAP_FRAMES")
                    .map(|v| v.parse())
                    .unwrap_or(Ok(defaults.max_gap_frames))?,
                min_visible_fraction: env::var("KEYPOINT_MIN_VISIBLE_FRACTION")
                    .map(|v| v.parse())
                    .unwrap_or(Ok(defaults.min_visible_fraction))?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizer_defaults() {
        let config = NormalizerConfig::default();
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.max_gap_frames, 5);
        assert_eq!(config.min_visible_fraction, 0.6);
    }
}
