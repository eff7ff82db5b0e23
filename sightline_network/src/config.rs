// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Network configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::SerializationMode;

/// Tunables of a [`Network`](crate::Network).
///
/// Loadable from TOML; missing keys keep their defaults:
///
/// ```rust
/// use sightline_network::{NetworkConfig, SerializationMode};
///
/// let config = NetworkConfig::from_toml_str(
///     r#"
///     auto-evaluate = true
///     default-serialization-mode = "all"
///     "#,
/// )
/// .unwrap();
/// assert!(config.auto_evaluate);
/// assert_eq!(config.max_evaluation_passes, 8);
/// assert_eq!(config.default_serialization_mode, SerializationMode::All);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkConfig {
    /// Evaluate immediately whenever an evaluation is requested outside a
    /// network lock. When `false` the host calls
    /// [`Network::evaluate`](crate::Network::evaluate) itself, typically after
    /// observing [`NetworkEvent::EvaluationRequested`](crate::NetworkEvent::EvaluationRequested).
    pub auto_evaluate: bool,
    /// Upper bound on repeated passes within one evaluation when processing
    /// keeps invalidating further processors.
    pub max_evaluation_passes: u32,
    /// Serialization mode of properties whose builder does not set one.
    pub default_serialization_mode: SerializationMode,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            auto_evaluate: false,
            max_evaluation_passes: 8,
            default_serialization_mode: SerializationMode::Default,
        }
    }
}

/// A configuration that could not be loaded or written.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text is malformed or has unknown keys.
    #[error("invalid network configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be rendered as TOML.
    #[error("could not write network configuration: {0}")]
    Write(#[from] toml::ser::Error),
    /// `max-evaluation-passes` was zero.
    #[error("max-evaluation-passes must be at least 1")]
    ZeroPasses,
}

impl NetworkConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.max_evaluation_passes == 0 {
            return Err(ConfigError::ZeroPasses);
        }
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(
            NetworkConfig::from_toml_str("").unwrap(),
            NetworkConfig::default()
        );
    }

    #[test]
    fn rejects_unknown_keys_and_zero_passes() {
        assert!(matches!(
            NetworkConfig::from_toml_str("auto-evaluat = true"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            NetworkConfig::from_toml_str("max-evaluation-passes = 0"),
            Err(ConfigError::ZeroPasses)
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = NetworkConfig {
            auto_evaluate: true,
            max_evaluation_passes: 3,
            default_serialization_mode: SerializationMode::None,
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("default-serialization-mode = \"none\""));
        assert_eq!(NetworkConfig::from_toml_str(&text).unwrap(), config);
    }
}
