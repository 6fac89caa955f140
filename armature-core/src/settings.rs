//! Deployment settings, loaded from TOML.

use crate::error::{DeployError, Result};
use crate::logging::LoggingConfig;
use serde::Deserialize;
use std::path::Path;

/// Settings controlling a deployment run.
///
/// ```toml
/// eager_validation = true
///
/// [logging]
/// level = "debug"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeploymentSettings {
    /// Validate the collected service graph (missing edges, cycles)
    /// immediately after install instead of leaving it to the runtime.
    pub eager_validation: bool,

    pub logging: LoggingConfig,
}

impl DeploymentSettings {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| DeployError::Settings(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DeployError::Settings(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogFormat, LogLevel};

    #[test]
    fn test_defaults() {
        let settings = DeploymentSettings::from_toml_str("").unwrap();
        assert!(!settings.eager_validation);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_full_settings() {
        let settings = DeploymentSettings::from_toml_str(
            r#"
            eager_validation = true

            [logging]
            level = "debug"
            format = "json"
            show_target = true
            "#,
        )
        .unwrap();
        assert!(settings.eager_validation);
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert!(settings.logging.show_target);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            DeploymentSettings::from_toml_str("eager_valdiation = true"),
            Err(DeployError::Settings(_))
        ));
    }
}
