//! TOML configuration loading for supplementary sensor profiles (§10.3).
//!
//! Mirrors the host stack's `ConfigLoader` convention: parse, then validate,
//! returning a single [`ConfigError`] enum rather than propagating the raw
//! `toml`/`io` errors.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::calibration::{SensorProfile, SensorRegistry};
use crate::error::ProfileError;

/// Error type for configuration loading operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing failed.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A profile in the file failed registration.
    #[error("profile {name} invalid: {source}")]
    Profile {
        name: String,
        #[source]
        source: ProfileError,
    },
}

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    profile: Vec<NamedProfile>,
}

#[derive(Debug, Deserialize)]
struct NamedProfile {
    name: String,
    accel_unit_max: f64,
    volt_max: f64,
    volt_base: f64,
    volt_per_g: f64,
    g_units: f64,
}

/// Load additional sensor profiles from a TOML file of the form:
///
/// ```toml
/// [[profile]]
/// name = "my-sensor"
/// accel_unit_max = 4095
/// volt_max = 3.3
/// volt_base = 1.65
/// volt_per_g = 0.33
/// g_units = 9.80665
/// ```
///
/// and merge them into `registry`. Built-in profile names are never
/// shadowed (§10.3); a collision is a [`ConfigError::Profile`].
pub fn load_profiles_into(registry: &mut SensorRegistry, path: &Path) -> Result<(), ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: ProfilesFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    for entry in parsed.profile {
        let profile = SensorProfile {
            accel_unit_max: entry.accel_unit_max,
            volt_max: entry.volt_max,
            volt_base: entry.volt_base,
            volt_per_g: entry.volt_per_g,
            g_units: entry.g_units,
        };
        registry
            .register(&entry.name, profile)
            .map_err(|source| ConfigError::Profile { name: entry.name, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_valid_profile_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[profile]]
            name = "custom-12bit"
            accel_unit_max = 4095
            volt_max = 3.3
            volt_base = 1.65
            volt_per_g = 0.33
            g_units = 9.80665
            "#
        )
        .unwrap();

        let mut registry = SensorRegistry::default();
        load_profiles_into(&mut registry, file.path()).unwrap();
        assert!(registry.get("custom-12bit").is_ok());
    }

    #[test]
    fn rejects_shadowing_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[profile]]
            name = "am3x-1.5g"
            accel_unit_max = 1
            volt_max = 1
            volt_base = 1
            volt_per_g = 1
            g_units = 1
            "#
        )
        .unwrap();

        let mut registry = SensorRegistry::default();
        assert!(load_profiles_into(&mut registry, file.path()).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut registry = SensorRegistry::default();
        let err = load_profiles_into(&mut registry, Path::new("/nonexistent/path.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
