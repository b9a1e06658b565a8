//! Sensor calibration (C1).
//!
//! Converts raw ADC counts emitted by a serial-attached accelerometer into
//! acceleration in `m/s^2`, per a static per-model calibration formula:
//!
//! ```text
//! v = u / (accel_unit_max / volt_max)
//! a = ((v - volt_base) / volt_per_g) * g_units
//! ```

use std::collections::HashMap;

use crate::error::ProfileError;

/// Static calibration parameters for one accelerometer model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    /// Maximum raw ADC count the device can report.
    pub accel_unit_max: f64,
    /// Supply voltage corresponding to `accel_unit_max`.
    pub volt_max: f64,
    /// Zero-g baseline voltage.
    pub volt_base: f64,
    /// Volts per g of acceleration.
    pub volt_per_g: f64,
    /// Value of standard gravity in the profile's acceleration units.
    pub g_units: f64,
}

impl SensorProfile {
    /// Convert a single raw ADC count to acceleration in `m/s^2`.
    #[inline]
    pub fn convert(&self, raw: f64) -> f64 {
        let v = raw / (self.accel_unit_max / self.volt_max);
        ((v - self.volt_base) / self.volt_per_g) * self.g_units
    }

    /// Convert a slice of raw ADC counts element-wise.
    pub fn convert_slice(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter().map(|&u| self.convert(u)).collect()
    }

    /// Acceleration in `m/s^2` at `accel_unit_max` — the display-range ceiling.
    pub fn accel_max(&self) -> f64 {
        self.convert(self.accel_unit_max)
    }

    fn validate(&self, name: &str) -> Result<(), ProfileError> {
        if self.accel_unit_max <= 0.0 || self.volt_max <= 0.0 || self.volt_per_g == 0.0 {
            return Err(ProfileError::InvalidParameters {
                name: name.to_string(),
                reason: "accel_unit_max, volt_max must be positive and volt_per_g non-zero"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Name of the default built-in profile, used as the CLI default.
pub const DEFAULT_PROFILE_NAME: &str = "am3x-1.5g";

const BUILTIN_NAMES: [&str; 2] = ["am3x-1.5g", "am3x-6g"];

/// Registry of named sensor profiles.
///
/// Two profiles are available out of the box; additional profiles may be
/// registered by name but may never shadow a built-in.
#[derive(Debug, Clone)]
pub struct SensorRegistry {
    profiles: HashMap<String, SensorProfile>,
}

impl Default for SensorRegistry {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        // from: www.freetronics.com.au/pages/am3x-quickstart-guide
        profiles.insert(
            "am3x-1.5g".to_string(),
            SensorProfile {
                accel_unit_max: 1023.0,
                volt_max: 5.0,
                volt_base: 1.65,
                volt_per_g: 0.8,
                g_units: 9.80665,
            },
        );
        profiles.insert(
            "am3x-6g".to_string(),
            SensorProfile {
                accel_unit_max: 1023.0,
                volt_max: 5.0,
                volt_base: 1.65,
                volt_per_g: 0.206,
                g_units: 9.80665,
            },
        );
        Self { profiles }
    }
}

impl SensorRegistry {
    /// Register an additional profile under `name`.
    ///
    /// # Errors
    /// Returns [`ProfileError::BuiltinShadowed`] if `name` collides with a
    /// built-in, or [`ProfileError::InvalidParameters`] if the profile's
    /// fields are out of range.
    pub fn register(&mut self, name: &str, profile: SensorProfile) -> Result<(), ProfileError> {
        if BUILTIN_NAMES.contains(&name) {
            return Err(ProfileError::BuiltinShadowed(name.to_string()));
        }
        profile.validate(name)?;
        self.profiles.insert(name.to_string(), profile);
        Ok(())
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Result<&SensorProfile, ProfileError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ProfileError::Unknown(name.to_string()))
    }

    /// Names of every registered profile.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_builtins() {
        let reg = SensorRegistry::default();
        assert!(reg.get("am3x-1.5g").is_ok());
        assert!(reg.get("am3x-6g").is_ok());
        assert!(matches!(reg.get("nope"), Err(ProfileError::Unknown(_))));
    }

    #[test]
    fn conversion_matches_reference_formula() {
        let profile = SensorRegistry::default().get("am3x-1.5g").unwrap().clone();
        let u = 700.0;
        let expected_v = u / (profile.accel_unit_max / profile.volt_max);
        let expected = ((expected_v - profile.volt_base) / profile.volt_per_g) * profile.g_units;
        assert!((profile.convert(u) - expected).abs() < 1e-12);
    }

    #[test]
    fn conversion_is_affine() {
        // convert(u1) - convert(u2) = k * (u1 - u2)
        let profile = SensorRegistry::default().get("am3x-6g").unwrap().clone();
        let k = profile.volt_max / (profile.accel_unit_max * profile.volt_per_g) * profile.g_units;
        let (u1, u2) = (312.0, 890.0);
        let lhs = profile.convert(u1) - profile.convert(u2);
        let rhs = k * (u1 - u2);
        assert!((lhs - rhs).abs() < 1e-9, "{lhs} vs {rhs}");
    }

    #[test]
    fn accel_max_is_image_of_unit_max() {
        let profile = SensorRegistry::default().get("am3x-1.5g").unwrap().clone();
        assert!((profile.accel_max() - profile.convert(profile.accel_unit_max)).abs() < 1e-12);
    }

    #[test]
    fn cannot_shadow_builtin() {
        let mut reg = SensorRegistry::default();
        let dummy = SensorProfile {
            accel_unit_max: 100.0,
            volt_max: 5.0,
            volt_base: 1.0,
            volt_per_g: 0.5,
            g_units: 9.8,
        };
        assert!(matches!(
            reg.register("am3x-6g", dummy),
            Err(ProfileError::BuiltinShadowed(_))
        ));
    }

    #[test]
    fn register_custom_profile() {
        let mut reg = SensorRegistry::default();
        let custom = SensorProfile {
            accel_unit_max: 4095.0,
            volt_max: 3.3,
            volt_base: 1.65,
            volt_per_g: 0.33,
            g_units: 9.80665,
        };
        reg.register("custom-12bit", custom).unwrap();
        assert_eq!(reg.get("custom-12bit").unwrap(), &custom);
    }

    #[test]
    fn rejects_degenerate_profile() {
        let mut reg = SensorRegistry::default();
        let bad = SensorProfile {
            accel_unit_max: 0.0,
            volt_max: 5.0,
            volt_base: 1.65,
            volt_per_g: 0.8,
            g_units: 9.8,
        };
        assert!(matches!(
            reg.register("bad", bad),
            Err(ProfileError::InvalidParameters { .. })
        ));
    }
}
