//! Analysis kernel (C6, §4.6).
//!
//! Runs entirely off the producer thread, inside a [`crate::worker::WorkerPool`]
//! worker. Pure function of `(Snapshot, KernelParams)` — no shared state, no
//! I/O — which is what makes it safe to fan out across worker threads.

mod autocorr;
mod classify;
mod resample;
mod sinefit;

use rotascope_common::calibration::SensorProfile;
use rotascope_common::model::{
    FrequencyEstimate, Orientation, RotationResult, SineFit, Snapshot,
};

/// Parameters the kernel needs beyond the snapshot itself: the resampling
/// grid period, the configured sensor axis orientation, and the calibration
/// profile for the attached accelerometer.
#[derive(Debug, Clone, Copy)]
pub struct KernelParams {
    pub time_delta_ms: u32,
    pub orientation: Orientation,
    pub profile: SensorProfile,
}

/// Minimum number of resampled points required to attempt autocorrelation
/// and sine-fitting (§4.6 "Numerical notes": windows shorter than this
/// yield the sentinel result).
const MIN_WINDOW_LEN: usize = 4;

/// Run the full seven-step kernel pipeline on one snapshot.
pub fn analyze(snapshot: &Snapshot, trace_id: u64, params: &KernelParams) -> RotationResult {
    let normalized = resample::normalize(
        snapshot,
        params.time_delta_ms,
        &params.orientation,
        &params.profile,
    );

    if normalized.len() < MIN_WINDOW_LEN {
        return RotationResult::sentinel(trace_id);
    }

    let dt_s = params.time_delta_ms as f64 / 1000.0;
    let Some(freq) = estimate_frequency(&normalized, dt_s) else {
        return RotationResult::sentinel(trace_id);
    };

    let sine_fit = fit_sine(&normalized, dt_s, freq);
    let (east_curve, up_curve) = evaluate_fit(normalized.len(), dt_s, freq, &sine_fit);
    let direction = classify::majority_vote(&east_curve, &up_curve);
    let rps = (freq.east + freq.up) / 2.0;

    RotationResult { rps, direction, trace_id }
}

/// Evaluate both channels' fitted sine curves at the same grid points used
/// for resampling, so Step 6 classifies against the smoothed model rather
/// than the noisy samples (§4.6 Step 6: "using the fitted curves, not the
/// noisy samples").
fn evaluate_fit(
    n: usize,
    dt_s: f64,
    freq: FrequencyEstimate,
    fit: &SineFit,
) -> (Vec<f64>, Vec<f64>) {
    let omega_east = std::f64::consts::TAU * freq.east;
    let omega_up = std::f64::consts::TAU * freq.up;
    let east: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 * dt_s;
            fit.east.amplitude * (omega_east * t + fit.east.phase).sin() + fit.east.vertical_offset
        })
        .collect();
    let up: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 * dt_s;
            fit.up.amplitude * (omega_up * t + fit.up.phase).sin() + fit.up.vertical_offset
        })
        .collect();
    (east, up)
}

/// Step 4: autocorrelation-based frequency estimate per channel. Returns
/// `None` if either channel's autocorrelation has no usable interior peak.
fn estimate_frequency(
    normalized: &rotascope_common::model::NormalizedWindow,
    dt_s: f64,
) -> Option<FrequencyEstimate> {
    let east = autocorr::dominant_frequency(&normalized.east, dt_s)?;
    let up = autocorr::dominant_frequency(&normalized.up, dt_s)?;
    Some(FrequencyEstimate { east, up })
}

/// Step 5: sine-wave regression per channel at the frequency found in Step 4.
fn fit_sine(
    normalized: &rotascope_common::model::NormalizedWindow,
    dt_s: f64,
    freq: FrequencyEstimate,
) -> SineFit {
    let t: Vec<f64> = (0..normalized.len()).map(|i| i as f64 * dt_s).collect();
    let east = sinefit::fit_channel(&t, &normalized.east, std::f64::consts::TAU * freq.east);
    let up = sinefit::fit_channel(&t, &normalized.up, std::f64::consts::TAU * freq.up);
    SineFit { east, up }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotascope_common::calibration::SensorRegistry;
    use rotascope_common::model::{AxisLetter, AxisSign, AxisSpec, RawSample};
    use std::f64::consts::TAU;

    fn params() -> KernelParams {
        KernelParams {
            time_delta_ms: 40,
            orientation: Orientation::default(),
            profile: *SensorRegistry::default().get("am3x-1.5g").unwrap(),
        }
    }

    /// Build a snapshot tracing `east(t) = A*sin(2*pi*f*t)`,
    /// `up(t) = ±A*cos(2*pi*f*t)` — the literal clockwise/anticlockwise
    /// orbit scenarios. `ccw` selects the `up` sign.
    fn orbit_snapshot(freq_hz: f64, amplitude: f64, dt_ms: u32, n: usize, ccw: bool) -> Snapshot {
        let profile = SensorRegistry::default().get("am3x-1.5g").unwrap();
        let mut snapshot = Snapshot::new();
        for i in 0..n {
            let t_s = i as f64 * dt_ms as f64 / 1000.0;
            let phase = TAU * freq_hz * t_s;
            let east_g = amplitude * phase.sin();
            let up_g = if ccw { -amplitude * phase.cos() } else { amplitude * phase.cos() };
            let x_counts = raw_counts_for(east_g, profile);
            let z_counts = raw_counts_for(up_g, profile);
            let y_counts = raw_counts_for(0.0, profile);
            snapshot.push(RawSample {
                t_ms: i as u32 * dt_ms,
                x: x_counts,
                y: y_counts,
                z: z_counts,
            });
        }
        snapshot
    }

    fn raw_counts_for(accel_m_s2: f64, profile: &SensorProfile) -> i32 {
        // Inverse of SensorProfile::convert.
        let volts = accel_m_s2 / profile.g_units * profile.volt_per_g + profile.volt_base;
        ((volts / profile.volt_max) * profile.accel_unit_max).round() as i32
    }

    #[test]
    fn short_window_yields_sentinel() {
        let mut snapshot = Snapshot::new();
        snapshot.push(RawSample { t_ms: 0, x: 500, y: 500, z: 500 });
        snapshot.push(RawSample { t_ms: 40, x: 500, y: 500, z: 500 });
        let result = analyze(&snapshot, 7, &params());
        assert_eq!(result, RotationResult::sentinel(7));
    }

    #[test]
    fn static_device_yields_direction_zero() {
        let mut snapshot = Snapshot::new();
        for i in 0..100u32 {
            snapshot.push(RawSample { t_ms: i * 40, x: 500, y: 500, z: 500 });
        }
        let result = analyze(&snapshot, 3, &params());
        assert_eq!(result.direction, 0);
    }

    /// Scenario 1 (§8): `f = 0.5 Hz`, `A = 3.0 m/s^2`, `dt = 40 ms`,
    /// a 4000 ms window (101 samples).
    #[test]
    fn pure_clockwise_orbit_is_classified_clockwise() {
        let snapshot = orbit_snapshot(0.5, 3.0, 40, 101, false);
        let result = analyze(&snapshot, 1, &params());
        assert_eq!(result.direction, 1);
        assert!((result.rps - 0.5).abs() < 0.05);
    }

    /// Scenario 2 (§8): same as scenario 1 with `up(t)` negated.
    #[test]
    fn pure_anticlockwise_orbit_is_classified_anticlockwise() {
        let snapshot = orbit_snapshot(0.5, 3.0, 40, 101, true);
        let result = analyze(&snapshot, 2, &params());
        assert_eq!(result.direction, -1);
    }

    /// Scenario 3 (§8): scenario 1 with `east_axis = "-x"`.
    #[test]
    fn axis_sign_override_flips_classified_direction() {
        let snapshot = orbit_snapshot(0.5, 3.0, 40, 101, false);
        let flipped_orientation = Orientation {
            east: AxisSpec { sign: AxisSign::Neg, axis: AxisLetter::X },
            ..Orientation::default()
        };
        let flipped_params = KernelParams { orientation: flipped_orientation, ..params() };
        let result = analyze(&snapshot, 4, &flipped_params);
        assert_eq!(result.direction, -1);
    }

    #[test]
    fn trace_id_is_carried_through_unchanged() {
        let snapshot = orbit_snapshot(1.0, 3.0, 40, 50, false);
        let result = analyze(&snapshot, 42, &params());
        assert_eq!(result.trace_id, 42);
    }
}
