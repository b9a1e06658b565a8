//! Unit conversion, axis selection, and resampling onto a regular time grid
//! (C6 Steps 1–3, §4.6).

use rotascope_common::calibration::SensorProfile;
use rotascope_common::model::{NormalizedWindow, Orientation, Snapshot};

/// Subtract the arithmetic mean from every element, in place.
fn zero_mean(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    for v in values.iter_mut() {
        *v -= mean;
    }
}

/// Linearly interpolate `(t, v)` onto `t_grid`, extrapolating linearly past
/// the right endpoint (§4.6 Step 3).
fn interpolate(t: &[f64], v: &[f64], t_grid: &[f64]) -> Vec<f64> {
    debug_assert_eq!(t.len(), v.len());
    let n = t.len();
    let mut out = Vec::with_capacity(t_grid.len());
    let mut j = 0usize;

    for &tg in t_grid {
        while j + 2 < n && t[j + 1] < tg {
            j += 1;
        }
        let (t0, t1, v0, v1) = if n >= 2 {
            (t[j], t[j + 1], v[j], v[j + 1])
        } else {
            (t[0], t[0] + 1.0, v[0], v[0])
        };
        let slope = if (t1 - t0).abs() > f64::EPSILON {
            (v1 - v0) / (t1 - t0)
        } else {
            0.0
        };
        out.push(v0 + slope * (tg - t0));
    }
    out
}

/// Run Steps 1–3 of the kernel: calibrate raw counts to `m/s^2`, project
/// onto the East/Up plane per `orientation`, mean-zero each channel, and
/// resample onto a regular `dt_ms` grid of exactly `N = len(t)` points.
pub fn normalize(
    snapshot: &Snapshot,
    dt_ms: u32,
    orientation: &Orientation,
    profile: &SensorProfile,
) -> NormalizedWindow {
    let n = snapshot.len();
    if n == 0 {
        return NormalizedWindow::default();
    }

    let t_s: Vec<f64> = snapshot.t.iter().map(|&t| t as f64 / 1000.0).collect();

    let mut east_raw: Vec<f64> = Vec::with_capacity(n);
    let mut up_raw: Vec<f64> = Vec::with_capacity(n);
    for i in 0..n {
        let x = profile.convert(snapshot.x[i] as f64);
        let y = profile.convert(snapshot.y[i] as f64);
        let z = profile.convert(snapshot.z[i] as f64);
        east_raw.push(orientation.east.apply(x, y, z));
        up_raw.push(orientation.up.apply(x, y, z));
    }
    zero_mean(&mut east_raw);
    zero_mean(&mut up_raw);

    let dt_s = dt_ms as f64 / 1000.0;
    let t0 = t_s[0];
    let t_grid: Vec<f64> = (0..n).map(|i| t0 + i as f64 * dt_s).collect();

    let east = interpolate(&t_s, &east_raw, &t_grid);
    let up = interpolate(&t_s, &up_raw, &t_grid);

    NormalizedWindow { time: t_grid, east, up }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotascope_common::calibration::SensorRegistry;
    use rotascope_common::model::{AxisLetter, AxisSign, AxisSpec};

    fn profile() -> SensorProfile {
        *SensorRegistry::default().get("am3x-1.5g").unwrap()
    }

    #[test]
    fn normalized_window_has_matching_lengths() {
        let snapshot = Snapshot {
            t: vec![0, 40, 80, 120],
            x: vec![500, 520, 540, 560],
            y: vec![500, 500, 500, 500],
            z: vec![500, 480, 460, 440],
        };
        let norm = normalize(&snapshot, 40, &Orientation::default(), &profile());
        assert_eq!(norm.time.len(), 4);
        assert_eq!(norm.east.len(), 4);
        assert_eq!(norm.up.len(), 4);
    }

    #[test]
    fn channels_are_mean_zero() {
        let snapshot = Snapshot {
            t: vec![0, 40, 80, 120, 160],
            x: vec![500, 520, 540, 560, 510],
            y: vec![500, 500, 500, 500, 500],
            z: vec![500, 480, 460, 440, 470],
        };
        let norm = normalize(&snapshot, 40, &Orientation::default(), &profile());
        let mean_east: f64 = norm.east.iter().sum::<f64>() / norm.east.len() as f64;
        let mean_up: f64 = norm.up.iter().sum::<f64>() / norm.up.len() as f64;
        assert!(mean_east.abs() < 1e-9);
        assert!(mean_up.abs() < 1e-9);
    }

    #[test]
    fn grid_spacing_is_exact() {
        let snapshot = Snapshot {
            t: vec![0, 37, 81, 119, 163],
            x: vec![500, 520, 540, 560, 510],
            y: vec![500; 5],
            z: vec![500, 480, 460, 440, 470],
        };
        let norm = normalize(&snapshot, 40, &Orientation::default(), &profile());
        for w in norm.time.windows(2) {
            assert!((w[1] - w[0] - 0.040).abs() < 1e-12);
        }
    }

    #[test]
    fn axis_sign_flip_negates_east_channel() {
        let snapshot = Snapshot {
            t: vec![0, 40, 80, 120],
            x: vec![500, 520, 540, 560],
            y: vec![500; 4],
            z: vec![500; 4],
        };
        let pos_orientation = Orientation::default();
        let neg_orientation = Orientation {
            east: AxisSpec { sign: AxisSign::Neg, axis: AxisLetter::X },
            ..Orientation::default()
        };
        let norm_pos = normalize(&snapshot, 40, &pos_orientation, &profile());
        let norm_neg = normalize(&snapshot, 40, &neg_orientation, &profile());
        for (a, b) in norm_pos.east.iter().zip(norm_neg.east.iter()) {
            assert!((a + b).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_snapshot_yields_empty_window() {
        let norm = normalize(&Snapshot::new(), 40, &Orientation::default(), &profile());
        assert!(norm.is_empty());
    }
}
