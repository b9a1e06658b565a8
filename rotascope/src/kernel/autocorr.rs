//! FFT-based autocorrelation and dominant-frequency extraction
//! (C6 Step 4, §4.6).
//!
//! The autocorrelation of a real signal is computed via the Wiener–Khinchin
//! theorem: zero-pad to avoid circular wraparound, take the FFT, multiply by
//! its own conjugate (the power spectrum), and inverse-FFT back. The first
//! non-zero-lag peak of the resulting autocorrelation gives the dominant
//! period; its location is refined with parabolic interpolation across the
//! three samples straddling the peak.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Compute the (unnormalized) autocorrelation of `signal` via FFT.
///
/// Returns a vector of length `signal.len()` with the non-negative lags
/// `0..signal.len()`.
fn autocorrelation(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    // Zero-pad to at least 2n (next power of two) so the circular
    // convolution the FFT computes matches the linear autocorrelation.
    let padded_len = (2 * n).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(padded_len);
    let ifft = planner.plan_fft_inverse(padded_len);

    let mut buf: Vec<Complex64> = signal
        .iter()
        .map(|&v| Complex64::new(v, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(padded_len)
        .collect();

    fft.process(&mut buf);
    for c in buf.iter_mut() {
        *c = *c * c.conj();
    }
    ifft.process(&mut buf);

    let scale = 1.0 / padded_len as f64;
    buf[..n].iter().map(|c| c.re * scale).collect()
}

/// Refine a discrete peak index `k` (`1 <= k < len-1`) using parabolic
/// interpolation across `y[k-1], y[k], y[k+1]`. Returns the sub-sample
/// offset from `k`, in `[-0.5, 0.5]`.
fn parabolic_offset(y_m1: f64, y_0: f64, y_p1: f64) -> f64 {
    let denom = y_m1 - 2.0 * y_0 + y_p1;
    if denom.abs() < 1e-15 {
        return 0.0;
    }
    0.5 * (y_m1 - y_p1) / denom
}

/// Estimate the dominant frequency (Hz) of a regularly-sampled, mean-zeroed
/// signal via autocorrelation peak-picking. `dt_s` is the sample period in
/// seconds. Returns `None` if no interior peak exists (signal too short or
/// featureless) — the caller must fall back to the sentinel result.
pub fn dominant_frequency(signal: &[f64], dt_s: f64) -> Option<f64> {
    let n = signal.len();
    if n < 4 {
        return None;
    }
    let ac = autocorrelation(signal);

    // `start` is the first rising index of the first difference `d[i] =
    // c[i+1] - c[i]`: this guards against the DC peak sitting at lag 0.
    let start = (0..n - 1).find(|&i| ac[i + 1] - ac[i] > 0.0)?;

    // `peak` is the index of the maximum autocorrelation value at or past
    // `start`.
    let peak = start
        + ac[start..]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)?;

    if peak == 0 || peak >= n - 1 {
        // No interior neighbor on one side; parabolic interpolation is
        // undefined at the boundary.
        return None;
    }

    let offset = parabolic_offset(ac[peak - 1], ac[peak], ac[peak + 1]);
    let xv = peak as f64 + offset;
    if xv <= 0.0 {
        return None;
    }

    let sampling_rate = 1.0 / dt_s;
    Some(sampling_rate / xv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq_hz: f64, dt_s: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq_hz * i as f64 * dt_s).sin()).collect()
    }

    #[test]
    fn recovers_known_frequency_within_one_percent() {
        let dt_s = 0.01;
        let freq = 2.0; // Hz
        let signal = sine(freq, dt_s, 400);
        let estimate = dominant_frequency(&signal, dt_s).unwrap();
        assert!(
            (estimate - freq).abs() / freq < 0.01,
            "estimate {estimate} too far from {freq}"
        );
    }

    #[test]
    fn short_signal_yields_none() {
        assert!(dominant_frequency(&[0.0, 1.0, -1.0], 0.01).is_none());
    }

    #[test]
    fn flat_signal_yields_none() {
        let signal = vec![0.0; 64];
        assert!(dominant_frequency(&signal, 0.01).is_none());
    }

    #[test]
    fn autocorrelation_of_zero_lag_is_maximal_energy() {
        let signal = sine(1.5, 0.02, 128);
        let ac = autocorrelation(&signal);
        let max = ac.iter().cloned().fold(f64::MIN, f64::max);
        assert!((ac[0] - max).abs() < 1e-6);
    }
}
