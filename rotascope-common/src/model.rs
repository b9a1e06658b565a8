//! Shared data model (§3).
//!
//! Types here are produced by the serial framer (C3), accumulated and
//! snapshotted by the rolling-window accumulator (C4), and consumed by the
//! analysis kernel (C6) and broadcaster (C7). None of these types carry
//! behaviour beyond basic invariants — the stateful logic that produces and
//! consumes them lives in the `rotascope` binary crate.

use std::str::FromStr;

use crate::error::AxisSpecError;

/// One tri-axial accelerometer reading from the microcontroller (§3).
///
/// `t_ms` is a monotonically non-decreasing millisecond timestamp assigned
/// by the microcontroller; `x`, `y`, `z` are raw ADC counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub t_ms: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Sign of an [`AxisSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSign {
    Pos,
    Neg,
}

impl AxisSign {
    #[inline]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            AxisSign::Pos => v,
            AxisSign::Neg => -v,
        }
    }
}

/// Body-frame axis letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLetter {
    X,
    Y,
    Z,
}

/// A signed axis selection, e.g. `"+x"` or `"-z"` (§3 Orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpec {
    pub sign: AxisSign,
    pub axis: AxisLetter,
}

impl AxisSpec {
    pub fn apply(self, x: f64, y: f64, z: f64) -> f64 {
        let raw = match self.axis {
            AxisLetter::X => x,
            AxisLetter::Y => y,
            AxisLetter::Z => z,
        };
        self.sign.apply(raw)
    }
}

impl FromStr for AxisSpec {
    type Err = AxisSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(AxisSpecError::Malformed(s.to_string()));
        }
        let sign = match bytes[0] {
            b'+' => AxisSign::Pos,
            b'-' => AxisSign::Neg,
            _ => return Err(AxisSpecError::Malformed(s.to_string())),
        };
        let axis = match bytes[1].to_ascii_lowercase() {
            b'x' => AxisLetter::X,
            b'y' => AxisLetter::Y,
            b'z' => AxisLetter::Z,
            _ => return Err(AxisSpecError::Malformed(s.to_string())),
        };
        Ok(AxisSpec { sign, axis })
    }
}

/// East/North/Up axis orientation (§3). The three axis letters are expected
/// to be a permutation of `{x,y,z}`; this is a deployment-configuration
/// concern and is not enforced by the core (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub east: AxisSpec,
    pub north: AxisSpec,
    pub up: AxisSpec,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            east: AxisSpec { sign: AxisSign::Pos, axis: AxisLetter::X },
            north: AxisSpec { sign: AxisSign::Pos, axis: AxisLetter::Y },
            up: AxisSpec { sign: AxisSign::Pos, axis: AxisLetter::Z },
        }
    }
}

/// Structure-of-arrays sample series: the shape shared by `WindowInterval`
/// and `RollingWindow` (§3, §9 "dynamic dictionary-of-arrays windows ->
/// structure-of-arrays"). `t` is invariant to be strictly non-decreasing;
/// all four channels share length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    pub t: Vec<u32>,
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub z: Vec<i32>,
}

/// An immutable by-value copy of a [`SampleSeries`] dispatched to a worker
/// (§3 Snapshot, §9 "sub-process pool -> in-process worker threads").
pub type Snapshot = SampleSeries;

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(sample: RawSample) -> Self {
        Self {
            t: vec![sample.t_ms],
            x: vec![sample.x],
            y: vec![sample.y],
            z: vec![sample.z],
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn first_t(&self) -> Option<u32> {
        self.t.first().copied()
    }

    pub fn last_t(&self) -> Option<u32> {
        self.t.last().copied()
    }

    pub fn push(&mut self, sample: RawSample) {
        self.t.push(sample.t_ms);
        self.x.push(sample.x);
        self.y.push(sample.y);
        self.z.push(sample.z);
    }

    /// Append `other` onto the end of `self` in place.
    pub fn extend_from(&mut self, other: &SampleSeries) {
        self.t.extend_from_slice(&other.t);
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
        self.z.extend_from_slice(&other.z);
    }

    /// Drop the first `count` samples of every channel.
    pub fn drop_front(&mut self, count: usize) {
        self.t.drain(0..count);
        self.x.drain(0..count);
        self.y.drain(0..count);
        self.z.drain(0..count);
    }

    /// Least index `k` such that `t[k] > threshold`, or `len()` if none.
    pub fn first_index_after(&self, threshold: u32) -> usize {
        self.t.partition_point(|&t| t <= threshold)
    }

    /// `true` iff `t` is strictly non-decreasing and all channels share length.
    pub fn is_well_formed(&self) -> bool {
        let n = self.t.len();
        if self.x.len() != n || self.y.len() != n || self.z.len() != n {
            return false;
        }
        self.t.windows(2).all(|w| w[0] <= w[1])
    }
}

/// A resampled, mean-zeroed, regularly-spaced East/Up signal pair (§3).
///
/// Invariants: `time[i+1] - time[i] == dt_s` exactly; `east`/`up` each have
/// mean zero; `time.len() == east.len() == up.len()`.
#[derive(Debug, Clone, Default)]
pub struct NormalizedWindow {
    pub time: Vec<f64>,
    pub east: Vec<f64>,
    pub up: Vec<f64>,
}

impl NormalizedWindow {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Per-channel dominant frequency estimate, in Hz (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEstimate {
    pub east: f64,
    pub up: f64,
}

/// Fitted parameters of `s(t) = amplitude * sin(2*pi*f*t + phase) + vertical_offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelFit {
    pub amplitude: f64,
    pub phase: f64,
    pub vertical_offset: f64,
}

/// Sine-wave regression result for both channels (§3 SineFit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineFit {
    pub east: ChannelFit,
    pub up: ChannelFit,
}

/// Final per-window analysis result, fanned out by the broadcaster (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationResult {
    pub rps: f64,
    pub direction: i8,
    pub trace_id: u64,
}

impl RotationResult {
    /// The sentinel result for windows too short or too noisy to analyse
    /// (§4.6 "Numerical notes", §8 boundary behaviour).
    pub fn sentinel(trace_id: u64) -> Self {
        Self { rps: 0.0, direction: 0, trace_id }
    }
}
