//! Rolling-window accumulator (C4, §4.4).
//!
//! Anchors the window on sample *timestamps*, not sample *count*, since the
//! microcontroller is soft real-time and the true sample period fluctuates.
//! This yields a bounded-time window with a variable sample count.

use rotascope_common::model::{RawSample, Snapshot};

/// A dispatched snapshot paired with its monotonic trace id (§3 "Trace id").
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub snapshot: Snapshot,
    pub trace_id: u64,
}

/// Configuration for the accumulator (§6 `time_window_ms`, `time_interval_ms`).
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    pub time_window_ms: u32,
    pub time_interval_ms: u32,
}

/// Stateful rolling-window accumulator (§4.4).
pub struct WindowAccumulator {
    config: WindowConfig,
    window: Snapshot,
    interval: Snapshot,
    interval_start_t: Option<u32>,
    filled: bool,
    next_trace_id: u64,
}

impl WindowAccumulator {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            window: Snapshot::new(),
            interval: Snapshot::new(),
            interval_start_t: None,
            filled: false,
            next_trace_id: 0,
        }
    }

    /// Whether the window has accumulated at least `time_window_ms` of
    /// history. Once true, this never reverts (§8 invariant).
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Feed one new sample; returns a [`Dispatch`] whenever a roll produces
    /// a fresh snapshot (i.e. once `filled` is true and the interval closes).
    pub fn push(&mut self, sample: RawSample) -> Option<Dispatch> {
        let mut dispatch = None;

        match self.interval_start_t {
            Some(t0) if sample.t_ms <= t0 + self.config.time_interval_ms => {
                self.interval.push(sample);
            }
            _ => {
                if self.interval_start_t.is_some() {
                    dispatch = self.roll(sample.t_ms);
                }
                self.interval = Snapshot::single(sample);
                self.interval_start_t = Some(sample.t_ms);
            }
        }

        dispatch
    }

    /// Roll the current interval into the window (§4.4 "Roll procedure").
    /// `current_t` is the timestamp of the sample that triggered the roll,
    /// used only for the "grow until full" check.
    fn roll(&mut self, current_t: u32) -> Option<Dispatch> {
        if self.window.is_empty() {
            // Bootstrap.
            self.window = std::mem::take(&mut self.interval);
        } else if !self.filled {
            self.window.extend_from(&self.interval);
            self.interval = Snapshot::new();
            // Authoritative per §9: strict `<`, not `<=`.
            if let Some(first_t) = self.window.first_t() {
                if first_t + self.config.time_window_ms < current_t {
                    self.filled = true;
                }
            }
        } else {
            let cutoff_t = self.window.first_t().unwrap_or(0) + self.config.time_interval_ms;
            let k = self.window.first_index_after(cutoff_t);
            self.window.drop_front(k);
            self.window.extend_from(&self.interval);
            self.interval = Snapshot::new();
        }

        if self.filled {
            let trace_id = self.next_trace_id;
            self.next_trace_id += 1;
            Some(Dispatch { snapshot: self.window.clone(), trace_id })
        } else {
            None
        }
    }
}
