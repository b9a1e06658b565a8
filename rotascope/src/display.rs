//! Live-plotting sink contract (§9 "Live plotting", §10.5).
//!
//! A pure sink: it must never block the broadcast path. The default
//! implementation drops every result on the floor; a real plotting sink
//! would render off this trait without the broadcaster ever knowing or
//! caring whether one is attached.

use rotascope_common::model::RotationResult;

pub trait DisplaySink: Send {
    fn push(&mut self, result: RotationResult);
}

/// The default sink when `--graph` is not passed, or as a placeholder when
/// it is: drop-on-contention is acceptable per the design note, and this
/// sink is always "contended".
#[derive(Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn push(&mut self, _result: RotationResult) {}
}
