//! Serial framer (C3, §4.3, §6).
//!
//! Decodes `S<body>E` delimited ASCII frames from a blocking byte stream
//! into [`RawSample`] values. A malformed frame is a `TransientFrameError`
//! (§7): it is discarded silently and the framer resynchronizes on
//! the next `S`. No partial-frame state survives a frame boundary.

use std::io::Read;

use rotascope_common::model::RawSample;
use thiserror::Error;
use tracing::debug;

/// Fatal serial I/O error (§7 `FatalIOError`) — propagates to the orchestrator.
#[derive(Debug, Error)]
pub enum FramerError {
    #[error("serial port I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes `RawSample`s from a blocking byte-oriented reader.
///
/// Tracks the number of frames discarded for resynchronization
/// (§10.5 "frame resynchronization counters") purely for observability.
pub struct SerialFramer<R> {
    reader: R,
    discarded_frames: u64,
}

impl<R: Read> SerialFramer<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, discarded_frames: 0 }
    }

    /// Number of frames discarded so far due to resynchronization or parse
    /// failure.
    pub fn discarded_frames(&self) -> u64 {
        self.discarded_frames
    }

    fn read_byte(&mut self) -> Result<Option<u8>, FramerError> {
        let mut b = [0u8; 1];
        match self.reader.read(&mut b) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(b[0])),
            Err(e) => Err(FramerError::Io(e)),
        }
    }

    /// Block until the next frame body (bytes between `S` and `E`) arrives.
    ///
    /// Returns `Ok(None)` when the underlying stream reaches EOF while
    /// searching for a start-of-frame byte.
    fn next_frame_body(&mut self) -> Result<Option<Vec<u8>>, FramerError> {
        loop {
            match self.read_byte()? {
                None => return Ok(None),
                Some(b'S') => break,
                Some(_) => continue, // garbage before S, consumed and ignored
            }
        }

        let mut body = Vec::new();
        loop {
            match self.read_byte()? {
                None => return Ok(None),
                Some(b'E') => return Ok(Some(body)),
                Some(b) => body.push(b),
            }
        }
    }

    /// Read and decode the next sample, resynchronizing past any malformed
    /// frame. Returns `Ok(None)` at end of stream.
    pub fn next_sample(&mut self) -> Result<Option<RawSample>, FramerError> {
        loop {
            let Some(body) = self.next_frame_body()? else {
                return Ok(None);
            };
            match parse_body(&body) {
                Some(sample) => return Ok(Some(sample)),
                None => {
                    self.discarded_frames += 1;
                    debug!(
                        discarded = self.discarded_frames,
                        "discarded malformed serial frame"
                    );
                }
            }
        }
    }
}

/// Parse `Time <ms> X <u> Y <u> Z <u>` (case-insensitive, any single
/// non-newline separator between fields) out of a frame body.
fn parse_body(body: &[u8]) -> Option<RawSample> {
    let text = std::str::from_utf8(body).ok()?;
    let mut tokens = text.split(|c: char| !c.is_ascii_alphanumeric() && c != '.' && c != '-');
    let tokens = tokens.by_ref().filter(|t| !t.is_empty());
    let mut tokens = tokens;

    let time_tag = tokens.next()?;
    if !time_tag.eq_ignore_ascii_case("time") {
        return None;
    }
    let t_ms: u32 = tokens.next()?.parse().ok()?;

    let x_tag = tokens.next()?;
    if !x_tag.eq_ignore_ascii_case("x") {
        return None;
    }
    let x: i32 = tokens.next()?.parse().ok()?;

    let y_tag = tokens.next()?;
    if !y_tag.eq_ignore_ascii_case("y") {
        return None;
    }
    let y: i32 = tokens.next()?.parse().ok()?;

    let z_tag = tokens.next()?;
    if !z_tag.eq_ignore_ascii_case("z") {
        return None;
    }
    let z: i32 = tokens.next()?.parse().ok()?;

    Some(RawSample { t_ms, x, y, z })
}
