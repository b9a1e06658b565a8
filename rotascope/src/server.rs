//! TCP server and per-connection handler (C8/C9, §4.8).
//!
//! The acceptor blocks on `accept()` on its own thread and spawns one
//! handler thread per connection. Each handler owns a non-blocking socket,
//! cooperatively polling both the socket and its [`Mailbox`], and enforces
//! the client-driven keepalive protocol: the client must send `SOKE` at
//! least once every `ping_timeout` or the handler closes the connection.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::broadcast::{Broadcaster, Mailbox};

/// Fatal error standing up the listener.
#[derive(Debug, Error)]
pub enum ConnError {
    #[error("failed to bind {host}:{port}: {source}")]
    Bind { host: String, port: u16, source: std::io::Error },
}

const READ_CHUNK: usize = 64;
const PING_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_SLEEP: Duration = Duration::from_millis(20);

/// Runs the accept loop on the calling thread until `shutdown` is set,
/// spawning a detached handler thread per accepted connection.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    pub fn bind(host: &str, port: u16) -> Result<Self, ConnError> {
        let listener = TcpListener::bind((host, port)).map_err(|source| ConnError::Bind {
            host: host.to_string(),
            port,
            source,
        })?;
        listener.set_nonblocking(true).ok();
        info!(host, port, "TCP server listening");
        Ok(Self { listener })
    }

    /// Accept connections until `shutdown` becomes true. Each connection
    /// gets its own handler thread with a fresh mailbox from `broadcaster`.
    pub fn run(&self, broadcaster: Arc<Broadcaster>, shutdown: Arc<AtomicBool>) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    debug!(%addr, "accepted connection");
                    let mailbox = broadcaster.subscribe();
                    let broadcaster = broadcaster.clone();
                    let shutdown = shutdown.clone();
                    thread::Builder::new()
                        .name("rotascope-handler".into())
                        .spawn(move || handle_connection(stream, mailbox.clone(), &broadcaster, &shutdown))
                        .expect("failed to spawn connection handler thread");
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(POLL_SLEEP);
                }
                Err(e) => {
                    warn!(error = %e, "accept() failed");
                    thread::sleep(POLL_SLEEP);
                }
            }
        }
    }
}

/// Per-connection state machine (§4.8).
fn handle_connection(
    mut stream: TcpStream,
    mailbox: Mailbox,
    broadcaster: &Broadcaster,
    shutdown: &AtomicBool,
) {
    stream.set_nonblocking(true).ok();
    let mut input = Vec::new();
    let mut last_ok_at = Instant::now();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        // 1. Read up to READ_CHUNK bytes, non-blocking.
        let mut buf = [0u8; READ_CHUNK];
        match stream.read(&mut buf) {
            Ok(0) => {
                debug!("peer closed connection");
                break;
            }
            Ok(n) => input.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => {
                error!(error = %e, "client read error");
                break;
            }
        }

        // 2. Drain the mailbox and write a frame if a result is pending.
        if let Some(result) = mailbox.try_recv() {
            let frame = format!("S{}:{}E", result.rps, result.direction);
            if let Err(e) = stream.write_all(frame.as_bytes()) {
                error!(error = %e, "client write error");
                break;
            }
        }

        // 3. Lex the input buffer for `S...E` frames; drop leading garbage.
        if let Some((token, consumed)) = lex_frame(&input) {
            if token == "OK" {
                last_ok_at = Instant::now();
            }
            input.drain(0..consumed);
        }

        // 4. Timeout check.
        if last_ok_at.elapsed() >= PING_TIMEOUT {
            debug!("client keepalive timeout");
            break;
        }

        // 5. Yield.
        thread::sleep(POLL_SLEEP);
    }

    broadcaster.unsubscribe(&mailbox);
}

/// Drop everything before the first `S`; if a complete `S...E` frame
/// follows, return its payload token and the number of bytes to consume
/// (including any leading garbage). Matches "zero-or-one frame" — never
/// returns a partial match, so the caller always makes progress once a
/// frame completes, and makes no progress (consumes nothing) otherwise.
fn lex_frame(buf: &[u8]) -> Option<(String, usize)> {
    let start = buf.iter().position(|&b| b == b'S')?;
    let end = buf[start..].iter().position(|&b| b == b'E')?;
    let end = start + end;
    let payload = std::str::from_utf8(&buf[start + 1..end]).ok()?.to_string();
    Some((payload, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_frame_extracts_token_and_consumed_length() {
        let (token, consumed) = lex_frame(b"garbageSOKE").unwrap();
        assert_eq!(token, "OK");
        assert_eq!(consumed, "garbageSOKE".len());
    }

    #[test]
    fn lex_frame_returns_none_without_complete_frame() {
        assert!(lex_frame(b"garbageS").is_none());
        assert!(lex_frame(b"").is_none());
    }

    #[test]
    fn lex_frame_ignores_unrecognized_token() {
        let (token, _) = lex_frame(b"SPINGE").unwrap();
        assert_ne!(token, "OK");
    }

    #[test]
    fn server_accepts_and_streams_a_result() {
        let broadcaster = Arc::new(Broadcaster::new());
        let server = Server::bind("127.0.0.1", 0).unwrap();
        let addr = server.listener.local_addr().unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));

        let bc = broadcaster.clone();
        let sd = shutdown.clone();
        let accept_thread = thread::spawn(move || server.run(bc, sd));

        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(2))).ok();
        // Give the handler thread time to subscribe.
        thread::sleep(Duration::from_millis(100));
        broadcaster.broadcast(rotascope_common::model::RotationResult {
            rps: 0.5,
            direction: 1,
            trace_id: 0,
        });

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).unwrap();
        let text = std::str::from_utf8(&buf[..n]).unwrap();
        assert_eq!(text, "S0.5:1E");

        shutdown.store(true, Ordering::Relaxed);
        drop(client);
        let _ = accept_thread.join();
    }
}
