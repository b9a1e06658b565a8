//! Rotascope: real-time rotation-detection server.
//!
//! Ingests tri-axial accelerometer samples over a serial connection,
//! maintains a sliding time window, estimates dominant rotational
//! frequency and direction via autocorrelation and sine-wave regression,
//! and broadcasts results to TCP clients over a framed keepalive protocol.

pub mod broadcast;
pub mod cli;
pub mod display;
pub mod framer;
pub mod kernel;
pub mod orchestrator;
pub mod server;
pub mod window;
pub mod worker;
