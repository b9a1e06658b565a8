//! Startup/shutdown sequencing (C10, §4.9).
//!
//! Startup order: construct the [`Broadcaster`] → start the TCP server →
//! open the serial device and wait for readiness → begin the sampling
//! loop. Shutdown, triggered by any of `{SIGINT, SIGTERM, SIGQUIT,
//! SIGHUP}`: signal the device to stop (write `'0'`), close the device,
//! shut down the server, close the worker pool.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use rotascope_common::calibration::SensorRegistry;
use rotascope_common::model::Orientation;

use crate::broadcast::Broadcaster;
use crate::framer::{FramerError, SerialFramer};
use crate::kernel::KernelParams;
use crate::server::{ConnError, Server};
use crate::window::{WindowAccumulator, WindowConfig};
use crate::worker::WorkerPool;

/// Top-level fatal errors from running the server.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("serial device never signalled readiness")]
    DeviceNotReady,
    #[error("failed to bind TCP listener: {0}")]
    Listener(#[from] ConnError),
    #[error("fatal serial I/O error: {0}")]
    Fatal(#[from] FramerError),
}

/// Device readiness handshake: wait (with a bounded number of polls) for
/// the microcontroller to signal data-available, then request streaming.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);
const READY_POLL_ATTEMPTS: u32 = 200; // 10s at 50ms/poll

/// All the parameters needed to run the server end to end, gathered from
/// the CLI surface (§6) plus the resolved sensor profile.
pub struct Config {
    pub device_path: String,
    pub baud: u32,
    pub host: String,
    pub port: u16,
    pub orientation: Orientation,
    pub window: WindowConfig,
    pub time_delta_ms: u32,
    pub workers: usize,
    pub profile_name: String,
}

/// Block on the serial device until it signals readiness (some byte
/// becomes available to read), or give up after a bounded number of
/// polls. On success, request streaming by writing `'1'`.
fn await_device_ready(port: &mut dyn serialport::SerialPort) -> Result<(), OrchestratorError> {
    let mut probe = [0u8; 1];
    for _ in 0..READY_POLL_ATTEMPTS {
        match port.read(&mut probe) {
            Ok(n) if n > 0 => {
                port.write_all(b"1").map_err(FramerError::Io)?;
                info!("serial device ready, streaming requested");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(FramerError::Io(e).into()),
        }
        thread::sleep(READY_POLL_INTERVAL);
    }
    Err(OrchestratorError::DeviceNotReady)
}

/// Run the server until a shutdown signal arrives. Returns on clean
/// shutdown; propagates fatal serial I/O errors.
pub fn run(config: Config, registry: &SensorRegistry, shutdown: Arc<AtomicBool>) -> Result<(), OrchestratorError> {
    let profile = registry
        .get(&config.profile_name)
        .expect("profile name was validated before orchestrator::run was called");

    let broadcaster = Arc::new(Broadcaster::new());

    let server = Server::bind(&config.host, config.port)?;
    let server_broadcaster = broadcaster.clone();
    let server_shutdown = shutdown.clone();
    let server_thread = thread::Builder::new()
        .name("rotascope-acceptor".into())
        .spawn(move || server.run(server_broadcaster, server_shutdown))
        .expect("failed to spawn acceptor thread");

    let mut serial = serialport::new(&config.device_path, config.baud)
        .timeout(Duration::from_millis(200))
        .open()
        .map_err(|e| FramerError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    await_device_ready(serial.as_mut())?;

    let (result_tx, result_rx) = crossbeam_channel::unbounded();
    let kernel_params =
        KernelParams { time_delta_ms: config.time_delta_ms, orientation: config.orientation, profile: *profile };
    let pool = WorkerPool::new(config.workers, kernel_params, result_tx);

    let broadcast_for_results = broadcaster.clone();
    let result_shutdown = shutdown.clone();
    let result_thread = thread::Builder::new()
        .name("rotascope-results".into())
        .spawn(move || {
            while !result_shutdown.load(Ordering::Relaxed) {
                match result_rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(result) => broadcast_for_results.broadcast(result),
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                    Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                }
            }
        })
        .expect("failed to spawn result-broadcast thread");

    let sampling_result = run_sampling_loop(serial.as_mut(), &pool, config.window, &shutdown);

    shutdown.store(true, Ordering::Relaxed);
    let _ = serial.write_all(b"0");
    drop(serial);
    pool.shutdown();
    let _ = server_thread.join();
    let _ = result_thread.join();

    sampling_result
}

/// The producer loop: decode samples off the serial device and feed them
/// into the rolling-window accumulator, submitting dispatched snapshots to
/// the worker pool.
fn run_sampling_loop(
    serial: &mut dyn serialport::SerialPort,
    pool: &WorkerPool,
    window_config: WindowConfig,
    shutdown: &AtomicBool,
) -> Result<(), OrchestratorError> {
    let mut framer = SerialFramer::new(SerialReadAdapter { port: serial });
    let mut accumulator = WindowAccumulator::new(window_config);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }
        match framer.next_sample() {
            Ok(Some(sample)) => {
                if let Some(dispatch) = accumulator.push(sample) {
                    pool.submit(dispatch);
                }
            }
            Ok(None) => return Ok(()),
            Err(e) => {
                if shutdown.load(Ordering::Relaxed) {
                    // Expected: shutdown closed the device out from under us.
                    return Ok(());
                }
                error!(error = %e, "fatal serial read error");
                return Err(e.into());
            }
        }
    }
}

/// A read timeout on a `serialport::SerialPort` surfaces as
/// `ErrorKind::TimedOut`; translate it into "no data yet" so the framer's
/// blocking read loop keeps polling rather than treating it as EOF.
struct SerialReadAdapter<'a> {
    port: &'a mut dyn serialport::SerialPort,
}

impl Read for SerialReadAdapter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            match self.port.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
