//! Rotascope binary entry point (§10.1, §10.3).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use rotascope::cli::Args;
use rotascope::orchestrator::{self, Config, OrchestratorError};
use rotascope_common::calibration::SensorRegistry;
use rotascope_common::config::load_profiles_into;
use rotascope_common::model::Orientation;

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    match run(args) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("rotascope exiting: {}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

/// Exit codes per §6: `0` normal, `1` device never ready, other
/// non-zero on fatal I/O.
fn exit_code(e: &OrchestratorError) -> i32 {
    match e {
        OrchestratorError::DeviceNotReady => 1,
        _ => 2,
    }
}

fn run(args: Args) -> Result<(), OrchestratorError> {
    let mut registry = SensorRegistry::default();
    if let Some(path) = &args.profiles {
        load_profiles_into(&mut registry, path)
            .unwrap_or_else(|e| panic!("failed to load --profiles file {}: {e}", path.display()));
    }
    // Fail fast on an unknown sensor-type name rather than deep inside the
    // sampling loop.
    registry.get(&args.sensor_type).unwrap_or_else(|e| {
        error!("unknown sensor profile {:?}: {}", args.sensor_type, e);
        std::process::exit(2)
    });

    let orientation = Orientation { east: args.east_axis, north: args.north_axis, up: args.up_axis };

    let config = Config {
        device_path: args.device.clone(),
        baud: args.baud,
        host: args.host.clone(),
        port: args.port,
        orientation,
        window: rotascope::window::WindowConfig {
            time_window_ms: args.time_window_ms,
            time_interval_ms: args.time_interval_ms,
        },
        time_delta_ms: args.time_delta_ms,
        workers: args.workers,
        profile_name: args.sensor_type.clone(),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    register_signal_handlers(&shutdown);

    info!(
        device = %args.device,
        host = %args.host,
        port = args.port,
        sensor = %args.sensor_type,
        "rotascope starting"
    );

    orchestrator::run(config, &registry, shutdown)
}

/// Register POSIX signal handlers for the four signals §4.9
/// treats as shutdown triggers. Each sets the shared flag that every task
/// polls at its next suspension point.
fn register_signal_handlers(shutdown: &Arc<AtomicBool>) {
    for signal in [
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGQUIT,
        signal_hook::consts::SIGHUP,
    ] {
        if let Err(e) = signal_hook::flag::register(signal, shutdown.clone()) {
            error!(signal, error = %e, "failed to register signal handler");
        }
    }
}

/// Configure the global tracing subscriber from `--json`/`-v`/`ROTASCOPE_LOG`
/// (falling back to `RUST_LOG`, then `info`).
fn setup_tracing(args: &Args) {
    let default_level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_env("ROTASCOPE_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    if args.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
