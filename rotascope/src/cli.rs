//! Command-line surface (§6, §10.3).

use std::path::PathBuf;

use clap::Parser;
use rotascope_common::calibration::DEFAULT_PROFILE_NAME;
use rotascope_common::model::AxisSpec;

/// Rotascope — real-time rotation-detection server.
#[derive(Parser, Debug)]
#[command(name = "rotascope")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Serial accelerometer ingest, rotation-frequency/direction analysis, TCP broadcast")]
#[command(long_about = None)]
pub struct Args {
    /// Path to the serial device (e.g. /dev/ttyUSB0)
    pub device: String,

    /// Serial baud rate
    pub baud: u32,

    /// TCP bind address
    pub host: String,

    /// TCP bind port
    pub port: u16,

    /// Accelerometer sensor profile name
    #[arg(short = 's', long = "sensor-type", default_value = DEFAULT_PROFILE_NAME)]
    pub sensor_type: String,

    /// Additional TOML file of sensor profiles (merged into the registry)
    #[arg(long = "profiles")]
    pub profiles: Option<PathBuf>,

    /// East axis and sign, one of +x,-x,+y,-y,+z,-z
    #[arg(long = "east-axis", default_value = "+x")]
    pub east_axis: AxisSpec,

    /// North axis and sign, one of +x,-x,+y,-y,+z,-z
    #[arg(long = "north-axis", default_value = "+y")]
    pub north_axis: AxisSpec,

    /// Up axis and sign, one of +x,-x,+y,-y,+z,-z
    #[arg(long = "up-axis", default_value = "+z")]
    pub up_axis: AxisSpec,

    /// Rolling time window size, in milliseconds
    #[arg(long = "time-window-ms", default_value_t = 4000)]
    pub time_window_ms: u32,

    /// Rolling time window increment (interval), in milliseconds
    #[arg(long = "time-interval-ms", default_value_t = 150)]
    pub time_interval_ms: u32,

    /// Regular resampling grid period, in milliseconds
    #[arg(long = "time-delta-ms", default_value_t = 40)]
    pub time_delta_ms: u32,

    /// Number of analysis-kernel worker threads
    #[arg(long = "workers", default_value_t = 1)]
    pub workers: usize,

    /// Enable the live-plotting sink (no-op unless a real sink is wired in)
    #[arg(long = "graph")]
    pub graph: bool,

    /// Increase log verbosity (may be repeated)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long = "json")]
    pub json: bool,
}
