//! Logging setup on top of the `log` facade and `env_logger`.
//!
//! Level resolution, first match wins:
//!
//! 1. `RUST_LOG` environment variable
//! 2. `--quiet` (errors only) or `--verbose` (debug, trace with `-vv`)
//! 3. Info
//!
//! Logs go to stderr so that `--output json` keeps stdout machine-readable.
//!
//! ```rust,no_run
//! codesweep::logging::init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Environment variable that overrides the CLI-derived level.
pub const LOG_ENV: &str = "RUST_LOG";

/// Initialize logging from CLI verbosity flags.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var_os(LOG_ENV).is_some();
    let level = level_for(verbose, quiet);

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if from_env {
        builder.parse_env(LOG_ENV);
    } else {
        builder.filter_level(level);
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }
    if from_env {
        log::debug!("Log level taken from {LOG_ENV}");
    } else {
        log::debug!("Log level: {level}");
    }
}

/// Level selected by the CLI flags alone. Quiet beats verbose.
#[must_use]
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    // Module paths only help when debugging.
    let with_target = cfg!(debug_assertions) || verbose > 0;
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if with_target {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.target(),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });
}

/// Name of the active maximum level.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
