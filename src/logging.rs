//! Logging infrastructure for tinker.
//!
//! Structured logging through the `log` facade with an `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! HTTP stack crates (`reqwest`, `hyper`, `rustls`) stay at warn unless trace
//! is requested, so `-v` shows the session lifecycle rather than connection
//! pool chatter.
//!
//! # Example
//!
//! ```rust,no_run
//! use tinker::logging::init_logging;
//!
//! // -v: debug output for the session lifecycle
//! init_logging(1, false);
//! log::debug!("Restored sandbox identity");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Crates whose debug output is noise for a user of this tool.
const NOISY_DEPENDENCIES: [&str; 3] = ["reqwest", "hyper", "rustls"];

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once at startup, before any log output.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
///
/// # Panics
///
/// Panics if called more than once, as `env_logger` can only be
/// initialized once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    } else {
        let level = determine_level(verbose, quiet);
        builder.filter_level(level);
        let dependency_level = dependency_level(level);
        for name in NOISY_DEPENDENCIES {
            builder.filter_module(name, dependency_level);
        }
    }

    configure_format(&mut builder, verbose);
    builder.init();

    log::debug!("Logging initialized at level: {}", current_level_name());
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Level applied to HTTP stack crates for a given application level.
fn dependency_level(level: LevelFilter) -> LevelFilter {
    if level == LevelFilter::Trace {
        LevelFilter::Trace
    } else {
        level.min(LevelFilter::Warn)
    }
}

/// Debug builds and verbose runs include timestamps and the module path;
/// release builds at default verbosity print level and message only.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let detailed = cfg!(debug_assertions) || verbose > 0;

    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if detailed {
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{level_style}{:<5}{level_style:#} {}", level, record.args())
        }
    });
}

/// Get the current log level as a string.
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
