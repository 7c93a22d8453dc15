//! Logging setup for dupsweep.
//!
//! Diagnostics go through the `log` facade with an `env_logger` backend and
//! land on stderr, keeping stdout free for phase status lines. The level is
//! determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `-v`/`-vv` (debug/trace)
//! 3. Default: info level

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem from the CLI verbosity flags.
///
/// Call once at startup before any logging happens. Re-initialization (as
/// when tests drive the application entry point repeatedly) is silently
/// ignored.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from the CLI (0=info, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder, verbose);

    // Double initialization only happens in test harnesses
    let _ = builder.try_init();

    log::debug!("logging initialized at level {}", current_level_name());
}

/// Map the CLI flags to a level filter. Quiet wins over verbose.
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

/// Compact single-line format; module path included from -v up since the
/// per-file skip diagnostics get noisy without an origin.
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if verbose >= 1 {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} [{}] {}",
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{level_style}{:<5}{level_style:#} {}", level, record.args())
        }
    });
}

/// Current maximum log level as a lowercase name.
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
