//----------------------------------------------------------------------------------------- std lib
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
//--------------------------------------------------------------------------------- other libraries
use env_logger::fmt::style::Style;
use log::info;
use once_cell::sync::Lazy;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt as _};

use crate::format_duration;

// This will get initialized below.
/// Returns the init [`Instant`]
pub static INIT_INSTANT: Lazy<Instant> = Lazy::new(Instant::now);

fn level_char(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug => "D",
        log::Level::Trace => "T",
    }
}

/// The filter directives used when `RUST_LOG` isn't set,
/// everything but our own crates is silenced.
fn default_filters(filter: log::LevelFilter) -> String {
    format!("off,spotlite={filter}")
}

//---------------------------------------------------------------------------------------------------- Logger init function
#[allow(clippy::module_name_repetitions)]
/// Initializes the logger.
///
/// This enables console logging on all the internals of `Spotlite`,
/// or logging to `log_file` instead if one is given.
///
/// Functionality is provided by [`log`].
///
/// # Panics
/// This must only be called _once_.
#[cfg(not(tarpaulin_include))]
pub fn init_logger(filter: log::LevelFilter, log_file: Option<PathBuf>) {
    let now = Lazy::force(&INIT_INSTANT);

    let env = std::env::var("RUST_LOG").ok().filter(|e| !e.is_empty());
    let filters = env.clone().unwrap_or_else(|| default_filters(filter));

    let mut builder = env_logger::Builder::new();
    builder.format(move |buf, record| {
        let level_style = buf.default_level_style(record.level()).bold();
        let dimmed = Style::new().dimmed();
        writeln!(
            buf,
            //      Longest PATH ---|        |--- Longest file
            //                      |        |
            //                      v        v
            "| {level_style}{}{level_style:#} | {dimmed}{}{dimmed:#} | {dimmed}{: >32}{dimmed:#} @ {dimmed}{: <4}{dimmed:#} | {}",
            level_char(record.level()),
            format_duration(&now.elapsed()),
            record.file_static().unwrap_or("???"),
            record.line().unwrap_or(0),
            record.args(),
        )
    });
    builder.parse_filters(&filters);

    match log_file.map(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
    }) {
        Some(Ok(file)) => {
            builder
                .write_style(env_logger::WriteStyle::Never)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        Some(Err(e)) => {
            eprintln!("Unable to open the log file, logging to stderr instead: {e}");
            builder.write_style(env_logger::WriteStyle::Always);
        }
        None => {
            builder.write_style(env_logger::WriteStyle::Always);
        }
    }

    builder.init();

    match env {
        Some(env) => info!("Log Level (RUST_LOG) ... {env}"),
        None => info!("Log Level (Flag) ... {filter}"),
    }
}

/// Initializes the tracing layer.
///
/// Spans are printed to stderr when they close, filtered by `SPOTLITE_TRACE`
/// (same syntax as `RUST_LOG`). Without it nothing is printed, unless the
/// `verbose_tracing` feature is on.
#[must_use]
pub fn init_tracing() -> impl tracing::Subscriber + Send + Sync {
    #[cfg(not(feature = "verbose_tracing"))]
    let default = "off";
    #[cfg(feature = "verbose_tracing")]
    let default = "spotlite=trace,tower_http=debug";

    let filter = EnvFilter::try_from_env("SPOTLITE_TRACE").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true),
    )
}
