//! Logging utilities for the Atom service.
//!
//! Every crate logs through `tracing` with structured fields such as
//! `user_id`, `service` and `operation`. The backend calls [`init`] once at
//! startup; [`init_with_options`] additionally writes a rolling file log and,
//! on Linux, forwards to journald.

use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Options for [`init_with_options`].
#[derive(Debug, Clone)]
pub struct LogOptions {
    pub level: Level,
    /// Directory for a daily rolling `atom.log`; stdout only when `None`.
    pub log_dir: Option<String>,
    /// Forward events to journald (Linux only; ignored elsewhere).
    pub journald: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_dir: None,
            journald: false,
        }
    }
}

impl LogOptions {
    /// Read `ATOM_LOG_LEVEL`, `ATOM_LOG_DIR` and `ATOM_LOG_JOURNALD` from the environment.
    pub fn from_env() -> Self {
        let level = std::env::var("ATOM_LOG_LEVEL")
            .ok()
            .and_then(|l| l.parse::<Level>().ok())
            .unwrap_or(Level::INFO);
        Self {
            level,
            log_dir: std::env::var("ATOM_LOG_DIR").ok().filter(|d| !d.is_empty()),
            journald: std::env::var("ATOM_LOG_JOURNALD")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Crate targets that get the requested level on top of `RUST_LOG`.
const ATOM_TARGETS: &[&str] = &[
    "atom_backend",
    "atom_common",
    "atom_config",
    "atom_graphql",
    "atom_gcal",
    "atom_msteams",
    "atom_quickbooks",
    "atom_slack",
    "atom_stripe",
    "atom_github",
    "atom_scheduling",
];

fn env_filter(level: Level) -> EnvFilter {
    ATOM_TARGETS
        .iter()
        .fold(EnvFilter::from_default_env(), |filter, target| {
            match format!("{}={}", target, level).parse() {
                Ok(directive) => filter.add_directive(directive),
                Err(_) => filter,
            }
        })
}

/// Initialize the tracing subscriber at INFO.
///
/// ```
/// use atom_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Uses `try_init`, so a second call (e.g. from tests) is a no-op.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(env_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize stdout logging plus the optional file and journald sinks.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_with_options(options: &LogOptions) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "atom.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    #[cfg(target_os = "linux")]
    let journald_layer = if options.journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer.with_syslog_identifier("atom".to_string())),
            Err(err) => {
                eprintln!("journald unavailable: {}", err);
                None
            }
        }
    } else {
        None
    };
    #[cfg(not(target_os = "linux"))]
    let journald_layer: Option<tracing_subscriber::layer::Identity> = None;

    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_line_number(true))
        .with(file_layer)
        .with(journald_layer)
        .with(env_filter(options.level))
        .try_init();

    if result.is_ok() {
        info!(
            level = %options.level,
            log_dir = ?options.log_dir,
            journald = options.journald,
            "Logging initialized"
        );
    }
    guard
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
