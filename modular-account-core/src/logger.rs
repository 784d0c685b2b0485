//! Opt-in logging initialization.
//!
//! The library itself only emits `tracing` events; nothing is installed
//! unless an application asks for it. `init` wires up an env-filtered
//! subscriber and bridges `log` records emitted by dependencies, so a CLI
//! or test binary gets a single coherent stream.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, reading the filter from `RUST_LOG`
/// (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    if let Err(err) = try_init() {
        // A host application may already have installed its own subscriber.
        eprintln!("logger already initialized: {err}");
    }
}

/// Fallible variant of [`init`] for applications that want to handle the
/// already-installed case themselves.
///
/// # Errors
/// Returns an error if a global subscriber or `log` logger is already
/// installed.
pub fn try_init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
