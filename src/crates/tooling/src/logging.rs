//! Logging helpers
//!
//! Tracing setup for binaries and a latency wrapper for the I/O edges.

use std::time::Instant;
use tracing::debug;

/// Initialize a tracing subscriber from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Await a future and log how long it took at `debug` level.
///
/// # Example
///
/// ```rust,ignore
/// let context = timed("build_context", builder.build(user_id)).await;
/// ```
pub async fn timed<F, T>(name: &str, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = future.await;
    debug!(target: "latency", "{} completed in {:?}", name, start.elapsed());
    result
}
