//! Structured logging setup.
//!
//! The scheduler emits `tracing` events (`debug` per placement, `info` per
//! call, `warn` for overloads and late tasks). Library users normally install
//! their own subscriber; binaries and tests can call [`init_tracing`].

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, unless a global
/// subscriber is already set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
