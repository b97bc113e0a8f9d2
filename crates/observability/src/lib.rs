//! Shared tracing setup for grocery binaries and tests.

/// Initialize process-wide tracing with the default (`info`) filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;
