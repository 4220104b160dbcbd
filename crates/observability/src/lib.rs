//! Tracing and logging (shared setup).

/// Initialize process-wide logging with JSON output and an `info` default.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json, "info");
}

/// Initialize logging with an explicit format and default filter.
pub fn init_with(format: tracing::LogFormat, default_filter: &str) {
    tracing::init(format, default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::LogFormat;
