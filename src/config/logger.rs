//! Injectable sink for engine diagnostics.

/// Receives the engine's log, warning and error reports.
///
/// Implementations decide what an error means for the caller; the engine
/// itself only consults `Config::on_error` to choose whether to continue.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default logger forwarding to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::debug!(target: "statechart", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "statechart", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "statechart", "{}", message);
    }
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}
