//! Tracing setup and span timing helpers.

use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Filter directives come from `RUST_LOG`, falling back to `info` for
/// this crate. Safe to call more than once; only the first call
/// installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("intentflow=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("classify");
        assert_eq!(timer.name(), "classify");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.finish() >= 5.0);
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing();
        init_tracing();
    }
}
