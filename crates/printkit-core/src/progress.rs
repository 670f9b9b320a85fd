//! Cooperative cancellation and throttled progress reporting.
//!
//! Long-running passes call [`ProgressMonitor::checkpoint`] once per unit of
//! work. The monitor only does real work (invoking the reporter and checking
//! the cancellation token) once per interval, so the per-line cost stays a
//! single clock read.
//!
//! ```rust,ignore
//! let token = CancellationToken::new();
//! let mut monitor = ProgressMonitor::new()
//!     .with_reporter(|fraction, stage| tracing::info!("{stage}: {:.0}%", fraction * 100.0))
//!     .with_cancellation(token.clone());
//!
//! for (index, line) in lines.iter().enumerate() {
//!     monitor.checkpoint(index as f64 / lines.len() as f64, "Parsing")?;
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::LoadError;

/// Minimum wall time between two progress reports
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// A progress callback receiving (fraction complete in [0, 1], stage label).
pub type ProgressCallback = Box<dyn FnMut(f64, &str) + Send>;

/// Shared flag used to request cancellation of a running load.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Throttled progress reporter with an optional cancellation token
pub struct ProgressMonitor {
    reporter: Option<ProgressCallback>,
    cancellation: Option<CancellationToken>,
    interval: Duration,
    last_checkpoint: Instant,
}

impl ProgressMonitor {
    /// Create a monitor with no reporter and no cancellation token
    pub fn new() -> Self {
        Self {
            reporter: None,
            cancellation: None,
            interval: DEFAULT_PROGRESS_INTERVAL,
            last_checkpoint: Instant::now(),
        }
    }

    /// Attach a progress reporter
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: FnMut(f64, &str) + Send + 'static,
    {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Attach a boxed progress reporter
    pub fn with_boxed_reporter(mut self, reporter: Option<ProgressCallback>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Change the minimum interval between reports
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Report progress and observe cancellation, at most once per interval.
    ///
    /// # Errors
    /// Returns [`LoadError::Cancelled`] once the token has been cancelled and
    /// the interval has elapsed.
    pub fn checkpoint(&mut self, fraction: f64, stage: &str) -> Result<(), LoadError> {
        if self.last_checkpoint.elapsed() < self.interval {
            return Ok(());
        }

        if let Some(reporter) = self.reporter.as_mut() {
            reporter(fraction.clamp(0.0, 1.0), stage);
        }
        self.ensure_not_cancelled()?;
        self.last_checkpoint = Instant::now();
        Ok(())
    }

    /// Check the cancellation token immediately, ignoring the interval
    pub fn ensure_not_cancelled(&self) -> Result<(), LoadError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                tracing::warn!("Cancellation observed, abandoning the current pass");
                Err(LoadError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProgressMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressMonitor")
            .field("has_reporter", &self.reporter.is_some())
            .field("cancellation", &self.cancellation)
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_checkpoint_reports_when_interval_elapsed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut monitor = ProgressMonitor::new()
            .with_interval(Duration::ZERO)
            .with_reporter(move |fraction, stage| {
                sink.lock().unwrap().push((fraction, stage.to_string()));
            });

        monitor.checkpoint(0.25, "Parsing").unwrap();
        monitor.checkpoint(1.5, "Parsing").unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (0.25, "Parsing".to_string()));
        assert_eq!(seen[1].0, 1.0);
    }

    #[test]
    fn test_checkpoint_is_throttled() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);
        let mut monitor = ProgressMonitor::new()
            .with_interval(Duration::from_secs(3600))
            .with_reporter(move |_, _| *sink.lock().unwrap() += 1);

        for _ in 0..100 {
            monitor.checkpoint(0.5, "Parsing").unwrap();
        }
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_checkpoint_observes_cancellation() {
        let token = CancellationToken::new();
        let mut monitor = ProgressMonitor::new()
            .with_interval(Duration::ZERO)
            .with_cancellation(token.clone());

        assert!(monitor.checkpoint(0.1, "Parsing").is_ok());
        token.cancel();
        let err = monitor.checkpoint(0.2, "Parsing").unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_ensure_not_cancelled_ignores_interval() {
        let token = CancellationToken::new();
        let mut monitor = ProgressMonitor::new()
            .with_interval(Duration::from_secs(3600))
            .with_cancellation(token.clone());

        assert!(monitor.ensure_not_cancelled().is_ok());
        token.cancel();
        // Throttled checkpoints still pass until the interval elapses
        assert!(monitor.checkpoint(0.5, "Parsing").is_ok());
        assert!(monitor.ensure_not_cancelled().unwrap_err().is_cancelled());
    }
}
