//! Progress reporting and cooperative cancellation for long constructions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{FsaError, Result};

/// A flag the caller can raise to stop a running algorithm.
///
/// Algorithms check the flag once per processed state and return
/// [`FsaError::Cancelled`] when it is set. Clones share the flag, so one can be
/// handed to a signal handler or another thread.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    /// A new, lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    /// True once cancellation was requested.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` if the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_aborted() {
            Err(FsaError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Rate-limited progress messages.
///
/// The first message is only emitted after an initial delay so that short
/// runs stay quiet; after that at most one message per interval goes out
/// through `log::debug!`.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    interval: Duration,
    next: Instant,
}

impl StatusReporter {
    /// A reporter emitting at most once per `interval`, first after twice that.
    pub fn new(interval: Duration) -> Self {
        StatusReporter {
            interval,
            next: Instant::now() + interval * 2,
        }
    }

    /// Restart the initial delay, e.g. at the start of a new phase.
    pub fn restart(&mut self) {
        self.next = Instant::now() + self.interval * 2;
    }

    /// True if a message is due now.
    pub fn should_report(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.next {
            self.next = now + self.interval;
            true
        } else {
            false
        }
    }

    /// Emit the message built by `message` if one is due.
    pub fn report<F: FnOnce() -> String>(&mut self, message: F) {
        if self.should_report() {
            log::debug!("{}", message());
        }
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
