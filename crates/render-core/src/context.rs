//! Deadlines and cooperative cancellation for a single render.

use crate::error::RenderError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A shared, one-way switch. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a renderer needs to know about the request it is serving.
#[derive(Debug, Clone)]
pub struct RenderContext {
    started: Instant,
    timeout: Option<Duration>,
    cancel: CancellationFlag,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// No deadline, never cancelled unless a flag is attached.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            timeout: None,
            cancel: CancellationFlag::new(),
        }
    }

    /// The clock starts now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::new()
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|t| self.started + t)
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails if the render has been cancelled or has run past its deadline.
    /// Cancellation wins when both apply.
    pub fn checkpoint(&self) -> Result<(), RenderError> {
        if self.cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        match (self.timeout, self.deadline()) {
            (Some(timeout), Some(deadline)) if Instant::now() >= deadline => {
                Err(RenderError::Timeout(timeout))
            }
            _ => Ok(()),
        }
    }
}
