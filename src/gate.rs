//! Bounded admission for outbound fetches.
//!
//! [`AdmissionGate`] is a counting semaphore that caps how many upstream
//! fetches may be in flight at once, independent of how many inbound
//! requests the server is handling. Callers that find no free permit wait
//! in FIFO order; a released permit is handed straight to the oldest
//! waiter rather than returned to the pool.
//!
//! Permits are RAII guards: dropping a [`Permit`] releases it exactly once,
//! on every exit path, including cancellation of the holding task.
//!
//! The wait queue is unbounded and waits have no deadline unless
//! [`GateLimits`] says otherwise.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Optional bounds on the wait phase. Both default to unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateLimits {
    /// Reject new waiters once this many callers are already queued.
    pub max_waiting: Option<usize>,
    /// Give up on a queued acquire after this long.
    pub acquire_timeout: Option<Duration>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    #[error("wait queue is full ({0} callers already waiting)")]
    QueueFull(usize),

    #[error("no permit became available within {0:?}")]
    Timeout(Duration),

    /// Returned if the semaphore is closed. The gate owns it privately and
    /// never closes it.
    #[error("admission gate is closed")]
    Closed,
}

#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    waiting: Arc<AtomicUsize>,
    limits: GateLimits,
}

/// Authorization for one in-flight fetch. Released on drop.
#[derive(Debug)]
#[must_use = "dropping the permit releases it immediately"]
pub struct Permit {
    _inner: OwnedSemaphorePermit,
}

/// Keeps the waiter count accurate when a queued acquire is dropped.
struct WaitingGuard(Arc<AtomicUsize>);

impl Drop for WaitingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl AdmissionGate {
    /// A gate with `capacity` permits and no wait limits. The capacity is
    /// clamped to `1..=Semaphore::MAX_PERMITS`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_limits(capacity, GateLimits::default())
    }

    #[must_use]
    pub fn with_limits(capacity: usize, limits: GateLimits) -> Self {
        let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            waiting: Arc::new(AtomicUsize::new(0)),
            limits,
        }
    }

    /// Take a permit, waiting in FIFO order if none is free.
    ///
    /// Never fails when no [`GateLimits`] are configured.
    pub async fn acquire(&self) -> Result<Permit, GateError> {
        match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(inner) => return Ok(Permit { _inner: inner }),
            Err(TryAcquireError::Closed) => return Err(GateError::Closed),
            Err(TryAcquireError::NoPermits) => {}
        }

        let already_waiting = self.waiting.fetch_add(1, Ordering::AcqRel);
        let _guard = WaitingGuard(Arc::clone(&self.waiting));
        if let Some(max) = self.limits.max_waiting {
            if already_waiting >= max {
                return Err(GateError::QueueFull(already_waiting));
            }
        }

        let acquire = Arc::clone(&self.semaphore).acquire_owned();
        let inner = match self.limits.acquire_timeout {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .map_err(|_| GateError::Timeout(limit))?,
            None => acquire.await,
        }
        .map_err(|_| GateError::Closed)?;

        Ok(Permit { _inner: inner })
    }

    /// Take a permit only if one is free right now and nobody is queued.
    #[must_use]
    pub fn try_acquire(&self) -> Option<Permit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|inner| Permit { _inner: inner })
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Callers currently queued in [`acquire`](Self::acquire).
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }
}
