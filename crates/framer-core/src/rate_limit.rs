//! Leading + trailing edge rate limiter for high-frequency input channels.
//!
//! The first value submitted after a quiet period fires immediately (leading
//! edge). Values submitted inside the interval are coalesced: only the latest
//! one is kept and it fires once the interval has elapsed (trailing edge),
//! which the owner observes by calling [`RateLimiter::poll`] from its render
//! tick.
//!
//! Time is injected as milliseconds on a monotonic clock chosen by the host,
//! so the limiter has no dependency on a timer API and is trivially testable.

/// Coalesces values of type `T` to at most one per `interval_ms`.
#[derive(Debug, Clone)]
pub struct RateLimiter<T> {
    interval_ms: f64,
    last_fire_ms: Option<f64>,
    pending: Option<T>,
}

impl<T> RateLimiter<T> {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_fire_ms: None,
            pending: None,
        }
    }

    /// Offer a value at time `now_ms`.
    ///
    /// Returns the value if it should be applied right away. Otherwise it is
    /// held (replacing any older held value) until [`poll`](Self::poll) releases it.
    pub fn submit(&mut self, now_ms: f64, value: T) -> Option<T> {
        if self.ready(now_ms) {
            self.last_fire_ms = Some(now_ms);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Release the held trailing value if the interval has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        if self.pending.is_some() && self.ready(now_ms) {
            self.last_fire_ms = Some(now_ms);
            self.pending.take()
        } else {
            None
        }
    }

    /// Drop any held value without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    fn ready(&self, now_ms: f64) -> bool {
        match self.last_fire_ms {
            None => true,
            // A clock that went backwards counts as elapsed
            Some(last) => now_ms - last >= self.interval_ms || now_ms < last,
        }
    }
}
