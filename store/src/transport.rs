//! Transport contracts between a client and an event store.
//!
//! Two narrow contracts cover everything the schema generator's callers
//! need: registering/fetching named schemas ([`SchemaTransport`]) and
//! appending/reading stream events ([`EventTransport`]). Calls are
//! synchronous and bounded by [`CallOptions`]; event reads are bounded only
//! by a [`CancellationToken`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use graveyard_schema_core::Schema;

use crate::error::{Result, StoreError};
use crate::event::{Event, ExpectedVersion};

/// Per-call settings for unary operations.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use graveyard_schema_store::CallOptions;
///
/// let options = CallOptions::default();
/// assert!(options.deadline.is_none());
///
/// let options = options.or_timeout(Some(Duration::from_secs(5)));
/// assert!(options.deadline.is_some());
/// assert!(options.check().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Instant after which the call fails with
    /// [`StoreError::DeadlineExceeded`].
    pub deadline: Option<Instant>,
}

impl CallOptions {
    /// Options with an absolute deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Options whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Fills in a deadline from `timeout` if none was set.
    pub fn or_timeout(self, timeout: Option<Duration>) -> Self {
        match (self.deadline, timeout) {
            (None, Some(timeout)) => Self::with_timeout(timeout),
            _ => self,
        }
    }

    /// Returns `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fails if the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DeadlineExceeded`] after the deadline.
    pub fn check(&self) -> Result<()> {
        if self.is_expired() {
            return Err(StoreError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// Caller-owned signal that stops an [`EventStream`].
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every stream holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lazily produced events of one stream.
///
/// Yields `Err(StoreError::Cancelled)` once after the token is cancelled and
/// then ends.
///
/// # Examples
///
/// ```
/// use graveyard_schema_store::{CancellationToken, Event, EventStream, StoreError};
///
/// let token = CancellationToken::new();
/// let events = vec![Event::new("A", vec![]), Event::new("B", vec![])];
/// let mut stream = EventStream::new(events.into_iter().map(Ok), token.clone());
///
/// assert_eq!(stream.next().unwrap().unwrap().event_type, "A");
/// token.cancel();
/// assert!(matches!(stream.next(), Some(Err(StoreError::Cancelled))));
/// assert!(stream.next().is_none());
/// ```
pub struct EventStream {
    inner: Box<dyn Iterator<Item = Result<Event>> + Send>,
    cancel: CancellationToken,
    finished: bool,
}

impl EventStream {
    /// Wraps an event source with cancellation.
    pub fn new<I>(events: I, cancel: CancellationToken) -> Self
    where
        I: Iterator<Item = Result<Event>> + Send + 'static,
    {
        Self {
            inner: Box::new(events),
            cancel,
            finished: false,
        }
    }
}

impl Iterator for EventStream {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.finished = true;
            return Some(Err(StoreError::Cancelled));
        }
        let item = self.inner.next();
        if matches!(item, None | Some(Err(_))) {
            self.finished = true;
        }
        item
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Registration and lookup of named schemas.
pub trait SchemaTransport: Send + Sync {
    /// Registers or replaces a schema. Idempotent.
    fn upsert_schema(&self, schema: &Schema, options: CallOptions) -> Result<bool>;

    /// Fetches a schema by name; a missing schema is
    /// [`StoreError::SchemaNotFound`].
    fn get_schema(&self, name: &str, options: CallOptions) -> Result<Schema>;
}

/// Appending to and reading from event streams.
pub trait EventTransport: Send + Sync {
    /// Appends `events` in order. Returns `false` if `expected_version` does
    /// not match the stream's current version.
    fn append_events(
        &self,
        stream_id: &str,
        events: &[Event],
        expected_version: ExpectedVersion,
        options: CallOptions,
    ) -> Result<bool>;

    /// Opens a lazy read of a stream, stopped by `cancel`.
    fn get_events(&self, stream_id: &str, cancel: CancellationToken) -> Result<EventStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_timeout_keeps_explicit_deadline() {
        let deadline = Instant::now() + Duration::from_secs(60);
        let options = CallOptions::with_deadline(deadline).or_timeout(Some(Duration::from_millis(1)));
        assert_eq!(options.deadline, Some(deadline));
    }

    #[test]
    fn test_or_timeout_without_default_leaves_unbounded() {
        let options = CallOptions::default().or_timeout(None);
        assert!(options.deadline.is_none());
        assert!(!options.is_expired());
    }

    #[test]
    fn test_expired_deadline_fails_check() {
        let past = Instant::now()
            .checked_sub(Duration::from_millis(10))
            .unwrap_or_else(Instant::now);
        let options = CallOptions::with_deadline(past);
        assert!(matches!(options.check(), Err(StoreError::DeadlineExceeded)));
    }

    #[test]
    fn test_stream_ends_after_error() {
        let items: Vec<Result<Event>> = vec![
            Ok(Event::new("A", vec![])),
            Err(StoreError::Internal("boom".into())),
            Ok(Event::new("B", vec![])),
        ];
        let mut stream = EventStream::new(items.into_iter(), CancellationToken::new());

        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(stream.next(), Some(Err(StoreError::Internal(_)))));
        assert!(stream.next().is_none());
    }
}
