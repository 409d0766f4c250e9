//! Events and optimistic-concurrency tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A single event appended to a stream.
///
/// The payload is opaque bytes; the store validates it against the schema
/// registered for the event type.
///
/// # Examples
///
/// ```
/// use graveyard_schema_store::Event;
///
/// let event = Event::new("OrderPlaced", br#"{"id":7}"#.to_vec());
/// assert_eq!(event.event_type, "OrderPlaced");
/// assert!(event.timestamp > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// Event type name, usually the name of the payload's schema.
    pub event_type: String,
    /// Serialized payload.
    pub payload: Vec<u8>,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Event {
    /// Creates an event with a fresh id and the current time.
    pub fn new(event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            payload,
            timestamp: u64::try_from(millis).unwrap_or_default(),
        }
    }

    /// Creates an event whose payload is `value` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::StoreError::JsonError) if `value` cannot
    /// be serialized.
    pub fn json<T: Serialize>(event_type: impl Into<String>, value: &T) -> Result<Self> {
        let payload = serde_json::to_vec(value)?;
        Ok(Self::new(event_type, payload))
    }
}

/// Optimistic-concurrency token supplied on append.
///
/// [`ExpectedVersion::ANY`] (`-1`) disables the check. Any other value must
/// equal the stream's current version: the index of its last event, or `-1`
/// for an empty stream.
///
/// # Examples
///
/// ```
/// use graveyard_schema_store::ExpectedVersion;
///
/// assert!(ExpectedVersion::ANY.matches(41));
/// assert!(ExpectedVersion::exact(3).matches(3));
/// assert!(!ExpectedVersion::exact(3).matches(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedVersion(i64);

impl ExpectedVersion {
    /// Appends regardless of the stream's version.
    pub const ANY: Self = Self(-1);

    /// Requires the stream to be at exactly `version`.
    pub const fn exact(version: i64) -> Self {
        Self(version)
    }

    /// Returns the raw token value.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` if the check is disabled.
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    /// Returns `true` if an append is allowed at `current` version.
    pub const fn matches(self, current: i64) -> bool {
        self.is_any() || self.0 == current
    }
}

impl Default for ExpectedVersion {
    fn default() -> Self {
        Self::ANY
    }
}

impl From<i64> for ExpectedVersion {
    fn from(version: i64) -> Self {
        Self(version)
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
