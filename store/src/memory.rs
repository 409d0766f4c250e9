//! In-process reference store.
//!
//! [`InMemoryStore`] implements both transport contracts with the same
//! semantics as the remote store: schemas are validated on upsert, a missing
//! schema is a defined error, and appends honor the optimistic-concurrency
//! token. Useful for tests and local tooling.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use graveyard_schema_core::{Schema, validate_schema};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::event::{Event, ExpectedVersion};
use crate::loader;
use crate::transport::{CallOptions, CancellationToken, EventStream, EventTransport, SchemaTransport};

type Streams = Arc<RwLock<HashMap<String, Vec<Event>>>>;

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Internal("lock poisoned".to_string())
}

/// Schemas and event streams held in memory.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::Schema;
/// use graveyard_schema_store::{
///     CallOptions, Event, EventTransport, ExpectedVersion, InMemoryStore, SchemaTransport,
/// };
///
/// let store = InMemoryStore::new();
/// store.upsert_schema(&Schema::new("Ping"), CallOptions::default()).unwrap();
/// assert_eq!(store.get_schema("Ping", CallOptions::default()).unwrap().name, "Ping");
///
/// let events = [Event::new("Ping", b"{}".to_vec())];
/// assert!(store
///     .append_events("pings", &events, ExpectedVersion::ANY, CallOptions::default())
///     .unwrap());
/// assert_eq!(store.stream_version("pings").unwrap(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    schemas: RwLock<HashMap<String, Schema>>,
    streams: Streams,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the schemas of a bundle file.
    ///
    /// # Errors
    ///
    /// Returns load errors, or [`StoreError::InvalidSchema`] if a schema in
    /// the bundle is structurally invalid.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let bundle = loader::load_bundle(path)?;
        Self::seeded(bundle.schemas)
    }

    /// Creates a store seeded with every schema in a directory.
    ///
    /// # Errors
    ///
    /// Returns load errors, or [`StoreError::InvalidSchema`] if a schema is
    /// structurally invalid.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let schemas = loader::load_dir(path)?;
        Self::seeded(schemas)
    }

    fn seeded(schemas: Vec<Schema>) -> Result<Self> {
        let store = Self::new();
        for schema in &schemas {
            store.upsert_schema(schema, CallOptions::default())?;
        }
        Ok(store)
    }

    /// Returns the names of all registered schemas, sorted.
    pub fn schema_names(&self) -> Result<Vec<String>> {
        let schemas = self.schemas.read().map_err(poisoned)?;
        let mut names: Vec<String> = schemas.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Returns the current version of a stream: the index of its last event,
    /// or `-1` if the stream is empty or unknown.
    pub fn stream_version(&self, stream_id: &str) -> Result<i64> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(version_of(streams.get(stream_id)))
    }
}

fn version_of(events: Option<&Vec<Event>>) -> i64 {
    events.map_or(-1, |events| {
        i64::try_from(events.len()).unwrap_or(i64::MAX) - 1
    })
}

impl SchemaTransport for InMemoryStore {
    fn upsert_schema(&self, schema: &Schema, options: CallOptions) -> Result<bool> {
        options.check()?;

        let errors = validate_schema(schema);
        if !errors.is_empty() {
            let reason = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::InvalidSchema {
                name: schema.name.clone(),
                reason,
            });
        }

        let mut schemas = self.schemas.write().map_err(poisoned)?;
        let replaced = schemas.insert(schema.name.clone(), schema.clone()).is_some();
        info!(schema = %schema.name, fields = schema.len(), replaced, "schema upserted");
        Ok(true)
    }

    fn get_schema(&self, name: &str, options: CallOptions) -> Result<Schema> {
        options.check()?;

        let schemas = self.schemas.read().map_err(poisoned)?;
        schemas
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::SchemaNotFound(name.to_string()))
    }
}

impl EventTransport for InMemoryStore {
    fn append_events(
        &self,
        stream_id: &str,
        events: &[Event],
        expected_version: ExpectedVersion,
        options: CallOptions,
    ) -> Result<bool> {
        options.check()?;

        let mut streams = self.streams.write().map_err(poisoned)?;
        let current = version_of(streams.get(stream_id));
        if !expected_version.matches(current) {
            warn!(
                stream = stream_id,
                expected = expected_version.value(),
                current,
                "concurrency conflict"
            );
            return Ok(false);
        }

        streams
            .entry(stream_id.to_string())
            .or_default()
            .extend(events.iter().cloned());
        debug!(stream = stream_id, appended = events.len(), "events appended");
        Ok(true)
    }

    fn get_events(&self, stream_id: &str, cancel: CancellationToken) -> Result<EventStream> {
        let cursor = StreamCursor {
            streams: Arc::clone(&self.streams),
            stream_id: stream_id.to_string(),
            next: 0,
        };
        Ok(EventStream::new(cursor, cancel))
    }
}

/// Reads a stream one event at a time, so events appended after the read
/// was opened are still delivered.
struct StreamCursor {
    streams: Streams,
    stream_id: String,
    next: usize,
}

impl Iterator for StreamCursor {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let streams = match self.streams.read() {
            Ok(streams) => streams,
            Err(err) => return Some(Err(poisoned(err))),
        };
        let event = streams.get(&self.stream_id)?.get(self.next)?.clone();
        self.next += 1;
        Some(Ok(event))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use graveyard_schema_core::{Field, FieldType, PrimitiveType};

    use super::*;

    fn events(n: usize) -> Vec<Event> {
        (0..n).map(|i| Event::new("Tick", vec![i as u8])).collect()
    }

    fn expired() -> CallOptions {
        let past = Instant::now()
            .checked_sub(Duration::from_millis(5))
            .unwrap_or_else(Instant::now);
        CallOptions::with_deadline(past)
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = InMemoryStore::new();
        let schema = Schema::new("Tick").with_field(
            "n",
            Field::new(FieldType::Primitive(PrimitiveType::Number)),
        );

        assert!(store.upsert_schema(&schema, CallOptions::default()).unwrap());
        assert!(store.upsert_schema(&schema, CallOptions::default()).unwrap());
        assert_eq!(store.schema_names().unwrap(), vec!["Tick"]);
        assert_eq!(store.get_schema("Tick", CallOptions::default()).unwrap(), schema);
    }

    #[test]
    fn test_get_missing_schema_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_schema("Nope", CallOptions::default()),
            Err(StoreError::SchemaNotFound(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_upsert_rejects_invalid_schema() {
        let store = InMemoryStore::new();
        let err = store
            .upsert_schema(&Schema::new(""), CallOptions::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidSchema { .. }));
        assert!(store.schema_names().unwrap().is_empty());
    }

    #[test]
    fn test_expected_version_enforced() {
        let store = InMemoryStore::new();
        let opts = CallOptions::default();

        assert_eq!(store.stream_version("s").unwrap(), -1);
        assert!(!store
            .append_events("s", &events(1), ExpectedVersion::exact(0), opts)
            .unwrap());
        assert!(store
            .append_events("s", &events(2), ExpectedVersion::ANY, opts)
            .unwrap());
        assert_eq!(store.stream_version("s").unwrap(), 1);

        assert!(!store
            .append_events("s", &events(1), ExpectedVersion::exact(0), opts)
            .unwrap());
        assert!(store
            .append_events("s", &events(1), ExpectedVersion::exact(1), opts)
            .unwrap());
        assert_eq!(store.stream_version("s").unwrap(), 2);
    }

    #[test]
    fn test_expired_deadline_rejects_unary_calls() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.upsert_schema(&Schema::new("A"), expired()),
            Err(StoreError::DeadlineExceeded)
        ));
        assert!(matches!(
            store.get_schema("A", expired()),
            Err(StoreError::DeadlineExceeded)
        ));
        assert!(matches!(
            store.append_events("s", &events(1), ExpectedVersion::ANY, expired()),
            Err(StoreError::DeadlineExceeded)
        ));
        assert_eq!(store.stream_version("s").unwrap(), -1);
    }

    #[test]
    fn test_stream_is_lazy() {
        let store = InMemoryStore::new();
        let opts = CallOptions::default();
        store
            .append_events("s", &events(1), ExpectedVersion::ANY, opts)
            .unwrap();

        let mut stream = store.get_events("s", CancellationToken::new()).unwrap();
        assert_eq!(stream.next().unwrap().unwrap().payload, vec![0]);

        store
            .append_events("s", &events(2), ExpectedVersion::ANY, opts)
            .unwrap();
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_unknown_stream_reads_empty() {
        let store = InMemoryStore::new();
        let mut stream = store.get_events("ghost", CancellationToken::new()).unwrap();
        assert!(stream.next().is_none());
    }
}
