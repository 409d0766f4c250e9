//! Client wrapper over a store transport.
//!
//! [`Client`] owns a transport and its [`ClientConfig`]. Unary calls get the
//! configured default timeout unless the caller supplied a deadline; event
//! reads never do. After [`Client::close`] every call fails with
//! [`StoreError::Closed`].

use std::sync::atomic::{AtomicBool, Ordering};

use graveyard_schema_core::{Describe, Schema, generate};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{Result, StoreError};
use crate::event::{Event, ExpectedVersion};
use crate::transport::{CallOptions, CancellationToken, EventStream, EventTransport, SchemaTransport};

/// A store client.
///
/// # Examples
///
/// ```
/// use graveyard_schema_core::record;
/// use graveyard_schema_store::{CallOptions, Client, ClientConfig, InMemoryStore};
///
/// record! {
///     pub struct Greeting {
///         pub text: String => "text",
///     }
/// }
///
/// let client = Client::new(InMemoryStore::new(), ClientConfig::default()).unwrap();
/// let schema = client.register::<Greeting>(CallOptions::default()).unwrap();
/// assert_eq!(schema.name, "Greeting");
///
/// client.close();
/// assert!(client.get_schema("Greeting", CallOptions::default()).is_err());
/// ```
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    config: ClientConfig,
    closed: AtomicBool,
}

impl<T> Client<T> {
    /// Creates a client over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `config` does not validate.
    pub fn new(transport: T, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        debug!(endpoint = %config.endpoint(), "client created");
        Ok(Self {
            transport,
            config,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Closes the client. Idempotent.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!(endpoint = %self.config.endpoint(), "client closed");
        }
    }

    /// Returns `true` once [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn unary(&self, options: CallOptions) -> Result<CallOptions> {
        self.ensure_open()?;
        Ok(options.or_timeout(self.config.timeout()))
    }
}

impl<T: SchemaTransport> Client<T> {
    /// Registers or replaces a schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] after [`close`](Self::close), otherwise
    /// whatever the transport reports.
    pub fn upsert_schema(&self, schema: &Schema, options: CallOptions) -> Result<bool> {
        let options = self.unary(options)?;
        self.transport.upsert_schema(schema, options)
    }

    /// Fetches a schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] after [`close`](Self::close), otherwise
    /// whatever the transport reports.
    pub fn get_schema(&self, name: &str, options: CallOptions) -> Result<Schema> {
        let options = self.unary(options)?;
        self.transport.get_schema(name, options)
    }

    /// Generates the schema for `R` and registers it.
    ///
    /// Nothing is sent if generation fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Generate`] if `R` cannot be described as a
    /// schema, [`StoreError::Closed`] after [`close`](Self::close), or the
    /// transport's error.
    pub fn register<R: Describe>(&self, options: CallOptions) -> Result<Schema> {
        self.ensure_open()?;
        let schema = generate::<R>()?;
        self.upsert_schema(&schema, options)?;
        info!(schema = %schema.name, "schema registered");
        Ok(schema)
    }
}

impl<T: EventTransport> Client<T> {
    /// Appends events to a stream.
    ///
    /// Returns `false` if `expected_version` did not match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] after [`close`](Self::close), otherwise
    /// whatever the transport reports.
    pub fn append_events(
        &self,
        stream_id: &str,
        events: &[Event],
        expected_version: ExpectedVersion,
        options: CallOptions,
    ) -> Result<bool> {
        let options = self.unary(options)?;
        self.transport
            .append_events(stream_id, events, expected_version, options)
    }

    /// Opens a lazy read of a stream. No default timeout applies; the read
    /// runs until exhausted or `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] after [`close`](Self::close), otherwise
    /// whatever the transport reports.
    pub fn get_events(&self, stream_id: &str, cancel: CancellationToken) -> Result<EventStream> {
        self.ensure_open()?;
        self.transport.get_events(stream_id, cancel)
    }
}
