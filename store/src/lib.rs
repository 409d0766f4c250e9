//! Client side of schema registration and event appends.
//!
//! This crate connects the generated schemas of `graveyard-schema-core` to an
//! event store:
//!
//! - [`ClientConfig`]: address, default timeout and TLS settings, loadable
//!   from YAML.
//! - [`SchemaTransport`] and [`EventTransport`]: the contracts a store
//!   backend implements.
//! - [`Client`]: applies the timeout policy and close semantics on top of a
//!   transport.
//! - [`InMemoryStore`]: a reference backend, seedable from schema files.
//!
//! # Example
//!
//! ```
//! use graveyard_schema_core::record;
//! use graveyard_schema_store::*;
//!
//! record! {
//!     pub struct OrderPlaced {
//!         pub id: u64,
//!         pub total: f64,
//!     }
//! }
//!
//! let client = Client::new(InMemoryStore::new(), ClientConfig::default()).unwrap();
//! client.register::<OrderPlaced>(CallOptions::default()).unwrap();
//!
//! let event = Event::new("OrderPlaced", br#"{"id":1,"total":9.5}"#.to_vec());
//! let appended = client
//!     .append_events("orders-1", &[event], ExpectedVersion::exact(-1), CallOptions::default())
//!     .unwrap();
//! assert!(appended);
//!
//! let read: Vec<_> = client
//!     .get_events("orders-1", CancellationToken::new())
//!     .unwrap()
//!     .collect::<Result<_>>()
//!     .unwrap();
//! assert_eq!(read.len(), 1);
//! ```

mod client;
mod config;
mod error;
mod event;
pub mod loader;
mod memory;
mod transport;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_ADDRESS, DEFAULT_TIMEOUT_MS};
pub use error::{Result, StoreError};
pub use event::{Event, ExpectedVersion};
pub use memory::InMemoryStore;
pub use transport::{CallOptions, CancellationToken, EventStream, EventTransport, SchemaTransport};
