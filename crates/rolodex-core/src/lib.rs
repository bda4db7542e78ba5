//! # Rolodex Core
//!
//! Core types and storage for the Rolodex contact manager.
//!
//! This crate provides the domain layer used by the HTTP surface:
//!
//! - [`Contact`] - A contact record and its field validation
//! - [`ContactStore`] - The storage abstraction handlers depend on
//! - [`MemoryStore`] - Concurrent in-memory store with case-insensitive email uniqueness
//! - [`ContactError`] - Closed set of failures a store operation can produce
//! - [`RequestId`] - UUID v7 request identifier
//!
//! ## Example
//!
//! ```
//! use rolodex_core::{Contact, ContactStore, MemoryStore};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! let created = store
//!     .create(Contact::new("Ada", "Lovelace", "ada@example.com", ""))
//!     .await
//!     .unwrap();
//! assert_eq!(created.id, "1");
//! assert_eq!(store.count().await, 1);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/rolodex-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod contact;
mod context;
mod error;
mod memory;
pub mod seed;
mod store;

pub use contact::{Contact, FieldErrors};
pub use context::RequestId;
pub use error::{ContactError, ContactResult};
pub use memory::MemoryStore;
pub use store::ContactStore;
