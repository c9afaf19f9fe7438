//! # Storage Layer
//!
//! Rollbook never owns the authoritative copy of a record. The system of record
//! is a document store holding four collections (see [`Collection`]), reached
//! through the [`DataStore`] trait.
//!
//! ## Contract
//!
//! - Records are flat key-value documents ([`Document`]).
//! - `create` assigns the identity and returns it; the payload must not carry one.
//! - `update` merges the given keys into the existing document. Keys not present
//!   in the patch are left alone.
//! - `update` and `delete` on a missing id fail with [`RollbookError::NotFound`].
//!   Nothing is retried.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: one JSON file per collection inside the data directory.
//! - [`memory::InMemoryStore`]: no persistence, with failure injection for tests.
//!
//! [`live::LiveStore`] sits on top of either and turns it into a push-based feed:
//! subscribers receive the full collection on subscribe and after every change.
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <data dir>/
//! ├── students.json     # [ { "id": "<uuid>", ...document... }, ... ]
//! ├── attendance.json
//! ├── bookings.json
//! ├── invoices.json
//! └── config.json
//! ```
//!
//! [`RollbookError::NotFound`]: crate::error::RollbookError::NotFound

use crate::error::Result;
use crate::model::{Collection, Document};
use uuid::Uuid;

pub mod fs;
pub mod live;
pub mod memory;

/// Abstract interface for the document store.
pub trait DataStore {
    /// Every document in the collection, each including its `id` key.
    fn snapshot(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Insert a new document and return the id assigned to it.
    fn create(&mut self, collection: Collection, doc: Document) -> Result<Uuid>;

    /// Merge `patch` into the document with the given id.
    fn update(&mut self, collection: Collection, id: &Uuid, patch: Document) -> Result<()>;

    /// Remove a document permanently.
    fn delete(&mut self, collection: Collection, id: &Uuid) -> Result<()>;
}

/// Shapes a stored document for callers: the id travels inside it.
pub(crate) fn with_id(id: &Uuid, mut doc: Document) -> Document {
    doc.insert("id".to_string(), serde_json::Value::String(id.to_string()));
    doc
}

/// Drops any caller-supplied identity before the store assigns or keeps its own.
pub(crate) fn strip_id(mut doc: Document) -> Document {
    doc.remove("id");
    doc
}
