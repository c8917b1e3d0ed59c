//! # Document Store
//!
//! The storage seam of the roster service. The service only talks to a
//! [`DocumentStore`]; the bundled [`InMemoryStore`] implements it for the
//! server binary and tests, and fakes can implement it to inject failures.
//!
//! Documents are JSON objects keyed by `_id`. Every stored document carries a
//! store-managed `__v` version counter.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

pub mod errors;
pub mod filter;
pub mod memory;
pub mod pipeline;
pub mod update;

pub use errors::{StoreError, StoreResult};
pub use filter::{Filter, FilterOp, Predicate};
pub use memory::InMemoryStore;
pub use pipeline::{Accumulator, Pipeline, Stage};
pub use update::{PullCondition, Update};

/// Primary key field
pub const ID_FIELD: &str = "_id";

/// Store-managed version counter field
pub const VERSION_FIELD: &str = "__v";

/// A stored document (always a JSON object)
pub type Document = Value;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Fields to drop from a returned document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Projection {
    /// Return documents unchanged
    pub fn full() -> Self {
        Self::default()
    }

    /// Drop the given top-level field
    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.excluded.push(field.into());
        self
    }

    pub fn apply(&self, mut document: Document) -> Document {
        if let Some(obj) = document.as_object_mut() {
            for field in &self.excluded {
                obj.remove(field);
            }
        }
        document
    }
}

/// Outcome of a multi-document update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Documents accepted by the filter
    pub matched: u64,
    /// Documents the update actually changed
    pub modified: u64,
}

/// Document store operations used by the roster service.
///
/// Each operation is atomic per document. Nothing spans documents or
/// collections, so multi-step sequences built on top are not isolated.
pub trait DocumentStore: Send + Sync {
    /// All documents matching the filter, in insertion order
    fn find<'a>(&'a self, collection: &'a str, filter: &'a Filter) -> StoreFuture<'a, Vec<Document>>;

    /// First document matching the filter
    fn find_one<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
        projection: &'a Projection,
    ) -> StoreFuture<'a, Option<Document>>;

    /// Insert a document, assigning `_id` if absent and `__v = 0`.
    /// Returns the stored document.
    fn insert_one<'a>(&'a self, collection: &'a str, document: Document) -> StoreFuture<'a, Document>;

    /// Update the first matching document and return it after the update
    fn find_one_and_update<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
        update: &'a Update,
    ) -> StoreFuture<'a, Option<Document>>;

    /// Update every matching document
    fn update_many<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateSummary>;

    /// Remove the first matching document and return it
    fn find_one_and_remove<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> StoreFuture<'a, Option<Document>>;

    /// Run an aggregation pipeline over a collection
    fn aggregate<'a>(&'a self, collection: &'a str, pipeline: &'a Pipeline) -> StoreFuture<'a, Vec<Document>>;
}
