//! In-memory document store
//!
//! Collections are vectors kept in insertion order behind an async
//! `RwLock`. Writers hold the lock for the whole operation, which gives
//! per-operation atomicity. Updates are computed on copies and committed
//! only when every matched document accepted the update.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::filter::{values_equal, Filter};
use super::pipeline::Pipeline;
use super::update::Update;
use super::{
    Document, DocumentStore, Projection, StoreFuture, UpdateSummary, ID_FIELD, VERSION_FIELD,
};

/// Document store held entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

/// Apply an update to a copy of the document, bumping `__v` on change.
fn updated_copy(document: &Document, update: &Update) -> StoreResult<Option<Document>> {
    let mut copy = document.clone();
    if !update.apply(&mut copy)? {
        return Ok(None);
    }
    if let Some(obj) = copy.as_object_mut() {
        let version = obj.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0);
        obj.insert(VERSION_FIELD.to_string(), Value::from(version + 1));
    }
    Ok(Some(copy))
}

impl DocumentStore for InMemoryStore {
    fn find<'a>(&'a self, collection: &'a str, filter: &'a Filter) -> StoreFuture<'a, Vec<Document>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            Ok(collections
                .get(collection)
                .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
                .unwrap_or_default())
        })
    }

    fn find_one<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
        projection: &'a Projection,
    ) -> StoreFuture<'a, Option<Document>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            Ok(collections
                .get(collection)
                .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
                .map(|doc| projection.apply(doc.clone())))
        })
    }

    fn insert_one<'a>(&'a self, collection: &'a str, document: Document) -> StoreFuture<'a, Document> {
        Box::pin(async move {
            let mut document = document;
            let obj = document
                .as_object_mut()
                .ok_or_else(|| StoreError::InvalidDocument("document is not an object".into()))?;

            let id = match obj.get(ID_FIELD) {
                Some(id) if !id.is_null() => id.clone(),
                _ => {
                    let id = Value::String(Uuid::new_v4().to_string());
                    obj.insert(ID_FIELD.to_string(), id.clone());
                    id
                }
            };
            obj.insert(VERSION_FIELD.to_string(), Value::from(0u64));

            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();
            let duplicate = docs
                .iter()
                .any(|d| d.get(ID_FIELD).is_some_and(|existing| values_equal(existing, &id)));
            if duplicate {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    id: id.as_str().map_or_else(|| id.to_string(), str::to_string),
                });
            }

            docs.push(document.clone());
            Ok(document)
        })
    }

    fn find_one_and_update<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
        update: &'a Update,
    ) -> StoreFuture<'a, Option<Document>> {
        Box::pin(async move {
            let mut collections = self.collections.write().await;
            let Some(docs) = collections.get_mut(collection) else {
                return Ok(None);
            };
            let Some(slot) = docs.iter_mut().find(|d| filter.matches(d)) else {
                return Ok(None);
            };

            if let Some(updated) = updated_copy(slot, update)? {
                *slot = updated;
            }
            Ok(Some(slot.clone()))
        })
    }

    fn update_many<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
        update: &'a Update,
    ) -> StoreFuture<'a, UpdateSummary> {
        Box::pin(async move {
            let mut collections = self.collections.write().await;
            let Some(docs) = collections.get_mut(collection) else {
                return Ok(UpdateSummary::default());
            };

            let mut summary = UpdateSummary::default();
            let mut staged = Vec::new();
            for (idx, doc) in docs.iter().enumerate() {
                if !filter.matches(doc) {
                    continue;
                }
                summary.matched += 1;
                if let Some(updated) = updated_copy(doc, update)? {
                    staged.push((idx, updated));
                }
            }

            summary.modified = staged.len() as u64;
            for (idx, updated) in staged {
                docs[idx] = updated;
            }
            Ok(summary)
        })
    }

    fn find_one_and_remove<'a>(
        &'a self,
        collection: &'a str,
        filter: &'a Filter,
    ) -> StoreFuture<'a, Option<Document>> {
        Box::pin(async move {
            let mut collections = self.collections.write().await;
            let Some(docs) = collections.get_mut(collection) else {
                return Ok(None);
            };
            let position = docs.iter().position(|d| filter.matches(d));
            Ok(position.map(|idx| docs.remove(idx)))
        })
    }

    fn aggregate<'a>(&'a self, collection: &'a str, pipeline: &'a Pipeline) -> StoreFuture<'a, Vec<Document>> {
        Box::pin(async move {
            let rows = {
                let collections = self.collections.read().await;
                collections.get(collection).cloned().unwrap_or_default()
            };
            Ok(pipeline.execute(rows))
        })
    }
}
