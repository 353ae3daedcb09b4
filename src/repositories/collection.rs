use async_trait::async_trait;
use bson::Document;
use futures_util::TryStreamExt;
use mongodb::{
    options::{FindOptions, UpdateOptions},
    Collection,
};
use std::sync::Arc;
use tracing::debug;

use crate::models::{
    DeleteOutcome, InsertOutcome, PageWindow, RepositoryError, RepositoryResult, UpdateOutcome,
};
use crate::observability::{DatabaseTracingMiddleware, Metrics};

/// Schemaless access to one named collection
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name, used for logging and metrics
    fn name(&self) -> &str;

    /// Find all documents matching `filter` inside the skip/limit window
    async fn find(&self, filter: Document, window: PageWindow) -> RepositoryResult<Vec<Document>>;

    async fn find_one(&self, filter: Document) -> RepositoryResult<Option<Document>>;

    /// Insert a document; the store assigns `_id` when absent
    async fn insert_one(&self, document: Document) -> RepositoryResult<InsertOutcome>;

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> RepositoryResult<UpdateOutcome>;

    async fn delete_one(&self, filter: Document) -> RepositoryResult<DeleteOutcome>;

    /// Metadata-based count of every document in the collection
    async fn estimated_count(&self) -> RepositoryResult<u64>;
}

/// MongoDB implementation of [`DocumentCollection`]
pub struct MongoCollection {
    collection: Collection<Document>,
    tracing: DatabaseTracingMiddleware,
}

impl MongoCollection {
    pub fn new(collection: Collection<Document>, metrics: Arc<Metrics>) -> Self {
        Self {
            collection,
            tracing: DatabaseTracingMiddleware::new(metrics),
        }
    }
}

pub(crate) fn find_options(window: PageWindow) -> FindOptions {
    let mut options = FindOptions::default();
    if window.skip > 0 {
        options.skip = Some(window.skip);
    }
    options.limit = window.limit;
    options
}

pub(crate) fn upsert_options(upsert: bool) -> UpdateOptions {
    let mut options = UpdateOptions::default();
    options.upsert = Some(upsert);
    options
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.collection.name()
    }

    async fn find(&self, filter: Document, window: PageWindow) -> RepositoryResult<Vec<Document>> {
        let documents = self
            .tracing
            .trace_operation("find", self.name(), async {
                let cursor = self
                    .collection
                    .find(filter, find_options(window))
                    .await?;
                let documents: Vec<Document> = cursor.try_collect().await?;
                Ok::<_, RepositoryError>(documents)
            })
            .await?;

        debug!(count = documents.len(), "Fetched documents");
        Ok(documents)
    }

    async fn find_one(&self, filter: Document) -> RepositoryResult<Option<Document>> {
        self.tracing
            .trace_operation("find_one", self.name(), async {
                Ok(self.collection.find_one(filter, None).await?)
            })
            .await
    }

    async fn insert_one(&self, document: Document) -> RepositoryResult<InsertOutcome> {
        let result = self
            .tracing
            .trace_operation("insert_one", self.name(), async {
                Ok::<_, RepositoryError>(self.collection.insert_one(document, None).await?)
            })
            .await?;

        Ok(InsertOutcome {
            inserted_id: result.inserted_id,
        })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> RepositoryResult<UpdateOutcome> {
        let result = self
            .tracing
            .trace_operation("update_one", self.name(), async {
                Ok::<_, RepositoryError>(
                    self.collection
                        .update_one(filter, update, upsert_options(upsert))
                        .await?,
                )
            })
            .await?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(&self, filter: Document) -> RepositoryResult<DeleteOutcome> {
        let result = self
            .tracing
            .trace_operation("delete_one", self.name(), async {
                Ok::<_, RepositoryError>(self.collection.delete_one(filter, None).await?)
            })
            .await?;

        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn estimated_count(&self) -> RepositoryResult<u64> {
        self.tracing
            .trace_operation("estimated_document_count", self.name(), async {
                Ok(self.collection.estimated_document_count(None).await?)
            })
            .await
    }
}
