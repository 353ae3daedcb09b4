use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{
    documents_to_json, id_filter, json_to_document, require_object, DeleteResponse,
    InsertOneResponse, ListOrdersQuery, PageWindow, ServiceResult,
};
use crate::repositories::DocumentCollection;

/// Service for the `orderedFoods` collection
pub struct OrderService {
    collection: Arc<dyn DocumentCollection>,
}

impl OrderService {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }

    /// Orders for one buyer, or every order when no email is given.
    /// Callers are expected to have checked the email against the session.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: &ListOrdersQuery) -> ServiceResult<Value> {
        let documents = self
            .collection
            .find(query.to_filter(), PageWindow::default())
            .await?;

        debug!(count = documents.len(), "Orders retrieved");
        Ok(documents_to_json(documents))
    }

    #[instrument(skip(self, body))]
    pub async fn create_order(&self, body: Value) -> ServiceResult<InsertOneResponse> {
        let body = require_object(body, "order")?;
        let outcome = self.collection.insert_one(json_to_document(&body)?).await?;

        crate::info_with_trace!(inserted_id = ?outcome.inserted_id, "Order placed");
        Ok(outcome.into())
    }

    /// Remove one order; deleting an unknown id reports zero deleted
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: &str) -> ServiceResult<DeleteResponse> {
        let filter = id_filter(id)?;
        let outcome = self.collection.delete_one(filter).await?;

        crate::info_with_trace!(deleted = outcome.deleted_count, "Order deleted");
        Ok(outcome.into())
    }
}
