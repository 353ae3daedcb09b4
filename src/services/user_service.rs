use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    documents_to_json, json_to_document, require_object, InsertOneResponse, PageWindow,
    ServiceResult,
};
use crate::repositories::DocumentCollection;

/// Service for the `users` collection
pub struct UserService {
    collection: Arc<dyn DocumentCollection>,
}

impl UserService {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> ServiceResult<Value> {
        let documents = self
            .collection
            .find(bson::Document::new(), PageWindow::default())
            .await?;
        Ok(documents_to_json(documents))
    }

    #[instrument(skip(self, body))]
    pub async fn create_user(&self, body: Value) -> ServiceResult<InsertOneResponse> {
        let body = require_object(body, "user")?;
        let outcome = self.collection.insert_one(json_to_document(&body)?).await?;

        crate::info_with_trace!(inserted_id = ?outcome.inserted_id, "User registered");
        Ok(outcome.into())
    }
}
