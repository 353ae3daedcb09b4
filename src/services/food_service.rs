use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{
    document_to_json, documents_to_json, id_filter, json_to_document, require_object, CountResponse,
    InsertOneResponse, PageQuery, PatchFoodRequest, ServiceResult, UpdateFoodRequest,
    UpdateResponse,
};
use crate::repositories::DocumentCollection;

/// Service for the `foods` collection
pub struct FoodService {
    collection: Arc<dyn DocumentCollection>,
}

impl FoodService {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }

    /// One page of foods in natural order
    #[instrument(skip(self))]
    pub async fn list_foods(&self, query: &PageQuery) -> ServiceResult<Value> {
        let window = query.window()?;
        crate::info_with_trace!(skip = window.skip, limit = ?window.limit, "Listing foods");

        let documents = self
            .collection
            .find(bson::Document::new(), window)
            .await?;

        debug!(count = documents.len(), "Foods retrieved");
        Ok(documents_to_json(documents))
    }

    /// A food by id, `None` when nothing matches
    #[instrument(skip(self))]
    pub async fn get_food(&self, id: &str) -> ServiceResult<Option<Value>> {
        let filter = id_filter(id)?;
        let document = self.collection.find_one(filter).await?;
        Ok(document.map(document_to_json))
    }

    #[instrument(skip(self, body))]
    pub async fn create_food(&self, body: Value) -> ServiceResult<InsertOneResponse> {
        let body = require_object(body, "food")?;
        let outcome = self.collection.insert_one(json_to_document(&body)?).await?;

        crate::info_with_trace!(inserted_id = ?outcome.inserted_id, "Food created");
        Ok(outcome.into())
    }

    /// Overwrite the editable fields, creating the food if the id is unknown
    #[instrument(skip(self, request))]
    pub async fn replace_food(
        &self,
        id: &str,
        request: &UpdateFoodRequest,
    ) -> ServiceResult<UpdateResponse> {
        let filter = id_filter(id)?;
        let outcome = self
            .collection
            .update_one(filter, request.to_update(), true)
            .await?;

        crate::info_with_trace!(
            matched = outcome.matched_count,
            upserted = outcome.upserted_id.is_some(),
            "Food replaced"
        );
        Ok(outcome.into())
    }

    /// Store the food's order count after a purchase
    #[instrument(skip(self))]
    pub async fn record_order_count(
        &self,
        id: &str,
        request: PatchFoodRequest,
    ) -> ServiceResult<UpdateResponse> {
        let filter = id_filter(id)?;
        let outcome = self
            .collection
            .update_one(filter, request.to_update(), false)
            .await?;

        Ok(outcome.into())
    }

    #[instrument(skip(self))]
    pub async fn count_foods(&self) -> ServiceResult<CountResponse> {
        let count = self.collection.estimated_count().await?;
        Ok(CountResponse { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InsertOutcome, PageWindow, RepositoryError, ServiceError, UpdateOutcome};
    use crate::services::MockTestCollection;
    use bson::{doc, oid::ObjectId, Bson};
    use mockall::predicate::eq;
    use serde_json::json;

    const FOOD_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

    fn food_oid() -> ObjectId {
        ObjectId::parse_str(FOOD_ID).unwrap()
    }

    fn create_test_update() -> UpdateFoodRequest {
        UpdateFoodRequest {
            food_name: "Beef Tehari".to_string(),
            food_image: "https://i.ibb.co/tehari.jpg".to_string(),
            food_category: "Rice".to_string(),
            price: 8.0,
            quantity: 15,
            description: "Old Dhaka style".to_string(),
            provider: "Karim".to_string(),
            provider_email: "karim@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_foods_uses_page_window() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_find()
            .with(
                eq(bson::Document::new()),
                eq(PageWindow {
                    skip: 4,
                    limit: Some(2),
                }),
            )
            .times(1)
            .returning(|_, _| Ok(vec![doc! { "_id": food_oid(), "food_name": "Ramen" }]));

        let service = FoodService::new(Arc::new(mock_collection));
        let query = PageQuery {
            page: Some(2),
            size: Some(2),
        };

        let foods = service.list_foods(&query).await.unwrap();
        assert_eq!(foods, json!([{ "_id": FOOD_ID, "food_name": "Ramen" }]));
    }

    #[tokio::test]
    async fn test_list_foods_without_paging_has_no_limit() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_find()
            .with(eq(bson::Document::new()), eq(PageWindow::default()))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let service = FoodService::new(Arc::new(mock_collection));
        let foods = service.list_foods(&PageQuery::default()).await.unwrap();

        assert_eq!(foods, json!([]));
    }

    #[tokio::test]
    async fn test_get_food_not_found() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_find_one()
            .with(eq(doc! { "_id": food_oid() }))
            .times(1)
            .returning(|_| Ok(None));

        let service = FoodService::new(Arc::new(mock_collection));
        assert_eq!(service.get_food(FOOD_ID).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_food_malformed_id_is_store_failure() {
        let mock_collection = MockTestCollection::new();
        let service = FoodService::new(Arc::new(mock_collection));

        let result = service.get_food("not-an-object-id").await;
        assert!(matches!(
            result,
            Err(ServiceError::Repository {
                source: RepositoryError::InvalidIdentifier { .. }
            })
        ));
    }

    #[tokio::test]
    async fn test_create_food_inserts_body_verbatim() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_insert_one()
            .withf(|document| {
                document.get_str("food_name").ok() == Some("Ramen")
                    && document.get_str("providerEmail").ok() == Some("chef@example.com")
            })
            .times(1)
            .returning(|_| {
                Ok(InsertOutcome {
                    inserted_id: Bson::ObjectId(food_oid()),
                })
            });

        let service = FoodService::new(Arc::new(mock_collection));
        let response = service
            .create_food(json!({ "food_name": "Ramen", "providerEmail": "chef@example.com" }))
            .await
            .unwrap();

        assert!(response.acknowledged);
        assert_eq!(response.inserted_id, json!(FOOD_ID));
    }

    #[tokio::test]
    async fn test_create_food_rejects_non_object() {
        let mock_collection = MockTestCollection::new();
        let service = FoodService::new(Arc::new(mock_collection));

        let result = service.create_food(json!(["not", "an", "object"])).await;
        assert!(matches!(result, Err(ServiceError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_replace_food_upserts() {
        let request = create_test_update();
        let expected_update = request.to_update();

        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_update_one()
            .with(eq(doc! { "_id": food_oid() }), eq(expected_update), eq(true))
            .times(1)
            .returning(|_, _, _| {
                Ok(UpdateOutcome {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: Some(Bson::ObjectId(food_oid())),
                })
            });

        let service = FoodService::new(Arc::new(mock_collection));
        let response = service.replace_food(FOOD_ID, &request).await.unwrap();

        assert_eq!(response.upserted_count, 1);
        assert_eq!(response.upserted_id, Some(json!(FOOD_ID)));
    }

    #[tokio::test]
    async fn test_record_order_count_does_not_upsert() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_update_one()
            .with(
                eq(doc! { "_id": food_oid() }),
                eq(doc! { "$set": { "ordered": 5_i64 } }),
                eq(false),
            )
            .times(1)
            .returning(|_, _, _| {
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: 1,
                    upserted_id: None,
                })
            });

        let service = FoodService::new(Arc::new(mock_collection));
        let response = service
            .record_order_count(FOOD_ID, PatchFoodRequest { after_order: 5 })
            .await
            .unwrap();

        assert_eq!(response.modified_count, 1);
        assert_eq!(response.upserted_id, None);
    }

    #[tokio::test]
    async fn test_count_foods() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection
            .expect_estimated_count()
            .times(1)
            .returning(|| Ok(42));

        let service = FoodService::new(Arc::new(mock_collection));
        assert_eq!(service.count_foods().await.unwrap().count, 42);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut mock_collection = MockTestCollection::new();
        mock_collection.expect_estimated_count().returning(|| {
            Err(RepositoryError::ConnectionFailed {
                message: "server selection timeout".to_string(),
            })
        });

        let service = FoodService::new(Arc::new(mock_collection));
        assert!(matches!(
            service.count_foods().await,
            Err(ServiceError::Repository { .. })
        ));
    }
}
