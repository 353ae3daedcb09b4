// Services module - business logic layer

pub mod food_service;
pub mod order_service;
pub mod user_service;

pub use food_service::FoodService;
pub use order_service::OrderService;
pub use user_service::UserService;

#[cfg(test)]
mockall::mock! {
    pub TestCollection {}

    #[async_trait::async_trait]
    impl crate::repositories::DocumentCollection for TestCollection {
        fn name(&self) -> &str;
        async fn find(
            &self,
            filter: bson::Document,
            window: crate::models::PageWindow,
        ) -> crate::models::RepositoryResult<Vec<bson::Document>>;
        async fn find_one(
            &self,
            filter: bson::Document,
        ) -> crate::models::RepositoryResult<Option<bson::Document>>;
        async fn insert_one(
            &self,
            document: bson::Document,
        ) -> crate::models::RepositoryResult<crate::models::InsertOutcome>;
        async fn update_one(
            &self,
            filter: bson::Document,
            update: bson::Document,
            upsert: bool,
        ) -> crate::models::RepositoryResult<crate::models::UpdateOutcome>;
        async fn delete_one(
            &self,
            filter: bson::Document,
        ) -> crate::models::RepositoryResult<crate::models::DeleteOutcome>;
        async fn estimated_count(&self) -> crate::models::RepositoryResult<u64>;
    }
}
