use bson::doc;
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database,
};
use std::sync::Arc;
use tracing::info;

use super::{DocumentCollection, MongoCollection};
use crate::config::DatabaseConfig;
use crate::models::{RepositoryError, RepositoryResult};
use crate::observability::Metrics;

pub const FOODS_COLLECTION: &str = "foods";
pub const ORDERS_COLLECTION: &str = "orderedFoods";
pub const USERS_COLLECTION: &str = "users";

/// Shared client handle for the configured database
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    database: Database,
    metrics: Arc<Metrics>,
}

impl DocumentStore {
    /// Build a client with Stable API v1. The driver connects lazily, so this
    /// only fails on a malformed connection string.
    pub async fn connect(config: &DatabaseConfig, metrics: Arc<Metrics>) -> RepositoryResult<Self> {
        let mut options = ClientOptions::parse(config.connection_uri())
            .await
            .map_err(|e| RepositoryError::ConnectionFailed {
                message: e.to_string(),
            })?;

        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        options.server_api = Some(server_api);
        options.app_name = Some("hungryharmony-rs".to_string());

        let client = Client::with_options(options)?;
        let database = client.database(&config.name);

        info!(database = %config.name, "Document store client created");

        Ok(Self {
            client,
            database,
            metrics,
        })
    }

    /// Round trip to the `admin` database
    pub async fn ping(&self) -> RepositoryResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    pub fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(MongoCollection::new(
            self.database.collection(name),
            self.metrics.clone(),
        ))
    }

    pub fn foods(&self) -> Arc<dyn DocumentCollection> {
        self.collection(FOODS_COLLECTION)
    }

    pub fn orders(&self) -> Arc<dyn DocumentCollection> {
        self.collection(ORDERS_COLLECTION)
    }

    pub fn users(&self) -> Arc<dyn DocumentCollection> {
        self.collection(USERS_COLLECTION)
    }
}
