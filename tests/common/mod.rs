#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Value};
use tower::ServiceExt;

use hungryharmony_rs::{
    auth::TokenService,
    config::CorsConfig,
    cors_layer, create_app,
    handlers::{ApiState, AuthState},
    models::{DeleteOutcome, InsertOutcome, PageWindow, RepositoryResult, UpdateOutcome},
    repositories::{DocumentCollection, FOODS_COLLECTION, ORDERS_COLLECTION, USERS_COLLECTION},
    services::{FoodService, OrderService, UserService},
    Metrics,
};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Collection kept in memory, matching top-level fields by equality
pub struct InMemoryCollection {
    name: String,
    documents: Mutex<Vec<Document>>,
}

impl InMemoryCollection {
    pub fn new(name: &str) -> Self {
        Self::with_documents(name, Vec::new())
    }

    pub fn with_documents(name: &str, documents: Vec<Document>) -> Self {
        let documents = documents
            .into_iter()
            .map(|mut document| {
                if !document.contains_key("_id") {
                    document.insert("_id", ObjectId::new());
                }
                document
            })
            .collect();

        Self {
            name: name.to_string(),
            documents: Mutex::new(documents),
        }
    }

    pub fn snapshot(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    pub fn get(&self, id: ObjectId) -> Option<Document> {
        self.snapshot()
            .into_iter()
            .find(|document| document.get_object_id("_id").ok() == Some(id))
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn apply_set(document: &mut Document, update: &Document) -> bool {
    let mut changed = false;
    if let Ok(set) = update.get_document("$set") {
        for (key, value) in set {
            if document.get(key) != Some(value) {
                document.insert(key.clone(), value.clone());
                changed = true;
            }
        }
    }
    changed
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, filter: Document, window: PageWindow) -> RepositoryResult<Vec<Document>> {
        let documents = self.documents.lock().unwrap();
        let matching = documents
            .iter()
            .filter(|document| matches(document, &filter))
            .skip(window.skip as usize);

        Ok(match window.limit {
            Some(limit) => matching.take(limit as usize).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    async fn find_one(&self, filter: Document) -> RepositoryResult<Option<Document>> {
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .iter()
            .find(|document| matches(document, &filter))
            .cloned())
    }

    async fn insert_one(&self, mut document: Document) -> RepositoryResult<InsertOutcome> {
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        let inserted_id = document.get("_id").cloned().unwrap_or(Bson::Null);
        self.documents.lock().unwrap().push(document);

        Ok(InsertOutcome { inserted_id })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> RepositoryResult<UpdateOutcome> {
        let mut documents = self.documents.lock().unwrap();

        if let Some(document) = documents
            .iter_mut()
            .find(|document| matches(document, &filter))
        {
            let changed = apply_set(document, &update);
            return Ok(UpdateOutcome {
                matched_count: 1,
                modified_count: u64::from(changed),
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
                upserted_id: None,
            });
        }

        let mut document = filter.clone();
        if !document.contains_key("_id") {
            document.insert("_id", ObjectId::new());
        }
        apply_set(&mut document, &update);
        let upserted_id = document.get("_id").cloned();
        documents.push(document);

        Ok(UpdateOutcome {
            matched_count: 0,
            modified_count: 0,
            upserted_id,
        })
    }

    async fn delete_one(&self, filter: Document) -> RepositoryResult<DeleteOutcome> {
        let mut documents = self.documents.lock().unwrap();
        let position = documents
            .iter()
            .position(|document| matches(document, &filter));

        let deleted_count = match position {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteOutcome { deleted_count })
    }

    async fn estimated_count(&self) -> RepositoryResult<u64> {
        Ok(self.documents.lock().unwrap().len() as u64)
    }
}

/// Router wired to in-memory collections
pub struct TestApp {
    pub router: Router,
    pub foods: Arc<InMemoryCollection>,
    pub orders: Arc<InMemoryCollection>,
    pub users: Arc<InMemoryCollection>,
    pub tokens: Arc<TokenService>,
    pub metrics: Arc<Metrics>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_data(Vec::new(), Vec::new(), Vec::new())
    }

    pub fn with_data(foods: Vec<Document>, orders: Vec<Document>, users: Vec<Document>) -> Self {
        let foods = Arc::new(InMemoryCollection::with_documents(FOODS_COLLECTION, foods));
        let orders = Arc::new(InMemoryCollection::with_documents(ORDERS_COLLECTION, orders));
        let users = Arc::new(InMemoryCollection::with_documents(USERS_COLLECTION, users));
        let tokens = Arc::new(TokenService::new(
            TEST_SECRET,
            Duration::from_secs(5 * 60 * 60),
        ));
        let metrics = Arc::new(Metrics::new().unwrap());

        let api_state = ApiState {
            food_service: Arc::new(FoodService::new(foods.clone())),
            order_service: Arc::new(OrderService::new(orders.clone())),
            user_service: Arc::new(UserService::new(users.clone())),
            metrics: metrics.clone(),
        };
        let auth_state = AuthState {
            tokens: tokens.clone(),
            metrics: metrics.clone(),
        };
        let cors = cors_layer(&CorsConfig {
            allowed_origins: FRONTEND_ORIGIN.to_string(),
        });

        Self {
            router: create_app(metrics.clone(), api_state, auth_state, cors),
            foods,
            orders,
            users,
            tokens,
            metrics,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> Response {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, format!("token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: &Value) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Signed token carrying `email`, or no email at all
    pub fn token_for(&self, email: Option<&str>) -> String {
        let mut claims = Map::new();
        if let Some(email) = email {
            claims.insert("email".to_string(), Value::String(email.to_string()));
        }
        self.tokens.issue(claims).unwrap()
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `token` entry among a response's Set-Cookie headers
pub fn token_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("token="))
        .map(str::to_string)
}
