use std::sync::Arc;

use crate::auth::TokenService;
use crate::observability::Metrics;
use crate::services::{FoodService, OrderService, UserService};

/// State shared by the collection routes
#[derive(Clone)]
pub struct ApiState {
    pub food_service: Arc<FoodService>,
    pub order_service: Arc<OrderService>,
    pub user_service: Arc<UserService>,
    pub metrics: Arc<Metrics>,
}

/// State for token issuance and the auth gate
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub metrics: Arc<Metrics>,
}
