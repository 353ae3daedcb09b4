// Repositories module - document store access

pub mod collection;
pub mod store;

pub use collection::{DocumentCollection, MongoCollection};
pub use store::{DocumentStore, FOODS_COLLECTION, ORDERS_COLLECTION, USERS_COLLECTION};
