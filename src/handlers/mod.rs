pub mod auth;
pub mod errors;
pub mod foods;
pub mod health;
pub mod middleware;
pub mod orders;
pub mod state;
pub mod users;

pub use auth::*;
pub use errors::*;
pub use foods::*;
pub use health::*;
pub use middleware::*;
pub use orders::*;
pub use state::*;
pub use users::*;
