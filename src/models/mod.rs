// Re-export all model types
pub use self::documents::*;
pub use self::errors::*;
pub use self::food::*;
pub use self::order::*;

mod documents;
mod errors;
mod food;
mod order;
