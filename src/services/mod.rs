// Service exports
pub mod cache;
pub mod cart;
pub mod catalog;
pub mod postgres;
pub mod sessions;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use cart::PostgresCart;
pub use catalog::{CatalogClient, CatalogError};
pub use postgres::{PostgresClient, PostgresError, SignalType};
pub use sessions::{DecisionReport, SessionHandle, SessionRegistry, SwipeSession, TracingObserver};
