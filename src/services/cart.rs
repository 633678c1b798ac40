use std::sync::Arc;

use crate::core::CartSink;
use crate::models::Item;
use crate::services::PostgresClient;

/// Cart sink writing accepted items to a visitor's PostgreSQL cart
///
/// Writes run on a spawned task; failures are logged and otherwise dropped.
pub struct PostgresCart {
    postgres: Arc<PostgresClient>,
    visitor_id: String,
}

impl PostgresCart {
    pub fn new(postgres: Arc<PostgresClient>, visitor_id: impl Into<String>) -> Self {
        Self {
            postgres,
            visitor_id: visitor_id.into(),
        }
    }
}

impl CartSink for PostgresCart {
    fn submit(&self, item: &Item) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No runtime available, dropping cart item {} for {}", item.id, self.visitor_id);
                return;
            }
        };

        let postgres = self.postgres.clone();
        let visitor_id = self.visitor_id.clone();
        let item_id = item.id;
        let price = item.price;

        handle.spawn(async move {
            if let Err(e) = postgres.add_to_cart(&visitor_id, item_id, price).await {
                tracing::warn!("Failed to add item {} to cart of {}: {}", item_id, visitor_id, e);
            }
        });
    }
}
