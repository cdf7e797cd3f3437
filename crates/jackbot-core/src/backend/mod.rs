pub mod memory;

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::types::{AlertWithProduct, PriceAlert, PriceSnapshot, Product, StoredMessage, User};

/// Object-store style persistence for users, products, prices, alerts
/// and archived messages.
///
/// Implementations assign ids on insert (an empty `id` field means
/// "new") and return the stored record.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Provision a user record at first contact.
    async fn sign_up(&self, user: &User) -> Result<User, CollaboratorError>;

    /// Archive an inbound message.
    async fn save_message(
        &self,
        sender_id: &str,
        text: &str,
    ) -> Result<StoredMessage, CollaboratorError>;

    async fn find_product_by_asin(&self, asin: &str)
        -> Result<Option<Product>, CollaboratorError>;

    /// Insert or update a product row.
    async fn save_product(&self, product: &Product) -> Result<Product, CollaboratorError>;

    async fn save_price(&self, price: &PriceSnapshot)
        -> Result<PriceSnapshot, CollaboratorError>;

    async fn get_alert(&self, alert_id: &str) -> Result<Option<PriceAlert>, CollaboratorError>;

    /// Insert or update a price alert.
    async fn save_alert(&self, alert: &PriceAlert) -> Result<PriceAlert, CollaboratorError>;

    /// A user's alerts filtered by active flag, ordered by creation
    /// time, with `limit`/`skip` pagination and the referenced product
    /// and current price snapshot eagerly loaded.
    async fn alerts_for_user(
        &self,
        user_id: &str,
        active: bool,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<AlertWithProduct>, CollaboratorError>;

    /// Bump a product's tracked counter.
    async fn increment_tracked(&self, product_id: &str) -> Result<(), CollaboratorError>;
}
