use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::CollaboratorError;
use crate::types::{AlertWithProduct, PriceAlert, PriceSnapshot, Product, StoredMessage, User};

/// In-process backend backed by concurrent maps, used in tests and for
/// local runs without a real object store.
#[derive(Default)]
pub struct MemoryBackend {
    users: DashMap<String, User>,
    products: DashMap<String, Product>,
    prices: DashMap<String, PriceSnapshot>,
    alerts: DashMap<String, PriceAlert>,
    messages: DashMap<String, StoredMessage>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Number of archived messages, for test assertions.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(&self, user: &User) -> Result<User, CollaboratorError> {
        let mut stored = user.clone();
        if stored.id.is_empty() {
            stored.id = Self::new_id();
        }
        self.users.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn save_message(
        &self,
        sender_id: &str,
        text: &str,
    ) -> Result<StoredMessage, CollaboratorError> {
        let message = StoredMessage {
            id: Self::new_id(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.messages.insert(message.id.clone(), message.clone());
        Ok(message)
    }

    async fn find_product_by_asin(
        &self,
        asin: &str,
    ) -> Result<Option<Product>, CollaboratorError> {
        Ok(self
            .products
            .iter()
            .find(|p| p.asin == asin)
            .map(|p| p.clone()))
    }

    async fn save_product(&self, product: &Product) -> Result<Product, CollaboratorError> {
        let mut stored = product.clone();
        if stored.id.is_empty() {
            stored.id = Self::new_id();
        }
        self.products.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn save_price(
        &self,
        price: &PriceSnapshot,
    ) -> Result<PriceSnapshot, CollaboratorError> {
        let mut stored = price.clone();
        if stored.id.is_empty() {
            stored.id = Self::new_id();
        }
        self.prices.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_alert(&self, alert_id: &str) -> Result<Option<PriceAlert>, CollaboratorError> {
        Ok(self.alerts.get(alert_id).map(|a| a.clone()))
    }

    async fn save_alert(&self, alert: &PriceAlert) -> Result<PriceAlert, CollaboratorError> {
        let mut stored = alert.clone();
        if stored.id.is_empty() {
            stored.id = Self::new_id();
        }
        self.alerts.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn alerts_for_user(
        &self,
        user_id: &str,
        active: bool,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<AlertWithProduct>, CollaboratorError> {
        let mut matching: Vec<PriceAlert> = self
            .alerts
            .iter()
            .filter(|a| a.user_id == user_id && a.active == active)
            .map(|a| a.clone())
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut page = Vec::new();
        for alert in matching.into_iter().skip(skip).take(limit) {
            let product = self
                .products
                .get(&alert.product_id)
                .map(|p| p.clone())
                .ok_or_else(|| CollaboratorError::NotFound(alert.product_id.clone()))?;
            let current_price = self
                .prices
                .get(&alert.current_price_id)
                .map(|p| p.clone())
                .ok_or_else(|| CollaboratorError::NotFound(alert.current_price_id.clone()))?;
            page.push(AlertWithProduct {
                alert,
                product,
                current_price,
            });
        }
        Ok(page)
    }

    async fn increment_tracked(&self, product_id: &str) -> Result<(), CollaboratorError> {
        let mut product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| CollaboratorError::NotFound(product_id.to_string()))?;
        product.total_tracked += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemPrices;
    use chrono::Duration;

    fn alert(id_hint: i64, user_id: &str, product_id: &str, price_id: &str, active: bool) -> PriceAlert {
        PriceAlert {
            id: String::new(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            active,
            region: "de_DE".into(),
            price_type: None,
            desired_price: None,
            current_price_id: price_id.to_string(),
            price_when_tracked_id: price_id.to_string(),
            created_at: Utc::now() + Duration::seconds(id_hint),
        }
    }

    #[tokio::test]
    async fn test_sign_up_assigns_id() {
        let backend = MemoryBackend::new();
        let user = backend
            .sign_up(&User {
                sender_id: "1234".into(),
                language: "de".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!user.id.is_empty());
    }

    #[tokio::test]
    async fn test_product_upsert_by_id() {
        let backend = MemoryBackend::new();
        let mut product = backend
            .save_product(&Product {
                asin: "B00TEST".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = backend.find_product_by_asin("B00TEST").await.unwrap();
        assert_eq!(found.as_ref().map(|p| p.id.as_str()), Some(product.id.as_str()));

        product.total_tracked = 7;
        let updated = backend.save_product(&product).await.unwrap();
        assert_eq!(updated.id, product.id);
        assert_eq!(
            backend
                .find_product_by_asin("B00TEST")
                .await
                .unwrap()
                .unwrap()
                .total_tracked,
            7
        );
    }

    #[tokio::test]
    async fn test_increment_tracked() {
        let backend = MemoryBackend::new();
        let product = backend
            .save_product(&Product {
                asin: "B00TEST".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        backend.increment_tracked(&product.id).await.unwrap();
        backend.increment_tracked(&product.id).await.unwrap();
        let loaded = backend.find_product_by_asin("B00TEST").await.unwrap().unwrap();
        assert_eq!(loaded.total_tracked, 2);

        let err = backend.increment_tracked("missing").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_alerts_pagination_and_eager_loading() {
        let backend = MemoryBackend::new();
        let product = backend
            .save_product(&Product {
                asin: "B00TEST".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let price = backend
            .save_price(&PriceSnapshot {
                id: String::new(),
                product_id: product.id.clone(),
                region: "de_DE".into(),
                prices: ItemPrices {
                    amazon_price: Some(1099),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        for i in 0..12 {
            backend
                .save_alert(&alert(i, "u1", &product.id, &price.id, true))
                .await
                .unwrap();
        }
        // Inactive and foreign alerts are filtered out.
        backend
            .save_alert(&alert(100, "u1", &product.id, &price.id, false))
            .await
            .unwrap();
        backend
            .save_alert(&alert(101, "u2", &product.id, &price.id, true))
            .await
            .unwrap();

        let first = backend.alerts_for_user("u1", true, 11, 0).await.unwrap();
        assert_eq!(first.len(), 11);
        assert_eq!(first[0].product.asin, "B00TEST");
        assert_eq!(first[0].current_price.prices.amazon_price, Some(1099));

        let second = backend.alerts_for_user("u1", true, 11, 10).await.unwrap();
        assert_eq!(second.len(), 2);

        // Ordering is stable across calls.
        let again = backend.alerts_for_user("u1", true, 11, 0).await.unwrap();
        assert_eq!(again[0].alert.id, first[0].alert.id);
    }

    #[tokio::test]
    async fn test_save_message_archives() {
        let backend = MemoryBackend::new();
        backend.save_message("1234", "iPhone 6").await.unwrap();
        assert_eq!(backend.message_count(), 1);
    }
}
