use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which of the three price observations a watch tracks.
///
/// The serde names are the wire names used inside postback payloads and
/// persisted alert records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceType {
    #[serde(rename = "amazonPrice")]
    Amazon,
    #[serde(rename = "thirdPartyNewPrice")]
    ThirdPartyNew,
    #[serde(rename = "thirdPartyUsedPrice")]
    ThirdPartyUsed,
}

impl PriceType {
    pub const ALL: [PriceType; 3] = [
        PriceType::Amazon,
        PriceType::ThirdPartyNew,
        PriceType::ThirdPartyUsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::Amazon => "amazonPrice",
            PriceType::ThirdPartyNew => "thirdPartyNewPrice",
            PriceType::ThirdPartyUsed => "thirdPartyUsedPrice",
        }
    }

    /// Source string for the long user-facing label, fed through i18n.
    pub fn label(&self) -> &'static str {
        match self {
            PriceType::Amazon => "Amazon price",
            PriceType::ThirdPartyNew => "3rd Party New price",
            PriceType::ThirdPartyUsed => "3rd Party Used price",
        }
    }

    /// Source string for the short button title.
    pub fn short_label(&self) -> &'static str {
        match self {
            PriceType::Amazon => "Amazon",
            PriceType::ThirdPartyNew => "3rd Party New",
            PriceType::ThirdPartyUsed => "3rd Party Used",
        }
    }
}

/// Up to three price observations for an item, in integer minor
/// currency units. An absent observation is `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPrices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amazon_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_party_new_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_party_used_price: Option<i64>,
}

impl ItemPrices {
    pub fn get(&self, price_type: PriceType) -> Option<i64> {
        match price_type {
            PriceType::Amazon => self.amazon_price,
            PriceType::ThirdPartyNew => self.third_party_new_price,
            PriceType::ThirdPartyUsed => self.third_party_used_price,
        }
    }

    /// True if any of the three observations is present.
    pub fn any(&self) -> bool {
        self.amazon_price.is_some()
            || self.third_party_new_price.is_some()
            || self.third_party_used_price.is_some()
    }

    /// The price types that actually carry an observation.
    pub fn available(&self) -> Vec<PriceType> {
        PriceType::ALL
            .into_iter()
            .filter(|pt| self.get(*pt).is_some())
            .collect()
    }
}

/// A normalized catalog item, as extracted from one raw search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_rank: Option<i64>,
    pub price: ItemPrices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

impl Item {
    /// An item may be rendered in a results list only when its id,
    /// detail url, title and at least one price observation are present.
    pub fn is_display_eligible(&self) -> bool {
        self.asin.is_some()
            && self.detail_page_url.is_some()
            && self.title.is_some()
            && self.price.any()
    }
}

/// Canonical persisted product row, keyed by catalog id (ASIN).
///
/// Title, product group, category and sales rank are per-region maps
/// because the same product carries localized values in each regional
/// catalog it was searched from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub asin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub total_tracked: i64,
    pub title: HashMap<String, String>,
    pub product_group: HashMap<String, String>,
    pub category: HashMap<String, String>,
    pub sales_rank: HashMap<String, i64>,
}

impl Product {
    /// Build a fresh product row from a fully-detailed item.
    pub fn from_item(item: &Item, region: &str) -> Self {
        let mut product = Product {
            id: String::new(),
            asin: item.asin.clone().unwrap_or_default(),
            image_url: item.image_url.clone(),
            ean: item.ean.clone(),
            upc: item.upc.clone(),
            sku: item.sku.clone(),
            model: item.model.clone(),
            manufacturer: item.manufacturer.clone(),
            total_tracked: 0,
            ..Default::default()
        };
        product.merge_region(region, item);
        product
    }

    /// Merge the localized fields of `item` under the given region key.
    pub fn merge_region(&mut self, region: &str, item: &Item) {
        if let Some(title) = &item.title {
            self.title.insert(region.to_string(), title.clone());
        }
        if let Some(group) = &item.product_group {
            self.product_group.insert(region.to_string(), group.clone());
        }
        if let Some(category) = &item.category {
            self.category.insert(region.to_string(), category.clone());
        }
        if let Some(rank) = item.sales_rank {
            self.sales_rank.insert(region.to_string(), rank);
        }
    }
}

/// A persisted snapshot of an item's price observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceSnapshot {
    pub id: String,
    pub product_id: String,
    pub region: String,
    pub prices: ItemPrices,
}

/// A price watch: one user tracking one price type of one product.
///
/// Created inactive; becomes active once both a price type and a
/// desired price are set. Deactivation is a soft delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub active: bool,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_type: Option<PriceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_price: Option<i64>,
    pub current_price_id: String,
    pub price_when_tracked_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An alert joined with its product and latest price snapshot, as
/// returned by paginated listing queries.
#[derive(Debug, Clone)]
pub struct AlertWithProduct {
    pub alert: PriceAlert,
    pub product: Product,
    pub current_price: PriceSnapshot,
}

/// Messaging-platform profile, fetched once at first contact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub timezone: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A backend user record, provisioned from the platform profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub language: String,
}

impl User {
    /// Derive a user record from a platform profile. The language is
    /// the prefix of the locale (e.g. "de" of "de_DE").
    pub fn from_profile(sender_id: &str, profile: &Profile) -> Self {
        let language = profile
            .locale
            .as_deref()
            .and_then(|l| l.split('_').next())
            .unwrap_or("en")
            .to_string();
        User {
            id: String::new(),
            sender_id: sender_id.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            profile_pic: profile.profile_pic.clone(),
            locale: profile.locale.clone(),
            timezone: profile.timezone,
            gender: profile.gender.clone(),
            language,
        }
    }
}

/// An archived inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_type_wire_names() {
        let json = serde_json::to_string(&PriceType::ThirdPartyNew).unwrap();
        assert_eq!(json, "\"thirdPartyNewPrice\"");
        let pt: PriceType = serde_json::from_str("\"amazonPrice\"").unwrap();
        assert_eq!(pt, PriceType::Amazon);
    }

    #[test]
    fn test_item_prices_absent_is_none() {
        let prices = ItemPrices::default();
        assert!(!prices.any());
        assert_eq!(prices.get(PriceType::Amazon), None);

        let prices = ItemPrices {
            third_party_used_price: Some(499),
            ..Default::default()
        };
        assert!(prices.any());
        assert_eq!(prices.available(), vec![PriceType::ThirdPartyUsed]);
    }

    #[test]
    fn test_item_prices_skip_absent_fields() {
        let prices = ItemPrices {
            amazon_price: Some(1099),
            ..Default::default()
        };
        let json = serde_json::to_string(&prices).unwrap();
        assert_eq!(json, r#"{"amazonPrice":1099}"#);
    }

    #[test]
    fn test_product_merge_region() {
        let item = Item {
            asin: Some("B00TEST".into()),
            title: Some("Kindle Paperwhite".into()),
            ..Default::default()
        };
        let mut product = Product::from_item(&item, "de_DE");
        assert_eq!(product.asin, "B00TEST");

        let localized = Item {
            title: Some("Kindle Paperwhite (UK)".into()),
            sales_rank: Some(42),
            ..Default::default()
        };
        product.merge_region("en_GB", &localized);
        assert_eq!(product.title["en_GB"], "Kindle Paperwhite (UK)");
        assert_eq!(product.sales_rank["en_GB"], 42);
    }

    #[test]
    fn test_user_from_profile_language_prefix() {
        let profile = Profile {
            locale: Some("de_DE".into()),
            ..Default::default()
        };
        let user = User::from_profile("12345", &profile);
        assert_eq!(user.language, "de");
        assert_eq!(user.sender_id, "12345");
    }
}
