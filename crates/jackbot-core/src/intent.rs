use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RouterError;
use crate::types::{Item, PriceType};

/// Maximum serialized size of a postback payload in bytes. The
/// messaging platform truncates button payloads beyond this.
pub const PAYLOAD_LIMIT: usize = 1000;

/// The validity window for time-sensitive postbacks. A payload whose
/// `validFrom` is exactly this old is still valid; strictly older is
/// stale.
pub const VALIDITY_WINDOW_MINUTES: i64 = 5;

// ====== Settings ======

/// Which user setting a `changeSetting` postback targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Setting {
    Region,
    Language,
}

// ====== Intent ======

/// A closed union of every action the bot can dispatch on, each
/// carrying exactly the entities its handler needs.
///
/// On the wire this serializes to `{"intent": "...", "entities": {...}}`,
/// the envelope embedded in postback buttons. Unknown intents and
/// malformed entities fail deserialization instead of falling through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "entities", rename_all = "camelCase")]
pub enum Intent {
    /// Prompt the user for a search query.
    SearchProduct {},
    /// Look up full item detail, upsert the product and create an
    /// inactive price alert for it.
    #[serde(rename_all = "camelCase")]
    ActivatePriceAlert { item: Item, region: String },
    /// Look up and present full item detail.
    #[serde(rename_all = "camelCase")]
    ShowProductDetails { item: Item, region: String },
    /// Record the chosen price type on an alert, then prompt for the
    /// desired price.
    #[serde(rename_all = "camelCase")]
    SetPriceType {
        item: Item,
        price_type: PriceType,
        alert_id: String,
    },
    /// Finalize an alert with a desired price, or enter the custom
    /// price input sub-state when `custom_price_input` is set.
    #[serde(rename_all = "camelCase")]
    SetDesiredPrice {
        desired_price: i64,
        custom_price_input: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_price_input_example_price: Option<String>,
        item_title: String,
        alert_id: String,
        alert_created_at: DateTime<Utc>,
        price_type: PriceType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
    },
    /// Soft-delete an alert.
    #[serde(rename_all = "camelCase")]
    DisactivatePriceAlert { alert_id: String },
    /// Re-open the desired-price flow on an existing alert.
    #[serde(rename_all = "camelCase")]
    ChangeDesiredPrice {
        asin: String,
        alert_id: String,
        region: String,
    },
    /// Paginated listing of the user's active alerts.
    #[serde(rename_all = "camelCase")]
    ListPriceWatches { page_number: u32 },
    /// Switch a setting, or present the option menu when no value is
    /// supplied yet.
    #[serde(rename_all = "camelCase")]
    ChangeSetting {
        setting: Setting,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// Present the settings overview menu.
    ShowSettings {},
    /// Present the help text.
    ShowHelpInstructions {},
    /// Confirm a language change.
    #[serde(rename_all = "camelCase")]
    RetainLanguageSettings { language_new: String },
    /// Undo a language change.
    #[serde(rename_all = "camelCase")]
    RevertLanguageSettings { language_old: String },
}

// ====== Postback envelope ======

/// A parsed postback payload: the intent plus the optional generation
/// timestamp used for the staleness gate.
///
/// `validFrom` travels inside the `entities` object alongside the
/// intent-specific fields, so it is split out here before the intent
/// itself is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Postback {
    pub intent: Intent,
    pub valid_from: Option<DateTime<Utc>>,
}

impl Postback {
    pub fn new(intent: Intent) -> Self {
        Postback {
            intent,
            valid_from: None,
        }
    }

    /// A postback that expires once its generation time falls out of
    /// the validity window.
    pub fn valid_from(intent: Intent, valid_from: DateTime<Utc>) -> Self {
        Postback {
            intent,
            valid_from: Some(valid_from),
        }
    }

    /// Parse a raw payload string. Unknown intents and malformed
    /// entities are rejected.
    pub fn parse(payload: &str) -> Result<Self, RouterError> {
        let mut value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| RouterError::MalformedPayload(e.to_string()))?;

        let valid_from = value
            .get_mut("entities")
            .and_then(|e| e.as_object_mut())
            .and_then(|e| e.remove("validFrom"))
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v).ok());

        let intent: Intent = serde_json::from_value(value)
            .map_err(|e| RouterError::MalformedPayload(e.to_string()))?;

        Ok(Postback { intent, valid_from })
    }

    /// Serialize to the wire envelope, enforcing the platform's
    /// payload size limit.
    pub fn to_payload(&self) -> Result<String, RouterError> {
        let mut value = serde_json::to_value(&self.intent)
            .map_err(|e| RouterError::MalformedPayload(e.to_string()))?;

        if let Some(valid_from) = self.valid_from {
            if let Some(entities) = value.get_mut("entities").and_then(|e| e.as_object_mut()) {
                entities.insert(
                    "validFrom".to_string(),
                    serde_json::to_value(valid_from)
                        .map_err(|e| RouterError::MalformedPayload(e.to_string()))?,
                );
            }
        }

        let payload = value.to_string();
        if payload.len() > PAYLOAD_LIMIT {
            return Err(RouterError::PayloadTooLarge(payload.len()));
        }
        Ok(payload)
    }

    /// True when the payload carries a generation timestamp strictly
    /// older than the validity window. Payloads without a timestamp
    /// never go stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.valid_from {
            Some(valid_from) => {
                now.signed_duration_since(valid_from)
                    > Duration::minutes(VALIDITY_WINDOW_MINUTES)
            }
            None => false,
        }
    }
}
