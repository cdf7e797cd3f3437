pub mod memory_store;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PriceType, User};

/// A suspended multi-turn flow, resumed by the next free-text message.
/// At most one per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transaction {
    /// Waiting for the user to type a price for an alert that has a
    /// price type but no desired price yet.
    #[serde(rename_all = "camelCase")]
    CustomPriceInput {
        /// Formatted price shown in the "for example, type %s" prompt.
        example_price: String,
        item_title: String,
        alert_id: String,
        alert_created_at: DateTime<Utc>,
        price_type: PriceType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
    },
}

/// Per-user conversation state, keyed by the platform sender id.
///
/// Created at first contact from the profile lookup and never hard
/// deleted; settings intents mutate `region` and `language` in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub sender_id: String,
    /// Backend user record id.
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub language: String,
    /// Catalog region searches and alerts are scoped to. Starts as the
    /// user's home locale.
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

impl Session {
    /// Bootstrap a session from a freshly signed-up user.
    pub fn from_user(user: &User) -> Self {
        Session {
            sender_id: user.sender_id.clone(),
            user_id: user.id.clone(),
            locale: user.locale.clone(),
            language: user.language.clone(),
            region: user.locale.clone().unwrap_or_default(),
            transaction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_region_starts_at_home_locale() {
        let user = User {
            id: "u1".into(),
            sender_id: "1234".into(),
            locale: Some("en_GB".into()),
            language: "en".into(),
            ..Default::default()
        };
        let session = Session::from_user(&user);
        assert_eq!(session.region, "en_GB");
        assert_eq!(session.language, "en");
        assert_eq!(session.transaction, None);
    }

    #[test]
    fn test_transaction_serde_round_trip() {
        let session = Session {
            sender_id: "1234".into(),
            user_id: "u1".into(),
            language: "de".into(),
            region: "de_DE".into(),
            transaction: Some(Transaction::CustomPriceInput {
                example_price: "€ 10,98".into(),
                item_title: "Echo Dot".into(),
                alert_id: "a1".into(),
                alert_created_at: Utc::now(),
                price_type: PriceType::Amazon,
                region: Some("de_DE".into()),
            }),
            ..Default::default()
        };
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }
}
