use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::config::MessengerConfig;
use crate::error::CollaboratorError;
use crate::types::Profile;

/// Buttons per card or button template, per platform limit.
pub const MAX_BUTTONS: usize = 3;
/// Cards per generic template, per platform limit.
pub const MAX_CARDS: usize = 10;

// ====== Messenger Webhook Types ======

/// Webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEvent {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// A single page entry in the webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

/// One messaging event. The optin/message/delivery/postback fields are
/// mutually exclusive.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagingEvent {
    pub sender: Principal,
    pub recipient: Principal,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optin: Option<Optin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<InboundMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<PostbackEvent>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Principal {
    pub id: String,
}

/// Authorization event from the "Send to Messenger" plugin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Optin {
    #[serde(default, rename = "ref")]
    pub data_ref: Option<String>,
}

/// An inbound message: text or attachments, not both.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Value>>,
}

/// Delivery confirmation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Delivery {
    #[serde(default)]
    pub mids: Option<Vec<String>>,
    #[serde(default)]
    pub watermark: i64,
    #[serde(default)]
    pub seq: Option<i64>,
}

/// A tapped postback button; `payload` carries the intent envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostbackEvent {
    pub payload: String,
}

/// Parse a webhook event from the raw JSON body.
pub fn parse_webhook_event(body: &[u8]) -> Result<WebhookEvent, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Verify the `x-hub-signature` header: `sha1=<hex>` of an HMAC-SHA1
/// over the raw body, keyed by the app secret.
pub fn verify_signature(app_secret: &str, body: &[u8], signature: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha1::Sha1;

    type HmacSha1 = Hmac<Sha1>;

    let Some(hex_digest) = signature.strip_prefix("sha1=") else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    let expected = hex::encode(mac.finalize().into_bytes());
    expected == hex_digest
}

// ====== Outbound messages ======

#[derive(Debug, Clone, PartialEq)]
pub enum Button {
    Postback { title: String, payload: String },
    WebUrl { title: String, url: String },
}

impl Button {
    fn to_json(&self) -> Value {
        match self {
            Button::Postback { title, payload } => json!({
                "type": "postback",
                "title": title,
                "payload": payload,
            }),
            Button::WebUrl { title, url } => json!({
                "type": "web_url",
                "url": url,
                "title": title,
            }),
        }
    }
}

/// One element of a generic-template carousel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub item_url: String,
    pub buttons: Vec<Button>,
}

/// What to send: plain text, a button template, or a card carousel.
/// Button and card counts beyond the platform caps are truncated.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    Buttons { text: String, buttons: Vec<Button> },
    Cards(Vec<Card>),
}

impl MessageBody {
    /// Build the Send API request body for a recipient.
    pub fn to_request(&self, recipient_id: &str) -> Value {
        let message = match self {
            MessageBody::Text(text) => json!({ "text": text }),
            MessageBody::Buttons { text, buttons } => {
                let buttons: Vec<Value> = buttons
                    .iter()
                    .take(MAX_BUTTONS)
                    .map(Button::to_json)
                    .collect();
                json!({
                    "attachment": {
                        "type": "template",
                        "payload": {
                            "template_type": "button",
                            "text": text,
                            "buttons": buttons,
                        }
                    }
                })
            }
            MessageBody::Cards(cards) => {
                let elements: Vec<Value> = cards
                    .iter()
                    .take(MAX_CARDS)
                    .map(|card| {
                        let buttons: Vec<Value> = card
                            .buttons
                            .iter()
                            .take(MAX_BUTTONS)
                            .map(Button::to_json)
                            .collect();
                        json!({
                            "title": card.title,
                            "subtitle": card.subtitle,
                            "item_url": card.item_url,
                            "image_url": card.image_url,
                            "buttons": buttons,
                        })
                    })
                    .collect();
                json!({
                    "attachment": {
                        "type": "template",
                        "payload": {
                            "template_type": "generic",
                            "elements": elements,
                        }
                    }
                })
            }
        };

        json!({
            "recipient": { "id": recipient_id },
            "message": message,
        })
    }
}

// ====== Send API ======

/// Outbound side of the channel: message delivery plus the profile
/// lookup used to bootstrap new users.
#[async_trait]
pub trait SendApi: Send + Sync {
    async fn send(&self, recipient_id: &str, body: MessageBody)
        -> Result<(), CollaboratorError>;

    async fn profile(&self, user_id: &str) -> Result<Profile, CollaboratorError>;
}

/// Graph API client.
pub struct MessengerClient {
    client: reqwest::Client,
    config: MessengerConfig,
}

impl MessengerClient {
    pub fn new(config: MessengerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SendApi for MessengerClient {
    async fn send(
        &self,
        recipient_id: &str,
        body: MessageBody,
    ) -> Result<(), CollaboratorError> {
        let url = format!("{}/me/messages", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .query(&[("access_token", self.config.page_access_token.as_str())])
            .json(&body.to_request(recipient_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Send API error {}: {}", status, message);
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<Profile, CollaboratorError> {
        let url = format!("{}/{}", self.config.api_base, user_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", "first_name,last_name,profile_pic,locale,timezone,gender"),
                ("access_token", self.config.page_access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("User Profile API error {}: {}", status, message);
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_webhook_event() {
        let body = r#"{
            "object": "page",
            "entry": [{
                "id": "page1",
                "time": 1458692752478,
                "messaging": [{
                    "sender": {"id": "1234"},
                    "recipient": {"id": "page1"},
                    "timestamp": 1458692752478,
                    "message": {"mid": "mid.1", "text": "iPhone 6"}
                }, {
                    "sender": {"id": "1234"},
                    "recipient": {"id": "page1"},
                    "timestamp": 1458692752500,
                    "postback": {"payload": "{\"intent\":\"showHelpInstructions\",\"entities\":{}}"}
                }]
            }]
        }"#;
        let event = parse_webhook_event(body.as_bytes()).unwrap();
        assert_eq!(event.object, "page");
        assert_eq!(event.entry.len(), 1);
        let messaging = &event.entry[0].messaging;
        assert_eq!(messaging.len(), 2);
        assert_eq!(
            messaging[0].message.as_ref().unwrap().text.as_deref(),
            Some("iPhone 6")
        );
        assert!(messaging[0].postback.is_none());
        assert!(messaging[1].postback.is_some());
    }

    #[test]
    fn test_verify_signature() {
        use hmac::{Hmac, Mac};
        use sha1::Sha1;

        let secret = "app-secret";
        let body = br#"{"object":"page","entry":[]}"#;
        let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let signature = format!("sha1={}", hex::encode(mac.finalize().into_bytes()));

        assert!(verify_signature(secret, body, &signature));
        assert!(!verify_signature("other-secret", body, &signature));
        assert!(!verify_signature(secret, b"tampered", &signature));
        // Missing scheme prefix is rejected.
        assert!(!verify_signature(secret, body, signature.trim_start_matches("sha1=")));
    }

    #[test]
    fn test_text_request_shape() {
        let body = MessageBody::Text("hello".into());
        let request = body.to_request("1234");
        assert_eq!(request["recipient"]["id"], "1234");
        assert_eq!(request["message"]["text"], "hello");
    }

    #[test]
    fn test_button_caps_enforced() {
        let buttons = (0..5)
            .map(|i| Button::Postback {
                title: format!("b{i}"),
                payload: "{}".into(),
            })
            .collect();
        let body = MessageBody::Buttons {
            text: "pick".into(),
            buttons,
        };
        let request = body.to_request("1234");
        let payload = &request["message"]["attachment"]["payload"];
        assert_eq!(payload["template_type"], "button");
        assert_eq!(payload["buttons"].as_array().unwrap().len(), MAX_BUTTONS);
    }

    #[test]
    fn test_card_caps_enforced() {
        let cards = (0..12)
            .map(|i| Card {
                title: format!("card {i}"),
                buttons: vec![Button::WebUrl {
                    title: "Go to Website".into(),
                    url: "https://example.com".into(),
                }],
                ..Default::default()
            })
            .collect();
        let request = MessageBody::Cards(cards).to_request("1234");
        let payload = &request["message"]["attachment"]["payload"];
        assert_eq!(payload["template_type"], "generic");
        assert_eq!(payload["elements"].as_array().unwrap().len(), MAX_CARDS);
    }
}
