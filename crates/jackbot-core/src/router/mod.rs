pub mod replies;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::catalog::CatalogClient;
use crate::channel::messenger::{
    Delivery, InboundMessage, MessageBody, MessagingEvent, Optin, PostbackEvent, SendApi,
};
use crate::config::Config;
use crate::domain::item::normalize_search_result;
use crate::domain::price::{format_price, parse_custom_price_input};
use crate::error::{BotError, CollaboratorError, RouterError};
use crate::i18n::{self, currency_for_region, interpolate, Translator};
use crate::intent::{Intent, Postback, Setting};
use crate::router::replies::MenuEntry;
use crate::session::store::SessionStore;
use crate::session::{Session, Transaction};
use crate::types::{Item, PriceAlert, PriceSnapshot, PriceType, Product, User};
use crate::util::truncate_string;

/// Message ids remembered for webhook redelivery dedup.
const MID_WINDOW: usize = 512;

/// The collaborators every handler needs.
pub struct Collaborators {
    pub send: Arc<dyn SendApi>,
    pub backend: Arc<dyn Backend>,
    pub sessions: Arc<dyn SessionStore>,
    pub catalog: Arc<dyn CatalogClient>,
}

/// Bounded window of recently seen message ids.
#[derive(Default)]
struct MidWindow {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl MidWindow {
    /// Record a message id; returns false when it was already seen.
    fn remember(&mut self, mid: &str) -> bool {
        if self.seen.contains(mid) {
            return false;
        }
        if self.order.len() == MID_WINDOW {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        self.order.push_back(mid.to_string());
        self.seen.insert(mid.to_string());
        true
    }
}

/// Turns one inbound messaging event into outbound replies and state
/// mutations.
///
/// Events for the same sender are serialized through a per-sender
/// mutex so two rapid taps cannot race writes to one session;
/// different senders proceed concurrently.
pub struct Router {
    config: Arc<Config>,
    translator: Translator,
    collab: Collaborators,
    sender_locks: DashMap<String, Arc<Mutex<()>>>,
    seen_mids: Mutex<MidWindow>,
}

impl Router {
    pub fn new(config: Arc<Config>, collab: Collaborators) -> Self {
        Self {
            config,
            translator: Translator::new(),
            collab,
            sender_locks: DashMap::new(),
            seen_mids: Mutex::new(MidWindow::default()),
        }
    }

    /// Entry point per messaging event. Never fails outward: a failed
    /// handler logs and answers the user with a generic error reply.
    pub async fn handle_event(&self, event: MessagingEvent) {
        let sender_id = event.sender.id.clone();
        let lock = self
            .sender_locks
            .entry(sender_id.clone())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        if let Err(e) = self.route(&event).await {
            error!(sender = %sender_id, error = %e, "event handling failed");
            let language = match self.collab.sessions.get(&sender_id).await {
                Ok(Some(session)) => session.language,
                _ => "en".to_string(),
            };
            let text = self
                .translator
                .translate(&language, "Something went wrong. Please try again.");
            if let Err(e) = self.collab.send.send(&sender_id, MessageBody::Text(text)).await {
                error!(sender = %sender_id, error = %e, "failed to deliver error reply");
            }
        }
    }

    async fn route(&self, event: &MessagingEvent) -> Result<(), BotError> {
        if let Some(optin) = &event.optin {
            self.on_optin(event, optin).await
        } else if let Some(message) = &event.message {
            self.on_message(event, message).await
        } else if let Some(delivery) = &event.delivery {
            self.on_delivery(event, delivery);
            Ok(())
        } else if let Some(postback) = &event.postback {
            self.on_postback(event, postback).await
        } else {
            warn!(sender = %event.sender.id, "unknown messaging event");
            Ok(())
        }
    }

    // ====== Event handlers ======

    async fn on_optin(&self, event: &MessagingEvent, optin: &Optin) -> Result<(), BotError> {
        info!(
            sender = %event.sender.id,
            data_ref = optin.data_ref.as_deref().unwrap_or_default(),
            "received authentication"
        );
        let language = match self.collab.sessions.get(&event.sender.id).await? {
            Some(session) => session.language,
            None => "en".to_string(),
        };
        let text = self.translator.translate(
            &language,
            "Hi there, let’s get started. I’ll alert you when prices drop on Amazon. If you get lost, just type help. Or, use a few words to tell me what product you are searching for. For example, you could type “iPhone 6”, “Kindle Paperwhite” or “Xbox One”.",
        );
        self.collab
            .send
            .send(&event.sender.id, MessageBody::Text(text))
            .await?;
        Ok(())
    }

    fn on_delivery(&self, event: &MessagingEvent, delivery: &Delivery) {
        if let Some(mids) = &delivery.mids {
            for mid in mids {
                debug!(sender = %event.sender.id, mid = %mid, "delivery confirmed");
            }
        }
        debug!(
            sender = %event.sender.id,
            watermark = delivery.watermark,
            "messages before watermark delivered"
        );
    }

    async fn on_message(
        &self,
        event: &MessagingEvent,
        message: &InboundMessage,
    ) -> Result<(), BotError> {
        let sender_id = &event.sender.id;

        if let Some(mid) = &message.mid {
            if !self.seen_mids.lock().await.remember(mid) {
                debug!(sender = %sender_id, mid = %mid, "duplicate delivery skipped");
                return Ok(());
            }
        }

        self.collab
            .backend
            .save_message(sender_id, message.text.as_deref().unwrap_or_default())
            .await?;

        let session = match self.collab.sessions.get(sender_id).await? {
            Some(session) => session,
            None => self.bootstrap_session(sender_id).await?,
        };

        if !i18n::is_supported_region(&session.region) {
            return self
                .send_text(&session, "I'm sorry, but I'm not yet available in your country.")
                .await;
        }

        if let Some(text) = &message.text {
            let text = text.to_lowercase();
            match session.transaction.clone() {
                Some(transaction) => self.resume_transaction(&session, transaction, &text).await,
                None => self.run_command(&session, &text).await,
            }
        } else if message.attachments.is_some() {
            self.collab
                .send
                .send(
                    sender_id,
                    MessageBody::Text("Message with attachment received".to_string()),
                )
                .await?;
            Ok(())
        } else {
            Ok(())
        }
    }

    async fn on_postback(
        &self,
        event: &MessagingEvent,
        postback: &PostbackEvent,
    ) -> Result<(), BotError> {
        let sender_id = &event.sender.id;
        let postback = Postback::parse(&postback.payload)?;

        let session = self
            .collab
            .sessions
            .get(sender_id)
            .await?
            .ok_or_else(|| RouterError::NoSession(sender_id.clone()))?;

        if postback.is_stale(Utc::now()) {
            return self
                .send_text(
                    &session,
                    "Price and availability information for this product may have changed.",
                )
                .await;
        }
        let had_validity = postback.valid_from.is_some();

        match postback.intent {
            Intent::ActivatePriceAlert { item, region } => {
                self.activate_price_alert(&session, &item, &region).await
            }
            Intent::ShowProductDetails { item, region } => {
                self.show_product_details(&session, &item, &region).await
            }
            Intent::SetPriceType {
                item,
                price_type,
                alert_id,
            } => self.set_price_type(&session, &item, price_type, &alert_id).await,
            Intent::SetDesiredPrice {
                desired_price,
                custom_price_input,
                custom_price_input_example_price,
                item_title,
                alert_id,
                alert_created_at,
                price_type,
                region,
            } => {
                self.set_desired_price(
                    session,
                    desired_price,
                    custom_price_input,
                    custom_price_input_example_price,
                    item_title,
                    alert_id,
                    alert_created_at,
                    price_type,
                    region,
                    had_validity,
                )
                .await
            }
            Intent::DisactivatePriceAlert { alert_id } => {
                self.disactivate_price_alert(&session, &alert_id).await
            }
            Intent::ChangeDesiredPrice {
                asin,
                alert_id,
                region,
            } => self.change_desired_price(&session, &asin, &alert_id, &region).await,
            Intent::ListPriceWatches { page_number } => {
                self.list_price_watches(&session, page_number).await
            }
            Intent::ChangeSetting {
                setting,
                region,
                language,
            } => self.change_setting(session, setting, region, language).await,
            Intent::ShowSettings {} => self.show_settings(&session).await,
            Intent::SearchProduct {} => {
                self.send_text(
                    &session,
                    "What’re you searching for? Use a few words to tell me what product you are searching for. For example, you could type “iPhone 6” or “Kindle Paperwhite”.",
                )
                .await
            }
            Intent::ShowHelpInstructions {} => self.send_help(&session).await,
            Intent::RetainLanguageSettings { language_new } => {
                self.send_text_args(
                    &session,
                    "Ok! From now on the only language I understand is %s. If you want to revert this setting, just type settings.",
                    &[&language_new],
                )
                .await
            }
            Intent::RevertLanguageSettings { language_old } => {
                self.revert_language(session, language_old).await
            }
        }
    }

    // ====== Session bootstrap ======

    /// First contact: fetch the platform profile, sign the user up on
    /// the backend and seed a session from the result.
    async fn bootstrap_session(&self, sender_id: &str) -> Result<Session, BotError> {
        let profile = self.collab.send.profile(sender_id).await?;
        let user = User::from_profile(sender_id, &profile);
        let user = self.collab.backend.sign_up(&user).await?;
        let session = Session::from_user(&user);
        self.collab.sessions.put(&session).await?;
        info!(sender = %sender_id, user = %user.id, "new user signed up");
        Ok(session)
    }

    // ====== Free-text commands ======

    async fn run_command(&self, session: &Session, text: &str) -> Result<(), BotError> {
        let t = |source: &str| self.translator.translate(&session.language, source);

        if text.starts_with(&t("help")) {
            self.send_help(session).await
        } else if text.starts_with(&t("list")) {
            self.list_price_watches(session, 1).await
        } else if text.starts_with(&t("hi")) || text.starts_with(&t("hello")) {
            let menu = replies::menu_buttons(
                &self.translator,
                &session.language,
                t("Pick an option below to get going"),
                vec![
                    MenuEntry::SearchProduct,
                    MenuEntry::ListPriceWatches,
                    MenuEntry::ShowHelpInstructions,
                ],
            )?;
            self.collab.send.send(&session.sender_id, menu).await?;
            self.send_text(session, "Hi there, let’s get started.").await
        } else if text.starts_with(&t("settings")) {
            self.show_settings(session).await
        } else {
            self.search(session, text).await
        }
    }

    async fn send_help(&self, session: &Session) -> Result<(), BotError> {
        self.send_text(
            session,
            "Lost? Use a few words to tell me what product you are searching for. For example, you could type “iPhone 6”, “Kindle Paperwhite” or “Xbox One”. Or, just type one of the words below:\n\n  • list - to show your price watches\n  • settings - to see your settings",
        )
        .await
    }

    async fn search(&self, session: &Session, keywords: &str) -> Result<(), BotError> {
        let results = match self.collab.catalog.search(keywords, &session.region).await {
            Ok(results) => results,
            Err(e) => {
                warn!(sender = %session.sender_id, error = %e, "catalog search failed");
                return self.search_fallback(session).await;
            }
        };

        let items: Vec<Item> = results
            .iter()
            .map(|raw| normalize_search_result(raw, false))
            .collect();
        let cards = replies::search_result_cards(
            &self.translator,
            &self.config,
            &session.language,
            &session.region,
            &items,
        );

        if cards.is_empty() {
            self.search_fallback(session).await
        } else {
            self.send_text_args(session, "Search results for \"%s\"", &[keywords])
                .await?;
            self.collab
                .send
                .send(&session.sender_id, MessageBody::Cards(cards))
                .await?;
            Ok(())
        }
    }

    /// Empty or failed search: offer the menu and say so.
    async fn search_fallback(&self, session: &Session) -> Result<(), BotError> {
        let menu = replies::menu_buttons(
            &self.translator,
            &session.language,
            self.translator
                .translate(&session.language, "Try again or pick one of the options below:"),
            vec![MenuEntry::SearchProduct, MenuEntry::ShowHelpInstructions],
        )?;
        self.collab.send.send(&session.sender_id, menu).await?;
        self.send_text(session, "Not sure I understand what you're searching for.")
            .await
    }

    // ====== Transactions ======

    async fn resume_transaction(
        &self,
        session: &Session,
        transaction: Transaction,
        text: &str,
    ) -> Result<(), BotError> {
        let Transaction::CustomPriceInput {
            example_price,
            item_title,
            alert_id,
            alert_created_at,
            price_type,
            region,
        } = transaction;

        let suggestions = parse_custom_price_input(text);
        if suggestions.is_empty() {
            return self
                .send_text_args(
                    session,
                    "The price must be a number greater than or equal to zero. For example, you could type %s",
                    &[&example_price],
                )
                .await;
        }

        let body = replies::price_suggestion_buttons(
            &self.translator,
            &self.config,
            &session.language,
            &suggestions,
            &item_title,
            &alert_id,
            alert_created_at,
            price_type,
            region.as_deref(),
        )?;
        self.collab.send.send(&session.sender_id, body).await?;
        Ok(())
    }

    // ====== Intent handlers ======

    async fn activate_price_alert(
        &self,
        session: &Session,
        item: &Item,
        region: &str,
    ) -> Result<(), BotError> {
        let asin = item.asin.clone().unwrap_or_default();
        let results = self.collab.catalog.lookup(&asin, region).await?;
        let raw = results
            .first()
            .ok_or_else(|| CollaboratorError::NotFound(asin.clone()))?;
        let full = normalize_search_result(raw, true);

        let title = full.title.clone().unwrap_or_default();
        self.send_text_args(
            session,
            "Create price watch for \"%s\"",
            &[&truncate_string(&title, 250, "…")],
        )
        .await?;

        let product = match self.collab.backend.find_product_by_asin(&asin).await? {
            Some(mut product) => {
                product.merge_region(region, &full);
                self.collab.backend.save_product(&product).await?
            }
            None => {
                self.collab
                    .backend
                    .save_product(&Product::from_item(&full, region))
                    .await?
            }
        };

        let price = self
            .collab
            .backend
            .save_price(&PriceSnapshot {
                id: String::new(),
                product_id: product.id.clone(),
                region: region.to_string(),
                prices: full.price.clone(),
            })
            .await?;

        let alert = self
            .collab
            .backend
            .save_alert(&PriceAlert {
                id: String::new(),
                product_id: product.id,
                user_id: session.user_id.clone(),
                active: false,
                region: region.to_string(),
                price_type: None,
                desired_price: None,
                current_price_id: price.id.clone(),
                price_when_tracked_id: price.id,
                created_at: Utc::now(),
            })
            .await?;

        let body =
            replies::set_price_type_card(&self.translator, &session.language, item, &alert)?;
        self.collab.send.send(&session.sender_id, body).await?;
        Ok(())
    }

    async fn set_price_type(
        &self,
        session: &Session,
        item: &Item,
        price_type: PriceType,
        alert_id: &str,
    ) -> Result<(), BotError> {
        let mut alert = self
            .collab
            .backend
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| CollaboratorError::NotFound(alert_id.to_string()))?;
        alert.price_type = Some(price_type);
        let alert = self.collab.backend.save_alert(&alert).await?;

        let currency = self.config.currency_format(
            item.currency_code
                .as_deref()
                .unwrap_or_else(|| currency_for_region(&alert.region)),
        );
        let formatted = format_price(item.price.get(price_type).unwrap_or_default(), &currency);
        let label = self
            .translator
            .translate(&session.language, price_type.label());
        self.send_text_args(
            session,
            "The current %s for this item is %s",
            &[&label, &formatted],
        )
        .await?;

        let body = replies::set_desired_price_cards(
            &self.translator,
            &self.config,
            &session.language,
            item,
            &alert,
            price_type,
            true,
        )?;
        self.collab.send.send(&session.sender_id, body).await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn set_desired_price(
        &self,
        mut session: Session,
        desired_price: i64,
        custom_price_input: bool,
        example_price: Option<String>,
        item_title: String,
        alert_id: String,
        alert_created_at: DateTime<Utc>,
        price_type: PriceType,
        region: Option<String>,
        had_validity: bool,
    ) -> Result<(), BotError> {
        if custom_price_input {
            let example_price = example_price.unwrap_or_default();
            session.transaction = Some(Transaction::CustomPriceInput {
                example_price: example_price.clone(),
                item_title,
                alert_id,
                alert_created_at,
                price_type,
                region,
            });
            self.collab.sessions.put(&session).await?;
            return self
                .send_text_args(
                    &session,
                    "Enter a valid price. For example, you could type %s",
                    &[&example_price],
                )
                .await;
        }

        let mut alert = self
            .collab
            .backend
            .get_alert(&alert_id)
            .await?
            .ok_or_else(|| CollaboratorError::NotFound(alert_id.clone()))?;
        alert.desired_price = Some(desired_price);
        alert.active = true;
        let alert = self.collab.backend.save_alert(&alert).await?;

        session.transaction = None;
        self.collab.sessions.put(&session).await?;

        // A validity-checked button means the alert is being finished
        // for the first time; without one this is an update to an
        // existing alert.
        if had_validity {
            let label = self
                .translator
                .translate(&session.language, price_type.label());
            self.send_text_args(
                &session,
                "You have tracked the %s for \"%s\"",
                &[&label, &truncate_string(&item_title, 250, "…")],
            )
            .await?;
            self.collab.backend.increment_tracked(&alert.product_id).await?;
        } else {
            self.send_text(&session, "Price watch updated.").await?;
        }
        Ok(())
    }

    async fn disactivate_price_alert(
        &self,
        session: &Session,
        alert_id: &str,
    ) -> Result<(), BotError> {
        let mut alert = self
            .collab
            .backend
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| CollaboratorError::NotFound(alert_id.to_string()))?;
        alert.active = false;
        self.collab.backend.save_alert(&alert).await?;
        self.send_text(session, "Price watch deleted.").await
    }

    async fn change_desired_price(
        &self,
        session: &Session,
        asin: &str,
        alert_id: &str,
        region: &str,
    ) -> Result<(), BotError> {
        let results = self.collab.catalog.lookup(asin, region).await?;
        let raw = results
            .first()
            .ok_or_else(|| CollaboratorError::NotFound(asin.to_string()))?;
        let item = normalize_search_result(raw, false);

        let alert = self
            .collab
            .backend
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| CollaboratorError::NotFound(alert_id.to_string()))?;
        let price_type = alert.price_type.unwrap_or(PriceType::Amazon);

        let body = replies::set_desired_price_cards(
            &self.translator,
            &self.config,
            &session.language,
            &item,
            &alert,
            price_type,
            false,
        )?;
        self.collab.send.send(&session.sender_id, body).await?;
        Ok(())
    }

    async fn list_price_watches(
        &self,
        session: &Session,
        page_number: u32,
    ) -> Result<(), BotError> {
        let page_number = page_number.max(1);
        let skip = (page_number as usize - 1) * replies::PAGE_SIZE;
        // One past the page size, to know whether a next page exists.
        let alerts = self
            .collab
            .backend
            .alerts_for_user(&session.user_id, true, replies::PAGE_SIZE + 1, skip)
            .await?;

        if alerts.is_empty() {
            return self
                .send_text(
                    session,
                    "You haven't created any price watches yet. Use a few words to tell me what product you are searching for. For example, you could type “iPhone 6” or “Kindle Paperwhite”",
                )
                .await;
        }

        let (header, body) = replies::price_watch_page(
            &self.translator,
            &self.config,
            &session.language,
            page_number,
            &alerts,
        )?;
        self.collab
            .send
            .send(&session.sender_id, MessageBody::Text(header))
            .await?;
        self.collab.send.send(&session.sender_id, body).await?;
        Ok(())
    }

    async fn change_setting(
        &self,
        mut session: Session,
        setting: Setting,
        region: Option<String>,
        language: Option<String>,
    ) -> Result<(), BotError> {
        match setting {
            Setting::Region => match region {
                Some(region) => {
                    session.region = region.clone();
                    self.collab.sessions.put(&session).await?;
                    let country = self.translator.country_name(&session.language, &region);
                    self.send_text_args(
                        &session,
                        "Great. You have changed the Amazon shop to %s. If you're now searching for a product, I search for you the Amazon shop %s. To reverse this setting, just type settings.",
                        &[&country, &country],
                    )
                    .await
                }
                None => {
                    let body = replies::setting_option_cards(
                        &self.translator,
                        &session.language,
                        Setting::Region,
                        &i18n::SUPPORTED_REGIONS,
                        self.translator
                            .translate(&session.language, "Change Amazon Shop"),
                        self.translator
                            .translate(&session.language, "Pick an option below"),
                    )?;
                    self.collab.send.send(&session.sender_id, body).await?;
                    Ok(())
                }
            },
            Setting::Language => match language {
                Some(language_new) => {
                    let language_old = session.language.clone();
                    session.language = language_new.clone();
                    self.collab.sessions.put(&session).await?;

                    // The retain/revert question still speaks the old
                    // language; the confirmation already the new one.
                    let menu = replies::menu_buttons(
                        &self.translator,
                        &language_old,
                        self.translator.translate(
                            &language_old,
                            "Do you want to retain the change of the language setting?",
                        ),
                        vec![
                            MenuEntry::RetainLanguage {
                                language_new: self
                                    .translator
                                    .language_name(&language_new, &language_new),
                            },
                            MenuEntry::RevertLanguage {
                                language_old: language_old.clone(),
                            },
                        ],
                    )?;
                    self.collab.send.send(&session.sender_id, menu).await?;

                    let name = self
                        .translator
                        .language_name(&language_new, &language_new);
                    let text = interpolate(
                        &self.translator.translate(
                            &language_new,
                            "Great. You have changed the language to %s.",
                        ),
                        &[&name],
                    );
                    self.collab
                        .send
                        .send(&session.sender_id, MessageBody::Text(text))
                        .await?;
                    Ok(())
                }
                None => {
                    let body = replies::setting_option_cards(
                        &self.translator,
                        &session.language,
                        Setting::Language,
                        &i18n::SUPPORTED_LANGUAGES,
                        self.translator
                            .translate(&session.language, "Change Language"),
                        self.translator
                            .translate(&session.language, "Pick an option below"),
                    )?;
                    self.collab.send.send(&session.sender_id, body).await?;
                    Ok(())
                }
            },
        }
    }

    async fn revert_language(
        &self,
        mut session: Session,
        language_old: String,
    ) -> Result<(), BotError> {
        session.language = language_old.clone();
        self.collab.sessions.put(&session).await?;
        let name = self.translator.language_name(&language_old, &language_old);
        self.send_text_args(&session, "Ok! The language has been reverted to %s.", &[&name])
            .await
    }

    async fn show_settings(&self, session: &Session) -> Result<(), BotError> {
        let shop = self
            .translator
            .country_name(&session.language, &session.region);
        let language = self
            .translator
            .language_name(&session.language, &session.language);
        let text = interpolate(
            &self.translator.translate(
                &session.language,
                "You're wondering about your settings?\n\nAmazon Shop: %s\nLanguage: %s\n\nTo change any setting, just pick an option below:",
            ),
            &[&shop, &language],
        );
        let menu = replies::menu_buttons(
            &self.translator,
            &session.language,
            text,
            vec![MenuEntry::ChangeSettingRegion, MenuEntry::ChangeSettingLanguage],
        )?;
        self.collab.send.send(&session.sender_id, menu).await?;
        Ok(())
    }

    async fn show_product_details(
        &self,
        session: &Session,
        item: &Item,
        region: &str,
    ) -> Result<(), BotError> {
        let asin = item.asin.clone().unwrap_or_default();
        let results = self.collab.catalog.lookup(&asin, region).await?;
        let raw = results
            .first()
            .ok_or_else(|| CollaboratorError::NotFound(asin))?;
        let full = normalize_search_result(raw, true);

        let menu = replies::menu_buttons(
            &self.translator,
            &session.language,
            self.translator.translate(&session.language, "What next?"),
            vec![
                MenuEntry::ActivatePriceAlert {
                    item: item.clone(),
                    region: region.to_string(),
                },
                MenuEntry::GoToWebsite {
                    url: full.detail_page_url.clone().unwrap_or_default(),
                },
            ],
        )?;
        self.collab.send.send(&session.sender_id, menu).await?;

        let title = full.title.clone().unwrap_or_default();
        self.collab
            .send
            .send(
                &session.sender_id,
                MessageBody::Text(truncate_string(&title, 317, "…")),
            )
            .await?;
        Ok(())
    }

    // ====== Reply helpers ======

    async fn send_text(&self, session: &Session, source: &str) -> Result<(), BotError> {
        let text = self.translator.translate(&session.language, source);
        self.collab
            .send
            .send(&session.sender_id, MessageBody::Text(text))
            .await?;
        Ok(())
    }

    async fn send_text_args(
        &self,
        session: &Session,
        source: &str,
        args: &[&str],
    ) -> Result<(), BotError> {
        let text = interpolate(&self.translator.translate(&session.language, source), args);
        self.collab
            .send
            .send(&session.sender_id, MessageBody::Text(text))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mid_window_dedup_and_eviction() {
        let mut window = MidWindow::default();
        assert!(window.remember("mid.1"));
        assert!(!window.remember("mid.1"));

        for i in 0..MID_WINDOW {
            window.remember(&format!("mid.fill.{i}"));
        }
        // The original id was evicted and counts as new again.
        assert!(window.remember("mid.1"));
    }
}
