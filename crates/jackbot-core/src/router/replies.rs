//! Builders for the structured outbound messages: menus, search result
//! carousels, alert-creation cards and the price-watch listing.

use chrono::Utc;

use crate::channel::messenger::{Button, Card, MessageBody};
use crate::config::Config;
use crate::domain::price::{calculate_desired_price_examples, format_price};
use crate::error::RouterError;
use crate::i18n::{currency_for_region, Translator};
use crate::intent::{Intent, Postback, Setting};
use crate::types::{AlertWithProduct, Item, PriceAlert, PriceType};
use crate::util::truncate_string;

/// Alerts per listing page.
pub const PAGE_SIZE: usize = 10;

/// One entry of a dynamic menu, mirroring the intents a menu button
/// can carry.
pub enum MenuEntry {
    SearchProduct,
    ListPriceWatches,
    ShowSettings,
    ActivatePriceAlert { item: Item, region: String },
    GoToWebsite { url: String },
    ShowHelpInstructions,
    ChangeSettingRegion,
    ChangeSettingLanguage,
    RetainLanguage { language_new: String },
    RevertLanguage { language_old: String },
}

/// A button-template menu assembled from intent entries.
pub fn menu_buttons(
    t: &Translator,
    language: &str,
    text: String,
    entries: Vec<MenuEntry>,
) -> Result<MessageBody, RouterError> {
    let mut buttons = Vec::new();
    for entry in entries {
        let button = match entry {
            MenuEntry::SearchProduct => Button::Postback {
                title: t.translate(language, "Search product"),
                payload: Postback::new(Intent::SearchProduct {}).to_payload()?,
            },
            MenuEntry::ListPriceWatches => Button::Postback {
                title: t.translate(language, "Your Price Watches"),
                payload: Postback::new(Intent::ListPriceWatches { page_number: 1 }).to_payload()?,
            },
            MenuEntry::ShowSettings => Button::Postback {
                title: t.translate(language, "Change Settings"),
                payload: Postback::new(Intent::ShowSettings {}).to_payload()?,
            },
            MenuEntry::ActivatePriceAlert { item, region } => Button::Postback {
                title: t.translate(language, "Create price watch"),
                payload: Postback::valid_from(
                    Intent::ActivatePriceAlert { item, region },
                    Utc::now(),
                )
                .to_payload()?,
            },
            MenuEntry::GoToWebsite { url } => Button::WebUrl {
                title: t.translate(language, "Go to Website"),
                url,
            },
            MenuEntry::ShowHelpInstructions => Button::Postback {
                title: t.translate(language, "Help"),
                payload: Postback::new(Intent::ShowHelpInstructions {}).to_payload()?,
            },
            MenuEntry::ChangeSettingRegion => Button::Postback {
                title: t.translate(language, "Change Amazon Shop"),
                payload: Postback::new(Intent::ChangeSetting {
                    setting: Setting::Region,
                    region: None,
                    language: None,
                })
                .to_payload()?,
            },
            MenuEntry::ChangeSettingLanguage => Button::Postback {
                title: t.translate(language, "Change Language"),
                payload: Postback::new(Intent::ChangeSetting {
                    setting: Setting::Language,
                    region: None,
                    language: None,
                })
                .to_payload()?,
            },
            MenuEntry::RetainLanguage { language_new } => Button::Postback {
                title: t.translate(language, "Yes"),
                payload: Postback::new(Intent::RetainLanguageSettings { language_new })
                    .to_payload()?,
            },
            MenuEntry::RevertLanguage { language_old } => Button::Postback {
                title: t.translate(language, "No"),
                payload: Postback::new(Intent::RevertLanguageSettings { language_old })
                    .to_payload()?,
            },
        };
        buttons.push(button);
    }
    Ok(MessageBody::Buttons { text, buttons })
}

/// Carousel of display-eligible search results. Items whose payload
/// would exceed the platform limit are skipped.
pub fn search_result_cards(
    t: &Translator,
    config: &Config,
    language: &str,
    region: &str,
    items: &[Item],
) -> Vec<Card> {
    let mut cards = Vec::new();
    for item in items {
        if !item.is_display_eligible() {
            continue;
        }
        let currency = config.currency_format(
            item.currency_code
                .as_deref()
                .unwrap_or_else(|| currency_for_region(region)),
        );
        let not_in_stock = t.translate(language, "Not in Stock");
        let price_cell = |amount: Option<i64>| match amount {
            Some(minor) => format_price(minor, &currency),
            None => not_in_stock.clone(),
        };

        let title = item.title.clone().unwrap_or_default();
        let asin = item.asin.clone().unwrap_or_default();
        let detail_url = item.detail_page_url.clone().unwrap_or_default();
        let subtitle = crate::i18n::interpolate(
            &t.translate(language, "Amazon: %s | 3rd Party New: %s | 3rd Party Used: %s"),
            &[
                &price_cell(item.price.amazon_price),
                &price_cell(item.price.third_party_new_price),
                &price_cell(item.price.third_party_used_price),
            ],
        );

        let activate = Postback::valid_from(
            Intent::ActivatePriceAlert {
                item: item.clone(),
                region: region.to_string(),
            },
            Utc::now(),
        )
        .to_payload();
        let details = Postback::valid_from(
            Intent::ShowProductDetails {
                item: item.clone(),
                region: region.to_string(),
            },
            Utc::now(),
        )
        .to_payload();

        let (activate, details) = match (activate, details) {
            (Ok(a), Ok(d)) => (a, d),
            _ => {
                tracing::warn!(asin = %asin, "skipping result with oversized payload");
                continue;
            }
        };

        cards.push(Card {
            title: format!("{} ({})", title, asin),
            subtitle,
            image_url: item
                .image_url
                .as_deref()
                .map(|url| config.image_proxy.fit_url(url))
                .unwrap_or_default(),
            item_url: String::new(),
            buttons: vec![
                Button::Postback {
                    title: t.translate(language, "Create price watch"),
                    payload: activate,
                },
                Button::Postback {
                    title: t.translate(language, "Details"),
                    payload: details,
                },
                Button::WebUrl {
                    title: t.translate(language, "Go to Website"),
                    url: detail_url,
                },
            ],
        });
    }
    cards
}

/// Card asking which price type to track, one button per available
/// observation on the item.
pub fn set_price_type_card(
    t: &Translator,
    language: &str,
    item: &Item,
    alert: &PriceAlert,
) -> Result<MessageBody, RouterError> {
    let mut buttons = Vec::new();
    for price_type in item.price.available() {
        buttons.push(Button::Postback {
            title: t.translate(language, price_type.short_label()),
            payload: Postback::valid_from(
                Intent::SetPriceType {
                    item: item.clone(),
                    price_type,
                    alert_id: alert.id.clone(),
                },
                alert.created_at,
            )
            .to_payload()?,
        });
    }

    Ok(MessageBody::Cards(vec![Card {
        title: t.translate(language, "Set price type"),
        subtitle: t.translate(language, "What price type do you want to track?"),
        buttons,
        ..Default::default()
    }]))
}

/// The two desired-price cards: a "just under" anchor plus four
/// percentage discounts, and a custom-input escape hatch. With
/// `validity_check` the buttons expire relative to the alert's
/// creation time; without it (re-opening an existing alert) they
/// never go stale.
pub fn set_desired_price_cards(
    t: &Translator,
    config: &Config,
    language: &str,
    item: &Item,
    alert: &PriceAlert,
    price_type: PriceType,
    validity_check: bool,
) -> Result<MessageBody, RouterError> {
    let price = item.price.get(price_type).unwrap_or_default();
    let currency = config.currency_format(
        item.currency_code
            .as_deref()
            .unwrap_or_else(|| currency_for_region(&alert.region)),
    );
    let examples = calculate_desired_price_examples(price);
    let formatted: Vec<String> = examples
        .iter()
        .map(|minor| format_price(*minor, &currency))
        .collect();
    let item_title = item.title.clone().unwrap_or_default();

    let payload_for = |desired_price: i64, custom: bool, example: Option<String>| {
        let intent = Intent::SetDesiredPrice {
            desired_price,
            custom_price_input: custom,
            custom_price_input_example_price: example,
            item_title: item_title.clone(),
            alert_id: alert.id.clone(),
            alert_created_at: alert.created_at,
            price_type,
            region: Some(alert.region.clone()),
        };
        if validity_check {
            Postback::valid_from(intent, alert.created_at).to_payload()
        } else {
            Postback::new(intent).to_payload()
        }
    };

    let anchor_button = |label: &str, index: usize| -> Result<Button, RouterError> {
        Ok(Button::Postback {
            title: format!("{} ({})", t.translate(language, label), formatted[index]),
            payload: payload_for(examples[index], false, None)?,
        })
    };

    let title = t.translate(language, "Set desired price");
    let subtitle = t.translate(language, "At what price would you like to receive an alert?");

    Ok(MessageBody::Cards(vec![
        Card {
            title: title.clone(),
            subtitle: subtitle.clone(),
            buttons: vec![
                anchor_button("-0,01", 0)?,
                anchor_button("-3%", 1)?,
                anchor_button("-5%", 2)?,
            ],
            ..Default::default()
        },
        Card {
            title,
            subtitle,
            buttons: vec![
                anchor_button("-7%", 3)?,
                anchor_button("-10%", 4)?,
                Button::Postback {
                    title: t.translate(language, "Custom Input"),
                    payload: payload_for(0, true, Some(formatted[0].clone()))?,
                },
            ],
            ..Default::default()
        },
    ]))
}

/// Button template offering the interpretations of a typed price.
pub fn price_suggestion_buttons(
    t: &Translator,
    config: &Config,
    language: &str,
    suggestions: &[i64],
    item_title: &str,
    alert_id: &str,
    alert_created_at: chrono::DateTime<Utc>,
    price_type: PriceType,
    region: Option<&str>,
) -> Result<MessageBody, RouterError> {
    let currency = config.currency_format(currency_for_region(region.unwrap_or_default()));
    let mut buttons = Vec::new();
    for suggestion in suggestions.iter().take(2) {
        buttons.push(Button::Postback {
            title: format_price(*suggestion, &currency),
            payload: Postback::valid_from(
                Intent::SetDesiredPrice {
                    desired_price: *suggestion,
                    custom_price_input: false,
                    custom_price_input_example_price: None,
                    item_title: item_title.to_string(),
                    alert_id: alert_id.to_string(),
                    alert_created_at,
                    price_type,
                    region: region.map(str::to_string),
                },
                Utc::now(),
            )
            .to_payload()?,
        });
    }

    Ok(MessageBody::Buttons {
        text: t.translate(
            language,
            "Pick one of the options below or try again to enter a valid price",
        ),
        buttons,
    })
}

/// Setting options as cards of three buttons each.
pub fn setting_option_cards(
    t: &Translator,
    language: &str,
    setting: Setting,
    options: &[&str],
    title: String,
    subtitle: String,
) -> Result<MessageBody, RouterError> {
    let mut cards = Vec::new();
    let mut buttons = Vec::new();
    for (i, option) in options.iter().enumerate() {
        let (button_title, region, lang_value) = match setting {
            Setting::Region => (t.country_name(language, option), Some(option.to_string()), None),
            Setting::Language => (
                t.language_name(language, option),
                None,
                Some(option.to_string()),
            ),
        };
        buttons.push(Button::Postback {
            title: button_title,
            payload: Postback::new(Intent::ChangeSetting {
                setting,
                region,
                language: lang_value,
            })
            .to_payload()?,
        });

        if buttons.len() == 3 || i + 1 == options.len() {
            cards.push(Card {
                title: title.clone(),
                subtitle: subtitle.clone(),
                buttons: std::mem::take(&mut buttons),
                ..Default::default()
            });
        }
    }
    Ok(MessageBody::Cards(cards))
}

/// One page of the price-watch listing: the page header text plus up
/// to ten cards, the tenth carrying a "More price watches" button when
/// a further page exists.
pub fn price_watch_page(
    t: &Translator,
    config: &Config,
    language: &str,
    page_number: u32,
    alerts: &[AlertWithProduct],
) -> Result<(String, MessageBody), RouterError> {
    let from = (page_number as usize - 1) * PAGE_SIZE + 1;
    let shown = alerts.len().min(PAGE_SIZE);
    let to = from + shown - 1;

    let header = if page_number == 1 {
        crate::i18n::interpolate(
            &t.translate(
                language,
                "Here're your price watches. I'll send you an alert when the current price for any of the products you are watching falls below your desired price.\n\n Price watches %s to %s:",
            ),
            &[&from.to_string(), &to.to_string()],
        )
    } else {
        crate::i18n::interpolate(
            &t.translate(language, "Price watches %s to %s:"),
            &[&from.to_string(), &to.to_string()],
        )
    };

    let has_more = alerts.len() > PAGE_SIZE;
    let mut cards = Vec::new();
    for (i, entry) in alerts.iter().take(PAGE_SIZE).enumerate() {
        let alert = &entry.alert;
        let currency = config.currency_format(currency_for_region(&alert.region));
        let not_in_stock = t.translate(language, "Not in Stock");

        let current = alert
            .price_type
            .and_then(|pt| entry.current_price.prices.get(pt))
            .map(|minor| format_price(minor, &currency))
            .unwrap_or_else(|| not_in_stock.clone());
        let desired = alert
            .desired_price
            .map(|minor| format_price(minor, &currency))
            .unwrap_or_else(|| not_in_stock.clone());

        let mut buttons = vec![
            Button::Postback {
                title: t.translate(language, "Change desired price"),
                payload: Postback::new(Intent::ChangeDesiredPrice {
                    asin: entry.product.asin.clone(),
                    alert_id: alert.id.clone(),
                    region: alert.region.clone(),
                })
                .to_payload()?,
            },
            Button::Postback {
                title: t.translate(language, "Delete price watch"),
                payload: Postback::new(Intent::DisactivatePriceAlert {
                    alert_id: alert.id.clone(),
                })
                .to_payload()?,
            },
        ];
        if has_more && i + 1 == PAGE_SIZE {
            buttons.push(Button::Postback {
                title: t.translate(language, "More price watches"),
                payload: Postback::new(Intent::ListPriceWatches {
                    page_number: page_number + 1,
                })
                .to_payload()?,
            });
        }

        let title = entry
            .product
            .title
            .get(&alert.region)
            .cloned()
            .or_else(|| entry.product.title.values().next().cloned())
            .unwrap_or_default();

        cards.push(Card {
            title: truncate_string(&title, 80, "…"),
            subtitle: crate::i18n::interpolate(
                &t.translate(language, "Current price: %s | Your Desired price: %s"),
                &[&current, &desired],
            ),
            image_url: entry
                .product
                .image_url
                .as_deref()
                .map(|url| config.image_proxy.fit_url(url))
                .unwrap_or_default(),
            item_url: String::new(),
            buttons,
        });
    }

    Ok((header, MessageBody::Cards(cards)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemPrices, PriceSnapshot, Product};

    fn translator() -> Translator {
        Translator::new()
    }

    fn config() -> Config {
        crate::config::load_config(Some(std::path::Path::new(
            "/tmp/nonexistent_jackbot_test.json",
        )))
    }

    fn item() -> Item {
        Item {
            asin: Some("B00X4WHP5E".into()),
            title: Some("Echo Dot".into()),
            detail_page_url: Some("https://www.amazon.de/dp/B00X4WHP5E".into()),
            image_url: Some("https://img.example.com/echo.jpg".into()),
            price: ItemPrices {
                amazon_price: Some(1099),
                third_party_used_price: Some(899),
                ..Default::default()
            },
            currency_code: Some("EUR".into()),
            ..Default::default()
        }
    }

    fn alert() -> PriceAlert {
        PriceAlert {
            id: "a1".into(),
            product_id: "p1".into(),
            user_id: "u1".into(),
            active: false,
            region: "de_DE".into(),
            price_type: Some(PriceType::Amazon),
            desired_price: Some(999),
            current_price_id: "pr1".into(),
            price_when_tracked_id: "pr1".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_search_cards_skip_ineligible() {
        let ineligible = Item {
            asin: Some("B000".into()),
            ..Default::default()
        };
        let cards = search_result_cards(
            &translator(),
            &config(),
            "en",
            "de_DE",
            &[item(), ineligible],
        );
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Echo Dot (B00X4WHP5E)");
        assert!(cards[0].subtitle.contains("€ 10,99"));
        assert!(cards[0].subtitle.contains("Not in Stock"));
        assert_eq!(cards[0].buttons.len(), 3);
    }

    #[test]
    fn test_set_price_type_card_one_button_per_observation() {
        let body = set_price_type_card(&translator(), "en", &item(), &alert()).unwrap();
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        let titles: Vec<&str> = cards[0].buttons.iter().map(|b| match b {
            Button::Postback { title, .. } => title.as_str(),
            Button::WebUrl { title, .. } => title.as_str(),
        }).collect();
        assert_eq!(titles, vec!["Amazon", "3rd Party Used"]);
    }

    #[test]
    fn test_desired_price_cards_layout() {
        let body = set_desired_price_cards(
            &translator(),
            &config(),
            "en",
            &item(),
            &alert(),
            PriceType::Amazon,
            true,
        )
        .unwrap();
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].buttons.len(), 3);
        assert_eq!(cards[1].buttons.len(), 3);

        // First anchor is price-1 of the amazon price, 1099 -> 1098.
        let Button::Postback { title, payload } = &cards[0].buttons[0] else {
            panic!("expected postback");
        };
        assert_eq!(title, "-0,01 (€ 10,98)");
        let parsed = Postback::parse(payload).unwrap();
        assert!(parsed.valid_from.is_some());
        assert!(matches!(
            parsed.intent,
            Intent::SetDesiredPrice { desired_price: 1098, custom_price_input: false, .. }
        ));

        // Last button of the second card is the custom input.
        let Button::Postback { payload, .. } = &cards[1].buttons[2] else {
            panic!("expected postback");
        };
        assert!(matches!(
            Postback::parse(payload).unwrap().intent,
            Intent::SetDesiredPrice { custom_price_input: true, .. }
        ));
    }

    #[test]
    fn test_desired_price_cards_without_validity_never_stale() {
        let body = set_desired_price_cards(
            &translator(),
            &config(),
            "en",
            &item(),
            &alert(),
            PriceType::Amazon,
            false,
        )
        .unwrap();
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        let Button::Postback { payload, .. } = &cards[0].buttons[0] else {
            panic!("expected postback");
        };
        assert_eq!(Postback::parse(payload).unwrap().valid_from, None);
    }

    #[test]
    fn test_setting_option_cards_grouped_in_threes() {
        let body = setting_option_cards(
            &translator(),
            "en",
            Setting::Region,
            &crate::i18n::SUPPORTED_REGIONS,
            "Change Amazon Shop".into(),
            "Pick an option below".into(),
        )
        .unwrap();
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].buttons.len(), 3);

        let body = setting_option_cards(
            &translator(),
            "en",
            Setting::Language,
            &["en", "de"],
            "Change Language".into(),
            "Pick an option below".into(),
        )
        .unwrap();
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        assert_eq!(cards[0].buttons.len(), 2);
    }

    fn listing(count: usize) -> Vec<AlertWithProduct> {
        (0..count)
            .map(|i| {
                let mut product = Product {
                    id: format!("p{i}"),
                    asin: format!("B{i:09}"),
                    ..Default::default()
                };
                product.title.insert("de_DE".into(), format!("Product {i}"));
                AlertWithProduct {
                    alert: PriceAlert {
                        id: format!("a{i}"),
                        active: true,
                        ..alert()
                    },
                    product,
                    current_price: PriceSnapshot {
                        id: "pr1".into(),
                        product_id: format!("p{i}"),
                        region: "de_DE".into(),
                        prices: ItemPrices {
                            amazon_price: Some(1099),
                            ..Default::default()
                        },
                    },
                }
            })
            .collect()
    }

    #[test]
    fn test_price_watch_page_first_page() {
        let (header, body) =
            price_watch_page(&translator(), &config(), "en", 1, &listing(3)).unwrap();
        assert!(header.contains("1 to 3"));
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].buttons.len(), 2);
        assert!(cards[0].subtitle.contains("€ 10,99"));
        assert!(cards[0].subtitle.contains("€ 9,99"));
    }

    #[test]
    fn test_price_watch_page_more_button() {
        // Eleven results returned for a ten-per-page listing: the
        // tenth card links to the next page.
        let (header, body) =
            price_watch_page(&translator(), &config(), "en", 1, &listing(11)).unwrap();
        assert!(header.contains("1 to 10"));
        let MessageBody::Cards(cards) = body else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 10);
        assert_eq!(cards[9].buttons.len(), 3);
        let Button::Postback { payload, .. } = &cards[9].buttons[2] else {
            panic!("expected postback");
        };
        assert!(matches!(
            Postback::parse(payload).unwrap().intent,
            Intent::ListPriceWatches { page_number: 2 }
        ));
    }

    #[test]
    fn test_price_watch_second_page_header() {
        let (header, _) =
            price_watch_page(&translator(), &config(), "en", 2, &listing(2)).unwrap();
        assert!(header.contains("11 to 12"));
    }
}
