//! Normalization of raw catalog search results into canonical items.
//!
//! Search results arrive as deeply nested JSON where almost every
//! field is wrapped in a one-element array. Missing leaves stay
//! `None`, never zero or empty string.

use serde_json::Value;

use crate::types::{Item, ItemPrices};

/// Walk a path of object keys, unwrapping the one-element array at
/// each step when present.
fn node<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = raw;
    for key in path {
        current = current.get(key)?;
        if let Some(array) = current.as_array() {
            current = array.first()?;
        }
    }
    Some(current)
}

fn leaf_str(raw: &Value, path: &[&str]) -> Option<String> {
    node(raw, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Amounts appear both as JSON numbers and as numeric strings.
fn leaf_amount(raw: &Value, path: &[&str]) -> Option<i64> {
    let value = node(raw, path)?;
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Extract a canonical item from one raw search result.
///
/// Image selection picks the first available of the large, medium and
/// small variants. When `detailed` is false the categorization fields
/// used only by the product upsert are skipped.
pub fn normalize_search_result(raw: &Value, detailed: bool) -> Item {
    let image_url = leaf_str(raw, &["LargeImage", "URL"])
        .or_else(|| leaf_str(raw, &["MediumImage", "URL"]))
        .or_else(|| leaf_str(raw, &["SmallImage", "URL"]));

    let price = ItemPrices {
        amazon_price: leaf_amount(
            raw,
            &["Offers", "Offer", "OfferListing", "Price", "Amount"],
        ),
        third_party_new_price: leaf_amount(raw, &["OfferSummary", "LowestNewPrice", "Amount"]),
        third_party_used_price: leaf_amount(raw, &["OfferSummary", "LowestUsedPrice", "Amount"]),
    };

    let currency_code = leaf_str(
        raw,
        &["Offers", "Offer", "OfferListing", "Price", "CurrencyCode"],
    )
    .or_else(|| leaf_str(raw, &["OfferSummary", "LowestNewPrice", "CurrencyCode"]))
    .or_else(|| leaf_str(raw, &["OfferSummary", "LowestUsedPrice", "CurrencyCode"]));

    let mut item = Item {
        asin: leaf_str(raw, &["ASIN"]),
        title: leaf_str(raw, &["ItemAttributes", "Title"]),
        image_url,
        detail_page_url: leaf_str(raw, &["DetailPageURL"]),
        price,
        currency_code,
        ..Default::default()
    };

    if detailed {
        item.product_group = leaf_str(raw, &["ItemAttributes", "ProductGroup"]);
        item.category = leaf_str(raw, &["ItemAttributes", "Binding"]);
        item.manufacturer = leaf_str(raw, &["ItemAttributes", "Manufacturer"]);
        item.model = leaf_str(raw, &["ItemAttributes", "Model"]);
        item.ean = leaf_str(raw, &["ItemAttributes", "EAN"]);
        item.upc = leaf_str(raw, &["ItemAttributes", "UPC"]);
        item.sku = leaf_str(raw, &["ItemAttributes", "SKU"]);
        item.sales_rank = leaf_amount(raw, &["SalesRank"]);
    }

    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_result() -> Value {
        json!({
            "ASIN": ["B00REQKWGA"],
            "DetailPageURL": ["https://www.amazon.de/dp/B00REQKWGA"],
            "ItemAttributes": [{
                "Title": ["Kindle Paperwhite"],
                "ProductGroup": ["Amazon Devices"],
                "Binding": ["Electronics"],
                "Manufacturer": ["Amazon"],
                "Model": ["DP75SDI"],
                "EAN": ["0848719056471"]
            }],
            "LargeImage": [{"URL": ["https://img.example.com/kindle-large.jpg"]}],
            "SalesRank": ["3"],
            "Offers": [{
                "Offer": [{
                    "OfferListing": [{
                        "Price": [{"Amount": ["11999"], "CurrencyCode": ["EUR"]}]
                    }]
                }]
            }],
            "OfferSummary": [{
                "LowestNewPrice": [{"Amount": ["10950"], "CurrencyCode": ["EUR"]}],
                "LowestUsedPrice": [{"Amount": ["8900"], "CurrencyCode": ["EUR"]}]
            }]
        })
    }

    #[test]
    fn test_normalize_full_result() {
        let item = normalize_search_result(&sample_result(), true);
        assert_eq!(item.asin.as_deref(), Some("B00REQKWGA"));
        assert_eq!(item.title.as_deref(), Some("Kindle Paperwhite"));
        assert_eq!(
            item.image_url.as_deref(),
            Some("https://img.example.com/kindle-large.jpg")
        );
        assert_eq!(item.price.amazon_price, Some(11999));
        assert_eq!(item.price.third_party_new_price, Some(10950));
        assert_eq!(item.price.third_party_used_price, Some(8900));
        assert_eq!(item.currency_code.as_deref(), Some("EUR"));
        assert_eq!(item.sales_rank, Some(3));
        assert_eq!(item.product_group.as_deref(), Some("Amazon Devices"));
        assert!(item.is_display_eligible());
    }

    #[test]
    fn test_shallow_extraction_skips_categorization() {
        let item = normalize_search_result(&sample_result(), false);
        assert_eq!(item.product_group, None);
        assert_eq!(item.sales_rank, None);
        assert!(item.is_display_eligible());
    }

    #[test]
    fn test_image_fallback_order() {
        let raw = json!({
            "ASIN": ["B000"],
            "MediumImage": [{"URL": ["https://img.example.com/m.jpg"]}],
            "SmallImage": [{"URL": ["https://img.example.com/s.jpg"]}]
        });
        let item = normalize_search_result(&raw, false);
        assert_eq!(item.image_url.as_deref(), Some("https://img.example.com/m.jpg"));
    }

    #[test]
    fn test_missing_leaves_stay_none() {
        let raw = json!({"ASIN": ["B001"]});
        let item = normalize_search_result(&raw, true);
        assert_eq!(item.title, None);
        assert_eq!(item.price.amazon_price, None);
        assert!(!item.price.any());
        assert!(!item.is_display_eligible());
    }

    #[test]
    fn test_display_eligibility() {
        // No detail url: excluded.
        let raw = json!({
            "ASIN": ["B002"],
            "ItemAttributes": [{"Title": ["Thing"]}],
            "OfferSummary": [{"LowestUsedPrice": [{"Amount": ["100"]}]}]
        });
        assert!(!normalize_search_result(&raw, false).is_display_eligible());

        // Only a used price present: still included.
        let raw = json!({
            "ASIN": ["B002"],
            "DetailPageURL": ["https://www.amazon.com/dp/B002"],
            "ItemAttributes": [{"Title": ["Thing"]}],
            "OfferSummary": [{"LowestUsedPrice": [{"Amount": ["100"]}]}]
        });
        assert!(normalize_search_result(&raw, false).is_display_eligible());
    }

    #[test]
    fn test_numeric_amounts_accepted() {
        let raw = json!({
            "ASIN": ["B003"],
            "Offers": [{"Offer": [{"OfferListing": [{"Price": [{"Amount": 4999}]}]}]}]
        });
        let item = normalize_search_result(&raw, false);
        assert_eq!(item.price.amazon_price, Some(4999));
    }
}
