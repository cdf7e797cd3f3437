//! Pure price helpers: formatting, desired-price suggestions and
//! free-form price input parsing.

use serde::{Deserialize, Serialize};

/// How amounts of one currency are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimal_places: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "€".to_string(),
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            decimal_places: 2,
        }
    }
}

/// Render an amount of integer minor units, e.g. `100099` as
/// `€ 1.000,99` under the EUR format.
pub fn format_price(minor_units: i64, format: &CurrencyFormat) -> String {
    let scale = 10i64.pow(format.decimal_places);
    let negative = minor_units < 0;
    let abs = minor_units.abs();
    let whole = abs / scale;
    let fraction = abs % scale;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&format.thousands_separator);
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    if format.decimal_places == 0 {
        format!("{} {}{}", format.symbol, sign, grouped)
    } else {
        format!(
            "{} {}{}{}{:0width$}",
            format.symbol,
            sign,
            grouped,
            format.decimal_separator,
            fraction,
            width = format.decimal_places as usize
        )
    }
}

/// Candidate desired prices for an alert on an item currently priced
/// at `price` minor units: one "just under" anchor and four
/// percentage-discount anchors.
pub fn calculate_desired_price_examples(price: i64) -> [i64; 5] {
    let discounted = |factor: f64| (price as f64 * factor).round() as i64;
    [
        price - 1,
        discounted(0.97),
        discounted(0.95),
        discounted(0.93),
        discounted(0.90),
    ]
}

/// Parse a free-form price typed by the user into minor-unit
/// candidates.
///
/// The text is unformatted twice, once reading `.` as the decimal
/// separator and once reading `,`, so "12.34" and "12,34" both work
/// whatever the user's locale. Agreeing interpretations collapse to a
/// single candidate; text without a digit yields none.
pub fn parse_custom_price_input(input: &str) -> Vec<i64> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Vec::new();
    }

    let dot_reading: String = cleaned.chars().filter(|c| *c != ',').collect();
    let comma_reading: String = cleaned
        .chars()
        .filter(|c| *c != '.')
        .collect::<String>()
        .replace(',', ".");

    let mut candidates = Vec::with_capacity(2);
    for reading in [dot_reading, comma_reading] {
        if let Ok(value) = reading.parse::<f64>() {
            let minor = (value * 100.0).round() as i64;
            if !candidates.contains(&minor) {
                candidates.push(minor);
            }
        }
    }
    candidates
}
