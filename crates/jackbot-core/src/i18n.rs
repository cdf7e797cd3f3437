//! Message catalog lookup. Every user-facing string goes through
//! [`Translator::translate`], which falls back to the source string
//! when no translation exists for the requested language.

use std::collections::HashMap;

/// Regions whose catalogs the bot can search.
pub const SUPPORTED_REGIONS: [&str; 3] = ["de_DE", "en_GB", "en_US"];

/// Languages with a message catalog.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "de"];

pub fn is_supported_region(region: &str) -> bool {
    SUPPORTED_REGIONS.contains(&region)
}

/// Currency charged by the shop of a region.
pub fn currency_for_region(region: &str) -> &'static str {
    match region {
        "de_DE" => "EUR",
        "en_GB" => "GBP",
        _ => "USD",
    }
}

/// German catalog, keyed by the English source string.
const CATALOG_DE: &[(&str, &str)] = &[
    ("help", "hilfe"),
    ("list", "liste"),
    ("hi", "hi"),
    ("hello", "hallo"),
    ("settings", "einstellungen"),
    (
        "Hi there, let’s get started. I’ll alert you when prices drop on Amazon. If you get lost, just type help. Or, use a few words to tell me what product you are searching for. For example, you could type “iPhone 6”, “Kindle Paperwhite” or “Xbox One”.",
        "Hallo, lass uns anfangen. Ich benachrichtige dich, wenn Preise auf Amazon fallen. Wenn du nicht weiter weißt, tippe einfach hilfe. Oder beschreibe mir in wenigen Worten, welches Produkt du suchst. Du könntest zum Beispiel “iPhone 6”, “Kindle Paperwhite” oder “Xbox One” tippen.",
    ),
    (
        "Hi there, let’s get started.",
        "Hallo, lass uns anfangen.",
    ),
    (
        "Pick an option below to get going",
        "Wähle eine der Optionen unten, um loszulegen",
    ),
    (
        "Lost? Use a few words to tell me what product you are searching for. For example, you could type “iPhone 6”, “Kindle Paperwhite” or “Xbox One”. Or, just type one of the words below:\n\n  • list - to show your price watches\n  • settings - to see your settings",
        "Verlaufen? Beschreibe mir in wenigen Worten, welches Produkt du suchst. Du könntest zum Beispiel “iPhone 6”, “Kindle Paperwhite” oder “Xbox One” tippen. Oder tippe eines der Wörter unten:\n\n  • liste - zeigt deine Preisalarme\n  • einstellungen - zeigt deine Einstellungen",
    ),
    (
        "What’re you searching for? Use a few words to tell me what product you are searching for. For example, you could type “iPhone 6” or “Kindle Paperwhite”.",
        "Wonach suchst du? Beschreibe mir in wenigen Worten, welches Produkt du suchst. Du könntest zum Beispiel “iPhone 6” oder “Kindle Paperwhite” tippen.",
    ),
    (
        "I'm sorry, but I'm not yet available in your country.",
        "Es tut mir leid, aber ich bin in deinem Land noch nicht verfügbar.",
    ),
    (
        "Something went wrong. Please try again.",
        "Etwas ist schiefgelaufen. Bitte versuche es erneut.",
    ),
    (
        "Price and availability information for this product may have changed.",
        "Preis und Verfügbarkeit dieses Produkts können sich geändert haben.",
    ),
    ("Search results for \"%s\"", "Suchergebnisse für \"%s\""),
    (
        "Not sure I understand what you're searching for.",
        "Ich bin nicht sicher, was du suchst.",
    ),
    (
        "Try again or pick one of the options below:",
        "Versuche es erneut oder wähle eine der Optionen unten:",
    ),
    (
        "Amazon: %s | 3rd Party New: %s | 3rd Party Used: %s",
        "Amazon: %s | Neu von Dritten: %s | Gebraucht von Dritten: %s",
    ),
    ("Not in Stock", "Nicht auf Lager"),
    ("Create price watch", "Preisalarm erstellen"),
    ("Details", "Details"),
    ("Go to Website", "Zur Website"),
    ("What next?", "Was nun?"),
    ("Create price watch for \"%s\"", "Erstelle Preisalarm für \"%s\""),
    ("Set price type", "Preistyp wählen"),
    (
        "What price type do you want to track?",
        "Welchen Preistyp möchtest du beobachten?",
    ),
    ("Amazon price", "Amazon-Preis"),
    ("3rd Party New price", "Neupreis von Dritten"),
    ("3rd Party Used price", "Gebrauchtpreis von Dritten"),
    ("Amazon", "Amazon"),
    ("3rd Party New", "Neu von Dritten"),
    ("3rd Party Used", "Gebraucht von Dritten"),
    (
        "The current %s for this item is %s",
        "Der aktuelle %s für diesen Artikel beträgt %s",
    ),
    ("Set desired price", "Wunschpreis festlegen"),
    (
        "At what price would you like to receive an alert?",
        "Bei welchem Preis möchtest du benachrichtigt werden?",
    ),
    ("Custom Input", "Eigene Eingabe"),
    (
        "Enter a valid price. For example, you could type %s",
        "Gib einen gültigen Preis ein. Du könntest zum Beispiel %s tippen",
    ),
    (
        "The price must be a number greater than or equal to zero. For example, you could type %s",
        "Der Preis muss eine Zahl größer oder gleich null sein. Du könntest zum Beispiel %s tippen",
    ),
    (
        "Pick one of the options below or try again to enter a valid price",
        "Wähle eine der Optionen unten oder versuche erneut, einen gültigen Preis einzugeben",
    ),
    (
        "You have tracked the %s for \"%s\"",
        "Du beobachtest jetzt den %s für \"%s\"",
    ),
    ("Price watch updated.", "Preisalarm aktualisiert."),
    ("Price watch deleted.", "Preisalarm gelöscht."),
    (
        "Here're your price watches. I'll send you an alert when the current price for any of the products you are watching falls below your desired price.\n\n Price watches %s to %s:",
        "Hier sind deine Preisalarme. Ich benachrichtige dich, sobald der aktuelle Preis eines beobachteten Produkts unter deinen Wunschpreis fällt.\n\n Preisalarme %s bis %s:",
    ),
    ("Price watches %s to %s:", "Preisalarme %s bis %s:"),
    (
        "Current price: %s | Your Desired price: %s",
        "Aktueller Preis: %s | Dein Wunschpreis: %s",
    ),
    ("Change desired price", "Wunschpreis ändern"),
    ("Delete price watch", "Preisalarm löschen"),
    ("More price watches", "Weitere Preisalarme"),
    (
        "You haven't created any price watches yet. Use a few words to tell me what product you are searching for. For example, you could type “iPhone 6” or “Kindle Paperwhite”",
        "Du hast noch keine Preisalarme erstellt. Beschreibe mir in wenigen Worten, welches Produkt du suchst. Du könntest zum Beispiel “iPhone 6” oder “Kindle Paperwhite” tippen",
    ),
    ("Search product", "Produkt suchen"),
    ("Your Price Watches", "Deine Preisalarme"),
    ("Change Settings", "Einstellungen ändern"),
    ("Help", "Hilfe"),
    (
        "You're wondering about your settings?\n\nAmazon Shop: %s\nLanguage: %s\n\nTo change any setting, just pick an option below:",
        "Du möchtest deine Einstellungen wissen?\n\nAmazon-Shop: %s\nSprache: %s\n\nWähle eine Option unten, um eine Einstellung zu ändern:",
    ),
    ("Change Amazon Shop", "Amazon-Shop ändern"),
    ("Change Language", "Sprache ändern"),
    ("Pick an option below", "Wähle eine Option unten"),
    (
        "Great. You have changed the Amazon shop to %s. If you're now searching for a product, I search for you the Amazon shop %s. To reverse this setting, just type settings.",
        "Super. Du hast den Amazon-Shop auf %s geändert. Wenn du jetzt ein Produkt suchst, durchsuche ich für dich den Amazon-Shop %s. Um diese Einstellung rückgängig zu machen, tippe einfach einstellungen.",
    ),
    (
        "Great. You have changed the language to %s.",
        "Super. Du hast die Sprache auf %s geändert.",
    ),
    (
        "Do you want to retain the change of the language setting?",
        "Möchtest du die Änderung der Spracheinstellung beibehalten?",
    ),
    (
        "Ok! From now on the only language I understand is %s. If you want to revert this setting, just type settings.",
        "Ok! Ab jetzt verstehe ich nur noch %s. Wenn du diese Einstellung rückgängig machen willst, tippe einfach einstellungen.",
    ),
    (
        "Ok! The language has been reverted to %s.",
        "Ok! Die Sprache wurde auf %s zurückgesetzt.",
    ),
    ("Yes", "Ja"),
    ("No", "Nein"),
    (
        "Message with attachment received",
        "Nachricht mit Anhang erhalten",
    ),
];

/// Localized display names of the supported shop regions.
const COUNTRIES: &[(&str, &str, &str)] = &[
    // (region, English, German)
    ("de_DE", "Germany", "Deutschland"),
    ("en_GB", "United Kingdom", "Großbritannien"),
    ("en_US", "United States", "Vereinigte Staaten"),
];

/// Localized display names of the supported languages.
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("en", "English", "Englisch"),
    ("de", "German", "Deutsch"),
];

pub struct Translator {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("de", CATALOG_DE.iter().copied().collect());
        Translator { catalogs }
    }

    /// Look up `source` in the catalog for `language`; fall back to
    /// the source string itself.
    pub fn translate(&self, language: &str, source: &str) -> String {
        self.catalogs
            .get(language)
            .and_then(|catalog| catalog.get(source))
            .copied()
            .unwrap_or(source)
            .to_string()
    }

    /// Display name of a shop region in the requested language.
    pub fn country_name(&self, language: &str, region: &str) -> String {
        for (code, en, de) in COUNTRIES {
            if *code == region {
                return if language == "de" { de } else { en }.to_string();
            }
        }
        region.to_string()
    }

    /// Display name of a language code in the requested language.
    pub fn language_name(&self, language: &str, code: &str) -> String {
        for (c, en, de) in LANGUAGES {
            if *c == code {
                return if language == "de" { de } else { en }.to_string();
            }
        }
        code.to_string()
    }
}

/// Substitute each `%s` in `template` with the next argument, in
/// order. Missing arguments leave the placeholder in place.
pub fn interpolate(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut next = 0;
    while let Some(pos) = rest.find("%s") {
        if next >= args.len() {
            break;
        }
        out.push_str(&rest[..pos]);
        out.push_str(args[next]);
        next += 1;
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_falls_back_to_source() {
        let t = Translator::new();
        assert_eq!(t.translate("de", "Price watch deleted."), "Preisalarm gelöscht.");
        assert_eq!(t.translate("en", "Price watch deleted."), "Price watch deleted.");
        assert_eq!(t.translate("de", "untranslated phrase"), "untranslated phrase");
        assert_eq!(t.translate("fr", "Price watch deleted."), "Price watch deleted.");
    }

    #[test]
    fn test_supported_regions() {
        assert!(is_supported_region("de_DE"));
        assert!(is_supported_region("en_US"));
        assert!(!is_supported_region("fr_FR"));
    }

    #[test]
    fn test_currency_for_region() {
        assert_eq!(currency_for_region("de_DE"), "EUR");
        assert_eq!(currency_for_region("en_GB"), "GBP");
        assert_eq!(currency_for_region("en_US"), "USD");
    }

    #[test]
    fn test_display_names() {
        let t = Translator::new();
        assert_eq!(t.country_name("de", "en_GB"), "Großbritannien");
        assert_eq!(t.country_name("en", "de_DE"), "Germany");
        assert_eq!(t.language_name("de", "de"), "Deutsch");
        assert_eq!(t.language_name("en", "de"), "German");
    }

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate("%s to %s:", &["1", "10"]), "1 to 10:");
        assert_eq!(interpolate("no placeholders", &["x"]), "no placeholders");
        assert_eq!(interpolate("%s and %s", &["one"]), "one and %s");
    }
}
