//! Embedded UI strings.
//!
//! Each dictionary under `stackmate-shell/locales/` is a flat JSON object of
//! key → text, compiled in with `include_str!`. Languages without a
//! dictionary, and keys a dictionary lacks, fall back to English.

use serde_json::{Map, Value};
use std::sync::LazyLock;

const FALLBACK: &str = "english";

static LOCALES: &[(&str, &str)] = &[
    ("english", include_str!("../locales/english.json")),
    ("german", include_str!("../locales/german.json")),
    ("spanish", include_str!("../locales/spanish.json")),
    ("hindi", include_str!("../locales/hindi.json")),
];

/// Every selectable language: code and native name.
pub const LANGUAGES: [(&str, &str); 27] = [
    ("english", "English"),
    ("hindi", "हिन्दी"),
    ("spanish", "Español"),
    ("french", "Français"),
    ("german", "Deutsch"),
    ("japanese", "日本語"),
    ("chinese", "中文"),
    ("portuguese", "Português"),
    ("arabic", "العربية"),
    ("russian", "Русский"),
    ("korean", "한국어"),
    ("italian", "Italiano"),
    ("dutch", "Nederlands"),
    ("turkish", "Türkçe"),
    ("polish", "Polski"),
    ("vietnamese", "Tiếng Việt"),
    ("thai", "ไทย"),
    ("indonesian", "Bahasa Indonesia"),
    ("swedish", "Svenska"),
    ("greek", "Ελληνικά"),
    ("hebrew", "עברית"),
    ("ukrainian", "Українська"),
    ("bengali", "বাংলা"),
    ("tamil", "தமிழ்"),
    ("marathi", "मराठी"),
    ("urdu", "اردو"),
    ("kannada", "ಕನ್ನಡ"),
];

static PARSED: LazyLock<Vec<(&'static str, Map<String, Value>)>> = LazyLock::new(|| {
    LOCALES
        .iter()
        .filter_map(|(lang, json)| match serde_json::from_str::<Map<String, Value>>(json) {
            Ok(map) => Some((*lang, map)),
            Err(e) => {
                log::error!("Locale {lang} is not a JSON object: {e}");
                None
            }
        })
        .collect()
});

fn dictionary(lang: &str) -> Option<&'static Map<String, Value>> {
    PARSED.iter().find(|(l, _)| *l == lang).map(|(_, map)| map)
}

fn lookup(lang: &str, key: &str) -> Option<&'static str> {
    dictionary(lang)?.get(key)?.as_str()
}

/// Whether `lang` is one of [`LANGUAGES`].
pub fn is_supported(lang: &str) -> bool {
    LANGUAGES.iter().any(|(code, _)| *code == lang)
}

/// Native display name of `lang`, if selectable.
pub fn native_name(lang: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(code, _)| *code == lang)
        .map(|(_, name)| *name)
}

/// Text for `key` in `lang`, else in English, else `key` itself.
pub fn t(lang: &str, key: &str) -> String {
    lookup(lang, key)
        .or_else(|| lookup(FALLBACK, key))
        .unwrap_or(key)
        .to_string()
}
