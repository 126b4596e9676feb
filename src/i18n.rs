//! Multilingual text and the resolver used by every display path.
//!
//! Text fields coming from the backend are either a plain string (older
//! records) or an object carrying `en`, `ar` and optionally `fr`. The
//! resolver turns either shape into one display string for the active
//! language:
//!
//! 1. the requested language,
//! 2. then `en`,
//! 3. then `fr`,
//! 4. then the empty string.
//!
//! Empty locale slots count as missing. Nothing here can fail, including
//! deserialization: `null` or a value of the wrong shape reads as empty text.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Languages the site is published in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Fr => "fr",
        }
    }

    /// Parse a language code, ignoring case and any region suffix (`ar-AE`).
    pub fn from_code(code: &str) -> Option<Self> {
        let lowered = code.trim().to_ascii_lowercase();
        let primary = lowered.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            "fr" => Some(Language::Fr),
            _ => None,
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Text direction attribute for the document root.
    pub fn direction(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }
}

/// A label or description carrying parallel translations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilingualText {
    #[serde(default, deserialize_with = "null_as_default")]
    pub en: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
}

impl MultilingualText {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
            fr: None,
        }
    }

    pub fn with_fr(mut self, fr: impl Into<String>) -> Self {
        self.fr = Some(fr.into());
        self
    }

    fn slot(&self, language: Language) -> Option<&str> {
        let text = match language {
            Language::En => self.en.as_str(),
            Language::Ar => self.ar.as_str(),
            Language::Fr => self.fr.as_deref().unwrap_or_default(),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn resolve(&self, language: Language) -> String {
        self.slot(language)
            .or_else(|| self.slot(Language::En))
            .or_else(|| self.slot(Language::Fr))
            .unwrap_or_default()
            .to_string()
    }
}

/// A text field as stored by the backend: legacy plain value or translations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Number(serde_json::Number),
    Multilingual(MultilingualText),
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(LocalizedText::from_value)
    }
}

impl LocalizedText {
    /// Read any JSON shape; anything that isn't text, a number or a
    /// translation object becomes empty text.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => LocalizedText::Plain(text),
            Value::Number(number) => LocalizedText::Number(number),
            Value::Object(map) => LocalizedText::Multilingual(MultilingualText {
                en: slot_text(&map, "en").unwrap_or_default(),
                ar: slot_text(&map, "ar").unwrap_or_default(),
                fr: slot_text(&map, "fr"),
            }),
            Value::Null | Value::Bool(_) | Value::Array(_) => LocalizedText::default(),
        }
    }

    pub fn resolve(&self, language: Language) -> String {
        match self {
            LocalizedText::Plain(text) => text.clone(),
            LocalizedText::Number(number) => number.to_string(),
            LocalizedText::Multilingual(text) => text.resolve(language),
        }
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText::Plain(text.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(text: String) -> Self {
        LocalizedText::Plain(text)
    }
}

impl From<MultilingualText> for LocalizedText {
    fn from(text: MultilingualText) -> Self {
        LocalizedText::Multilingual(text)
    }
}

fn slot_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Treat an explicit `null` like a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Resolve an optional field for display.
pub fn resolve(value: Option<&LocalizedText>, language: Language) -> String {
    value.map(|text| text.resolve(language)).unwrap_or_default()
}

/// Resolve a free-form JSON value (CMS metadata) with the same fallback rules.
pub fn resolve_value(value: &Value, language: Language) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Object(map) => [language.code(), "en", "fr"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|slot| match slot {
                Value::String(text) if !text.is_empty() => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .unwrap_or_default(),
        Value::Null | Value::Bool(_) | Value::Array(_) => String::new(),
    }
}
