use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::i18n::{resolve_value, Language, LocalizedText};

/// CMS sections the public site renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Hero,
    About,
    Services,
    Goals,
    Clients,
    Portfolio,
    Slider,
    FeaturedProperties,
    AboutHome,
    ProcessSection,
    Contact,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Services => "services",
            Section::Goals => "goals",
            Section::Clients => "clients",
            Section::Portfolio => "portfolio",
            Section::Slider => "slider",
            Section::FeaturedProperties => "featured-properties",
            Section::AboutHome => "about-home",
            Section::ProcessSection => "process-section",
            Section::Contact => "contact",
        }
    }
}

/// One CMS content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub section: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<LocalizedText>,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: Value,
}

fn default_active() -> bool {
    true
}

impl ContentBlock {
    /// Resolve a metadata entry (plain or translated) for display.
    pub fn meta_text(&self, key: &str, language: Language) -> String {
        self.metadata
            .get(key)
            .map(|value| resolve_value(value, language))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_metadata_entries() {
        let block: ContentBlock = serde_json::from_value(json!({
            "_id": "c1",
            "section": "hero",
            "title": { "en": "Find your home", "ar": "ابحث عن منزلك" },
            "metadata": {
                "buttonText": { "en": "Browse", "ar": "تصفح" },
                "count": 120
            }
        }))
        .unwrap();

        assert_eq!(block.meta_text("buttonText", Language::Ar), "تصفح");
        assert_eq!(block.meta_text("count", Language::Fr), "120");
        assert_eq!(block.meta_text("missing", Language::En), "");
        assert!(block.is_active);
    }

    #[test]
    fn section_names_match_wire_format() {
        assert_eq!(
            serde_json::to_value(Section::FeaturedProperties).unwrap(),
            json!("featured-properties")
        );
        assert_eq!(Section::ProcessSection.as_str(), "process-section");
    }
}
