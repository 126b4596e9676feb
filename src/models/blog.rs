use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::{null_as_default, LocalizedText};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

/// Author details embedded in each post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<LocalizedText>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<LocalizedText>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub slug: LocalizedText,
    #[serde(default)]
    pub excerpt: LocalizedText,
    #[serde(default)]
    pub content: LocalizedText,
    #[serde(default)]
    pub category: LocalizedText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metrics: PostMetrics,
    #[serde(default)]
    pub seo: Seo,
}

/// Body of `POST /blog`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDraft {
    pub title: LocalizedText,
    pub slug: LocalizedText,
    pub excerpt: LocalizedText,
    pub content: LocalizedText,
    pub category: LocalizedText,
    pub tags: Vec<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub author: Author,
    pub status: PostStatus,
    pub seo: Seo,
}

/// Body of `PUT /blog/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<LocalizedText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use serde_json::json;

    #[test]
    fn reads_post_with_null_text_and_tags() {
        let post: BlogPost = serde_json::from_value(json!({
            "_id": "b9",
            "title": { "en": "Rental yields", "ar": null },
            "slug": "rental-yields",
            "excerpt": null,
            "tags": null
        }))
        .unwrap();

        assert_eq!(post.title.resolve(Language::Ar), "Rental yields");
        assert_eq!(post.excerpt.resolve(Language::En), "");
        assert!(post.tags.is_empty());
    }
}
