use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::i18n::{null_as_default, LocalizedText, MultilingualText};
use crate::models::User;

/// Market segment of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Residential,
    Commercial,
    #[serde(other)]
    Other,
}

/// Kind of building or plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    Villa,
    Townhouse,
    Penthouse,
    Duplex,
    Studio,
    Office,
    Retail,
    Warehouse,
    Land,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Sold,
    Rented,
    #[serde(other)]
    Other,
}

/// Fields that only exist on off-plan listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffPlanDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handover_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<LocalizedText>,
}

/// Listing type, carried on the wire as `listingType`.
///
/// Reads never fail on this field: a missing type is a sale and an
/// unrecognised one is `Other`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "listingType")]
pub enum Listing {
    #[serde(rename = "sale")]
    Sale,
    #[serde(rename = "rent")]
    Rent,
    #[serde(rename = "off-plan")]
    OffPlan(OffPlanDetails),
    #[serde(rename = "other")]
    Other,
}

impl Listing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Listing::Sale => "sale",
            Listing::Rent => "rent",
            Listing::OffPlan(_) => "off-plan",
            Listing::Other => "other",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingFields {
    #[serde(default)]
    listing_type: Option<String>,
    #[serde(default)]
    developer: Option<String>,
    #[serde(default)]
    completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    handover_date: Option<DateTime<Utc>>,
    #[serde(default)]
    payment_plan: Option<LocalizedText>,
}

impl<'de> Deserialize<'de> for Listing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = ListingFields::deserialize(deserializer)?;
        Ok(match fields.listing_type.as_deref() {
            None | Some("sale") => Listing::Sale,
            Some("rent") => Listing::Rent,
            Some("off-plan") => Listing::OffPlan(OffPlanDetails {
                developer: fields.developer,
                completion_date: fields.completion_date,
                handover_date: fields.handover_date,
                payment_plan: fields.payment_plan,
            }),
            Some(_) => Listing::Other,
        })
    }
}

/// Owning agent: an id on writes, usually a populated user on reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentRef {
    Id(String),
    Populated(Box<User>),
}

impl AgentRef {
    pub fn id(&self) -> &str {
        match self {
            AgentRef::Id(id) => id,
            AgentRef::Populated(user) => &user.id,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AgentRef::Id(_) => None,
            AgentRef::Populated(user) => Some(user),
        }
    }
}

/// Core property data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub location: LocalizedText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<LocalizedText>,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub area: f64,
    pub category: Option<Category>,
    pub property_type: Option<PropertyType>,
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brochure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentRef>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub featured_in_portfolio: bool,
    #[serde(default)]
    pub title_deed: bool,
    #[serde(default)]
    pub tenanted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "AED".to_string()
}

impl Property {
    pub fn off_plan(&self) -> Option<&OffPlanDetails> {
        match &self.listing {
            Listing::OffPlan(details) => Some(details),
            _ => None,
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Body of `POST /properties`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub title: MultilingualText,
    pub description: MultilingualText,
    pub location: MultilingualText,
    pub features: Vec<MultilingualText>,
    pub price: f64,
    pub currency: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: f64,
    pub category: Category,
    pub property_type: PropertyType,
    #[serde(flatten)]
    pub listing: Listing,
    pub status: PropertyStatus,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brochure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Agent user id
    pub agent: String,
    pub verified: bool,
    pub featured: bool,
    pub featured_in_portfolio: bool,
    pub title_deed: bool,
    pub tenanted: bool,
}

/// Body of `PUT /properties/:id`; unset fields are left untouched server-side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<MultilingualText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<MultilingualText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<MultilingualText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brochure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_deed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenanted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use serde_json::json;

    #[test]
    fn reads_off_plan_listing_with_populated_agent() {
        let property: Property = serde_json::from_value(json!({
            "_id": "p1",
            "title": { "en": "Marina Tower", "ar": "برج المارينا" },
            "location": "Dubai Marina",
            "price": 1_250_000,
            "bedrooms": 2,
            "category": "residential",
            "propertyType": "apartment",
            "listingType": "off-plan",
            "developer": "Emaar",
            "handoverDate": "2027-06-30T00:00:00Z",
            "agent": { "_id": "u1", "name": "Jane Doe", "email": "jane@x.com", "role": "agent" },
            "featured": true
        }))
        .unwrap();

        assert_eq!(property.title.resolve(Language::Ar), "برج المارينا");
        assert_eq!(property.location.resolve(Language::Ar), "Dubai Marina");
        assert_eq!(property.currency, "AED");
        assert_eq!(property.off_plan().and_then(|d| d.developer.as_deref()), Some("Emaar"));
        assert_eq!(property.agent.as_ref().map(AgentRef::id), Some("u1"));
        assert!(property.featured);
        assert_eq!(property.status, PropertyStatus::Available);
    }

    #[test]
    fn reads_rent_listing_with_agent_id_and_unknown_type() {
        let property: Property = serde_json::from_value(json!({
            "id": "p2",
            "title": "Loft",
            "price": 90_000,
            "propertyType": "houseboat",
            "listingType": "rent",
            "status": "rented",
            "agent": "u9"
        }))
        .unwrap();

        assert_eq!(property.listing, Listing::Rent);
        assert_eq!(property.property_type, Some(PropertyType::Other));
        assert_eq!(property.status, PropertyStatus::Rented);
        assert!(property.agent.as_ref().and_then(AgentRef::user).is_none());
    }

    #[test]
    fn null_text_fields_do_not_sink_the_record() {
        let property: Property = serde_json::from_value(json!({
            "_id": "p3",
            "title": { "en": "Creek Villa", "ar": null },
            "description": null,
            "features": null,
            "images": null,
            "price": 3_000_000,
            "listingType": "sale"
        }))
        .unwrap();

        assert_eq!(property.title.resolve(Language::Ar), "Creek Villa");
        assert_eq!(property.description.resolve(Language::En), "");
        assert!(property.features.is_empty());
        assert!(property.cover_image().is_none());
    }

    #[test]
    fn missing_or_unknown_listing_type_still_reads() {
        let bare: Property = serde_json::from_value(json!({
            "_id": "p1",
            "title": "A",
            "price": 1
        }))
        .unwrap();
        assert_eq!(bare.listing, Listing::Sale);

        let auction: Property = serde_json::from_value(json!({
            "_id": "p4",
            "title": "B",
            "price": 2,
            "listingType": "auction"
        }))
        .unwrap();
        assert_eq!(auction.listing, Listing::Other);
        assert_eq!(auction.listing.as_str(), "other");
    }

    #[test]
    fn draft_carries_listing_tag_and_off_plan_fields() {
        let listing = Listing::OffPlan(OffPlanDetails {
            developer: Some("Emaar".into()),
            ..Default::default()
        });
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value, json!({ "listingType": "off-plan", "developer": "Emaar" }));
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = PropertyPatch {
            price: Some(10.0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "price": 10.0 }));
    }
}
