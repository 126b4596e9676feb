use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Category, Pagination, PostStatus, PropertyType};

/// Page, limit and free-form filters for a list request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            filters: BTreeMap::new(),
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.insert(key.into(), value.to_string());
        self
    }

    /// Query-string pairs in a stable order: page, limit, then filters by key.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Search filters for the property listing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// `sale`, `rent` or `off-plan`
    pub listing_type: Option<String>,
    pub category: Option<Category>,
    pub property_type: Option<PropertyType>,
    /// Free-text match on title and location
    pub search: Option<String>,
    /// Minimum price in listing currency
    pub min_price: Option<u64>,
    /// Maximum price in listing currency
    pub max_price: Option<u64>,
    pub bedrooms: Option<u32>,
    pub featured: Option<bool>,
}

impl PropertyFilter {
    pub fn into_query(self, page: u32, limit: u32) -> ListQuery {
        let mut query = ListQuery::page(page, limit);
        if let Some(listing_type) = self.listing_type {
            query = query.filter("listingType", listing_type);
        }
        if let Some(category) = self.category.and_then(wire_name) {
            query = query.filter("category", category);
        }
        if let Some(property_type) = self.property_type.and_then(wire_name) {
            query = query.filter("propertyType", property_type);
        }
        if let Some(search) = self.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter("search", search.trim());
        }
        if let Some(min_price) = self.min_price {
            query = query.filter("minPrice", min_price);
        }
        if let Some(max_price) = self.max_price {
            query = query.filter("maxPrice", max_price);
        }
        if let Some(bedrooms) = self.bedrooms {
            query = query.filter("bedrooms", bedrooms);
        }
        if let Some(featured) = self.featured {
            query = query.filter("featured", featured);
        }
        query
    }
}

/// Filters for the blog index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub status: Option<PostStatus>,
}

impl BlogFilter {
    pub fn into_query(self, page: u32, limit: u32) -> ListQuery {
        let mut query = ListQuery::page(page, limit);
        if let Some(category) = self.category {
            query = query.filter("category", category);
        }
        if let Some(tag) = self.tag {
            query = query.filter("tag", tag);
        }
        if let Some(search) = self.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter("search", search.trim());
        }
        if let Some(status) = self.status {
            query = query.filter("status", status.as_str());
        }
        query
    }
}

fn wire_name<T: Serialize>(value: T) -> Option<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => Some(name),
        _ => None,
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pagination: Pagination,
}

/// `{data, total, pagination}` list envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ListEnvelope<T> {
    pub fn into_page(self, query: &ListQuery) -> ListPage<T> {
        let total = self.total.unwrap_or(self.data.len() as u64);
        let pagination = self.pagination.unwrap_or_else(|| {
            let limit = query.limit.unwrap_or(Pagination::default().limit).max(1);
            Pagination {
                page: query.page.unwrap_or(1),
                limit,
                pages: total.div_ceil(u64::from(limit)) as u32,
            }
        });
        ListPage {
            items: self.data,
            total,
            pagination,
        }
    }
}

/// Single-item payload: `{data: T}` or bare `T`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            ItemEnvelope::Wrapped { data } => data,
            ItemEnvelope::Bare(data) => data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedFile {
    pub url: String,
}

/// `{success, data: {url}}` or `{url}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UploadEnvelope {
    Wrapped { data: UploadedFile },
    Bare(UploadedFile),
}

impl UploadEnvelope {
    pub fn into_url(self) -> String {
        match self {
            UploadEnvelope::Wrapped { data } => data.url,
            UploadEnvelope::Bare(file) => file.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
