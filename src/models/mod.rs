use serde::{Deserialize, Serialize};

pub mod blog;
pub mod content;
pub mod property;
pub mod user;

pub use blog::{Author, BlogDraft, BlogPatch, BlogPost, PostMetrics, PostStatus, Seo};
pub use content::{ContentBlock, Section};
pub use property::{
    AgentRef, Category, Listing, OffPlanDetails, Property, PropertyDraft, PropertyPatch,
    PropertyStatus, PropertyType,
};
pub use user::{Role, User, UserDraft, UserPatch};

/// Page window reported by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            pages: 0,
        }
    }
}
