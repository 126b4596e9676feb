use async_trait::async_trait;
use reqwest::Method;

use crate::api::client::ApiClient;
use crate::api::error::ClientError;
use crate::api::traits::Resource;
use crate::models::{Property, PropertyDraft, PropertyPatch};

impl Resource for Property {
    const PATH: &'static str = "/properties";
    const SINGULAR: &'static str = "property";
    const PLURAL: &'static str = "properties";

    type Draft = PropertyDraft;
    type Patch = PropertyPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Boolean flags the backend flips server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFlag {
    Featured,
    Portfolio,
}

impl PropertyFlag {
    fn segment(self) -> &'static str {
        match self {
            PropertyFlag::Featured => "featured",
            PropertyFlag::Portfolio => "portfolio",
        }
    }
}

/// Flag toggles on top of plain CRUD
#[async_trait]
pub trait PropertyFlags: Send + Sync {
    async fn toggle_property_flag(&self, id: &str, flag: PropertyFlag) -> Result<(), ClientError>;
}

#[async_trait]
impl PropertyFlags for ApiClient {
    /// `PUT /properties/:id/featured|portfolio` with an empty body.
    /// The server decides the new value; callers re-read it.
    #[tracing::instrument(skip(self), err)]
    async fn toggle_property_flag(&self, id: &str, flag: PropertyFlag) -> Result<(), ClientError> {
        let path = format!("{}/{}/{}", Property::PATH, id, flag.segment());
        self.send_empty(self.request(Method::PUT, &path)).await
    }
}
