use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ClientError;
use crate::api::types::{ListPage, ListQuery};
use crate::upload::{FileSelection, UploadKind};

/// A REST collection the back-office manages
pub trait Resource: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Collection path relative to the API base, e.g. `/properties`
    const PATH: &'static str;
    /// Names used in user-facing messages
    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    type Draft: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> &str;
}

/// CRUD operations against one collection.
/// Slices only talk to the backend through this trait.
#[async_trait]
pub trait ResourceBackend<R: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<ListPage<R>, ClientError>;

    async fn fetch(&self, id: &str) -> Result<R, ClientError>;

    async fn create(&self, draft: &R::Draft) -> Result<R, ClientError>;

    async fn update(&self, id: &str, patch: &R::Patch) -> Result<R, ClientError>;

    async fn remove(&self, id: &str) -> Result<(), ClientError>;
}

/// Transmits a single file and returns the URL the server stored it under
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, kind: UploadKind, file: &FileSelection) -> Result<String, ClientError>;
}
