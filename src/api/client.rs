use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::error::{ClientError, ResponseExt};
use crate::api::traits::{Resource, ResourceBackend};
use crate::api::types::{ItemEnvelope, ListEnvelope, ListPage, ListQuery};
use crate::config::Config;

const USER_AGENT: &str = concat!("estate-portal/", env!("CARGO_PKG_VERSION"));

/// Authenticated HTTP client for the portal backend.
///
/// Cloning is cheap and clones share the bearer token slot, so a login on
/// one handle is seen by every store holding another.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a client with the default 30s timeout
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            client,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Self::with_timeout(config.api_base_url.as_str(), config.timeout)?;
        if let Some(token) = &config.api_token {
            client.set_token(token.clone());
        }
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching the bearer token when one is set
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder.send().await.map_client_error().await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Send and discard whatever body comes back
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        builder.send().await.map_client_error().await?;
        Ok(())
    }

    pub(crate) async fn send_item<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let envelope: ItemEnvelope<T> = self.send_json(builder).await?;
        Ok(envelope.into_inner())
    }
}

#[async_trait]
impl<R: Resource> ResourceBackend<R> for ApiClient {
    #[tracing::instrument(skip(self), fields(resource = R::PLURAL), err)]
    async fn list(&self, query: &ListQuery) -> Result<ListPage<R>, ClientError> {
        let builder = self.request(Method::GET, R::PATH).query(&query.to_pairs());
        let envelope: ListEnvelope<R> = self.send_json(builder).await?;
        Ok(envelope.into_page(query))
    }

    #[tracing::instrument(skip(self), fields(resource = R::PLURAL), err)]
    async fn fetch(&self, id: &str) -> Result<R, ClientError> {
        let path = format!("{}/{}", R::PATH, id);
        self.send_item(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(skip(self, draft), fields(resource = R::PLURAL), err)]
    async fn create(&self, draft: &R::Draft) -> Result<R, ClientError> {
        self.send_item(self.request(Method::POST, R::PATH).json(draft))
            .await
    }

    #[tracing::instrument(skip(self, patch), fields(resource = R::PLURAL), err)]
    async fn update(&self, id: &str, patch: &R::Patch) -> Result<R, ClientError> {
        let path = format!("{}/{}", R::PATH, id);
        self.send_item(self.request(Method::PUT, &path).json(patch))
            .await
    }

    #[tracing::instrument(skip(self), fields(resource = R::PLURAL), err)]
    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("{}/{}", R::PATH, id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
