use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::api::client::ApiClient;
use crate::api::error::ClientError;
use crate::api::traits::Resource;
use crate::i18n::LocalizedText;
use crate::models::{BlogDraft, BlogPatch, BlogPost};

impl Resource for BlogPost {
    const PATH: &'static str = "/blog";
    const SINGULAR: &'static str = "blog post";
    const PLURAL: &'static str = "blog posts";

    type Draft = BlogDraft;
    type Patch = BlogPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize)]
struct LikeCount {
    likes: u64,
}

/// Public blog endpoints beyond plain CRUD
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn post_by_slug(&self, slug: &str) -> Result<BlogPost, ClientError>;

    async fn blog_categories(&self) -> Result<Vec<LocalizedText>, ClientError>;

    async fn blog_tags(&self) -> Result<Vec<LocalizedText>, ClientError>;

    /// Returns the post's like count after the server applied the like
    async fn like_post(&self, id: &str) -> Result<u64, ClientError>;
}

#[async_trait]
impl BlogApi for ApiClient {
    #[tracing::instrument(skip(self), err)]
    async fn post_by_slug(&self, slug: &str) -> Result<BlogPost, ClientError> {
        let path = format!("{}/slug/{}", BlogPost::PATH, slug);
        self.send_item(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn blog_categories(&self) -> Result<Vec<LocalizedText>, ClientError> {
        let path = format!("{}/categories", BlogPost::PATH);
        self.send_item(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn blog_tags(&self) -> Result<Vec<LocalizedText>, ClientError> {
        let path = format!("{}/tags", BlogPost::PATH);
        self.send_item(self.request(Method::GET, &path)).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn like_post(&self, id: &str) -> Result<u64, ClientError> {
        let path = format!("{}/{}/like", BlogPost::PATH, id);
        let count: LikeCount = self.send_item(self.request(Method::POST, &path)).await?;
        Ok(count.likes)
    }
}
