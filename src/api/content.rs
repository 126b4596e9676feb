use reqwest::Method;

use crate::api::client::ApiClient;
use crate::api::error::ClientError;
use crate::models::{ContentBlock, Section};

impl ApiClient {
    /// CMS blocks for one section, sorted by their `order` field
    #[tracing::instrument(skip(self), err)]
    pub async fn content_section(
        &self,
        section: Section,
        active_only: bool,
    ) -> Result<Vec<ContentBlock>, ClientError> {
        let path = format!("/content/section/{}", section.as_str());
        let mut builder = self.request(Method::GET, &path);
        if active_only {
            builder = builder.query(&[("active", "true")]);
        }
        let mut blocks: Vec<ContentBlock> = self.send_item(builder).await?;
        blocks.sort_by_key(|block| block.order);
        Ok(blocks)
    }
}
