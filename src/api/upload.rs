use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::api::client::ApiClient;
use crate::api::error::ClientError;
use crate::api::traits::Uploader;
use crate::api::types::UploadEnvelope;
use crate::upload::{FileSelection, UploadKind};

#[async_trait]
impl Uploader for ApiClient {
    #[tracing::instrument(skip(self, file), fields(file = %file.name, size = file.size()), err)]
    async fn upload(&self, kind: UploadKind, file: &FileSelection) -> Result<String, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, kind.endpoint()).multipart(form);
        let envelope: UploadEnvelope = self.send_json(builder).await?;
        Ok(envelope.into_url())
    }
}
