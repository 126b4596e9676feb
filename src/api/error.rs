use async_trait::async_trait;
use reqwest::{Error, Response};

use crate::api::types::ErrorBody;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] Error),
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// The `error` field of a structured error response, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Text shown to the user: the server's message, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

#[async_trait]
pub trait ResponseExt {
    async fn map_client_error(self) -> Result<Response, ClientError>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn map_client_error(self) -> Result<Response, ClientError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let body = self.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.is_empty());
        tracing::warn!(status = %status, body = %body, "backend returned an error status");

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ResponseExt for Result<Response, Error> {
    async fn map_client_error(self) -> Result<Response, ClientError> {
        match self {
            Ok(response) => response.map_client_error().await,
            Err(e) => Err(ClientError::Transport(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_structured_errors_expose_a_server_message() {
        let structured = ClientError::Status {
            status: 400,
            message: Some("Email already exists".into()),
        };
        assert_eq!(structured.server_message(), Some("Email already exists"));
        assert_eq!(structured.user_message("Failed"), "Email already exists");

        let bare = ClientError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(bare.server_message(), None);
        assert_eq!(bare.user_message("Failed to fetch users"), "Failed to fetch users");
        assert_eq!(bare.to_string(), "HTTP 502: no error message");

        let decode = ClientError::Decode("eof".into());
        assert_eq!(decode.user_message("Failed"), "Failed");
    }
}
