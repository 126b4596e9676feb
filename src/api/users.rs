use async_trait::async_trait;
use reqwest::Method;

use crate::api::client::ApiClient;
use crate::api::error::ClientError;
use crate::api::traits::Resource;
use crate::models::{User, UserDraft, UserPatch};

impl Resource for User {
    const PATH: &'static str = "/users";
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";

    type Draft = UserDraft;
    type Patch = UserPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<User>, ClientError>;
}

#[async_trait]
impl AgentDirectory for ApiClient {
    /// `GET /users/agents`, public, unpaginated
    #[tracing::instrument(skip(self), err)]
    async fn list_agents(&self) -> Result<Vec<User>, ClientError> {
        let path = format!("{}/agents", User::PATH);
        self.send_item(self.request(Method::GET, &path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lists_agents_from_wrapped_payload() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/users/agents")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "data": [
                        { "_id": "u1", "name": "Jane Doe", "email": "jane@x.com", "role": "agent", "rating": 4.5 },
                        { "_id": "u2", "name": "Omar", "email": "omar@x.com", "role": "agent", "isActive": false }
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let agents = client.list_agents().await.unwrap();

        assert_eq!(agents.len(), 2);
        assert!(agents.iter().all(User::is_agent));
        assert!(agents[0].is_active);
        assert!(!agents[1].is_active);
        m.assert_async().await;
    }
}
