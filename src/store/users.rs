use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::api::{AgentDirectory, ResourceBackend};
use crate::models::{User, UserDraft, UserPatch};
use crate::store::slice::ResourceSlice;
use crate::store::{Operation, Rejected};

/// Public agent directory, kept next to the admin user list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentsState {
    pub items: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Users and agents. Mutations go through the user slice and are mirrored
/// into the agents list so both screens agree without a refetch.
pub struct UserStore {
    users: ResourceSlice<User>,
    directory: Arc<dyn AgentDirectory>,
    agents: RwLock<AgentsState>,
}

impl UserStore {
    pub fn new<B>(backend: Arc<B>) -> Self
    where
        B: ResourceBackend<User> + AgentDirectory + 'static,
    {
        Self {
            users: ResourceSlice::new(backend.clone()),
            directory: backend,
            agents: RwLock::new(AgentsState::default()),
        }
    }

    pub fn users(&self) -> &ResourceSlice<User> {
        &self.users
    }

    pub fn agents(&self) -> AgentsState {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_agents<U>(&self, f: impl FnOnce(&mut AgentsState) -> U) -> U {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut agents)
    }

    pub async fn fetch_agents(&self) -> Result<Vec<User>, Rejected> {
        self.with_agents(|agents| {
            agents.loading = true;
            agents.error = None;
        });

        match self.directory.list_agents().await {
            Ok(list) => {
                self.with_agents(|agents| {
                    agents.loading = false;
                    agents.items = list.clone();
                });
                Ok(list)
            }
            Err(e) => {
                let message = e.user_message("Failed to fetch agents");
                warn!(error = %e, "agent directory fetch failed");
                self.with_agents(|agents| {
                    agents.loading = false;
                    agents.error = Some(message.clone());
                });
                Err(Rejected {
                    op: Operation::FetchList,
                    message,
                })
            }
        }
    }

    pub async fn create_user(&self, draft: &UserDraft) -> Result<User, Rejected> {
        let created = self.users.create(draft).await?;
        if created.is_agent() {
            self.with_agents(|agents| {
                match agents.items.iter().position(|a| a.id == created.id) {
                    Some(index) => agents.items[index] = created.clone(),
                    None => agents.items.insert(0, created.clone()),
                }
            });
        }
        Ok(created)
    }

    /// Submit the agent form: one `POST /users` with the role fixed to agent
    pub async fn create_agent(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, Rejected> {
        self.create_user(&UserDraft::agent(name, email, password))
            .await
    }

    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, Rejected> {
        let updated = self.users.update(id, patch).await?;
        self.with_agents(|agents| {
            let position = agents.items.iter().position(|a| a.id == updated.id);
            match (position, updated.is_agent()) {
                (Some(index), true) => agents.items[index] = updated.clone(),
                (Some(index), false) => {
                    agents.items.remove(index);
                }
                (None, true) => agents.items.insert(0, updated.clone()),
                (None, false) => {}
            }
        });
        Ok(updated)
    }

    pub async fn remove_user(&self, id: &str) -> Result<(), Rejected> {
        self.users.remove(id).await?;
        self.with_agents(|agents| agents.items.retain(|a| a.id != id));
        Ok(())
    }
}
