use std::sync::Arc;

use tracing::info;

use crate::api::{ListPage, ListQuery, PropertyFlag, PropertyFlags, ResourceBackend};
use crate::models::Property;
use crate::store::slice::{Action, ResourceSlice};
use crate::store::{Operation, Rejected};

/// Property listings plus the featured/portfolio toggles
pub struct PropertyStore {
    slice: ResourceSlice<Property>,
    flags: Arc<dyn PropertyFlags>,
}

impl PropertyStore {
    pub fn new<B>(backend: Arc<B>) -> Self
    where
        B: ResourceBackend<Property> + PropertyFlags + 'static,
    {
        Self {
            slice: ResourceSlice::new(backend.clone()),
            flags: backend,
        }
    }

    pub fn slice(&self) -> &ResourceSlice<Property> {
        &self.slice
    }

    pub async fn toggle_featured(&self, id: &str) -> Result<ListPage<Property>, Rejected> {
        self.toggle(id, PropertyFlag::Featured).await
    }

    pub async fn toggle_portfolio(&self, id: &str) -> Result<ListPage<Property>, Rejected> {
        self.toggle(id, PropertyFlag::Portfolio).await
    }

    /// Ask the server to flip a flag, then reload the current page so the
    /// list shows the value the server settled on.
    async fn toggle(&self, id: &str, flag: PropertyFlag) -> Result<ListPage<Property>, Rejected> {
        self.slice.dispatch(Action::Pending(Operation::Update));
        if let Err(e) = self.flags.toggle_property_flag(id, flag).await {
            return Err(self.slice.reject(Operation::Update, &e));
        }
        info!(id, ?flag, "property flag toggled, refreshing current page");

        let query = self
            .slice
            .read(|state| state.last_query.clone())
            .unwrap_or_else(|| ListQuery::page(1, 10));
        self.slice.fetch_list(query).await
    }
}
