//! Client-side caches of the REST collections.
//!
//! Each store wraps a [`ResourceSlice`]: list, pagination, selected item and
//! in-flight status, changed only through [`Action`]s applied by [`reduce`].
//! Async operations dispatch `Pending` first and exactly one terminal action
//! afterwards; failures are stored as a message and returned as [`Rejected`].

use std::fmt;

pub mod blog;
pub mod properties;
pub mod slice;
pub mod users;

pub use blog::{BlogStore, Taxonomy};
pub use properties::PropertyStore;
pub use slice::{reduce, Action, Listener, ResourceSlice, SliceState};
pub use users::{AgentsState, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchList,
    FetchOne,
    Create,
    Update,
    Remove,
}

impl Operation {
    /// Message used when the server gave no structured error
    pub fn fallback_message(self, singular: &str, plural: &str) -> String {
        match self {
            Operation::FetchList => format!("Failed to fetch {plural}"),
            Operation::FetchOne => format!("Failed to fetch {singular}"),
            Operation::Create => format!("Failed to create {singular}"),
            Operation::Update => format!("Failed to update {singular}"),
            Operation::Remove => format!("Failed to delete {singular}"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FetchList => "fetchList",
            Operation::FetchOne => "fetchById",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Value an operation rejects with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{op} rejected: {message}")]
pub struct Rejected {
    pub op: Operation,
    pub message: String,
}
