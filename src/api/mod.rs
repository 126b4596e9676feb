pub mod blog;
pub mod client;
pub mod content;
pub mod error;
pub mod properties;
pub mod traits;
pub mod types;
pub mod upload;
pub mod users;

pub use blog::BlogApi;
pub use client::ApiClient;
pub use error::ClientError;
pub use properties::{PropertyFlag, PropertyFlags};
pub use traits::{Resource, ResourceBackend, Uploader};
pub use types::{BlogFilter, ListPage, ListQuery, PropertyFilter};
pub use users::AgentDirectory;
