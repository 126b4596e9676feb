//! Client core for the property portal: typed access to the listing
//! backend, cached collection state for the admin and public screens,
//! multilingual text resolution and validated media uploads.

pub mod api;
pub mod config;
pub mod i18n;
pub mod models;
pub mod store;
pub mod upload;

pub use api::{ApiClient, ClientError, ListQuery, PropertyFilter};
pub use config::Config;
pub use i18n::{resolve, resolve_value, Language, LocalizedText, MultilingualText};
pub use store::{BlogStore, PropertyStore, Rejected, UserStore};
pub use upload::{FileSelection, UploadKind, UploadWidget};
