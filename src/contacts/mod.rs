pub mod builder;
pub mod feed;
pub mod groups;
pub mod manager;
pub mod normalize;
pub mod providers;
pub mod types;

pub use builder::build_contact;
pub use feed::{ContactEntry, ContactFeed, GroupEntry, GroupFeed};
pub use groups::GroupCatalog;
pub use manager::{ContactsManager, LookupOutcome};
pub use providers::{ContactsProvider, GoogleContactsProvider};
pub use types::{Contact, ContactGroup, EmailAddress, PhoneNumber, PostalAddress};

use thiserror::Error;

/// Contact retrieval errors
#[derive(Error, Debug)]
pub enum ContactsError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type ContactsResult<T> = Result<T, ContactsError>;
