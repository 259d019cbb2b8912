//! Append-only capture stores.
//!
//! The endpoints only ever add records; reading them back is the job of
//! downstream tooling, so the traits expose a single `append` each.

use async_trait::async_trait;
use thiserror::Error;

use compass_core::domain::lead::{NewContactMessage, NewLead};

pub mod contact;
pub mod lead;
pub mod memory;

pub use contact::SqlContactRepository;
pub use lead::SqlLeadRepository;
pub use memory::{InMemoryContactRepository, InMemoryLeadRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encode error: {0}")]
    Encode(String),
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn append(&self, lead: NewLead) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn append(&self, message: NewContactMessage) -> Result<(), RepositoryError>;
}
