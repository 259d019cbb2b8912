use tokio::sync::RwLock;

use compass_core::domain::lead::{NewContactMessage, NewLead};

use super::{ContactRepository, LeadRepository, RepositoryError};

/// In-memory lead store for tests and endpoint doubles.
#[derive(Default)]
pub struct InMemoryLeadRepository {
    records: RwLock<Vec<NewLead>>,
}

impl InMemoryLeadRepository {
    pub async fn snapshot(&self) -> Vec<NewLead> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn append(&self, lead: NewLead) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.push(lead);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryContactRepository {
    records: RwLock<Vec<NewContactMessage>>,
}

impl InMemoryContactRepository {
    pub async fn snapshot(&self) -> Vec<NewContactMessage> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn append(&self, message: NewContactMessage) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.push(message);
        Ok(())
    }
}
