use chrono::Utc;
use uuid::Uuid;

use compass_core::domain::lead::NewLead;

use super::{LeadRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLeadRepository {
    pool: DbPool,
}

impl SqlLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LeadRepository for SqlLeadRepository {
    /// One atomic INSERT per lead; concurrent submissions serialize in
    /// SQLite rather than overwriting each other.
    async fn append(&self, lead: NewLead) -> Result<(), RepositoryError> {
        let tech_stack = serde_json::to_string(&lead.tech_stack)
            .map_err(|error| RepositoryError::Encode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO leads \
             (id, name, email, company_size, bottleneck, tech_stack, ai_response, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.company_size)
        .bind(&lead.bottleneck)
        .bind(tech_stack)
        .bind(&lead.ai_response)
        .bind(lead.status.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
