use chrono::Utc;
use uuid::Uuid;

use compass_core::domain::lead::NewContactMessage;

use super::{ContactRepository, RepositoryError};
use crate::DbPool;

pub struct SqlContactRepository {
    pool: DbPool,
}

impl SqlContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ContactRepository for SqlContactRepository {
    async fn append(&self, message: NewContactMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO contact_messages \
             (id, first_name, last_name, email, message, form_type, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&message.first_name)
        .bind(&message.last_name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(&message.form_type)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
