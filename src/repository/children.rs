//! Child directory repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Child};

use super::ChildDirectory;

#[derive(Clone)]
pub struct ChildrenRepository {
    pool: Pool<Postgres>,
}

impl ChildrenRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChildDirectory for ChildrenRepository {
    async fn resolve_name(&self, child_id: &str) -> AppResult<Option<String>> {
        let child = sqlx::query_as::<_, Child>("SELECT * FROM children WHERE id = $1")
            .bind(child_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(child.map(|c| c.full_name()))
    }

    async fn ids_in_class(&self, class_id: &str) -> AppResult<Vec<String>> {
        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT id FROM children WHERE class_id = $1 AND active",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
