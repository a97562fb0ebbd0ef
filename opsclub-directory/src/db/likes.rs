//! Postgres implementation of the like store

use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::error::{Error, Result};
use crate::likes::{EntityKind, LikeStore};

/// Like storage backed by the directory's Postgres store
#[derive(Clone)]
pub struct PgLikeStore {
    pool: Pool,
}

impl PgLikeStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl LikeStore for PgLikeStore {
    async fn find_like(
        &self,
        kind: EntityKind,
        entity_id: i32,
        user_identity: &str,
    ) -> Result<bool> {
        let client = self.pool.get().await?;

        let sql = match kind {
            EntityKind::Company => {
                "SELECT 1 FROM company_like WHERE company_id = $1 AND user_identity = $2"
            }
            EntityKind::Repo => {
                "SELECT 1 FROM repo_like WHERE repo_id = $1 AND user_identity = $2"
            }
        };
        let row = client.query_opt(sql, &[&entity_id, &user_identity]).await?;

        Ok(row.is_some())
    }

    async fn insert_like(
        &self,
        kind: EntityKind,
        entity_id: i32,
        user_identity: &str,
    ) -> Result<()> {
        let client = self.pool.get().await?;

        // Plain insert: a concurrent duplicate hits the composite primary
        // key and surfaces as a store error, preserving uniqueness.
        let sql = match kind {
            EntityKind::Company => {
                "INSERT INTO company_like (company_id, user_identity) VALUES ($1, $2)"
            }
            EntityKind::Repo => "INSERT INTO repo_like (repo_id, user_identity) VALUES ($1, $2)",
        };
        client.execute(sql, &[&entity_id, &user_identity]).await?;

        Ok(())
    }

    async fn delete_like(
        &self,
        kind: EntityKind,
        entity_id: i32,
        user_identity: &str,
    ) -> Result<()> {
        let client = self.pool.get().await?;

        let sql = match kind {
            EntityKind::Company => {
                "DELETE FROM company_like WHERE company_id = $1 AND user_identity = $2"
            }
            EntityKind::Repo => "DELETE FROM repo_like WHERE repo_id = $1 AND user_identity = $2",
        };
        client.execute(sql, &[&entity_id, &user_identity]).await?;

        Ok(())
    }

    async fn try_atomic_adjust(
        &self,
        kind: EntityKind,
        entity_id: i32,
        delta: i32,
    ) -> Result<Option<i32>> {
        let client = self.pool.get().await?;

        let sql = match kind {
            EntityKind::Company => "SELECT bump_company_likes($1, $2)",
            EntityKind::Repo => "SELECT bump_repo_likes($1, $2)",
        };
        match client.query_one(sql, &[&entity_id, &delta]).await {
            Ok(row) => {
                let count: Option<i32> = row.get(0);
                match count {
                    Some(count) => Ok(Some(count)),
                    // The function matched no row: the entity is gone
                    None => Err(Error::NotFound(format!(
                        "{} {} not found",
                        kind.as_str(),
                        entity_id
                    ))),
                }
            }
            // Store without the function installed: signal the caller to
            // take the fallback path.
            Err(e) if e.code() == Some(&SqlState::UNDEFINED_FUNCTION) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_count(&self, kind: EntityKind, entity_id: i32) -> Result<i32> {
        let client = self.pool.get().await?;

        let sql = match kind {
            EntityKind::Company => "SELECT like_count FROM company WHERE id = $1",
            EntityKind::Repo => "SELECT like_count FROM repo WHERE id = $1",
        };
        let row = client.query_opt(sql, &[&entity_id]).await?;

        match row {
            Some(row) => Ok(row.get(0)),
            None => Err(Error::NotFound(format!(
                "{} {} not found",
                kind.as_str(),
                entity_id
            ))),
        }
    }

    async fn write_count(&self, kind: EntityKind, entity_id: i32, count: i32) -> Result<i32> {
        let client = self.pool.get().await?;

        let sql = match kind {
            EntityKind::Company => {
                "UPDATE company SET like_count = $2 WHERE id = $1 RETURNING like_count"
            }
            EntityKind::Repo => "UPDATE repo SET like_count = $2 WHERE id = $1 RETURNING like_count",
        };
        let row = client.query_opt(sql, &[&entity_id, &count]).await?;

        match row {
            Some(row) => Ok(row.get(0)),
            None => Err(Error::NotFound(format!(
                "{} {} not found",
                kind.as_str(),
                entity_id
            ))),
        }
    }
}
