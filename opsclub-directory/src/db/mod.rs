//! Database setup for the directory store

pub mod directory;
pub mod likes;

use deadpool_postgres::Pool;
use tracing::info;

use crate::error::Result;

/// Run database migrations
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;

    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS company (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                blurb TEXT,
                url TEXT NOT NULL,
                like_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            &[],
        )
        .await?;

    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS repo (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                url TEXT NOT NULL,
                stars INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            &[],
        )
        .await?;

    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS tag (
                id SERIAL PRIMARY KEY,
                tag TEXT NOT NULL UNIQUE
            )
            "#,
            &[],
        )
        .await?;

    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS company_tag (
                company_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (company_id, tag_id)
            )
            "#,
            &[],
        )
        .await?;

    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS repo_tag (
                repo_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (repo_id, tag_id)
            )
            "#,
            &[],
        )
        .await?;

    // One like per (entity, user); the composite key is the uniqueness
    // invariant the toggle service relies on.
    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS company_like (
                company_id INTEGER NOT NULL,
                user_identity TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (company_id, user_identity)
            )
            "#,
            &[],
        )
        .await?;

    client
        .execute(
            r#"
            CREATE TABLE IF NOT EXISTS repo_like (
                repo_id INTEGER NOT NULL,
                user_identity TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (repo_id, user_identity)
            )
            "#,
            &[],
        )
        .await?;

    // Indexes for the "my likes" views
    client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_company_like_user ON company_like (user_identity)",
            &[],
        )
        .await?;

    client
        .execute(
            "CREATE INDEX IF NOT EXISTS idx_repo_like_user ON repo_like (user_identity)",
            &[],
        )
        .await?;

    // Store-side atomic counter bumps. When a deployment's store predates
    // these, the toggle service falls back to read-modify-write.
    client
        .batch_execute(
            r#"
            CREATE OR REPLACE FUNCTION bump_company_likes(cid INTEGER, delta INTEGER)
            RETURNS INTEGER AS $$
                UPDATE company
                SET like_count = GREATEST(like_count + delta, 0)
                WHERE id = cid
                RETURNING like_count;
            $$ LANGUAGE sql;

            CREATE OR REPLACE FUNCTION bump_repo_likes(rid INTEGER, delta INTEGER)
            RETURNS INTEGER AS $$
                UPDATE repo
                SET like_count = GREATEST(like_count + delta, 0)
                WHERE id = rid
                RETURNING like_count;
            $$ LANGUAGE sql;
            "#,
        )
        .await?;

    info!("Database migrations completed");
    Ok(())
}
