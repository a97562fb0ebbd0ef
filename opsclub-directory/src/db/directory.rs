//! Read side of the directory: entity rows, tag rows, liked-id lookups

use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;

use crate::error::Result;
use crate::tags::TagRow;

/// Company directory row
#[derive(Debug, Clone)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub blurb: Option<String>,
    pub url: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Open-source repository directory row
#[derive(Debug, Clone)]
pub struct Repo {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: i32,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

/// All companies, name ascending
pub async fn list_companies(pool: &Pool) -> Result<Vec<Company>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, name, blurb, url, like_count, created_at
            FROM company
            ORDER BY name ASC
            "#,
            &[],
        )
        .await?;

    Ok(rows.iter().map(row_to_company).collect())
}

/// All repositories, stars descending
pub async fn list_repos(pool: &Pool) -> Result<Vec<Repo>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, name, description, url, stars, like_count, created_at
            FROM repo
            ORDER BY stars DESC, name ASC
            "#,
            &[],
        )
        .await?;

    Ok(rows.iter().map(row_to_repo).collect())
}

pub async fn get_company(pool: &Pool, id: i32) -> Result<Option<Company>> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT id, name, blurb, url, like_count, created_at FROM company WHERE id = $1",
            &[&id],
        )
        .await?;

    Ok(row.as_ref().map(row_to_company))
}

pub async fn get_repo(pool: &Pool, id: i32) -> Result<Option<Repo>> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT id, name, description, url, stars, like_count, created_at FROM repo WHERE id = $1",
            &[&id],
        )
        .await?;

    Ok(row.as_ref().map(row_to_repo))
}

/// Companies in a given id set, in the listing's canonical order
pub async fn companies_by_ids(pool: &Pool, ids: &[i32]) -> Result<Vec<Company>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, name, blurb, url, like_count, created_at
            FROM company
            WHERE id = ANY($1)
            ORDER BY name ASC
            "#,
            &[&ids],
        )
        .await?;

    Ok(rows.iter().map(row_to_company).collect())
}

/// Repositories in a given id set, in the listing's canonical order
pub async fn repos_by_ids(pool: &Pool, ids: &[i32]) -> Result<Vec<Repo>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT id, name, description, url, stars, like_count, created_at
            FROM repo
            WHERE id = ANY($1)
            ORDER BY stars DESC, name ASC
            "#,
            &[&ids],
        )
        .await?;

    Ok(rows.iter().map(row_to_repo).collect())
}

/// Tag rows for a batch of companies, one bulk query
pub async fn company_tag_rows(pool: &Pool, ids: &[i32]) -> Result<Vec<TagRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT ct.company_id, t.tag
            FROM company_tag ct
            JOIN tag t ON t.id = ct.tag_id
            WHERE ct.company_id = ANY($1)
            "#,
            &[&ids],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| TagRow {
            entity_id: row.get(0),
            tag: row.get(1),
        })
        .collect())
}

/// Tag rows for a batch of repositories, one bulk query
pub async fn repo_tag_rows(pool: &Pool, ids: &[i32]) -> Result<Vec<TagRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let client = pool.get().await?;

    let rows = client
        .query(
            r#"
            SELECT rt.repo_id, t.tag
            FROM repo_tag rt
            JOIN tag t ON t.id = rt.tag_id
            WHERE rt.repo_id = ANY($1)
            "#,
            &[&ids],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| TagRow {
            entity_id: row.get(0),
            tag: row.get(1),
        })
        .collect())
}

/// Ids of companies the user has liked
pub async fn liked_company_ids(pool: &Pool, user_identity: &str) -> Result<Vec<i32>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT company_id FROM company_like WHERE user_identity = $1",
            &[&user_identity],
        )
        .await?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Ids of repositories the user has liked
pub async fn liked_repo_ids(pool: &Pool, user_identity: &str) -> Result<Vec<i32>> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT repo_id FROM repo_like WHERE user_identity = $1",
            &[&user_identity],
        )
        .await?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

fn row_to_company(row: &tokio_postgres::Row) -> Company {
    Company {
        id: row.get(0),
        name: row.get(1),
        blurb: row.get(2),
        url: row.get(3),
        like_count: row.get(4),
        created_at: row.get(5),
    }
}

fn row_to_repo(row: &tokio_postgres::Row) -> Repo {
    Repo {
        id: row.get(0),
        name: row.get(1),
        description: row.get(2),
        url: row.get(3),
        stars: row.get(4),
        like_count: row.get(5),
        created_at: row.get(6),
    }
}
