//! Tag aggregation
//!
//! Decorates batches of directory entities with their tag labels. Tag rows
//! for a whole batch arrive from one bulk query; this module only reshapes
//! them. Upstream ordering of the entities is preserved, and an entity with
//! no tags gets an empty list, never a missing field.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::directory::{Company, Repo};

/// One row of the entity-to-tag join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub entity_id: i32,
    pub tag: String,
}

/// Group tag labels by entity id. Label order within an entity follows the
/// join order, which is arbitrary.
pub fn group_by_entity(rows: Vec<TagRow>) -> HashMap<i32, Vec<String>> {
    let mut grouped: HashMap<i32, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.entity_id).or_default().push(row.tag);
    }
    grouped
}

/// A company decorated for list and detail responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithTags {
    pub id: i32,
    pub name: String,
    pub blurb: Option<String>,
    pub url: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// A repository decorated for list and detail responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoWithTags {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: i32,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

pub fn companies_with_tags(companies: Vec<Company>, rows: Vec<TagRow>) -> Vec<CompanyWithTags> {
    let mut grouped = group_by_entity(rows);
    companies
        .into_iter()
        .map(|company| CompanyWithTags {
            tags: grouped.remove(&company.id).unwrap_or_default(),
            id: company.id,
            name: company.name,
            blurb: company.blurb,
            url: company.url,
            like_count: company.like_count,
            created_at: company.created_at,
        })
        .collect()
}

pub fn repos_with_tags(repos: Vec<Repo>, rows: Vec<TagRow>) -> Vec<RepoWithTags> {
    let mut grouped = group_by_entity(rows);
    repos
        .into_iter()
        .map(|repo| RepoWithTags {
            tags: grouped.remove(&repo.id).unwrap_or_default(),
            id: repo.id,
            name: repo.name,
            description: repo.description,
            url: repo.url,
            stars: repo.stars,
            like_count: repo.like_count,
            created_at: repo.created_at,
        })
        .collect()
}
