//! Open-source repository directory endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use tracing::info;

use crate::api::parse_entity_id;
use crate::db::directory;
use crate::error::{Error, Result};
use crate::likes::{self, EntityKind, LikeOutcome};
use crate::tags::{self, RepoWithTags};
use crate::{AppState, auth};

/// Response for the repository listing views
#[derive(Debug, Serialize)]
pub struct ReposResponse {
    pub repos: Vec<RepoWithTags>,
}

/// GET /api/repos
pub async fn list_repos(State(state): State<Arc<AppState>>) -> Result<Json<ReposResponse>> {
    let repos = directory::list_repos(&state.db_pool).await?;
    let ids: Vec<i32> = repos.iter().map(|r| r.id).collect();
    let rows = directory::repo_tag_rows(&state.db_pool, &ids).await?;

    Ok(Json(ReposResponse {
        repos: tags::repos_with_tags(repos, rows),
    }))
}

/// GET /api/repos/{id}
pub async fn get_repo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RepoWithTags>> {
    let id = parse_entity_id(&id)?;

    let repo = directory::get_repo(&state.db_pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("repo {} not found", id)))?;
    let rows = directory::repo_tag_rows(&state.db_pool, &[id]).await?;

    let mut decorated = tags::repos_with_tags(vec![repo], rows);
    Ok(Json(decorated.remove(0)))
}

/// POST /api/repos/{id}/like
pub async fn like_repo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LikeOutcome>> {
    let id = parse_entity_id(&id)?;
    let user =
        auth::resolve_identity(&state.identity, &headers, &state.config.session_cookie).await?;

    if directory::get_repo(&state.db_pool, id).await?.is_none() {
        return Err(Error::NotFound(format!("repo {} not found", id)));
    }

    let outcome =
        likes::toggle_like(&state.like_store, EntityKind::Repo, id, user.identity()).await?;
    info!(
        repo_id = id,
        user = user.identity(),
        liked = outcome.liked,
        "repo like toggled"
    );

    Ok(Json(outcome))
}

/// GET /api/repos/liked
pub async fn liked_repos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ReposResponse>> {
    let user =
        auth::resolve_identity(&state.identity, &headers, &state.config.session_cookie).await?;

    let ids = directory::liked_repo_ids(&state.db_pool, user.identity()).await?;
    let repos = directory::repos_by_ids(&state.db_pool, &ids).await?;
    let rows = directory::repo_tag_rows(&state.db_pool, &ids).await?;

    Ok(Json(ReposResponse {
        repos: tags::repos_with_tags(repos, rows),
    }))
}
