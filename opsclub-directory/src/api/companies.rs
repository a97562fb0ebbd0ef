//! Company directory endpoints

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
use crate::tags::{self, CompanyWithTags};
use crate::{AppState, auth};

/// Response for the company listing views
#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<CompanyWithTags>,
}

/// GET /api/companies
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CompaniesResponse>> {
    let companies = directory::list_companies(&state.db_pool).await?;
    let ids: Vec<i32> = companies.iter().map(|c| c.id).collect();
    let rows = directory::company_tag_rows(&state.db_pool, &ids).await?;

    Ok(Json(CompaniesResponse {
        companies: tags::companies_with_tags(companies, rows),
    }))
}

/// GET /api/companies/{id}
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CompanyWithTags>> {
    let id = parse_entity_id(&id)?;

    let company = directory::get_company(&state.db_pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("company {} not found", id)))?;
    let rows = directory::company_tag_rows(&state.db_pool, &[id]).await?;

    let mut decorated = tags::companies_with_tags(vec![company], rows);
    Ok(Json(decorated.remove(0)))
}

/// POST /api/companies/{id}/like
pub async fn like_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LikeOutcome>> {
    let id = parse_entity_id(&id)?;
    let user =
        auth::resolve_identity(&state.identity, &headers, &state.config.session_cookie).await?;

    if directory::get_company(&state.db_pool, id).await?.is_none() {
        return Err(Error::NotFound(format!("company {} not found", id)));
    }

    let outcome =
        likes::toggle_like(&state.like_store, EntityKind::Company, id, user.identity()).await?;
    info!(
        company_id = id,
        user = user.identity(),
        liked = outcome.liked,
        "company like toggled"
    );

    Ok(Json(outcome))
}

/// GET /api/companies/liked
pub async fn liked_companies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CompaniesResponse>> {
    let user =
        auth::resolve_identity(&state.identity, &headers, &state.config.session_cookie).await?;

    let ids = directory::liked_company_ids(&state.db_pool, user.identity()).await?;
    let companies = directory::companies_by_ids(&state.db_pool, &ids).await?;
    let rows = directory::company_tag_rows(&state.db_pool, &ids).await?;

    Ok(Json(CompaniesResponse {
        companies: tags::companies_with_tags(companies, rows),
    }))
}
