use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::engine::RankingEngine;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    username: Option<String>,
}

/// `GET /search?username=<string>` — prefix match against usernames,
/// case-insensitive, each row's rank computed from the same snapshot as the
/// match. `username` is required; its absence is the one 400 this surface
/// produces.
pub async fn get_search(
    engine: Data<RankingEngine>,
    query: Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let username = query.username.as_deref().ok_or(ApiError::MissingParam("username"))?;
    let rows = engine.prefix_search(username);
    Ok(HttpResponse::Ok().json(rows))
}
