//! HTTP-facing error taxonomy.
//!
//! The engine itself only ever fails with [`RankingError::InvalidRating`];
//! the query surface adds the one error a request can trigger on its own
//! (a missing required parameter). Both map onto a small JSON error body
//! via a direct `ResponseError` impl — with only two variants, a stable
//! wire-code registry would be pure overhead.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::engine::RankingError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error("missing required query parameter `{0}`")]
    MissingParam(&'static str),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ranking(RankingError::InvalidRating { .. }) => StatusCode::BAD_REQUEST,
            ApiError::MissingParam(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody { message: self.to_string() })
    }
}
