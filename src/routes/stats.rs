use actix_web::web::Data;
use actix_web::HttpResponse;
use serde::Serialize;

use crate::engine::RankingEngine;

#[derive(Serialize)]
struct Stats {
    total_users: usize,
}

/// `GET /stats` — current population size. Never fails.
pub async fn get_stats(engine: Data<RankingEngine>) -> HttpResponse {
    HttpResponse::Ok().json(Stats { total_users: engine.size() })
}
