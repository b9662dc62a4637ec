use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::engine::RankingEngine;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    limit: Option<String>,
}

/// `GET /leaderboard?limit=<int>` — top `limit` users by rating descending,
/// dense competition ranks. A missing, non-positive, or unparsable `limit`
/// is clamped to the configured default; this is a clamp, not a client
/// error, so it never produces a 400.
pub async fn get_leaderboard(
    engine: Data<RankingEngine>,
    query: Query<LeaderboardQuery>,
) -> HttpResponse {
    let parsed = query.limit.as_deref().and_then(|raw| raw.parse::<i64>().ok());
    let limit = engine.clamp_limit(parsed);
    let rows = engine.top_n(limit);
    HttpResponse::Ok().json(rows)
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::*;
    use crate::engine::EngineConfig;

    fn test_engine() -> Data<RankingEngine> {
        let engine = RankingEngine::new(EngineConfig {
            rating_min: 100,
            rating_max: 5000,
            limit_default: 100,
            limit_max: 1000,
            search_limit: 50,
        });
        for i in 0..1500 {
            engine.upsert(&format!("user_{i}"), 100 + i).unwrap();
        }
        Data::new(engine)
    }

    #[actix_web::test]
    async fn limit_is_clamped_to_the_configured_bounds() {
        let engine = test_engine();
        let app = test::init_service(
            App::new().app_data(engine.clone()).route(
                "/leaderboard",
                actix_web::web::get().to(get_leaderboard),
            ),
        )
        .await;

        for (query, expected_len) in
            [("limit=abc", 100), ("limit=0", 100), ("limit=5000", 1000), ("limit=7", 7)]
        {
            let req = test::TestRequest::get().uri(&format!("/leaderboard?{query}")).to_request();
            let body: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body.len(), expected_len, "query {query}");
        }
    }
}
