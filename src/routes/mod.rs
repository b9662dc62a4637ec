//! The query surface: three stateless `actix-web` handlers translating
//! HTTP query parameters into `RankingEngine` calls and back to JSON.

pub mod leaderboard;
pub mod search;
pub mod stats;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/leaderboard").route(web::get().to(leaderboard::get_leaderboard)))
        .service(web::resource("/search").route(web::get().to(search::get_search)))
        .service(web::resource("/stats").route(web::get().to(stats::get_stats)));
}
