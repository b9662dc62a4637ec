pub mod engine;
pub mod error;
pub mod option;
pub mod routes;
pub mod simulator;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceResponse};
use actix_web::web::Data;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub use option::Opt;

use engine::{EngineConfig, RankingEngine};

impl From<&Opt> for EngineConfig {
    fn from(opt: &Opt) -> Self {
        EngineConfig {
            rating_min: opt.rating_min,
            rating_max: opt.rating_max,
            limit_default: opt.limit_default,
            limit_max: opt.limit_max,
            search_limit: opt.search_limit,
        }
    }
}

/// Seeds `count` synthetic users `user_0 .. user_{count-1}` with uniformly
/// random ratings. O(count); the engine is not served requests before this
/// returns.
pub fn seed_users(engine: &RankingEngine, count: usize) {
    let mut rng = SmallRng::from_entropy();
    let (min, max) = (engine.config().rating_min, engine.config().rating_max);
    for i in 0..count {
        let rating = rng.gen_range(min..=max);
        engine
            .upsert(&format!("user_{i}"), rating)
            .expect("seeded ratings are always drawn from the configured domain");
    }
}

/// Builds the `actix-web` app: wires the shared `RankingEngine`, mounts the
/// three query-surface routes, and applies the permissive CORS policy and
/// request-logging middleware every response carries.
pub fn create_app(
    engine: Data<RankingEngine>,
) -> actix_web::App<
    impl ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    actix_web::App::new()
        .app_data(engine)
        .configure(routes::configure)
        .wrap(
            Cors::default()
                .send_wildcard()
                .allow_any_header()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "OPTIONS"])
                .max_age(86_400),
        )
        .wrap(tracing_actix_web::TracingLogger::default())
}
