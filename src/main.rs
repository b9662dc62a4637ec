use std::io::LineWriter;
use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::KeepAlive;
use actix_web::web::Data;
use actix_web::HttpServer;
use matiks_ranking_engine::engine::{EngineConfig, RankingEngine};
use matiks_ranking_engine::option::LogModeArg;
use matiks_ranking_engine::{create_app, seed_users, simulator, Opt};
use tracing::level_filters::LevelFilter;

#[cfg(not(windows))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn setup_logging(opt: &Opt) {
    let level = LevelFilter::from_str(&opt.log_level).unwrap_or(LevelFilter::INFO);
    let writer = || LineWriter::new(std::io::stderr());

    match opt.log_mode {
        LogModeArg::Human => {
            tracing_subscriber::fmt().with_max_level(level).with_writer(writer).init()
        }
        LogModeArg::Json => {
            tracing_subscriber::fmt().json().with_max_level(level).with_writer(writer).init()
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::try_build()?;
    setup_logging(&opt);

    let engine = Arc::new(RankingEngine::new(EngineConfig::from(&opt)));

    tracing::info!(seed_count = opt.seed_count, "seeding synthetic users");
    seed_users(&engine, opt.seed_count);
    tracing::info!(population = engine.size(), "seeding complete");

    let stop_simulator = simulator::spawn(
        Arc::clone(&engine),
        simulator::SimulatorConfig {
            batch_size: opt.simulator_batch_size,
            period: opt.simulator_period(),
        },
    );

    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
        std::process::exit(130);
    });

    print_launch_banner(&opt);

    let engine_data = Data::from(engine);
    let http_addr = opt.http_addr.clone();
    let result = HttpServer::new(move || create_app(engine_data.clone()))
        .disable_signals()
        .keep_alive(KeepAlive::Os)
        .bind(&http_addr)?
        .run()
        .await;

    stop_simulator.stop();
    result.map_err(anyhow::Error::from)
}

fn print_launch_banner(opt: &Opt) {
    eprintln!("matiks-ranking-engine");
    eprintln!("Listening on:\t\thttp://{}", opt.http_addr);
    eprintln!("Rating domain:\t\t[{}, {}]", opt.rating_min, opt.rating_max);
    eprintln!(
        "Traffic simulator:\t{} users/tick every {:?}",
        opt.simulator_batch_size,
        opt.simulator_period()
    );
    eprintln!();
}
