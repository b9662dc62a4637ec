//! The traffic simulator: a dedicated background thread that keeps the
//! leaderboard moving the way live traffic would, without ever holding the
//! engine's lock across randomness generation or across more than one
//! `upsert`.
//!
//! Runs on a plain `std::thread`, not a tokio task, so it keeps making
//! progress regardless of how busy the `actix-web` worker threads are, the
//! same dedicated-thread-with-a-stop-flag pattern used for other background
//! run loops in this codebase.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::engine::RankingEngine;

pub struct SimulatorConfig {
    pub batch_size: usize,
    pub period: Duration,
}

/// Handle used to request a clean shutdown of the background thread.
#[derive(Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        StopSignal(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Spawns the simulator thread and returns the `StopSignal` used to shut it
/// down. The thread observes the signal between ticks and during its idle
/// wait, never mid-batch.
pub fn spawn(engine: Arc<RankingEngine>, config: SimulatorConfig) -> StopSignal {
    let stop = StopSignal::new();
    let stop_for_thread = stop.clone();

    std::thread::Builder::new()
        .name(String::from("simulator"))
        .spawn(move || run(engine, config, stop_for_thread))
        .expect("failed to spawn the traffic simulator thread");

    stop
}

fn run(engine: Arc<RankingEngine>, config: SimulatorConfig, stop: StopSignal) {
    let mut rng = SmallRng::from_entropy();

    loop {
        if stop.is_stopped() {
            return;
        }
        std::thread::sleep(config.period);
        if stop.is_stopped() {
            return;
        }

        apply_one_batch(&engine, &config, &mut rng);
    }
}

/// One simulator tick: snapshot usernames under a read lock, release it,
/// then pick up to `batch_size` users and draw fresh ratings without
/// holding any lock. Each `upsert` takes its own write critical section.
fn apply_one_batch(engine: &RankingEngine, config: &SimulatorConfig, rng: &mut SmallRng) {
    let usernames = engine.usernames_snapshot();
    if usernames.is_empty() {
        return;
    }

    let batch_size = config.batch_size.min(usernames.len());
    let chosen: Vec<&String> = usernames.choose_multiple(rng, batch_size).collect();

    let (min, max) = (engine.config().rating_min, engine.config().rating_max);
    let mut applied = 0u32;
    for username in chosen {
        let rating = rng.gen_range(min..=max);
        // The simulator only ever draws ratings inside the configured
        // domain, so this upsert must never return InvalidRating.
        if engine.upsert(username, rating).is_ok() {
            applied += 1;
        }
    }
    tracing::info!(applied, "traffic simulator batch applied");
}
