//! Launch-time configuration. A single `clap::Parser` struct, every field
//! also readable from a `MATIKS_*` environment variable. There is no config
//! file layer here, since this service carries no persisted state to
//! reconcile one against.

use std::time::Duration;

use clap::Parser;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RATING_MIN: i32 = 100;
const DEFAULT_RATING_MAX: i32 = 5000;
const DEFAULT_SEED_COUNT: usize = 10_000;
const DEFAULT_SIMULATOR_BATCH_SIZE: usize = 10;
const DEFAULT_SIMULATOR_PERIOD_MS: u64 = 1_000;
const DEFAULT_SEARCH_LIMIT: usize = 50;
const DEFAULT_LIMIT_MAX: usize = 1000;
const DEFAULT_LIMIT_DEFAULT: usize = 100;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser, Clone)]
#[clap(version, next_display_order = None)]
pub struct Opt {
    /// Sets the HTTP address and port the server will listen on.
    #[clap(long, env = "MATIKS_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    pub http_addr: String,

    /// Lower bound of the rating domain, inclusive.
    #[clap(long, env = "MATIKS_RATING_MIN", default_value_t = DEFAULT_RATING_MIN)]
    pub rating_min: i32,

    /// Upper bound of the rating domain, inclusive.
    #[clap(long, env = "MATIKS_RATING_MAX", default_value_t = DEFAULT_RATING_MAX)]
    pub rating_max: i32,

    /// Number of synthetic users seeded at startup.
    #[clap(long, env = "MATIKS_SEED_COUNT", default_value_t = DEFAULT_SEED_COUNT)]
    pub seed_count: usize,

    /// Number of users the traffic simulator re-rates per tick.
    #[clap(long, env = "MATIKS_SIMULATOR_BATCH_SIZE", default_value_t = DEFAULT_SIMULATOR_BATCH_SIZE)]
    pub simulator_batch_size: usize,

    /// Traffic simulator tick cadence, in milliseconds.
    #[clap(long, env = "MATIKS_SIMULATOR_PERIOD_MS", default_value_t = DEFAULT_SIMULATOR_PERIOD_MS)]
    pub simulator_period_ms: u64,

    /// Maximum rows returned by `/search`.
    #[clap(long, env = "MATIKS_SEARCH_LIMIT", default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub search_limit: usize,

    /// Upper clamp for `/leaderboard?limit=`.
    #[clap(long, env = "MATIKS_LIMIT_MAX", default_value_t = DEFAULT_LIMIT_MAX)]
    pub limit_max: usize,

    /// Default used for `/leaderboard?limit=` when the value is missing,
    /// non-positive, or fails to parse.
    #[clap(long, env = "MATIKS_LIMIT_DEFAULT", default_value_t = DEFAULT_LIMIT_DEFAULT)]
    pub limit_default: usize,

    /// Tracing log level (`error`, `warn`, `info`, `debug`, `trace`).
    #[clap(long, env = "MATIKS_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log output format.
    #[clap(long = "log-level-mode", env = "MATIKS_LOG_MODE", value_enum, default_value = "human")]
    pub log_mode: LogModeArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogModeArg {
    Human,
    Json,
}

impl Opt {
    /// Parses argv/env and validates cross-field constraints clap can't
    /// express on its own. Fails fast with a descriptive error rather than
    /// starting the server with a broken configuration.
    pub fn try_build() -> anyhow::Result<Self> {
        let opt = Opt::parse();
        anyhow::ensure!(
            opt.rating_min <= opt.rating_max,
            "rating-min ({}) must be <= rating-max ({})",
            opt.rating_min,
            opt.rating_max
        );
        anyhow::ensure!(opt.limit_default >= 1, "limit-default must be >= 1");
        anyhow::ensure!(
            opt.limit_default <= opt.limit_max,
            "limit-default ({}) must be <= limit-max ({})",
            opt.limit_default,
            opt.limit_max
        );
        Ok(opt)
    }

    pub fn simulator_period(&self) -> Duration {
        Duration::from_millis(self.simulator_period_ms)
    }
}
