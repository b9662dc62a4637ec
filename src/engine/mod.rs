//! The ranking engine: owns the bucket histogram and the user
//! directory behind one `parking_lot::RwLock` and exposes the five
//! operations that every reader and writer in the system goes through.
//!
//! Readers (`rank_of`, `top_n`, `prefix_search`, `size`) take the shared
//! (read) guard. `upsert` takes the exclusive (write) guard for its full
//! three-step transition — it is never split into smaller critical
//! sections, because a reader observing the state between the old-bucket
//! decrement and the directory swap would see the global invariant
//! (`sum(histogram) == directory.len()`) broken.

mod directory;
mod histogram;

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use directory::Directory;
use histogram::Histogram;

pub use directory::User;

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("rating {rating} is outside the allowed range [{min}, {max}]")]
    InvalidRating { rating: i32, min: i32, max: i32 },
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub rating_min: i32,
    pub rating_max: i32,
    pub limit_default: usize,
    pub limit_max: usize,
    pub search_limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub rank: u64,
    pub username: String,
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRow {
    pub username: String,
    pub rating: i32,
    pub global_rank: u64,
}

struct EngineState {
    histogram: Histogram,
    directory: Directory,
}

impl EngineState {
    /// Non-locking helper: the caller already holds the read or write guard.
    /// Reused by `prefix_search` so it never takes a second acquisition on
    /// the same lock for each match's rank.
    fn rank_of_locked(&self, rating: i32) -> u64 {
        self.histogram.rank_of(rating)
    }
}

/// The engine singleton. Created once at bootstrap and shared behind
/// `actix_web::web::Data`; the traffic simulator holds its own clone of the
/// same `Arc`.
pub struct RankingEngine {
    config: EngineConfig,
    state: RwLock<EngineState>,
    upserts_applied: AtomicU64,
}

impl RankingEngine {
    pub fn new(config: EngineConfig) -> Self {
        RankingEngine {
            state: RwLock::new(EngineState {
                histogram: Histogram::new(config.rating_min, config.rating_max),
                directory: Directory::new(),
            }),
            config,
            upserts_applied: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Insert-or-replace a user's rating. The three-step transition runs
    /// under one exclusive critical section: decrement the old bucket (if
    /// the user already existed), increment the new bucket, then swap the
    /// directory record in. No modification is made if `rating` is out of
    /// range.
    pub fn upsert(&self, username: &str, rating: i32) -> Result<(), RankingError> {
        if !(self.config.rating_min..=self.config.rating_max).contains(&rating) {
            return Err(RankingError::InvalidRating {
                rating,
                min: self.config.rating_min,
                max: self.config.rating_max,
            });
        }

        let mut state = self.state.write();
        if let Some(old_rating) = state.directory.get(username).map(|u| u.rating) {
            if old_rating == rating {
                // idempotent: same rating applied twice changes nothing.
                return Ok(());
            }
            state.histogram.decrement(old_rating);
        }
        state.histogram.increment(rating);
        state.directory.upsert(username, rating);
        debug_assert_eq!(
            state.histogram.total(),
            state.directory.len() as u64,
            "global invariant violated: sum(histogram) != |directory|"
        );
        drop(state);

        self.upserts_applied.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(username, rating, "upsert applied");
        Ok(())
    }

    /// Dense competition rank a hypothetical user of `rating` would hold.
    pub fn rank_of(&self, rating: i32) -> Result<u64, RankingError> {
        if !(self.config.rating_min..=self.config.rating_max).contains(&rating) {
            return Err(RankingError::InvalidRating {
                rating,
                min: self.config.rating_min,
                max: self.config.rating_max,
            });
        }
        let state = self.state.read();
        Ok(state.rank_of_locked(rating))
    }

    pub fn size(&self) -> usize {
        self.state.read().directory.len()
    }

    /// Total number of `upsert` calls that committed a change, across the
    /// process lifetime. Exposed for logging only, not part of the
    /// public query surface.
    pub fn upserts_applied(&self) -> u64 {
        self.upserts_applied.load(Ordering::Relaxed)
    }

    /// Clamps `limit` into `[1, limit_max]`, defaulting to `limit_default`
    /// for non-positive or unparsed values.
    pub fn clamp_limit(&self, limit: Option<i64>) -> usize {
        match limit {
            Some(n) if n >= 1 => (n as u64).min(self.config.limit_max as u64) as usize,
            _ => self.config.limit_default,
        }
    }

    /// Top `limit` users by rating descending, username ascending within a
    /// tie, with dense competition ranks. Materializes a transient
    /// `rating -> usernames` grouping from the directory in one pass, then
    /// walks non-empty histogram buckets from `rating_max` down, so the
    /// whole snapshot is internally consistent.
    pub fn top_n(&self, limit: usize) -> Vec<LeaderboardRow> {
        let state = self.state.read();
        if state.directory.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut by_rating: std::collections::HashMap<i32, Vec<&str>> =
            std::collections::HashMap::new();
        for user in state.directory.iter() {
            by_rating.entry(user.rating).or_default().push(user.username.as_str());
        }

        let mut rows = Vec::with_capacity(limit);
        let mut rank = 1u64;
        for (rating, count) in state.histogram.non_empty_descending() {
            let mut names = by_rating.remove(&rating).unwrap_or_default();
            debug_assert_eq!(names.len(), count as usize);
            names.sort_unstable();
            for username in names {
                if rows.len() == limit {
                    return rows;
                }
                rows.push(LeaderboardRow { rank, username: username.to_owned(), rating });
            }
            rank += count as u64;
        }
        rows
    }

    /// Matches usernames whose lowercase form starts with `query`'s
    /// lowercase form. An empty query never takes the lock and returns no
    /// rows. Case folding uses `str::to_lowercase`, a simple Unicode fold
    /// that is exact for the ASCII usernames this service seeds and stable
    /// for any others a future ingest path might add.
    pub fn prefix_search(&self, query: &str) -> Vec<SearchRow> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        let state = self.state.read();
        let mut matches: Vec<&User> = state
            .directory
            .iter()
            .filter(|user| user.username.to_lowercase().starts_with(&needle))
            .collect();
        matches.sort_unstable_by(|a, b| {
            b.rating.cmp(&a.rating).then_with(|| a.username.cmp(&b.username))
        });
        matches
            .into_iter()
            .take(self.config.search_limit)
            .map(|user| SearchRow {
                username: user.username.clone(),
                rating: user.rating,
                global_rank: state.rank_of_locked(user.rating),
            })
            .collect()
    }

    /// Snapshot of every username, taken under a single read acquisition.
    /// Used by the traffic simulator, which must release the lock before
    /// drawing randomness or calling `upsert`.
    pub fn usernames_snapshot(&self) -> Vec<String> {
        self.state.read().directory.usernames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RankingEngine {
        RankingEngine::new(EngineConfig {
            rating_min: 100,
            rating_max: 5000,
            limit_default: 100,
            limit_max: 1000,
            search_limit: 50,
        })
    }

    #[test]
    fn upsert_rejects_out_of_range_rating_and_changes_nothing() {
        let e = engine();
        assert!(e.upsert("a", 99).is_err());
        assert!(e.upsert("a", 5001).is_err());
        assert_eq!(e.size(), 0);
    }

    #[test]
    fn rank_of_boundaries() {
        let e = engine();
        assert_eq!(e.rank_of(5000).unwrap(), 1);
    }

    #[test]
    fn ties_and_skips_in_dense_ranks() {
        let e = engine();
        e.upsert("a", 5000).unwrap();
        e.upsert("b", 5000).unwrap();
        e.upsert("c", 5000).unwrap();
        e.upsert("d", 4900).unwrap();
        e.upsert("e", 4800).unwrap();
        e.upsert("f", 4800).unwrap();

        let top = e.top_n(6);
        let got: Vec<_> = top.iter().map(|r| (r.rank, r.username.as_str(), r.rating)).collect();
        assert_eq!(
            got,
            vec![
                (1, "a", 5000),
                (1, "b", 5000),
                (1, "c", 5000),
                (4, "d", 4900),
                (5, "e", 4800),
                (5, "f", 4800),
            ]
        );

        assert_eq!(e.rank_of(5000).unwrap(), 1);
        assert_eq!(e.rank_of(4900).unwrap(), 4);
        assert_eq!(e.rank_of(4800).unwrap(), 5);
        assert_eq!(e.rank_of(4700).unwrap(), 7);
    }

    #[test]
    fn update_moves_a_user_between_buckets() {
        let e = engine();
        e.upsert("a", 5000).unwrap();
        e.upsert("b", 5000).unwrap();
        e.upsert("c", 5000).unwrap();
        e.upsert("d", 4900).unwrap();
        e.upsert("e", 4800).unwrap();
        e.upsert("f", 4800).unwrap();

        e.upsert("d", 5000).unwrap();

        assert_eq!(e.rank_of(4800).unwrap(), 5);
        assert_eq!(e.rank_of(4999).unwrap(), 5);

        let top1 = e.top_n(1);
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].username, "a");
    }

    #[test]
    fn prefix_search_ranks_match_a_single_snapshot() {
        let e = engine();
        e.upsert("alice", 4800).unwrap();
        e.upsert("alina", 4200).unwrap();
        e.upsert("bob", 4800).unwrap();

        let rows = e.prefix_search("AL");
        let got: Vec<_> = rows.iter().map(|r| (r.username.as_str(), r.rating, r.global_rank)).collect();
        assert_eq!(got, vec![("alice", 4800, e.rank_of(4800).unwrap()), ("alina", 4200, e.rank_of(4200).unwrap())]);
    }

    #[test]
    fn top_n_returns_every_user_exactly_once() {
        let e = engine();
        for i in 0..37 {
            e.upsert(&format!("user_{i}"), 100 + i).unwrap();
        }
        let rows = e.top_n(e.size());
        assert_eq!(rows.len(), 37);
        let mut names: Vec<_> = rows.iter().map(|r| r.username.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 37);
    }

    #[test]
    fn clamp_limit_boundaries() {
        let e = engine();
        assert_eq!(e.clamp_limit(None), 100);
        assert_eq!(e.clamp_limit(Some(0)), 100);
        assert_eq!(e.clamp_limit(Some(-5)), 100);
        assert_eq!(e.clamp_limit(Some(1_000_000_000)), 1000);
        assert_eq!(e.clamp_limit(Some(7)), 7);
    }

    #[test]
    fn empty_engine_returns_empty_results() {
        let e = engine();
        assert!(e.top_n(100).is_empty());
        assert!(e.prefix_search("x").is_empty());
        assert_eq!(e.size(), 0);
        assert_eq!(e.rank_of(100).unwrap(), 1);
        assert_eq!(e.rank_of(3000).unwrap(), 1);
    }

    #[test]
    fn upsert_same_rating_twice_is_idempotent() {
        let e = engine();
        e.upsert("a", 1000).unwrap();
        e.upsert("a", 1000).unwrap();
        assert_eq!(e.size(), 1);
        assert_eq!(e.rank_of(1000).unwrap(), 1);
    }
}
