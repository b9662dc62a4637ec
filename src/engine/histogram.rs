//! Dense rating histogram.
//!
//! `Histogram::cells[r]` holds the number of users currently rated exactly
//! `r`. The array is indexed directly by rating (no offset arithmetic),
//! which keeps `Upsert`/`RankOf` branch-free and makes the global invariant
//! (`sum(cells) == population`) trivial to state and check.

#[derive(Debug)]
pub struct Histogram {
    min: i32,
    max: i32,
    cells: Vec<u32>,
}

impl Histogram {
    pub fn new(min: i32, max: i32) -> Self {
        assert!(min <= max, "rating domain must be non-empty");
        Histogram { min, max, cells: vec![0; (max - min + 1) as usize] }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, rating: i32) -> bool {
        (self.min..=self.max).contains(&rating)
    }

    fn index(&self, rating: i32) -> usize {
        (rating - self.min) as usize
    }

    pub fn get(&self, rating: i32) -> u32 {
        self.cells[self.index(rating)]
    }

    pub fn increment(&mut self, rating: i32) {
        let i = self.index(rating);
        self.cells[i] += 1;
    }

    pub fn decrement(&mut self, rating: i32) {
        let i = self.index(rating);
        debug_assert!(self.cells[i] > 0, "decrementing an already-empty bucket");
        self.cells[i] = self.cells[i].saturating_sub(1);
    }

    /// `1 + (number of users strictly above `rating`)`. Walks down from `max`
    /// so the cost is bounded by the rating domain, never by the population.
    pub fn rank_of(&self, rating: i32) -> u64 {
        let above: u64 =
            ((rating + 1)..=self.max).map(|r| self.cells[self.index(r)] as u64).sum();
        1 + above
    }

    /// Total population across all cells; used only to cross-check the
    /// global invariant against the directory's `len()`.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    /// Ratings with at least one user, from `max` down to `min`, paired with
    /// their bucket count. Used by `TopN` to walk non-empty buckets only.
    pub fn non_empty_descending(&self) -> impl Iterator<Item = (i32, u32)> + '_ {
        (self.min..=self.max).rev().filter_map(move |r| {
            let count = self.cells[self.index(r)];
            (count > 0).then_some((r, count))
        })
    }
}
