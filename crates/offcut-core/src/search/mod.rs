use crate::types::*;
use std::time::Instant;

mod cache;
mod evaluate;
mod permutations;
mod simulate;
mod summary;
#[cfg(test)]
mod tests;

pub use cache::{MemoCache, NoCache, PackingCache};
pub use evaluate::{BestTracker, CandidateScore};
pub use permutations::{distinct_permutation_count, next_permutation, UniquePermutations};
pub use simulate::simulate;

/// Exhaustive search over every distinct order of the required cuts.
pub struct CutSearch<C = MemoCache> {
    raw: RawStock,
    needed: CutRequirement,
    config: SearchConfig,
    cache: C,
}

impl CutSearch<MemoCache> {
    /// Builds a search memoizing up to `config.cache_capacity` packings.
    pub fn new(raw: RawStock, needed: CutRequirement, config: SearchConfig) -> Self {
        let cache = MemoCache::with_capacity(config.cache_capacity);
        Self::with_cache(raw, needed, config, cache)
    }

    /// Validates a request and builds a new search from it.
    pub fn from_request(request: &CutRequest) -> Result<Self> {
        request.validate()?;
        Ok(Self::new(
            request.raw_stock(),
            request.cut_requirement(),
            request.config(),
        ))
    }
}

impl<C: PackingCache> CutSearch<C> {
    pub fn with_cache(raw: RawStock, needed: CutRequirement, config: SearchConfig, cache: C) -> Self {
        Self {
            raw,
            needed,
            config,
            cache,
        }
    }

    pub fn raw_stock(&self) -> &RawStock {
        &self.raw
    }

    pub fn cut_requirement(&self) -> &CutRequirement {
        &self.needed
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Packs one cut order, going through the cache.
    pub fn pack(&mut self, order: &[Length]) -> PackingResult {
        let raw = self.raw.lengths();
        if let Some(hit) = self.cache.lookup(raw, order) {
            return hit;
        }
        let packing = simulate(raw, order, self.config.blade_width);
        self.cache.insert(raw, order, &packing);
        packing
    }

    /// Visits every distinct permutation and returns the best packing found.
    pub fn run(&mut self) -> SearchReport {
        let started = Instant::now();

        if self.raw.is_empty() || self.needed.is_empty() {
            tracing::warn!(
                raw_pieces = self.raw.len(),
                cuts = self.needed.len(),
                "nothing to search, no solution found"
            );
            return SearchReport {
                best: None,
                total_offcut: None,
                summary: None,
                permutations_tested: 0,
                elapsed_secs: started.elapsed().as_secs_f64(),
                warnings: Vec::new(),
            };
        }

        tracing::info!(
            raw_pieces = self.raw.len(),
            cuts = self.needed.len(),
            blade_width = self.config.blade_width,
            permutations = ?distinct_permutation_count(self.needed.lengths()),
            "calculating cuts"
        );

        let interval = self.config.progress_interval;
        let tracker = UniquePermutations::new(self.needed.lengths().to_vec()).fold(
            BestTracker::new(),
            |tracker, order| {
                let tracker = tracker.observe(self.pack(&order));
                if interval > 0 && tracker.observed() % interval == 0 {
                    tracing::debug!(tested = tracker.observed(), "progress");
                }
                tracker
            },
        );

        let permutations_tested = tracker.observed();
        let elapsed_secs = started.elapsed().as_secs_f64();
        let best = tracker.finish();

        let mut warnings = Vec::new();
        if let Some(candidate) = &best {
            if !candidate.packing.is_complete() {
                tracing::warn!(
                    unplaced = ?candidate.packing.unplaced,
                    "not all required cuts were placed, total offcut is understated"
                );
                warnings.push(SearchWarning::UnplacedCuts {
                    cuts: candidate.packing.unplaced.clone(),
                });
            }
        }

        tracing::info!(
            tested = permutations_tested,
            elapsed_secs,
            total_offcut = ?best.as_ref().map(|b| b.total_offcut),
            "search complete"
        );

        SearchReport {
            total_offcut: best.as_ref().map(|b| b.total_offcut),
            summary: best.as_ref().map(|b| self.calculate_summary(b)),
            best,
            permutations_tested,
            elapsed_secs,
            warnings,
        }
    }
}
