use crate::types::{BestCandidate, Length, PackingResult};

/// Metrics a packing is ranked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateScore {
    pub total_offcut: Length,
    pub smallest_offcut: Length,
    pub smallest_offcut_count: usize,
}

impl CandidateScore {
    /// Scores a packing; `None` when it touched no raw piece at all.
    pub fn of(packing: &PackingResult) -> Option<Self> {
        Some(Self {
            total_offcut: packing.total_offcut(),
            smallest_offcut: packing.smallest_offcut()?,
            smallest_offcut_count: packing.smallest_offcut_count(),
        })
    }

    /// Whether this score should replace `current`.
    ///
    /// A lower total is only taken when the smallest offcut shrinks too.
    /// An equal total is taken on a smaller smallest offcut, or on the same
    /// smallest offcut shared by more pieces. Everything else keeps the
    /// incumbent, so ties go to the earlier candidate.
    pub fn supersedes(&self, current: &CandidateScore) -> bool {
        if self.total_offcut < current.total_offcut {
            self.smallest_offcut < current.smallest_offcut
        } else if self.total_offcut == current.total_offcut {
            self.smallest_offcut < current.smallest_offcut
                || (self.smallest_offcut == current.smallest_offcut
                    && self.smallest_offcut_count > current.smallest_offcut_count)
        } else {
            false
        }
    }
}

/// Fold accumulator holding the single best packing seen so far.
#[derive(Debug, Clone, Default)]
pub struct BestTracker {
    best: Option<(CandidateScore, PackingResult)>,
    observed: u64,
    accepted: u64,
}

impl BestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one candidate and returns the updated tracker.
    pub fn observe(mut self, packing: PackingResult) -> Self {
        self.observed += 1;

        let Some(score) = CandidateScore::of(&packing) else {
            return self;
        };

        let accept = match &self.best {
            None => true,
            Some((current, _)) => score.supersedes(current),
        };

        if accept {
            tracing::debug!(
                total_offcut = score.total_offcut,
                smallest_offcut = score.smallest_offcut,
                count = score.smallest_offcut_count,
                "new best"
            );
            self.accepted += 1;
            self.best = Some((score, packing));
        }

        self
    }

    pub fn score(&self) -> Option<&CandidateScore> {
        self.best.as_ref().map(|(score, _)| score)
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn finish(self) -> Option<BestCandidate> {
        self.best.map(|(score, packing)| {
            let mut sorted_offcuts = packing.offcuts.clone();
            sorted_offcuts.sort_unstable();
            BestCandidate {
                packing,
                total_offcut: score.total_offcut,
                smallest_offcut: score.smallest_offcut,
                smallest_offcut_count: score.smallest_offcut_count,
                sorted_offcuts,
            }
        })
    }
}
