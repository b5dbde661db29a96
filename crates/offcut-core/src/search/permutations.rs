/// Steps `seq` to its lexicographic successor in place.
///
/// Returns `false` once `seq` is weakly decreasing, i.e. it was already the
/// last arrangement; `seq` is left untouched in that case. Repeated values
/// are never swapped with each other, so every distinct arrangement of a
/// multiset is reached exactly once when starting from the ascending sort.
pub fn next_permutation<T: Ord>(seq: &mut [T]) -> bool {
    if seq.len() < 2 {
        return false;
    }

    // Rightmost k with seq[k] < seq[k + 1]
    let Some(k) = (0..seq.len() - 1).rev().find(|&k| seq[k] < seq[k + 1]) else {
        return false;
    };

    // Rightmost i > k with seq[i] > seq[k]; exists because seq[k + 1] qualifies
    let i = (k + 1..seq.len())
        .rev()
        .find(|&i| seq[i] > seq[k])
        .unwrap_or(k + 1);

    seq.swap(k, i);
    seq[k + 1..].reverse();
    true
}

/// Lazily yields every distinct permutation of a multiset, in ascending
/// lexicographic order, starting from the sorted arrangement.
///
/// Only the current arrangement is held in memory. An empty input yields a
/// single empty permutation.
#[derive(Debug, Clone)]
pub struct UniquePermutations<T> {
    current: Vec<T>,
    started: bool,
    exhausted: bool,
}

impl<T: Ord + Clone> UniquePermutations<T> {
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort();
        Self {
            current: items,
            started: false,
            exhausted: false,
        }
    }
}

impl<T: Ord + Clone> Iterator for UniquePermutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current.clone());
        }
        if next_permutation(&mut self.current) {
            Some(self.current.clone())
        } else {
            self.exhausted = true;
            None
        }
    }
}

/// Number of distinct arrangements of `items`: N! / (d1! * d2! * ...).
///
/// Built as a product of binomials so intermediates stay small. Returns
/// `None` if the count does not fit in a `u128`.
pub fn distinct_permutation_count<T: Ord + Clone>(items: &[T]) -> Option<u128> {
    let mut sorted = items.to_vec();
    sorted.sort();

    let mut count: u128 = 1;
    let mut placed: u128 = 0;
    for group in sorted.chunk_by(|a, b| a == b) {
        // Choose positions for this group among all seen so far: C(placed + g, g)
        for j in 1..=group.len() as u128 {
            placed += 1;
            count = count.checked_mul(placed)? / j;
        }
    }
    Some(count)
}
