use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length of stock or of a cut, in whole units (typically millimetres).
pub type Length = u64;

/// Blade width used when a request does not specify one.
pub const DEFAULT_BLADE_WIDTH: Length = 2;

/// Number of packings kept by the default memo cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Permutations between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Most physical pieces a single length list may expand to.
pub const MAX_PIECES: u64 = 100_000;

/// Ordered sequence of raw pieces. The simulator consumes them front to back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStock(Vec<Length>);

impl RawStock {
    pub fn new(lengths: Vec<Length>) -> Self {
        Self(lengths)
    }

    pub fn lengths(&self) -> &[Length] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Length {
        self.0.iter().sum()
    }
}

/// Multiset of lengths that must be produced. Order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CutRequirement(Vec<Length>);

impl CutRequirement {
    pub fn new(lengths: Vec<Length>) -> Self {
        Self(lengths)
    }

    pub fn lengths(&self) -> &[Length] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Length {
        self.0.iter().sum()
    }
}

/// Tunables fixed for the duration of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Material lost to the blade, added to every cut
    pub blade_width: Length,
    /// Maximum number of memoized packings (0 disables memoization)
    pub cache_capacity: usize,
    /// Log a progress line every this many permutations (0 disables)
    pub progress_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            blade_width: DEFAULT_BLADE_WIDTH,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Map key holding a length. JSON spells it as a string (`"30"`), YAML as an
/// integer (`30`); both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LengthKey(pub Length);

impl<'de> Deserialize<'de> for LengthKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LengthKeyVisitor)
    }
}

struct LengthKeyVisitor;

impl<'de> Visitor<'de> for LengthKeyVisitor {
    type Value = LengthKey;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer length")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<LengthKey, E> {
        Ok(LengthKey(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<LengthKey, E> {
        Length::try_from(v)
            .map(LengthKey)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<LengthKey, E> {
        v.trim()
            .parse()
            .map(LengthKey)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// `{length: count}` entries in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthCounts(pub Vec<(Length, u32)>);

impl Serialize for LengthCounts {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (length, count) in &self.0 {
            map.serialize_entry(&LengthKey(*length), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LengthCounts {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LengthCountsVisitor)
    }
}

struct LengthCountsVisitor;

impl<'de> Visitor<'de> for LengthCountsVisitor {
    type Value = LengthCounts;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of length to count")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<LengthCounts, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0).min(1024));
        while let Some((key, count)) = access.next_entry::<LengthKey, u32>()? {
            entries.push((key.0, count));
        }
        Ok(LengthCounts(entries))
    }
}

/// Either a `{length: count}` map or an explicit ordered list of lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthSpec {
    Counts(LengthCounts),
    List(Vec<Length>),
}

impl LengthSpec {
    /// Flattens into one entry per physical piece, keeping the written order.
    pub fn expand(&self) -> Vec<Length> {
        match self {
            LengthSpec::Counts(counts) => counts
                .0
                .iter()
                .flat_map(|&(length, count)| std::iter::repeat(length).take(count as usize))
                .collect(),
            LengthSpec::List(lengths) => lengths.clone(),
        }
    }

    /// `(length, count)` pairs without expanding them.
    fn entries(&self) -> Vec<(Length, u64)> {
        match self {
            LengthSpec::Counts(counts) => counts
                .0
                .iter()
                .filter(|&&(_, count)| count > 0)
                .map(|&(length, count)| (length, count as u64))
                .collect(),
            LengthSpec::List(lengths) => lengths.iter().map(|&length| (length, 1)).collect(),
        }
    }

    /// Checks a list of required cuts, each padded by `blade_width`.
    pub fn validate_cuts(&self, blade_width: Length) -> Result<()> {
        self.validate("Required cut", blade_width)
    }

    /// Checks a list of raw stock pieces.
    pub fn validate_stock(&self) -> Result<()> {
        self.validate("Raw stock", 0)
    }

    /// Rejects zero lengths, more than [`MAX_PIECES`] pieces, and lengths
    /// whose padded size or total would not fit in a [`Length`].
    fn validate(&self, label: &str, padding: Length) -> Result<()> {
        let entries = self.entries();

        if entries.iter().any(|&(length, _)| length == 0) {
            return Err(SearchError::InvalidInput(format!(
                "{label} lengths must be positive"
            )));
        }

        let pieces: u64 = entries.iter().map(|&(_, count)| count).sum();
        if pieces > MAX_PIECES {
            return Err(SearchError::InvalidInput(format!(
                "{label} lengths expand to {pieces} pieces, at most {MAX_PIECES} are allowed"
            )));
        }

        let total = entries.iter().try_fold(0, |total: Length, &(length, count)| {
            length
                .checked_add(padding)?
                .checked_mul(count)?
                .checked_add(total)
        });
        if total.is_none() {
            return Err(SearchError::InvalidInput(format!(
                "{label} lengths are too large, their total overflows"
            )));
        }

        Ok(())
    }
}

/// Input: what the user provides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutRequest {
    pub lengths_needed: LengthSpec,
    pub raw_lengths: LengthSpec,
    #[serde(default = "default_blade_width")]
    pub blade_width: Length,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_blade_width() -> Length {
    DEFAULT_BLADE_WIDTH
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_progress_interval() -> u64 {
    DEFAULT_PROGRESS_INTERVAL
}

impl CutRequest {
    /// Builds a request from two JSON count maps such as `{"30": 2, "40": 1}`.
    pub fn from_json_counts(lengths_needed: &str, raw_lengths: &str) -> Result<Self> {
        Ok(Self {
            lengths_needed: serde_json::from_str(lengths_needed)?,
            raw_lengths: serde_json::from_str(raw_lengths)?,
            blade_width: DEFAULT_BLADE_WIDTH,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        })
    }

    /// Rejects lengths the search cannot make sense of.
    pub fn validate(&self) -> Result<()> {
        self.lengths_needed.validate_cuts(self.blade_width)?;
        self.raw_lengths.validate_stock()?;
        Ok(())
    }

    pub fn raw_stock(&self) -> RawStock {
        RawStock::new(self.raw_lengths.expand())
    }

    pub fn cut_requirement(&self) -> CutRequirement {
        CutRequirement::new(self.lengths_needed.expand())
    }

    pub fn config(&self) -> SearchConfig {
        SearchConfig {
            blade_width: self.blade_width,
            cache_capacity: self.cache_capacity,
            progress_interval: self.progress_interval,
        }
    }
}

/// Outcome of packing one cut order into the raw stock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingResult {
    /// Kerf-padded cut lengths, one list per raw piece touched
    pub pieces: Vec<Vec<Length>>,
    /// Remainder of each touched raw piece, parallel to `pieces`
    pub offcuts: Vec<Length>,
    /// Nominal lengths of cuts dropped because raw stock ran out
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<Length>,
}

impl PackingResult {
    pub fn total_offcut(&self) -> Length {
        self.offcuts.iter().sum()
    }

    pub fn smallest_offcut(&self) -> Option<Length> {
        self.offcuts.iter().copied().min()
    }

    /// How many pieces share the smallest offcut.
    pub fn smallest_offcut_count(&self) -> usize {
        match self.smallest_offcut() {
            Some(min) => self.offcuts.iter().filter(|&&o| o == min).count(),
            None => 0,
        }
    }

    /// Material taken by cuts including kerf.
    pub fn consumed_length(&self) -> Length {
        self.pieces.iter().flatten().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub(crate) fn close_piece(&mut self, offcut: Length, cuts: Vec<Length>) {
        self.offcuts.push(offcut);
        self.pieces.push(cuts);
    }
}

/// The packing retained by the search, with the metrics it was judged on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestCandidate {
    pub packing: PackingResult,
    pub total_offcut: Length,
    pub smallest_offcut: Length,
    pub smallest_offcut_count: usize,
    /// Offcuts in ascending order
    pub sorted_offcuts: Vec<Length>,
}

/// Summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub raw_pieces_used: usize,
    pub raw_length_used: Length,
    /// Nominal length of all placed cuts
    pub cut_length: Length,
    pub kerf_loss: Length,
    pub total_offcut: Length,
    pub waste_percentage: f64,
    pub smallest_offcut: Length,
    pub largest_offcut: Length,
    pub unplaced_cuts: usize,
}

/// Conditions that do not stop the search but make its answer suspect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchWarning {
    /// Raw stock ran out before every required cut was placed.
    /// The reported offcut then understates the real waste.
    UnplacedCuts { cuts: Vec<Length> },
}

/// Output: what the search returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// `None` means no solution was found
    pub best: Option<BestCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_offcut: Option<Length>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub permutations_tested: u64,
    pub elapsed_secs: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<SearchWarning>,
}

impl SearchReport {
    pub fn is_solved(&self) -> bool {
        self.best.is_some()
    }

    /// Returns the retained candidate, or an error when the search found none.
    pub fn solution(&self) -> Result<&BestCandidate> {
        self.best.as_ref().ok_or(SearchError::NoSolution)
    }
}

/// Error type for the cutting search
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No solution found - raw stock or required cuts are empty")]
    NoSolution,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed length map: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
