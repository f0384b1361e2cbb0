use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::fmt;

/// One record of a directional search (query input against subject input).
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub query: String,
    pub subject: String,
    /// Alignment length column minus one.
    pub alignment_length: usize,
    pub e_value: f64,
    pub bit_score: f64,
}

/// The winning record for one query after tie-break.
#[derive(Debug, Clone, PartialEq)]
pub struct TopHit {
    pub subject: String,
    pub score: f64,
    pub e_value: f64,
    pub alignment_length: usize,
}

impl From<HitRecord> for TopHit {
    fn from(rec: HitRecord) -> Self {
        Self {
            subject: rec.subject,
            score: rec.bit_score,
            e_value: rec.e_value,
            alignment_length: rec.alignment_length,
        }
    }
}

/// Query ID -> top hit, for one ordered pair of inputs.
pub type TopHitMap = FxHashMap<String, TopHit>;

/// Sequence ID -> sequence length.
pub type LengthIndex = FxHashMap<String, usize>;

/// Input tag -> allowed query headers. Inputs without an entry are unrestricted.
#[derive(Debug, Clone, Default)]
pub struct SubsetIndex {
    subsets: FxHashMap<String, FxHashSet<String>>,
}

impl SubsetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, ids: FxHashSet<String>) {
        self.subsets.insert(tag.into(), ids);
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    /// True when `id` may act as a query for input `tag`.
    pub fn allows(&self, tag: &str, id: &str) -> bool {
        self.subsets.get(tag).map_or(true, |ids| ids.contains(id))
    }
}

/// A sequence ID qualified by the input it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Member {
    pub tag: String,
    pub id: String,
}

impl Member {
    pub fn new(tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag, self.id)
    }
}

/// A mutual best-match relationship between two tagged inputs.
///
/// Members are stored sorted by `(tag, id)` and scores ascending, so two pairs
/// describing the same relationship compare equal on `members`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReciprologPair {
    pub members: (Member, Member),
    pub scores: (f64, f64),
}

impl ReciprologPair {
    pub fn new(a: Member, b: Member, score_a: f64, score_b: f64) -> Self {
        let members = if a <= b { (a, b) } else { (b, a) };
        let scores = if score_a <= score_b {
            (score_a, score_b)
        } else {
            (score_b, score_a)
        };
        Self { members, scores }
    }

    pub fn mean_score(&self) -> f64 {
        (self.scores.0 + self.scores.1) / 2.0
    }
}

/// A group of reciprologs, members sorted by ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrthoGroup {
    members: Vec<Member>,
}

impl OrthoGroup {
    pub fn new(mut members: Vec<Member>) -> Self {
        members.sort_by(compare_by_id);
        members.dedup();
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Ord for OrthoGroup {
    fn cmp(&self, other: &Self) -> Ordering {
        self.members
            .iter()
            .zip(&other.members)
            .map(|(a, b)| compare_by_id(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| self.members.len().cmp(&other.members.len()))
    }
}

impl PartialOrd for OrthoGroup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Output order: ID first, tag to break ties between inputs sharing an ID.
fn compare_by_id(a: &Member, b: &Member) -> Ordering {
    a.id.cmp(&b.id).then_with(|| a.tag.cmp(&b.tag))
}
