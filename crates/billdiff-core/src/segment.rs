//! Core value types for parsed bill changes.
//!
//! A `BillChangeSet` is always built through [`BillChangeSet::from_segments`],
//! which derives the tagged text and statistics from the segment sequence in
//! one step. The three fields are never updated independently, so they cannot
//! drift apart.

use serde::{Deserialize, Serialize};

use crate::{codec, stats};

/// Change classification of a run of bill text.
///
/// Wire names match the original JSON API: `new`, `deleted`, `unchanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Language being added to existing law (underlined in the source bill).
    New,
    /// Language being removed from existing law (struck through in the source bill).
    Deleted,
    /// Existing law that the bill leaves as-is.
    Unchanged,
}

/// A maximal contiguous run of text sharing one change classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Aggregate counts over a segment sequence.
///
/// `*_count` counts maximal segments of that kind; `*_words` counts
/// whitespace-delimited tokens across all segments of that kind combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub new_count: u32,
    pub new_words: u32,
    pub deleted_count: u32,
    pub deleted_words: u32,
}

/// The full parse result for one bill: ordered segments plus the tagged-text
/// encoding and statistics derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillChangeSet {
    pub segments: Vec<Segment>,
    #[serde(rename = "taggedText")]
    pub tagged_text: String,
    pub stats: Stats,
}

impl BillChangeSet {
    /// Build a change set from a segment sequence, computing the tagged text
    /// and statistics from the same sequence.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let tagged_text = codec::encode(&segments);
        let stats = stats::compute(&segments);
        Self {
            segments,
            tagged_text,
            stats,
        }
    }

    /// An empty change set: no segments, empty tagged text, all-zero stats.
    pub fn empty() -> Self {
        Self::from_segments(Vec::new())
    }

    /// Whether any new or deleted language was detected.
    ///
    /// A bill pasted without legislative formatting parses to a single
    /// `Unchanged` segment; callers use this to warn rather than fail.
    pub fn has_changes(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.kind != SegmentKind::Unchanged)
    }
}
