//! Change statistics derived from a segment sequence.

use crate::segment::{Segment, SegmentKind, Stats};

/// Count distinct new/deleted passages and their word totals.
///
/// Segment counts are already maximal by the builder's coalescing invariant;
/// words are maximal runs of non-whitespace characters.
pub fn compute(segments: &[Segment]) -> Stats {
    let mut stats = Stats::default();
    for segment in segments {
        match segment.kind {
            SegmentKind::New => {
                stats.new_count += 1;
                stats.new_words += word_count(&segment.text);
            }
            SegmentKind::Deleted => {
                stats.deleted_count += 1;
                stats.deleted_words += word_count(&segment.text);
            }
            SegmentKind::Unchanged => {}
        }
    }
    stats
}

fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}
