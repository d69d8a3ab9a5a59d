//! Card display for parsed bill change sets.
//!
//! Renders the statistics block and the segment listing as a grouped,
//! human-readable card.

use billdiff_core::{BillChangeSet, SegmentKind};

const MAX_SEGMENTS: usize = 40;
const MAX_PREVIEW: usize = 96;

/// Print a change set as a vertical card: statistics first, then segments
/// in document order with their classification.
pub fn print_change_set(set: &BillChangeSet) {
    println!("=== Bill Changes ===");
    println!();

    println!("Statistics");
    println!("  {:<26} {}", "new passages", set.stats.new_count);
    println!("  {:<26} {}", "new words", set.stats.new_words);
    println!("  {:<26} {}", "deleted passages", set.stats.deleted_count);
    println!("  {:<26} {}", "deleted words", set.stats.deleted_words);
    println!();

    if set.segments.is_empty() {
        println!("Segments");
        println!("  (none)");
        return;
    }

    println!("Segments ({}):", set.segments.len());
    let show = set.segments.len().min(MAX_SEGMENTS);
    for segment in &set.segments[..show] {
        let label = match segment.kind {
            SegmentKind::New => "[NEW]",
            SegmentKind::Deleted => "[DEL]",
            SegmentKind::Unchanged => "",
        };
        println!("  {:<6} {}", label, preview(&segment.text));
    }
    if set.segments.len() > MAX_SEGMENTS {
        println!("  ... and {} more", set.segments.len() - MAX_SEGMENTS);
    }
}

/// One-line preview of segment text: whitespace runs collapsed to single
/// spaces, long text truncated at a character boundary.
fn preview(text: &str) -> String {
    let flat: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if flat.len() <= MAX_PREVIEW {
        return flat;
    }
    let mut cut = MAX_PREVIEW;
    while cut > 0 && !flat.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &flat[..cut])
}
