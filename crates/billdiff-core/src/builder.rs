//! Segment builder: folds normalised markup tokens into typed segments.
//!
//! A single pass over the token stream with an explicit kind stack. Flushes
//! coalesce into the previous segment when the kind is unchanged, so no two
//! adjacent segments in the output ever share a kind, however malformed the
//! input markup was.

use tracing::{debug, warn};

use crate::markup::{self, Token};
use crate::segment::{BillChangeSet, Segment, SegmentKind};

/// Parse raw bill markup into a [`BillChangeSet`].
///
/// Never fails: malformed markup is resolved by the tolerant recovery rules
/// and degenerate input yields an empty change set.
pub fn parse_bill_markup(raw: &str) -> BillChangeSet {
    let cleaned = markup::cleanup_markup(raw);
    let segments = build_segments(markup::tokenize(&cleaned));
    let set = BillChangeSet::from_segments(segments);
    debug!(
        segments = set.segments.len(),
        new = set.stats.new_count,
        deleted = set.stats.deleted_count,
        "parsed bill markup"
    );
    if !set.segments.is_empty() && !set.has_changes() {
        warn!("no legislative formatting detected in bill markup");
    }
    set
}

/// Fold a token stream into a coalesced segment sequence.
///
/// The active kind is the innermost open marker, `Unchanged` when none is
/// open. An unmatched closer is ignored (kind-matching pop); markers still
/// open at end of input close implicitly.
pub fn build_segments(tokens: Vec<Token>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut buffer = String::new();
    let mut stack: Vec<SegmentKind> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(s) => buffer.push_str(&s),
            Token::Open(kind) => {
                flush(&mut segments, &mut buffer, active(&stack));
                stack.push(kind);
            }
            Token::Close(kind) => {
                flush(&mut segments, &mut buffer, active(&stack));
                if stack.last() == Some(&kind) {
                    stack.pop();
                }
            }
        }
    }
    flush(&mut segments, &mut buffer, active(&stack));
    segments
}

fn active(stack: &[SegmentKind]) -> SegmentKind {
    stack.last().copied().unwrap_or(SegmentKind::Unchanged)
}

/// Emit the buffered text as a segment of `kind`, merging into the previous
/// segment when it already has that kind.
fn flush(segments: &mut Vec<Segment>, buffer: &mut String, kind: SegmentKind) {
    if buffer.is_empty() {
        return;
    }
    let text = std::mem::take(buffer);
    match segments.last_mut() {
        Some(last) if last.kind == kind => last.text.push_str(&text),
        _ => segments.push(Segment::new(kind, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentKind::{Deleted, New, Unchanged};

    fn seg(kind: SegmentKind, text: &str) -> Segment {
        Segment::new(kind, text)
    }

    fn assert_coalesced(segments: &[Segment]) {
        for pair in segments.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "adjacent kinds in {segments:?}");
        }
        for s in segments {
            assert!(!s.text.is_empty(), "empty segment in {segments:?}");
        }
    }

    #[test]
    fn scenario_a_mixed_paragraph() {
        let set = parse_bill_markup("<p>Sec. 1. <del>old text</del> <u>new text</u> remains.</p>");
        assert_eq!(
            set.segments,
            vec![
                seg(Unchanged, "Sec. 1. "),
                seg(Deleted, "old text"),
                seg(Unchanged, " "),
                seg(New, "new text"),
                seg(Unchanged, " remains."),
            ]
        );
        assert_eq!(
            set.tagged_text,
            "Sec. 1. [DELETED]old text[/DELETED] [NEW]new text[/NEW] remains."
        );
        assert_eq!(set.stats.new_count, 1);
        assert_eq!(set.stats.deleted_count, 1);
        assert_eq!(set.stats.new_words, 2);
        assert_eq!(set.stats.deleted_words, 2);
    }

    #[test]
    fn scenario_b_unclosed_marker_extends_to_end() {
        let set = parse_bill_markup("existing law <u>and this addition runs to the end");
        assert_eq!(
            set.segments,
            vec![
                seg(Unchanged, "existing law "),
                seg(New, "and this addition runs to the end"),
            ]
        );
    }

    #[test]
    fn scenario_c_empty_input() {
        let set = parse_bill_markup("");
        assert!(set.segments.is_empty());
        assert!(set.tagged_text.is_empty());
        assert_eq!(set.stats.new_count, 0);
        assert_eq!(set.stats.deleted_count, 0);
        assert_eq!(set.stats.new_words, 0);
        assert_eq!(set.stats.deleted_words, 0);
    }

    #[test]
    fn unmatched_closer_ignored() {
        let set = parse_bill_markup("a</u>b</del>c");
        assert_eq!(set.segments, vec![seg(Unchanged, "abc")]);
    }

    #[test]
    fn mismatched_closer_keeps_region_open() {
        // </del> cannot pop the open <u>, so "b" and "c" are both new.
        let set = parse_bill_markup("<u>b</del>c</u>d");
        assert_eq!(set.segments, vec![seg(New, "bc"), seg(Unchanged, "d")]);
    }

    #[test]
    fn innermost_kind_wins_in_overlap() {
        let set = parse_bill_markup("<del>cut <u>kept</u> more cut</del>");
        assert_eq!(
            set.segments,
            vec![seg(Deleted, "cut "), seg(New, "kept"), seg(Deleted, " more cut")]
        );
        assert_coalesced(&set.segments);
    }

    #[test]
    fn nested_same_kind_markers() {
        // Duplicate kinds on the stack act as a depth counter.
        let set = parse_bill_markup("<u>a<u>b</u>c</u>d");
        assert_eq!(set.segments, vec![seg(New, "abc"), seg(Unchanged, "d")]);
    }

    #[test]
    fn back_to_back_same_kind_markers_coalesce() {
        let set = parse_bill_markup("<u>one</u><u>two</u>");
        assert_eq!(set.segments, vec![seg(New, "onetwo")]);
    }

    #[test]
    fn multi_paragraph_region_stays_open() {
        let set = parse_bill_markup("<u>first paragraph</p><p>second paragraph</u>");
        assert_eq!(set.segments, vec![seg(New, "first paragraphsecond paragraph")]);
    }

    #[test]
    fn coalescing_invariant_under_malformed_markup() {
        let inputs = [
            "<u>a</u><u>b</u><del>c</del><del>d</del>",
            "</u><u>a<del>b</u>c</del>d<u>",
            "<p></p><u></u>text<del></del>",
            "a<u>b<u>c</u>d</u>e<del>f</del><del>g</del>",
        ];
        for input in inputs {
            let set = parse_bill_markup(input);
            assert_coalesced(&set.segments);
        }
    }

    #[test]
    fn no_formatting_still_parses() {
        let set = parse_bill_markup("<p>just ordinary text</p>");
        assert_eq!(set.segments, vec![seg(Unchanged, "just ordinary text")]);
        assert!(!set.has_changes());
    }

    #[test]
    fn cleanup_applied_before_tokenising() {
        let set = parse_bill_markup("1  Sec. 2. <u>added</u>");
        assert_eq!(
            set.segments,
            vec![seg(Unchanged, "Sec. 2. "), seg(New, "added")]
        );
    }
}
