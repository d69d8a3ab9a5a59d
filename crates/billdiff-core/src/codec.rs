//! Tagged-text codec: the flat interchange form of a segment sequence.
//!
//! `[NEW]…[/NEW]` and `[DELETED]…[/DELETED]` wrap added and removed
//! language; unchanged text is carried verbatim. This is the canonical form
//! handed to the analysis service and to the manual copy-for-AI path.
//!
//! Known limitation: encoding is injective only when segment text does not
//! itself contain one of the four marker tokens. Such collisions are not
//! detected or escaped; the source domain (statute text) does not produce
//! them.

use crate::segment::{Segment, SegmentKind};

pub const NEW_OPEN: &str = "[NEW]";
pub const NEW_CLOSE: &str = "[/NEW]";
pub const DELETED_OPEN: &str = "[DELETED]";
pub const DELETED_CLOSE: &str = "[/DELETED]";

/// Encode a segment sequence as tagged text.
pub fn encode(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment.kind {
            SegmentKind::Unchanged => out.push_str(&segment.text),
            SegmentKind::New => {
                out.push_str(NEW_OPEN);
                out.push_str(&segment.text);
                out.push_str(NEW_CLOSE);
            }
            SegmentKind::Deleted => {
                out.push_str(DELETED_OPEN);
                out.push_str(&segment.text);
                out.push_str(DELETED_CLOSE);
            }
        }
    }
    out
}

/// Decode tagged text back into a segment sequence.
///
/// Scans left to right for the nearest open marker. An open marker whose
/// close marker never arrives is not an error: everything from the marker to
/// the end of the string becomes a single trailing `Unchanged` fragment.
/// For well-formed tagged text the round trip is exact:
/// `encode(decode(encode(s))) == encode(s)`.
pub fn decode(tagged: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut rest = tagged;

    loop {
        let (at, kind, open, close) = match (rest.find(NEW_OPEN), rest.find(DELETED_OPEN)) {
            (None, None) => break,
            (Some(n), None) => (n, SegmentKind::New, NEW_OPEN, NEW_CLOSE),
            (None, Some(d)) => (d, SegmentKind::Deleted, DELETED_OPEN, DELETED_CLOSE),
            (Some(n), Some(d)) if n <= d => (n, SegmentKind::New, NEW_OPEN, NEW_CLOSE),
            (Some(_), Some(d)) => (d, SegmentKind::Deleted, DELETED_OPEN, DELETED_CLOSE),
        };

        push(&mut segments, SegmentKind::Unchanged, &rest[..at]);
        let body = at + open.len();
        match rest[body..].find(close) {
            Some(end) => {
                push(&mut segments, kind, &rest[body..body + end]);
                rest = &rest[body + end + close.len()..];
            }
            None => {
                push(&mut segments, SegmentKind::Unchanged, &rest[at..]);
                return segments;
            }
        }
    }

    push(&mut segments, SegmentKind::Unchanged, rest);
    segments
}

/// Append a fragment, merging into the previous segment on matching kind so
/// the decoded sequence satisfies the coalescing invariant.
fn push(segments: &mut Vec<Segment>, kind: SegmentKind, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.kind == kind => last.text.push_str(text),
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

    #[test]
    fn encode_scenario_a() {
        let segments = vec![
            seg(Unchanged, "Sec. 1. "),
            seg(Deleted, "old text"),
            seg(Unchanged, " "),
            seg(New, "new text"),
            seg(Unchanged, " remains."),
        ];
        assert_eq!(
            encode(&segments),
            "Sec. 1. [DELETED]old text[/DELETED] [NEW]new text[/NEW] remains."
        );
    }

    #[test]
    fn decode_scenario_a() {
        let decoded = decode("Sec. 1. [DELETED]old text[/DELETED] [NEW]new text[/NEW] remains.");
        assert_eq!(
            decoded,
            vec![
                seg(Unchanged, "Sec. 1. "),
                seg(Deleted, "old text"),
                seg(Unchanged, " "),
                seg(New, "new text"),
                seg(Unchanged, " remains."),
            ]
        );
    }

    #[test]
    fn decode_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn decode_plain_text() {
        assert_eq!(decode("no markers here"), vec![seg(Unchanged, "no markers here")]);
    }

    #[test]
    fn decode_nearest_marker_wins() {
        let decoded = decode("[DELETED]a[/DELETED][NEW]b[/NEW]");
        assert_eq!(decoded, vec![seg(Deleted, "a"), seg(New, "b")]);
    }

    #[test]
    fn decode_missing_closer_becomes_trailing_unchanged() {
        let decoded = decode("before [NEW]never closed");
        assert_eq!(decoded, vec![seg(Unchanged, "before [NEW]never closed")]);
    }

    #[test]
    fn decode_missing_closer_after_valid_region() {
        let decoded = decode("[DELETED]gone[/DELETED] mid [NEW]tail");
        assert_eq!(
            decoded,
            vec![seg(Deleted, "gone"), seg(Unchanged, " mid [NEW]tail")]
        );
    }

    #[test]
    fn decode_wrong_kind_closer_does_not_close() {
        // [/DELETED] is not a closer for [NEW]; the [NEW] region is
        // unterminated and recovery folds the tail into unchanged text.
        let decoded = decode("[NEW]a[/DELETED]b");
        assert_eq!(decoded, vec![seg(Unchanged, "[NEW]a[/DELETED]b")]);
    }

    #[test]
    fn round_trip_idempotence() {
        let sequences: Vec<Vec<Segment>> = vec![
            vec![],
            vec![seg(Unchanged, "only unchanged")],
            vec![seg(New, "only new")],
            vec![seg(Deleted, "only deleted")],
            vec![
                seg(Unchanged, "Sec. 1. "),
                seg(Deleted, "old"),
                seg(Unchanged, " "),
                seg(New, "new"),
                seg(Unchanged, " rest."),
            ],
            vec![seg(New, "a"), seg(Deleted, "b"), seg(New, "c")],
            vec![seg(Unchanged, "multi\nline\ttext  with   spaces")],
        ];
        for segments in sequences {
            let once = encode(&segments);
            let again = encode(&decode(&once));
            assert_eq!(once, again, "round trip diverged for {segments:?}");
        }
    }

    #[test]
    fn decode_output_is_coalesced() {
        let decoded = decode("a[NEW]b[/NEW][NEW]c[/NEW]d");
        for pair in decoded.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }
}
