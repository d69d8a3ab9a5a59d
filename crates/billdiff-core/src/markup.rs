//! Tolerant normaliser for marked-up bill HTML.
//!
//! Scraped, hand-edited legislative HTML guarantees neither well-formedness
//! nor consistent nesting, so this is a best-effort scanner rather than a
//! validating parser: it reduces the heterogeneous markup to three token
//! kinds and never fails.
//!
//! # Recognised markers
//!
//! - `<u>`, `<ins>` open new language; `<del>`, `<s>`, `<strike>` open
//!   deleted language (tag names case-insensitive, attributes ignored)
//! - `<span>` with `text-decoration: underline` / `line-through` styling, or
//!   an `inserted` / `deleted` class, opens the corresponding kind
//! - every other tag is a structural separator: it terminates the current
//!   text run but opens and closes nothing, so a new/deleted region can span
//!   paragraphs and table cells

use std::sync::LazyLock;

use regex::Regex;

use crate::segment::SegmentKind;

/// A normalised markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start of a new/deleted region. Never carries `Unchanged`.
    Open(SegmentKind),
    /// End of a new/deleted region. Never carries `Unchanged`.
    Close(SegmentKind),
    /// A run of plain text with entities decoded, whitespace verbatim.
    Text(String),
}

/// Page headers in the form `SB2846 - 5 - LRB104 16878 AAS 30288 b`.
static PAGE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2}\d+\s*-\s*\d+\s*-\s*LRB\d+\s+\d+\s+[A-Z]+\s+\d+\s+[a-z]\b").unwrap()
});

/// Standalone line numbers at the start of a line (1-26 typically). The
/// trailing `\s+` may consume the newline, so a bare number alone on a line
/// is stripped as well.
static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d{1,2}\s+").unwrap());

/// Strip page headers and printed line numbers before tokenising.
///
/// Bill pages from the legislature's site carry a numbered-line layout and a
/// running LRB header that would otherwise pollute every segment.
pub fn cleanup_markup(input: &str) -> String {
    let cleaned = PAGE_HEADER.replace_all(input, "");
    LINE_NUMBER.replace_all(&cleaned, "").into_owned()
}

/// Tokenise an HTML-like document into normalised markup tokens.
///
/// Recovery rules: comments and tags left unterminated at end of input are
/// dropped, an unmatched `</span>` is ignored, and no error is ever raised.
/// Balancing of open/close markers is the segment builder's concern.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    // Open <span> tags, marker kind or None for structural spans.
    let mut spans: Vec<Option<SegmentKind>> = Vec::new();
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        decode_entities_into(&rest[..lt], &mut text);
        flush_text(&mut tokens, &mut text);
        let tail = &rest[lt..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            match comment.find("-->") {
                Some(end) => {
                    rest = &comment[end + 3..];
                    continue;
                }
                None => return tokens,
            }
        }

        let Some(gt) = tail.find('>') else {
            // Unterminated tag at end of input.
            return tokens;
        };
        classify_tag(&tail[1..gt], &mut tokens, &mut spans);
        rest = &tail[gt + 1..];
    }

    decode_entities_into(rest, &mut text);
    flush_text(&mut tokens, &mut text);
    tokens
}

fn flush_text(tokens: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

/// Emit the marker token (if any) for one tag body (the text between `<` and `>`).
fn classify_tag(body: &str, tokens: &mut Vec<Token>, spans: &mut Vec<Option<SegmentKind>>) {
    let body = body.trim();
    let (closing, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, body),
    };

    let name_end = body
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_lowercase();
    let attrs = &body[name_end..];

    match name.as_str() {
        "u" | "ins" => tokens.push(marker(closing, SegmentKind::New)),
        "del" | "s" | "strike" => tokens.push(marker(closing, SegmentKind::Deleted)),
        "span" => {
            if closing {
                // The closer closes whatever its opener mapped to; an
                // unmatched </span> is ignored.
                if let Some(Some(kind)) = spans.pop() {
                    tokens.push(Token::Close(kind));
                }
            } else {
                let kind = span_formatting(attrs);
                spans.push(kind);
                if let Some(kind) = kind {
                    tokens.push(Token::Open(kind));
                }
            }
        }
        // Structural separator: <p>, <td>, <br>, ...
        _ => {}
    }
}

fn marker(closing: bool, kind: SegmentKind) -> Token {
    if closing {
        Token::Close(kind)
    } else {
        Token::Open(kind)
    }
}

/// Classify a `<span>` opener by its styling.
///
/// Some bill renderings express the legislative convention through CSS
/// rather than semantic tags: underline styling marks new language and
/// line-through marks deletions; `inserted`/`deleted` classes likewise.
fn span_formatting(attrs: &str) -> Option<SegmentKind> {
    if let Some(style) = attr_value(attrs, "style") {
        let style = style.to_ascii_lowercase();
        if style.contains("text-decoration") {
            if style.contains("underline") {
                return Some(SegmentKind::New);
            }
            if style.contains("line-through") {
                return Some(SegmentKind::Deleted);
            }
        }
    }
    if let Some(class) = attr_value(attrs, "class") {
        let class = class.to_ascii_lowercase();
        if class.contains("inserted") {
            return Some(SegmentKind::New);
        }
        if class.contains("deleted") {
            return Some(SegmentKind::Deleted);
        }
    }
    None
}

/// Extract a named attribute value from a tag's attribute text.
///
/// Case-insensitive on the name; handles `name="v"`, `name='v'`, and bare
/// `name=v` forms. Returns the first match.
fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    // ASCII lowercasing preserves byte offsets, so positions found in
    // `lower` index into `attrs` directly.
    let lower = attrs.to_ascii_lowercase();
    let bytes = attrs.as_bytes();
    let mut from = 0;

    while let Some(pos) = lower[from..].find(name) {
        let start = from + pos;
        let end = start + name.len();
        from = start + 1;

        let standalone = (start == 0 || !bytes[start - 1].is_ascii_alphanumeric())
            && !bytes.get(end).is_some_and(|b| b.is_ascii_alphanumeric());
        if !standalone {
            continue;
        }

        let mut i = end;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        return match bytes.get(i).copied() {
            Some(q) if q == b'"' || q == b'\'' => {
                let vstart = i + 1;
                let vend = attrs[vstart..]
                    .find(q as char)
                    .map_or(attrs.len(), |p| vstart + p);
                Some(&attrs[vstart..vend])
            }
            Some(_) => {
                let vend = attrs[i..]
                    .find(|c: char| c.is_ascii_whitespace())
                    .map_or(attrs.len(), |p| i + p);
                Some(&attrs[i..vend])
            }
            None => None,
        };
    }
    None
}

/// Append `raw` to `out` with HTML entities decoded.
///
/// The named core set and numeric references (`&#NNN;`, `&#xHH;`) decode to
/// their literal character; anything unrecognised passes through verbatim.
fn decode_entities_into(raw: &str, out: &mut String) {
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_entity(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
}

/// Decode one entity at the start of `tail` (which begins with `&`).
///
/// Returns the decoded character and the byte length consumed, or `None`
/// when the reference is unknown or malformed.
fn decode_entity(tail: &str) -> Option<(char, usize)> {
    // Entity names are short; an unbounded search would scan to the next
    // unrelated semicolon in the document. Search on bytes: a fixed cap can
    // land inside a multi-byte character, where a str slice would panic.
    let semi = tail.as_bytes()[..tail.len().min(32)]
        .iter()
        .position(|&b| b == b';')?;
    let name = &tail[1..semi];
    let len = semi + 1;

    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, len))
}
