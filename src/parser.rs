//! Parser for the chord-sequence mini-language.
//!
//! Grammar, per line: `[Label:] Root[Accidental][Quality](Strokes|Count)[, ...]`
//! where `Strokes` is whitespace-separated `D`/`U` tokens and `Count` is a
//! decimal integer meaning that many downstrokes. Parsing is total:
//! malformed tokens are skipped with a logged warning and never abort the
//! rest of the input.

use log::warn;

use crate::chord::{ChordEvent, ChordQuality, RawPattern, RootNote, Sequence, Stroke};

/// Parse source text into an ordered chord sequence. Deterministic and
/// total; tokens that do not match the chord pattern are dropped.
pub fn parse(source: &str) -> Sequence {
    let mut events = Vec::new();
    let mut current_section = String::new();

    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (label, chord_text) = split_label(line);
        if let Some(label) = label {
            current_section = label.trim().to_string();
        }
        for token in split_after_parens(chord_text) {
            if let Some(event) = parse_token(token.trim(), &current_section) {
                events.push(event);
            }
        }
    }

    Sequence { events }
}

/// Permissive playability gate, checked separately from parsing. Empty text
/// is valid; otherwise some line must contain some comma-separated segment
/// that matches the chord pattern. One good token redeems a line of garbage.
pub fn is_valid_sequence(source: &str) -> bool {
    if source.trim().is_empty() {
        return true;
    }
    source.lines().any(|line| {
        let (_, chord_text) = split_label(line);
        chord_text
            .split(',')
            .any(|segment| find_chord_match(segment.trim()).is_some())
    })
}

/// Label is everything before the first colon; chord-bearing text is
/// everything after the last colon. A line with no colon is all chords.
fn split_label(line: &str) -> (Option<&str>, &str) {
    match (line.find(':'), line.rfind(':')) {
        (Some(first), Some(last)) => (Some(&line[..first]), &line[last + 1..]),
        _ => (None, line),
    }
}

/// Split chord-bearing text into tokens after each closing paren, consuming
/// the whitespace that follows. Trailing text with no paren is kept as a
/// final token so leftover garbage still gets a warning.
fn split_after_parens(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b')' {
            tokens.push(&text[start..i + 1]);
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// One successful application of the chord-token pattern
/// `Root[Accidental][Quality](Strokes|Count)`.
struct ChordMatch<'a> {
    root: &'a str,
    suffix: &'a str,
    body: &'a str,
}

/// Find the first chord-token match anywhere in `text`, like an unanchored
/// regex search.
fn find_chord_match(text: &str) -> Option<ChordMatch<'_>> {
    (0..text.len()).find_map(|start| match_at(text, start))
}

fn match_at(text: &str, start: usize) -> Option<ChordMatch<'_>> {
    let bytes = text.as_bytes();
    if !(b'A'..=b'G').contains(bytes.get(start)?) {
        return None;
    }
    let mut i = start + 1;
    if matches!(bytes.get(i), Some(&b'b') | Some(&b'#')) {
        i += 1;
    }
    let root_end = i;

    // Quality suffix runs to the opening paren.
    let open = root_end + text[root_end..].find('(')?;
    let body_start = open + 1;

    // Directional branch: one or more D/U, each followed by at most one
    // whitespace character.
    let mut k = body_start;
    while let Some(&c) = bytes.get(k) {
        if c != b'D' && c != b'U' {
            break;
        }
        k += 1;
        if matches!(bytes.get(k), Some(c) if c.is_ascii_whitespace()) {
            k += 1;
        }
    }
    if k > body_start && bytes.get(k) == Some(&b')') {
        return Some(ChordMatch {
            root: &text[start..root_end],
            suffix: &text[root_end..open],
            body: &text[body_start..k],
        });
    }

    // Numeric branch: one or more decimal digits.
    let mut k = body_start;
    while matches!(bytes.get(k), Some(c) if c.is_ascii_digit()) {
        k += 1;
    }
    if k > body_start && bytes.get(k) == Some(&b')') {
        return Some(ChordMatch {
            root: &text[start..root_end],
            suffix: &text[root_end..open],
            body: &text[body_start..k],
        });
    }

    None
}

fn parse_token(token: &str, section: &str) -> Option<ChordEvent> {
    if token.is_empty() {
        return None;
    }
    let m = find_chord_match(token)?;

    let Some(root) = RootNote::from_str(m.root) else {
        warn!("skipping chord token {token:?}: invalid root note {:?}", m.root);
        return None;
    };
    let suffix = m.suffix.trim();
    let Some(quality) = ChordQuality::from_suffix(suffix) else {
        warn!("skipping chord token {token:?}: unknown quality {suffix:?}");
        return None;
    };
    let raw = parse_pattern_body(m.body)?;

    Some(ChordEvent {
        root,
        quality,
        pattern: raw.normalize(),
        section: section.to_string(),
    })
}

fn parse_pattern_body(body: &str) -> Option<RawPattern> {
    if body.contains('D') || body.contains('U') {
        let strokes = body
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == 'U' { Stroke::Up } else { Stroke::Down })
            .collect();
        Some(RawPattern::Directional(strokes))
    } else {
        match body.parse::<u32>() {
            Ok(n) => Some(RawPattern::LegacyCount(n)),
            Err(_) => {
                warn!("skipping chord token: bad stroke count {body:?}");
                None
            }
        }
    }
}
