//! Core data model for chord sequences: root notes, chord qualities,
//! strokes, strum patterns, and parsed chord events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The 17 spellable root note names. Enharmonic pairs (`A#`/`Bb` etc.) are
/// distinct spellings of the same semitone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootNote {
    A,
    ASharp,
    BFlat,
    B,
    C,
    CSharp,
    DFlat,
    D,
    DSharp,
    EFlat,
    E,
    F,
    FSharp,
    GFlat,
    G,
    GSharp,
    AFlat,
}

/// All 17 root notes, in the order the original sequence editor lists them.
pub const ROOT_NOTES: [RootNote; 17] = [
    RootNote::A,
    RootNote::ASharp,
    RootNote::BFlat,
    RootNote::B,
    RootNote::C,
    RootNote::CSharp,
    RootNote::DFlat,
    RootNote::D,
    RootNote::DSharp,
    RootNote::EFlat,
    RootNote::E,
    RootNote::F,
    RootNote::FSharp,
    RootNote::GFlat,
    RootNote::G,
    RootNote::GSharp,
    RootNote::AFlat,
];

impl RootNote {
    /// Parse a spelled root (`"A"`, `"A#"`, `"Bb"`, ...). Returns `None` for
    /// anything that is not one of the 17 valid spellings.
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "A" => RootNote::A,
            "A#" => RootNote::ASharp,
            "Bb" => RootNote::BFlat,
            "B" => RootNote::B,
            "C" => RootNote::C,
            "C#" => RootNote::CSharp,
            "Db" => RootNote::DFlat,
            "D" => RootNote::D,
            "D#" => RootNote::DSharp,
            "Eb" => RootNote::EFlat,
            "E" => RootNote::E,
            "F" => RootNote::F,
            "F#" => RootNote::FSharp,
            "Gb" => RootNote::GFlat,
            "G" => RootNote::G,
            "G#" => RootNote::GSharp,
            "Ab" => RootNote::AFlat,
            _ => return None,
        })
    }

    /// Spelled name as it appears in sequence text.
    pub fn name(&self) -> &'static str {
        match self {
            RootNote::A => "A",
            RootNote::ASharp => "A#",
            RootNote::BFlat => "Bb",
            RootNote::B => "B",
            RootNote::C => "C",
            RootNote::CSharp => "C#",
            RootNote::DFlat => "Db",
            RootNote::D => "D",
            RootNote::DSharp => "D#",
            RootNote::EFlat => "Eb",
            RootNote::E => "E",
            RootNote::F => "F",
            RootNote::FSharp => "F#",
            RootNote::GFlat => "Gb",
            RootNote::G => "G",
            RootNote::GSharp => "G#",
            RootNote::AFlat => "Ab",
        }
    }

    /// Semitone index 0–11, with 0 = A. Enharmonic spellings normalize to
    /// the same index (`A#` and `Bb` are both 1).
    pub fn semitone(&self) -> u8 {
        match self {
            RootNote::A => 0,
            RootNote::ASharp | RootNote::BFlat => 1,
            RootNote::B => 2,
            RootNote::C => 3,
            RootNote::CSharp | RootNote::DFlat => 4,
            RootNote::D => 5,
            RootNote::DSharp | RootNote::EFlat => 6,
            RootNote::E => 7,
            RootNote::F => 8,
            RootNote::FSharp | RootNote::GFlat => 9,
            RootNote::G => 10,
            RootNote::GSharp | RootNote::AFlat => 11,
        }
    }
}

impl fmt::Display for RootNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Chord quality. The empty suffix in sequence text means `Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Minor7,
    Major7,
    Add9,
    Sus2,
    Sus4,
    Power5,
    Sixth,
    SevenSus4,
    Diminished,
}

impl ChordQuality {
    /// Parse a quality suffix as written after the root. `"m"` and
    /// `"minor"` are aliases; the empty string is `Major`.
    pub fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "" | "major" => ChordQuality::Major,
            "m" | "minor" => ChordQuality::Minor,
            "7" => ChordQuality::Dominant7,
            "m7" => ChordQuality::Minor7,
            "maj7" => ChordQuality::Major7,
            "add9" => ChordQuality::Add9,
            "sus2" => ChordQuality::Sus2,
            "sus4" => ChordQuality::Sus4,
            "5" => ChordQuality::Power5,
            "6" => ChordQuality::Sixth,
            "7sus4" => ChordQuality::SevenSus4,
            "dim" => ChordQuality::Diminished,
            _ => return None,
        })
    }

    /// Canonical suffix for serializing back to sequence text. Major is the
    /// empty string, so `C major` round-trips as `C`.
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Add9 => "add9",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Power5 => "5",
            ChordQuality::Sixth => "6",
            ChordQuality::SevenSus4 => "7sus4",
            ChordQuality::Diminished => "dim",
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A single pick motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stroke {
    Down,
    Up,
}

impl Stroke {
    pub fn is_upstroke(&self) -> bool {
        matches!(self, Stroke::Up)
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stroke::Down => f.write_str("D"),
            Stroke::Up => f.write_str("U"),
        }
    }
}

/// Raw pattern content as it appears between parentheses, before
/// normalization. The legacy numeric form `(4)` means "4 downstrokes".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPattern {
    LegacyCount(u32),
    Directional(Vec<Stroke>),
}

impl RawPattern {
    /// Normalize to a directional stroke list. Downstream code never sees
    /// the legacy form again.
    pub fn normalize(self) -> Vec<Stroke> {
        match self {
            RawPattern::Directional(strokes) => strokes,
            RawPattern::LegacyCount(n) => vec![Stroke::Down; n as usize],
        }
    }
}

/// An ordered, non-empty list of strokes applied to one chord.
pub type StrumPattern = Vec<Stroke>;

/// One parsed chord with its strum pattern and the section label it was
/// parsed under. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub root: RootNote,
    pub quality: ChordQuality,
    pub pattern: StrumPattern,
    /// Inherited from the most recent labeled line; empty if none yet.
    pub section: String,
}

impl ChordEvent {
    /// Display name, e.g. `Am` or `F#maj7`. Major omits the suffix.
    pub fn name(&self) -> String {
        format!("{}{}", self.root, self.quality)
    }
}

impl fmt::Display for ChordEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}(", self.root, self.quality)?;
        for (i, stroke) in self.pattern.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{stroke}")?;
        }
        f.write_str(")")
    }
}

/// An ordered list of chord events, derived fresh from source text on every
/// playback start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub events: Vec<ChordEvent>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serialize back to mini-language source. Section labels are emitted
    /// once, at the start of the line where they change; chords within a
    /// section are comma-separated on one line.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        let mut current_section: Option<&str> = None;
        for event in &self.events {
            let section_changed = current_section != Some(event.section.as_str());
            if section_changed {
                if current_section.is_some() {
                    out.push('\n');
                }
                if !event.section.is_empty() {
                    out.push_str(&event.section);
                    out.push_str(": ");
                }
                current_section = Some(event.section.as_str());
            } else if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&event.to_string());
        }
        out
    }
}
