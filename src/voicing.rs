//! Chord voicings: mapping a (root, quality) pair to fret positions on a
//! six-string guitar in standard tuning, and fret positions to MIDI notes.

use crate::chord::{ChordQuality, RootNote};

/// Fret per string, low E string first. `-1` is a muted string.
pub type FretShape = [i8; 6];

/// Number of strings on the modeled instrument.
pub const STRING_COUNT: usize = 6;

/// MIDI note numbers of the open strings, low E to high E (E2 A2 D3 G3 B3 E4).
pub const OPEN_STRING_MIDI: [u8; 6] = [40, 45, 50, 55, 59, 64];

/// MIDI note for a fretted string, or `None` when the string is muted.
pub fn midi_note(string_index: usize, fret: i8) -> Option<u8> {
    if fret < 0 || string_index >= STRING_COUNT {
        return None;
    }
    Some(OPEN_STRING_MIDI[string_index] + fret as u8)
}

/// Resolves a chord to a playable fret shape. The playback engine only sees
/// this trait, so hosts can substitute capo-shifted or inversion-aware
/// voicings without touching the scheduler.
pub trait VoicingResolver {
    fn resolve(&self, root: RootNote, quality: ChordQuality) -> FretShape;
}

/// The built-in first-position voicing table. Shapes are keyed by semitone,
/// so enharmonic spellings (`A#`/`Bb`) resolve identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenChordTable;

impl VoicingResolver for OpenChordTable {
    fn resolve(&self, root: RootNote, quality: ChordQuality) -> FretShape {
        SHAPES[root.semitone() as usize][quality_index(quality)]
    }
}

fn quality_index(quality: ChordQuality) -> usize {
    match quality {
        ChordQuality::Major => 0,
        ChordQuality::Minor => 1,
        ChordQuality::Dominant7 => 2,
        ChordQuality::Minor7 => 3,
        ChordQuality::Major7 => 4,
        ChordQuality::Add9 => 5,
        ChordQuality::Sus2 => 6,
        ChordQuality::Sus4 => 7,
        ChordQuality::Power5 => 8,
        ChordQuality::Sixth => 9,
        ChordQuality::SevenSus4 => 10,
        ChordQuality::Diminished => 11,
    }
}

/// 12 semitones (0 = A) by 12 qualities, in `quality_index` order:
/// major, minor, 7, m7, maj7, add9, sus2, sus4, 5, 6, 7sus4, dim.
const SHAPES: [[FretShape; 12]; 12] = [
    // A
    [
        [0, 0, 2, 2, 2, 0],
        [0, 0, 2, 2, 1, 0],
        [0, 0, 2, 0, 2, 0],
        [0, 0, 2, 0, 1, 0],
        [0, 0, 2, 1, 2, 0],
        [0, 0, 2, 4, 2, 0],
        [0, 0, 2, 2, 0, 0],
        [0, 0, 2, 2, 3, 0],
        [0, 0, 2, 2, -1, 0],
        [0, 0, 2, 2, 2, 2],
        [0, 0, 2, 0, 3, 0],
        [0, 0, 1, 2, 1, -1],
    ],
    // A# / Bb
    [
        [-1, 1, 3, 3, 3, 1],
        [-1, 1, 3, 3, 2, 1],
        [-1, 1, 3, 1, 3, 1],
        [-1, 1, 3, 1, 2, 1],
        [-1, 1, 3, 2, 3, 1],
        [-1, 1, 3, 3, 3, 3],
        [-1, 1, 3, 3, 1, 1],
        [-1, 1, 3, 3, 4, 1],
        [-1, 1, 3, 3, -1, 1],
        [-1, 1, 3, 3, 3, 3],
        [-1, 1, 3, 1, 4, 1],
        [-1, 1, 2, 3, 2, 0],
    ],
    // B
    [
        [-1, 2, 4, 4, 4, 2],
        [-1, 2, 4, 4, 3, 2],
        [-1, 2, 1, 2, 0, 2],
        [-1, 2, 0, 2, 0, 2],
        [-1, 2, 4, 3, 4, 2],
        [-1, 2, 4, 4, 4, 4],
        [-1, 2, 4, 4, 2, 2],
        [-1, 2, 4, 4, 5, 2],
        [-1, 2, 4, 4, -1, 2],
        [-1, 2, 4, 4, 4, 4],
        [-1, 2, 4, 2, 5, 2],
        [-1, 2, 3, 4, 3, -1],
    ],
    // C
    [
        [3, 3, 2, 0, 1, 0],
        [-1, 3, 5, 5, 4, 3],
        [0, 3, 2, 3, 1, 0],
        [-1, 3, 5, 3, 4, 3],
        [3, 3, 2, 0, 0, 0],
        [3, 3, 2, 0, 3, 0],
        [3, 3, 0, 0, 1, 3],
        [3, 3, 0, 0, 1, 1],
        [3, 3, 5, 5, -1, 3],
        [0, 0, 2, 2, 1, 3],
        [3, 3, 3, 3, 1, 1],
        [-1, -1, 1, 2, 1, 2],
    ],
    // C# / Db
    [
        [-1, 4, 3, 1, 2, 1],
        [-1, 4, 2, 1, 2, -1],
        [-1, 4, 3, 4, 2, -1],
        [-1, 4, 2, 4, 2, -1],
        [-1, 4, 3, 5, 2, 1],
        [-1, 4, 3, 1, 4, 4],
        [-1, 4, 1, 1, 2, -1],
        [-1, 4, 4, 1, 2, -1],
        [-1, 4, 1, 1, -1, -1],
        [-1, 4, 3, 3, 2, -1],
        [-1, 4, 4, 4, 2, -1],
        [-1, -1, 2, 3, 2, 3],
    ],
    // D
    [
        [-1, -1, 0, 2, 3, 2],
        [-1, -1, 0, 2, 3, 1],
        [-1, -1, 0, 2, 1, 2],
        [-1, -1, 0, 2, 1, 1],
        [-1, -1, 0, 2, 2, 2],
        [-1, -1, 0, 2, 3, 0],
        [-1, -1, 0, 2, 3, 0],
        [-1, -1, 0, 2, 3, 3],
        [-1, -1, 0, 2, 3, -1],
        [-1, -1, 0, 2, 0, 2],
        [-1, -1, 0, 2, 1, 3],
        [-1, -1, 0, 1, 3, 1],
    ],
    // D# / Eb
    [
        [0, 0, 1, 3, 4, 3],
        [0, 0, 1, 3, 4, 2],
        [0, 0, 1, 3, 2, 3],
        [0, 0, 1, 3, 2, 2],
        [0, 0, 1, 3, 3, 3],
        [0, 0, 1, 3, 4, 1],
        [0, 0, 1, 3, 4, 1],
        [0, 0, 1, 3, 4, 4],
        [0, 0, 1, 3, -1, -1],
        [0, 0, 1, 3, 1, 3],
        [0, 0, 1, 3, 2, 4],
        [-1, -1, 1, 2, 4, 2],
    ],
    // E
    [
        [0, 2, 2, 1, 0, 0],
        [0, 2, 2, 0, 0, 0],
        [0, 2, 0, 1, 0, 0],
        [0, 2, 0, 0, 0, 0],
        [0, 2, 1, 1, 0, 0],
        [0, 2, 2, 1, 0, 2],
        [0, 2, 2, 4, 0, 0],
        [0, 2, 2, 2, 0, 0],
        [0, 2, 2, -1, -1, 0],
        [0, 2, 2, 1, 2, 0],
        [0, 2, 0, 2, 0, 0],
        [0, 1, 2, 0, -1, -1],
    ],
    // F
    [
        [1, 3, 3, 2, 1, 1],
        [1, 3, 3, 1, 1, 1],
        [1, 3, 1, 2, 1, 1],
        [1, 3, 1, 1, 1, 1],
        [1, 3, 2, 2, 1, 0],
        [1, 0, 3, 0, 1, 1],
        [1, 3, 3, 0, 1, 1],
        [1, 3, 3, 3, 1, 1],
        [1, 3, 3, -1, -1, 1],
        [1, 3, 3, 2, 3, 1],
        [1, 3, 1, 3, 1, 1],
        [1, 2, 3, 1, -1, -1],
    ],
    // F# / Gb
    [
        [2, 4, 4, 3, 2, 2],
        [2, 4, 4, 2, 2, 2],
        [2, 4, 2, 3, 2, 2],
        [2, 4, 2, 2, 2, 2],
        [2, 4, 3, 3, 2, 1],
        [2, 1, 4, 1, 2, 2],
        [2, 4, 4, 1, 2, 2],
        [2, 4, 4, 4, 2, 2],
        [2, 4, 4, -1, -1, 2],
        [2, 4, 4, 3, 4, 2],
        [2, 4, 2, 4, 2, 2],
        [2, 3, 4, 2, -1, -1],
    ],
    // G
    [
        [3, 2, 0, 0, 0, 3],
        [3, 5, 5, 3, 3, 3],
        [3, 2, 0, 0, 0, 1],
        [3, 5, 3, 3, 3, 3],
        [3, 2, 0, 0, 0, 2],
        [3, 2, 0, 0, 0, 5],
        [3, 0, 0, 0, 3, 3],
        [3, 3, 0, 0, 1, 3],
        [3, 5, 5, -1, -1, 3],
        [3, 2, 0, 0, 0, 0],
        [3, 3, 0, 0, 1, 1],
        [3, 4, 5, 3, -1, -1],
    ],
    // G# / Ab
    [
        [4, 3, 1, 1, 1, 4],
        [4, 3, 1, 1, 4, 4],
        [4, 3, 1, 1, 1, 2],
        [4, 3, 1, 1, 4, 2],
        [4, 3, 1, 1, 1, 3],
        [4, 3, 1, 1, 1, 0],
        [4, 1, 1, 1, 4, 4],
        [4, 4, 1, 1, 2, 4],
        [4, 3, 1, -1, -1, 4],
        [4, 3, 1, 1, 1, 1],
        [4, 4, 1, 1, 2, 2],
        [4, 2, 3, 4, 3, -1],
    ],
];
