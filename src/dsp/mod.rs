//! Audio rendering for chord playback.
//!
//! The scheduler fires one [`NoteTrigger`] per sounding string per stroke;
//! an [`Instrument`] turns each trigger into sound. Two interchangeable
//! backends implement the contract: a plucked-string sampler with a
//! send/return feedback-delay reverb, and an oscillator synth feeding a
//! fixed effects chain. A backend is selected once per session and never
//! swapped mid-note.

pub mod chorus;
pub mod envelope;
pub mod eq;
pub mod filter;
pub mod oscillator;
pub mod reverb;
pub mod sampler;
pub mod send_reverb;
pub mod synth;
pub mod widener;

use serde::{Deserialize, Serialize};

/// One note to render. Created by the scheduler, consumed immediately by
/// the instrument and the animation listener; never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTrigger {
    pub midi_note: u8,
    /// 0 = low E string, 5 = high E string.
    pub string_index: usize,
    /// Fret on that string; -1 never reaches an instrument (muted strings
    /// are filtered out by the scheduler).
    pub fret_position: i8,
    pub is_upstroke: bool,
    /// Per-note gain, 0..1, bass dampening already applied.
    pub volume: f64,
    pub duration_ms: f64,
}

/// ADSR shape shared by all notes triggered while the values are current.
/// Changing them mid-sequence affects only subsequently triggered notes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeParams {
    /// Seconds.
    pub attack: f64,
    /// Seconds; used as a time-constant basis, not a fixed segment length.
    pub decay: f64,
    /// Gain fraction 0..1 of the peak level.
    pub sustain: f64,
    /// Seconds.
    pub release: f64,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        EnvelopeParams {
            attack: 0.01,
            decay: 0.15,
            sustain: 0.2,
            release: 0.3,
        }
    }
}

/// Send/return levels for the reverb network, 0..1 each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbParams {
    pub send_level: f64,
    pub output_level: f64,
}

impl Default for ReverbParams {
    fn default() -> Self {
        ReverbParams {
            send_level: 0.4,
            output_level: 0.7,
        }
    }
}

/// A playable audio backend.
pub trait Instrument {
    /// Start rendering one note. Must not block; an uninitialized backend
    /// logs a warning and stays silent.
    fn trigger(&mut self, note: &NoteTrigger, envelope: &EnvelopeParams, reverb: &ReverbParams);

    /// Render the next block of stereo audio, adding nothing outside the
    /// given buffers.
    fn process_block(&mut self, left: &mut [f64], right: &mut [f64]);
}

/// Equal-tempered frequency for a MIDI note (A4 = 69 = 440 Hz).
pub fn midi_to_frequency(midi_note: u8) -> f64 {
    440.0 * 2.0_f64.powf((midi_note as f64 - 69.0) / 12.0)
}
