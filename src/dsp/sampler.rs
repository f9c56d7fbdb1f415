//! Plucked-string sampler backend.
//!
//! Hosts load one WAV recording per MIDI note into a [`SampleBank`]; each
//! trigger plays the matching sample through its own gain envelope, with
//! the dry sum feeding the send/return reverb network. Missing samples or
//! an empty bank degrade to a logged warning, never an error, so the
//! scheduler's timing is unaffected by audio setup problems.

use std::collections::HashMap;
use std::io::Cursor;

use log::warn;

use crate::dsp::envelope::NoteEnvelope;
use crate::dsp::send_reverb::SendReverb;
use crate::dsp::{EnvelopeParams, Instrument, NoteTrigger, ReverbParams};
use crate::error::SampleError;

/// A decoded mono sample held in memory.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    data: Vec<f64>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(data: Vec<f64>, sample_rate: u32) -> Self {
        SampleBuffer { data, sample_rate }
    }

    /// Decode a WAV file. Stereo sources are averaged down to mono.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, SampleError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        if spec.channels == 0 || spec.channels > 2 {
            return Err(SampleError::UnsupportedChannels(spec.channels));
        }

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|v| v as f64))
                .collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let channels = spec.channels as usize;
        let data: Vec<f64> = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect();
        if data.is_empty() {
            return Err(SampleError::EmptySample);
        }
        Ok(SampleBuffer {
            data,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear-interpolated read at a fractional position; positions past
    /// the end read silence.
    fn read_interpolated(&self, position: f64) -> f64 {
        if position < 0.0 {
            return 0.0;
        }
        let idx = position as usize;
        if idx + 1 >= self.data.len() {
            return if idx < self.data.len() { self.data[idx] } else { 0.0 };
        }
        let frac = position - idx as f64;
        self.data[idx] * (1.0 - frac) + self.data[idx + 1] * frac
    }
}

/// Recordings keyed by the MIDI note they were captured at. Samples play
/// at their recorded pitch; there is no resampling between notes.
#[derive(Debug, Clone, Default)]
pub struct SampleBank {
    samples: HashMap<u8, SampleBuffer>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, midi_note: u8, buffer: SampleBuffer) {
        self.samples.insert(midi_note, buffer);
    }

    /// Decode WAV bytes and register them under `midi_note`.
    pub fn load_wav(&mut self, midi_note: u8, bytes: &[u8]) -> Result<(), SampleError> {
        let buffer = SampleBuffer::from_wav_bytes(bytes)?;
        self.samples.insert(midi_note, buffer);
        Ok(())
    }

    pub fn get(&self, midi_note: u8) -> Option<&SampleBuffer> {
        self.samples.get(&midi_note)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One sounding note: a read cursor over its sample plus its envelope.
#[derive(Debug, Clone)]
struct SamplerVoice {
    buffer: SampleBuffer,
    position: f64,
    /// Buffer samples consumed per engine sample.
    step: f64,
    envelope: NoteEnvelope,
}

impl SamplerVoice {
    fn next_sample(&mut self) -> f64 {
        let sample = self.buffer.read_interpolated(self.position);
        self.position += self.step;
        sample * self.envelope.next_sample()
    }

    fn is_finished(&self) -> bool {
        self.envelope.is_finished()
    }
}

/// The sampler instrument. Mono voices summed, dry to the output plus a
/// send into the two-branch feedback-delay reverb.
#[derive(Debug, Clone)]
pub struct SamplerInstrument {
    bank: SampleBank,
    voices: Vec<SamplerVoice>,
    reverb: SendReverb,
    sample_rate: f64,
}

impl SamplerInstrument {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_bank(SampleBank::new(), sample_rate)
    }

    pub fn with_bank(bank: SampleBank, sample_rate: f64) -> Self {
        SamplerInstrument {
            bank,
            voices: Vec::new(),
            reverb: SendReverb::new(sample_rate),
            sample_rate,
        }
    }

    pub fn bank_mut(&mut self) -> &mut SampleBank {
        &mut self.bank
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

impl Instrument for SamplerInstrument {
    fn trigger(&mut self, note: &NoteTrigger, envelope: &EnvelopeParams, reverb: &ReverbParams) {
        if self.bank.is_empty() {
            warn!("sampler has no samples loaded; dropping note {}", note.midi_note);
            return;
        }
        let Some(buffer) = self.bank.get(note.midi_note) else {
            warn!("no sample for MIDI note {}; dropping it", note.midi_note);
            return;
        };

        // Reverb levels are read at trigger time, like every tunable.
        self.reverb.send_level = reverb.send_level;
        self.reverb.output_level = reverb.output_level;

        self.voices.push(SamplerVoice {
            buffer: buffer.clone(),
            position: 0.0,
            step: buffer.sample_rate as f64 / self.sample_rate,
            envelope: NoteEnvelope::new(note.volume, note.duration_ms, envelope, self.sample_rate),
        });
    }

    fn process_block(&mut self, left: &mut [f64], right: &mut [f64]) {
        let frames = left.len().min(right.len());
        for i in 0..frames {
            let dry: f64 = self.voices.iter_mut().map(|v| v.next_sample()).sum();
            let out = dry + self.reverb.process(dry);
            left[i] = out;
            right[i] = out;
        }
        self.voices.retain(|v| !v.is_finished());
    }
}
