//! Oscillator synth backend.
//!
//! Each trigger starts a band-limited oscillator voice shaped by the note
//! envelope; the voice sum runs through a fixed effects chain in this
//! order: 3-band EQ, chorus, tone filter, stereo widener, reverb, master
//! gain. The reverb send level doubles as the reverb's wet mix here.

use crate::dsp::chorus::Chorus;
use crate::dsp::envelope::NoteEnvelope;
use crate::dsp::eq::ThreeBandEq;
use crate::dsp::filter::{BiquadFilter, FilterType};
use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::dsp::reverb::Reverb;
use crate::dsp::widener::StereoWidener;
use crate::dsp::{midi_to_frequency, EnvelopeParams, Instrument, NoteTrigger, ReverbParams};

/// Timbre controls for the synth chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub waveform: Waveform,
    pub low_gain_db: f64,
    pub mid_gain_db: f64,
    pub high_gain_db: f64,
    pub chorus_rate: f64,
    pub chorus_depth: f64,
    pub chorus_wet: f64,
    pub filter_type: FilterType,
    pub filter_cutoff: f64,
    pub filter_q: f64,
    pub stereo_width: f64,
    pub master_volume: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        SynthParams {
            waveform: Waveform::Sawtooth,
            low_gain_db: 0.0,
            mid_gain_db: 0.0,
            high_gain_db: 0.0,
            chorus_rate: 1.5,
            chorus_depth: 0.7,
            chorus_wet: 0.0,
            filter_type: FilterType::Lowpass,
            filter_cutoff: 15000.0,
            filter_q: 1.0,
            stereo_width: 0.0,
            master_volume: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct SynthVoice {
    oscillator: Oscillator,
    envelope: NoteEnvelope,
}

impl SynthVoice {
    fn next_sample(&mut self) -> f64 {
        self.oscillator.next_sample() * self.envelope.next_sample()
    }

    fn is_finished(&self) -> bool {
        self.envelope.is_finished()
    }
}

#[derive(Debug, Clone)]
pub struct SynthInstrument {
    params: SynthParams,
    voices: Vec<SynthVoice>,
    eq: ThreeBandEq,
    chorus: Chorus,
    filter_l: BiquadFilter,
    filter_r: BiquadFilter,
    widener: StereoWidener,
    reverb: Reverb,
    sample_rate: f64,
}

impl SynthInstrument {
    pub fn new(sample_rate: f64) -> Self {
        let params = SynthParams::default();
        let mut synth = SynthInstrument {
            params,
            voices: Vec::new(),
            eq: ThreeBandEq::new(sample_rate),
            chorus: Chorus::new(sample_rate),
            filter_l: BiquadFilter::new(params.filter_type, params.filter_cutoff, sample_rate),
            filter_r: BiquadFilter::new(params.filter_type, params.filter_cutoff, sample_rate),
            widener: StereoWidener::new(params.stereo_width),
            reverb: Reverb::new(sample_rate),
            sample_rate,
        };
        synth.set_params(params);
        synth
    }

    /// Apply timbre controls to every stage of the chain.
    pub fn set_params(&mut self, params: SynthParams) {
        self.eq
            .set_gains(params.low_gain_db, params.mid_gain_db, params.high_gain_db);
        self.chorus.rate = params.chorus_rate;
        self.chorus.depth = params.chorus_depth;
        self.chorus.wet = params.chorus_wet;
        for filter in [&mut self.filter_l, &mut self.filter_r] {
            filter.set_type(params.filter_type);
            filter.set_frequency(params.filter_cutoff);
            filter.set_q(params.filter_q);
        }
        self.widener.width = params.stereo_width.clamp(0.0, 1.0);
        self.params = params;
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

impl Instrument for SynthInstrument {
    fn trigger(&mut self, note: &NoteTrigger, envelope: &EnvelopeParams, reverb: &ReverbParams) {
        self.reverb.wet = reverb.send_level.clamp(0.0, 1.0);
        self.voices.push(SynthVoice {
            oscillator: Oscillator::new(
                self.params.waveform,
                midi_to_frequency(note.midi_note),
                self.sample_rate,
            ),
            envelope: NoteEnvelope::new(note.volume, note.duration_ms, envelope, self.sample_rate),
        });
    }

    fn process_block(&mut self, left: &mut [f64], right: &mut [f64]) {
        let frames = left.len().min(right.len());
        for i in 0..frames {
            let mono: f64 = self.voices.iter_mut().map(|v| v.next_sample()).sum();
            let shaped = self.eq.process(mono);
            let (l, r) = self.chorus.process(shaped);
            let (l, r) = (self.filter_l.process(l), self.filter_r.process(r));
            let (l, r) = self.widener.process(l, r);
            let (l, r) = self.reverb.process(l, r);
            left[i] = l * self.params.master_volume;
            right[i] = r * self.params.master_volume;
        }
        self.voices.retain(|v| !v.is_finished());
    }
}
