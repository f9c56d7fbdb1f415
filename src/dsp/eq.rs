//! Three-band EQ for the synth backend's effects chain.
//!
//! A low shelf at 400 Hz, a peaking mid band at 1 kHz, and a high shelf at
//! 2.5 kHz in series, each with an independent gain in dB.

use crate::dsp::filter::{BiquadFilter, FilterType};

const LOW_SHELF_HZ: f64 = 400.0;
const MID_PEAK_HZ: f64 = 1000.0;
const HIGH_SHELF_HZ: f64 = 2500.0;

#[derive(Debug, Clone)]
pub struct ThreeBandEq {
    low: BiquadFilter,
    mid: BiquadFilter,
    high: BiquadFilter,
}

impl ThreeBandEq {
    pub fn new(sample_rate: f64) -> Self {
        ThreeBandEq {
            low: BiquadFilter::new(FilterType::Lowshelf, LOW_SHELF_HZ, sample_rate),
            mid: BiquadFilter::new(FilterType::Peaking, MID_PEAK_HZ, sample_rate),
            high: BiquadFilter::new(FilterType::Highshelf, HIGH_SHELF_HZ, sample_rate),
        }
    }

    pub fn set_gains(&mut self, low_db: f64, mid_db: f64, high_db: f64) {
        self.low.set_gain_db(low_db);
        self.mid.set_gain_db(mid_db);
        self.high.set_gain_db(high_db);
    }

    pub fn process(&mut self, input: f64) -> f64 {
        self.high.process(self.mid.process(self.low.process(input)))
    }

    pub fn reset(&mut self) {
        self.low.reset();
        self.mid.reset();
        self.high.reset();
    }
}
