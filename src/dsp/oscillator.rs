//! Band-limited oscillator for the synth backend, PolyBLEP anti-aliased.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sawtooth
    }
}

/// Single-voice oscillator at a fixed note frequency.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase_inc: f64,
    phase: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            phase_inc: frequency / sample_rate,
            phase: 0.0,
        }
    }

    pub fn next_sample(&mut self) -> f64 {
        let inc = self.phase_inc;
        let sample = match self.waveform {
            Waveform::Sine => (2.0 * PI * self.phase).sin(),
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
            Waveform::Square => self.square(inc),
            Waveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }

    fn square(&self, inc: f64) -> f64 {
        let naive = if self.phase < 0.5 { 1.0 } else { -1.0 };
        naive + poly_blep(self.phase, inc) - poly_blep((self.phase + 0.5) % 1.0, inc)
    }
}

/// Polynomial band-limited step correction, applied around waveform
/// discontinuities to suppress aliasing. `t` is phase in [0, 1), `dt` the
/// per-sample phase increment.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}
