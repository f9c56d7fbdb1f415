//! Chorus for the synth backend: an LFO-modulated delay line, mono in,
//! stereo out. The two channels read the same buffer with LFO phases a
//! quarter cycle apart, which is where the stereo image comes from.

use std::f64::consts::PI;

/// Center delay around which the LFO modulates.
const BASE_DELAY: f64 = 0.0035;
const MAX_DELAY: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct Chorus {
    buffer: Vec<f64>,
    write_pos: usize,
    sample_rate: f64,
    phase: f64,

    /// LFO rate in Hz.
    pub rate: f64,
    /// Modulation depth, 0..1 of the center delay.
    pub depth: f64,
    /// Dry/wet mix, 0 = bypass.
    pub wet: f64,
}

impl Chorus {
    pub fn new(sample_rate: f64) -> Self {
        Chorus {
            buffer: vec![0.0; (sample_rate * MAX_DELAY) as usize + 2],
            write_pos: 0,
            sample_rate,
            phase: 0.0,
            rate: 1.5,
            depth: 0.7,
            wet: 0.0,
        }
    }

    pub fn process(&mut self, input: f64) -> (f64, f64) {
        let len = self.buffer.len();
        self.buffer[self.write_pos] = input;

        let lfo_l = (2.0 * PI * self.phase).sin();
        let lfo_r = (2.0 * PI * (self.phase + 0.25)).sin();
        let max = (len - 2) as f64;
        let delay_l = (BASE_DELAY * (1.0 + self.depth * lfo_l) * self.sample_rate).clamp(1.0, max);
        let delay_r = (BASE_DELAY * (1.0 + self.depth * lfo_r) * self.sample_rate).clamp(1.0, max);

        let wet_l = self.read_interpolated(delay_l);
        let wet_r = self.read_interpolated(delay_r);

        self.write_pos = (self.write_pos + 1) % len;
        self.phase = (self.phase + self.rate / self.sample_rate) % 1.0;

        (
            input * (1.0 - self.wet) + wet_l * self.wet,
            input * (1.0 - self.wet) + wet_r * self.wet,
        )
    }

    fn read_interpolated(&self, delay_samples: f64) -> f64 {
        let len = self.buffer.len();
        let whole = delay_samples as usize;
        let frac = delay_samples - whole as f64;
        let pos0 = (self.write_pos + len - whole) % len;
        let pos1 = (pos0 + len - 1) % len;
        self.buffer[pos0] + frac * (self.buffer[pos1] - self.buffer[pos0])
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.phase = 0.0;
    }
}
