//! Schroeder/Freeverb-style reverb used at the tail of the synth chain:
//! eight parallel damped comb filters per channel feeding four series
//! allpass diffusers, with a wet/dry mix.

/// Comb delay line with a one-pole lowpass in its feedback path.
#[derive(Debug, Clone)]
struct DampedComb {
    buffer: Vec<f64>,
    index: usize,
    feedback: f64,
    damp: f64,
    filter_state: f64,
}

impl DampedComb {
    fn new(len: usize) -> Self {
        DampedComb {
            buffer: vec![0.0; len.max(1)],
            index: 0,
            feedback: 0.84,
            damp: 0.2,
            filter_state: 0.0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let output = self.buffer[self.index];
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.index] = input + self.filter_state * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    buffer: Vec<f64>,
    index: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Allpass {
            buffer: vec![0.0; len.max(1)],
            index: 0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let delayed = self.buffer[self.index];
        self.buffer[self.index] = input + delayed * 0.5;
        self.index = (self.index + 1) % self.buffer.len();
        delayed - input
    }
}

// Freeverb tuning, in samples at 44.1 kHz. The right channel reads
// slightly longer lines to decorrelate the stereo image.
const COMB_TUNING: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNING: [usize; 4] = [556, 441, 341, 225];
const STEREO_SPREAD: usize = 23;
const INPUT_GAIN: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Reverb {
    combs_l: Vec<DampedComb>,
    combs_r: Vec<DampedComb>,
    allpasses_l: Vec<Allpass>,
    allpasses_r: Vec<Allpass>,
    /// Wet/dry mix, 0 = bypass.
    pub wet: f64,
}

impl Reverb {
    pub fn new(sample_rate: f64) -> Self {
        let scale = sample_rate / 44100.0;
        let scaled = |len: usize, spread: usize| (len as f64 * scale) as usize + spread;

        Reverb {
            combs_l: COMB_TUNING.iter().map(|&t| DampedComb::new(scaled(t, 0))).collect(),
            combs_r: COMB_TUNING
                .iter()
                .map(|&t| DampedComb::new(scaled(t, STEREO_SPREAD)))
                .collect(),
            allpasses_l: ALLPASS_TUNING.iter().map(|&t| Allpass::new(scaled(t, 0))).collect(),
            allpasses_r: ALLPASS_TUNING
                .iter()
                .map(|&t| Allpass::new(scaled(t, STEREO_SPREAD)))
                .collect(),
            wet: 0.0,
        }
    }

    pub fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        let input = (left + right) * INPUT_GAIN;

        let mut wet_l = 0.0;
        let mut wet_r = 0.0;
        for comb in &mut self.combs_l {
            wet_l += comb.process(input);
        }
        for comb in &mut self.combs_r {
            wet_r += comb.process(input);
        }
        for allpass in &mut self.allpasses_l {
            wet_l = allpass.process(wet_l);
        }
        for allpass in &mut self.allpasses_r {
            wet_r = allpass.process(wet_r);
        }

        (
            left * (1.0 - self.wet) + wet_l * self.wet,
            right * (1.0 - self.wet) + wet_r * self.wet,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_when_wet_is_zero() {
        let mut reverb = Reverb::new(44100.0);
        let (l, r) = reverb.process(0.5, -0.5);
        assert!((l - 0.5).abs() < 1e-9);
        assert!((r + 0.5).abs() < 1e-9);
    }

    #[test]
    fn impulse_leaves_a_tail() {
        let mut reverb = Reverb::new(44100.0);
        reverb.wet = 1.0;
        reverb.process(1.0, 1.0);
        let mut heard_tail = false;
        for _ in 0..5000 {
            let (l, r) = reverb.process(0.0, 0.0);
            if l.abs() > 0.001 || r.abs() > 0.001 {
                heard_tail = true;
                break;
            }
        }
        assert!(heard_tail, "impulse should produce a reverb tail");
    }

    #[test]
    fn tail_decays() {
        let mut reverb = Reverb::new(44100.0);
        reverb.wet = 1.0;
        reverb.process(1.0, 1.0);

        let mut early_max = 0.0_f64;
        for _ in 0..4410 {
            let (l, r) = reverb.process(0.0, 0.0);
            early_max = early_max.max(l.abs()).max(r.abs());
        }
        // Skip several seconds ahead; the tail must sit well below its start.
        for _ in 0..176400 {
            reverb.process(0.0, 0.0);
        }
        let mut late_max = 0.0_f64;
        for _ in 0..4410 {
            let (l, r) = reverb.process(0.0, 0.0);
            late_max = late_max.max(l.abs()).max(r.abs());
        }
        assert!(early_max > 0.0);
        assert!(late_max < early_max, "tail should decay, {late_max} vs {early_max}");
    }

    #[test]
    fn channels_decorrelate() {
        let mut reverb = Reverb::new(44100.0);
        reverb.wet = 1.0;
        reverb.process(1.0, 1.0);
        let mut differ = false;
        for _ in 0..5000 {
            let (l, r) = reverb.process(0.0, 0.0);
            if (l - r).abs() > 1e-6 {
                differ = true;
                break;
            }
        }
        assert!(differ, "stereo spread should decorrelate the channels");
    }
}
