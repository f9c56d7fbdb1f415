//! Send/return reverb for the sampler backend.
//!
//! Two parallel feedback delay lines with distinct times and feedback
//! coefficients, fed from a send gain and summed into a return gain. Not a
//! room model, just a pair of decaying echo trains under the dry signal.

/// A delay line that feeds a fraction of its own output back into its
/// input, producing a decaying echo every `delay` period.
#[derive(Debug, Clone)]
struct FeedbackDelay {
    buffer: Vec<f64>,
    index: usize,
    feedback: f64,
}

impl FeedbackDelay {
    fn new(delay_seconds: f64, feedback: f64, sample_rate: f64) -> Self {
        let len = ((delay_seconds * sample_rate) as usize).max(1);
        FeedbackDelay {
            buffer: vec![0.0; len],
            index: 0,
            feedback,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let output = self.buffer[self.index];
        self.buffer[self.index] = input + output * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

const BRANCH_1_DELAY: f64 = 0.025;
const BRANCH_1_FEEDBACK: f64 = 0.65;
const BRANCH_2_DELAY: f64 = 0.045;
const BRANCH_2_FEEDBACK: f64 = 0.55;

/// The sampler's reverb network. `send_level` scales what enters the
/// branches, `output_level` scales the summed return.
#[derive(Debug, Clone)]
pub struct SendReverb {
    branch1: FeedbackDelay,
    branch2: FeedbackDelay,
    pub send_level: f64,
    pub output_level: f64,
}

impl SendReverb {
    pub fn new(sample_rate: f64) -> Self {
        SendReverb {
            branch1: FeedbackDelay::new(BRANCH_1_DELAY, BRANCH_1_FEEDBACK, sample_rate),
            branch2: FeedbackDelay::new(BRANCH_2_DELAY, BRANCH_2_FEEDBACK, sample_rate),
            send_level: 0.4,
            output_level: 0.7,
        }
    }

    /// Returns the wet signal only; the caller mixes it with the dry path.
    pub fn process(&mut self, input: f64) -> f64 {
        let sent = input * self.send_level;
        (self.branch1.process(sent) + self.branch2.process(sent)) * self.output_level
    }

    pub fn clear(&mut self) {
        self.branch1.clear();
        self.branch2.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_first_echo() {
        let sample_rate = 1000.0;
        let mut reverb = SendReverb::new(sample_rate);
        reverb.send_level = 1.0;
        reverb.output_level = 1.0;

        reverb.process(1.0);
        // First branch echoes after 25 ms = 25 samples.
        for _ in 1..25 {
            let out = reverb.process(0.0);
            assert_eq!(out, 0.0, "no echo expected before the first delay time");
        }
        let first_echo = reverb.process(0.0);
        assert!((first_echo - 1.0).abs() < 1e-9);
    }

    #[test]
    fn both_branches_reach_the_output() {
        let sample_rate = 1000.0;
        let mut reverb = SendReverb::new(sample_rate);
        reverb.send_level = 1.0;
        reverb.output_level = 1.0;

        reverb.process(1.0);
        let mut echoes = Vec::new();
        for i in 1..50 {
            let out = reverb.process(0.0);
            if out.abs() > 1e-9 {
                echoes.push(i);
            }
        }
        assert!(echoes.contains(&25), "25 ms branch echo missing: {echoes:?}");
        assert!(echoes.contains(&45), "45 ms branch echo missing: {echoes:?}");
    }

    #[test]
    fn echoes_decay_by_feedback() {
        let sample_rate = 1000.0;
        let mut reverb = SendReverb::new(sample_rate);
        reverb.send_level = 1.0;
        reverb.output_level = 1.0;

        reverb.process(1.0);
        let mut outputs = vec![0.0];
        for _ in 1..100 {
            outputs.push(reverb.process(0.0));
        }
        // Second echo of the 25 ms branch lands at 50 samples, scaled by
        // its feedback coefficient.
        assert!((outputs[25] - 1.0).abs() < 1e-9);
        assert!((outputs[50] - 0.65).abs() < 1e-9);
        assert!((outputs[75] - 0.65 * 0.65).abs() < 1e-9);
    }

    #[test]
    fn send_level_zero_is_silent() {
        let mut reverb = SendReverb::new(44100.0);
        reverb.send_level = 0.0;
        reverb.process(1.0);
        for _ in 0..5000 {
            assert_eq!(reverb.process(0.0), 0.0);
        }
    }

    #[test]
    fn output_level_scales_return() {
        let sample_rate = 1000.0;
        let mut reverb = SendReverb::new(sample_rate);
        reverb.send_level = 1.0;
        reverb.output_level = 0.5;

        reverb.process(1.0);
        let mut first_echo = 0.0;
        for _ in 1..=25 {
            first_echo = reverb.process(0.0);
        }
        assert!((first_echo - 0.5).abs() < 1e-9);
    }
}
