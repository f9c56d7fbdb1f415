//! Per-note gain envelope.
//!
//! Models automation-style ADSR scheduling: the whole curve is fixed at
//! trigger time from the note's duration and the current envelope
//! parameters. Attack is an exponential ramp from a small non-zero floor to
//! the peak; decay and release are exponential approaches toward their
//! targets with time constants of a third of the configured times, so the
//! sustain level is approached asymptotically rather than reached exactly.

use crate::dsp::EnvelopeParams;

/// Gain floor used instead of zero so exponential segments never start from
/// a true zero.
pub const GAIN_FLOOR: f64 = 0.001;

/// The amplitude curve of a single note, evaluated sample by sample.
#[derive(Debug, Clone)]
pub struct NoteEnvelope {
    peak: f64,
    attack: f64,
    decay_tc: f64,
    sustain_gain: f64,
    release_tc: f64,
    /// Seconds from trigger at which the release approach begins.
    release_start: f64,
    /// Total note duration in seconds; the source stops here.
    duration: f64,
    sample_period: f64,
    t: f64,
}

impl NoteEnvelope {
    /// Plan the curve for one note. `duration_ms` is stretched so the note
    /// always has room for a full release tail.
    pub fn new(volume: f64, duration_ms: f64, params: &EnvelopeParams, sample_rate: f64) -> Self {
        let peak = volume.max(GAIN_FLOOR);
        let duration = (duration_ms / 1000.0).max(params.release);
        let attack = params.attack.max(1e-6);
        NoteEnvelope {
            peak,
            attack,
            decay_tc: params.decay / 3.0,
            sustain_gain: peak * params.sustain,
            release_tc: params.release / 3.0,
            // Never before the attack finishes, so a note whose duration
            // is swallowed by the release still plays its onset.
            release_start: (duration - params.release).max(attack),
            duration,
            sample_period: 1.0 / sample_rate,
            t: 0.0,
        }
    }

    /// Gain at `t` seconds after the trigger. Pure; `next_sample` steps
    /// through this curve at the sample rate.
    pub fn gain_at(&self, t: f64) -> f64 {
        if t >= self.duration {
            return 0.0;
        }
        if t >= self.release_start {
            let from = self.gain_before_release();
            return approach(from, GAIN_FLOOR, t - self.release_start, self.release_tc);
        }
        self.gain_before(t)
    }

    fn gain_before(&self, t: f64) -> f64 {
        if t < self.attack {
            // Exponential ramp floor -> peak over the attack time.
            GAIN_FLOOR * (self.peak / GAIN_FLOOR).powf(t / self.attack)
        } else {
            approach(self.peak, self.sustain_gain, t - self.attack, self.decay_tc)
        }
    }

    /// Where the curve sat when the release took over.
    fn gain_before_release(&self) -> f64 {
        self.gain_before(self.release_start)
    }

    pub fn next_sample(&mut self) -> f64 {
        let gain = self.gain_at(self.t);
        self.t += self.sample_period;
        gain
    }

    /// True once the source should have stopped.
    pub fn is_finished(&self) -> bool {
        self.t >= self.duration
    }

    /// Total planned duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// Exponential approach from `from` toward `target` with time constant
/// `tc`, evaluated `dt` seconds after the approach begins.
fn approach(from: f64, target: f64, dt: f64, tc: f64) -> f64 {
    if tc <= 0.0 {
        return target;
    }
    target + (from - target) * (-dt / tc).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EnvelopeParams {
        EnvelopeParams {
            attack: 0.01,
            decay: 0.15,
            sustain: 0.2,
            release: 0.3,
        }
    }

    #[test]
    fn starts_at_floor() {
        let env = NoteEnvelope::new(0.5, 495.0, &params(), 44100.0);
        assert!((env.gain_at(0.0) - GAIN_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn attack_peaks_at_volume() {
        let env = NoteEnvelope::new(0.5, 495.0, &params(), 44100.0);
        let at_peak = env.gain_at(0.01);
        assert!(
            (at_peak - 0.5).abs() < 0.01,
            "gain at end of attack should be ~0.5, got {at_peak}"
        );
    }

    #[test]
    fn decay_approaches_sustain() {
        let env = NoteEnvelope::new(0.5, 5000.0, &params(), 44100.0);
        // Several time constants into the decay the gain should be close
        // to volume * sustain = 0.1 but never below it.
        let late = env.gain_at(0.01 + 0.5);
        assert!(
            (late - 0.1).abs() < 0.001,
            "decay should approach 0.1, got {late}"
        );
        assert!(late >= 0.1, "decay must approach sustain from above");
    }

    #[test]
    fn end_approaches_floor() {
        let env = NoteEnvelope::new(0.5, 495.0, &params(), 44100.0);
        let at_end = env.gain_at(0.494);
        assert!(
            at_end < GAIN_FLOOR * 10.0,
            "gain near note end should approach the floor, got {at_end}"
        );
    }

    #[test]
    fn short_note_stretches_to_release() {
        let env = NoteEnvelope::new(0.5, 50.0, &params(), 44100.0);
        assert!((env.duration() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn short_note_release_waits_for_attack() {
        // 100 ms at a 300 ms release stretches the note to exactly the
        // release time; the attack must still reach the peak before the
        // release takes over.
        let env = NoteEnvelope::new(0.5, 100.0, &params(), 44100.0);
        let at_peak = env.gain_at(0.01);
        assert!(
            (at_peak - 0.5).abs() < 0.01,
            "short note should still peak, got {at_peak}"
        );
        let later = env.gain_at(0.2);
        assert!(
            later < at_peak && later > GAIN_FLOOR,
            "release should decay from the peak, got {later}"
        );
    }

    #[test]
    fn finishes_after_duration() {
        let mut env = NoteEnvelope::new(0.5, 50.0, &params(), 1000.0);
        // duration stretched to release = 0.3 s = 300 samples at 1 kHz
        for _ in 0..299 {
            env.next_sample();
        }
        assert!(!env.is_finished());
        env.next_sample();
        env.next_sample();
        assert!(env.is_finished());
    }

    #[test]
    fn gain_is_zero_after_stop() {
        let env = NoteEnvelope::new(0.5, 495.0, &params(), 44100.0);
        assert_eq!(env.gain_at(0.5), 0.0);
    }

    #[test]
    fn monotonic_within_attack() {
        let env = NoteEnvelope::new(0.8, 495.0, &params(), 44100.0);
        let mut prev = 0.0;
        for i in 0..100 {
            let g = env.gain_at(0.01 * i as f64 / 100.0);
            assert!(g >= prev, "attack ramp must be non-decreasing");
            prev = g;
        }
    }
}
