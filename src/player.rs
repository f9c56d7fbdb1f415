//! Playback state machine and scheduler.
//!
//! The player walks a parsed sequence chord by chord on a cooperative,
//! timer-driven timeline: every wait is a task in a priority queue ordered
//! by due time, and the host pumps [`Player::tick`] from its own coarse
//! timer. Each queued task carries the playback epoch current when it was
//! scheduled; `pause` and `stop` bump the epoch, so every pending task,
//! including per-string note triggers already fanned out for the current
//! stroke, is invalidated at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::chord::{ChordEvent, ChordQuality, RootNote, Stroke};
use crate::clock::Clock;
use crate::dsp::{EnvelopeParams, Instrument, NoteTrigger, ReverbParams};
use crate::parser;
use crate::voicing::{midi_note, FretShape, VoicingResolver, STRING_COUNT};

/// Strings below this index (low E, A, D) get the bass dampening factor.
const BASS_SPLIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// How strokes spread their per-string onsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayStyle {
    /// Tight spacing, all strings nearly together.
    Strum,
    /// Wide spacing, strings clearly separated.
    Arpeggio,
}

/// Tunable playback parameters, read at scheduling time rather than
/// snapshotted, so edits take effect from the next scheduled event on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackParams {
    /// Master speed control. The multiplier `0.5 + speed/100` divides all
    /// stroke timing; the chord pulse is `1000 / (speed/50)` ms.
    pub chord_play_speed: f64,
    /// Upstrokes compress their per-string spacing by this factor.
    pub upstroke_speed_factor: f64,
    /// Volume multiplier for the three bass strings.
    pub bass_dampening: f64,
    /// Per-note volume before dampening, 0..1.
    pub volume: f64,
    pub note_duration_ms: f64,
    pub arpeggio_base_ms: f64,
    pub strum_base_ms: f64,
    pub play_style: PlayStyle,
    pub envelope: EnvelopeParams,
    pub reverb: ReverbParams,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        PlaybackParams {
            chord_play_speed: 11.0,
            upstroke_speed_factor: 2.0,
            bass_dampening: 0.7,
            volume: 0.5,
            note_duration_ms: 495.0,
            arpeggio_base_ms: 350.0,
            strum_base_ms: 50.0,
            play_style: PlayStyle::Arpeggio,
            envelope: EnvelopeParams::default(),
            reverb: ReverbParams::default(),
        }
    }
}

impl PlaybackParams {
    fn speed_multiplier(&self) -> f64 {
        0.5 + self.chord_play_speed / 100.0
    }

    fn base_duration_ms(&self) -> f64 {
        match self.play_style {
            PlayStyle::Strum => self.strum_base_ms,
            PlayStyle::Arpeggio => self.arpeggio_base_ms,
        }
    }

    /// The steady musical pulse between chord starts.
    fn strum_interval_ms(&self) -> f64 {
        1000.0 / (self.chord_play_speed / 50.0)
    }

    fn stroke_duration_ms(&self) -> f64 {
        self.base_duration_ms() / self.speed_multiplier() + self.note_duration_ms
    }
}

/// Side-channel feedback for a UI. Fire-and-forget; a slow or absent
/// listener has no effect on timing.
pub trait PlaybackListener {
    fn on_note_triggered(&mut self, _note: &NoteTrigger) {}
    fn on_chord_changed(&mut self, _index: usize, _chord: &ChordEvent) {}
    fn on_state_changed(&mut self, _state: PlaybackState) {}
}

#[derive(Debug)]
enum Task {
    /// Begin the chord at this index into the active run.
    Chord { index: usize },
    /// Dispatch stroke `stroke` of the chord at `index`. `elapsed_ms`
    /// accumulates stroke durations for the next-chord gap.
    Stroke {
        index: usize,
        stroke: usize,
        elapsed_ms: f64,
    },
    /// Fire one note into the instrument.
    Note(NoteTrigger),
}

struct Scheduled {
    due_ms: f64,
    epoch: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest due time; ties break by
    // insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// The playback engine. Owns all mutable playback state; drive it from a
/// single thread.
pub struct Player<C: Clock> {
    source: String,
    pub params: PlaybackParams,

    state: PlaybackState,
    current_index: usize,
    loop_enabled: bool,
    /// Suffix of the sequence not yet dispatched, captured at each chord
    /// boundary so a resume continues from the next chord.
    remaining: Vec<ChordEvent>,
    /// Absolute index of `remaining[0]` in the full sequence.
    remaining_base: usize,

    /// Chords of the run in progress, with `base_index` mapping its local
    /// indices back onto the full sequence.
    run: Vec<ChordEvent>,
    base_index: usize,
    current_shape: FretShape,

    epoch: u64,
    seq_counter: u64,
    queue: BinaryHeap<Scheduled>,

    clock: C,
    resolver: Box<dyn VoicingResolver>,
    instrument: Box<dyn Instrument>,
    listener: Option<Box<dyn PlaybackListener>>,
}

impl<C: Clock> Player<C> {
    pub fn new(clock: C, resolver: Box<dyn VoicingResolver>, instrument: Box<dyn Instrument>) -> Self {
        Player {
            source: String::new(),
            params: PlaybackParams::default(),
            state: PlaybackState::Stopped,
            current_index: 0,
            loop_enabled: false,
            remaining: Vec::new(),
            remaining_base: 0,
            run: Vec::new(),
            base_index: 0,
            current_shape: [-1; STRING_COUNT],
            epoch: 0,
            seq_counter: 0,
            queue: BinaryHeap::new(),
            clock,
            resolver,
            instrument,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn PlaybackListener>) {
        self.listener = Some(listener);
    }

    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_chord_index(&self) -> usize {
        self.current_index
    }

    pub fn is_looping(&self) -> bool {
        self.loop_enabled
    }

    pub fn instrument_mut(&mut self) -> &mut dyn Instrument {
        &mut *self.instrument
    }

    /// Start or resume playback. Refuses invalid text with a warning; an
    /// empty sequence is a no-op.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        if !parser::is_valid_sequence(&self.source) {
            warn!("refusing to play: sequence text is not valid");
            self.cancel_pending();
            self.transition(PlaybackState::Stopped);
            return;
        }

        let resuming = self.state == PlaybackState::Paused && !self.remaining.is_empty();
        let (run, start, base) = if resuming {
            (std::mem::take(&mut self.remaining), 0, self.remaining_base)
        } else {
            self.remaining.clear();
            (parser::parse(&self.source).events, self.current_index, 0)
        };
        if run.is_empty() {
            return;
        }

        self.run = run;
        self.base_index = base;
        self.cancel_pending();
        self.transition(PlaybackState::Playing);
        let now = self.clock.now_ms();
        self.schedule(now, Task::Chord { index: start });
        self.tick();
    }

    /// Suspend playback, keeping the position. Every scheduled task is
    /// invalidated, note triggers included.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.cancel_pending();
        self.transition(PlaybackState::Paused);
    }

    /// Halt playback, reset to the start, and snap the displayed chord to
    /// the first chord of the current text.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.transition(PlaybackState::Stopped);
        self.current_index = 0;
        self.base_index = 0;
        self.remaining.clear();
        self.remaining_base = 0;
        if let Some(first) = parser::parse(&self.source).events.first() {
            let first = first.clone();
            self.notify_chord(0, &first);
        }
    }

    /// Move to the next chord without audio. Ignored while playing;
    /// clamped at the end of the sequence.
    pub fn step_forward(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        let events = parser::parse(&self.source).events;
        if self.current_index + 1 < events.len() {
            self.current_index += 1;
            let chord = events[self.current_index].clone();
            self.notify_chord(self.current_index, &chord);
        }
    }

    pub fn step_backward(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        let events = parser::parse(&self.source).events;
        if self.current_index > 0 && !events.is_empty() {
            self.current_index = (self.current_index - 1).min(events.len() - 1);
            let chord = events[self.current_index].clone();
            self.notify_chord(self.current_index, &chord);
        }
    }

    pub fn skip_to_start(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        let events = parser::parse(&self.source).events;
        if let Some(first) = events.first() {
            self.current_index = 0;
            let chord = first.clone();
            self.notify_chord(0, &chord);
        }
    }

    pub fn skip_to_end(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        let events = parser::parse(&self.source).events;
        if let Some(last) = events.last() {
            self.current_index = events.len() - 1;
            let chord = last.clone();
            self.notify_chord(self.current_index, &chord);
        }
    }

    /// Flip looping. When playing, the sequence restarts from the top in
    /// either direction so the new loop framing applies cleanly.
    pub fn toggle_loop(&mut self) {
        self.loop_enabled = !self.loop_enabled;
        if self.state == PlaybackState::Playing {
            self.stop();
            self.play();
        }
    }

    /// One-shot playback of a single chord outside the sequence machinery.
    /// Returns the estimated total duration in ms so a host can re-enable
    /// its control afterwards. Ignored while the sequence is playing.
    pub fn play_chord_once(
        &mut self,
        root: RootNote,
        quality: ChordQuality,
        pattern: &[Stroke],
    ) -> f64 {
        if self.state == PlaybackState::Playing {
            return 0.0;
        }
        let shape = self.resolver.resolve(root, quality);
        let now = self.clock.now_ms();
        let stroke_gap = self.params.base_duration_ms() / self.params.speed_multiplier();
        let mut offset = 0.0;
        for &stroke in pattern {
            self.schedule_stroke_notes(now + offset, &shape, stroke);
            offset += stroke_gap;
        }
        self.tick();
        offset + self.params.note_duration_ms
    }

    /// Run every task that has come due. Returns the milliseconds until
    /// the next pending task, if any, so the host can set its timer.
    pub fn tick(&mut self) -> Option<f64> {
        let now = self.clock.now_ms();
        loop {
            match self.queue.peek() {
                Some(head) if head.due_ms <= now => {}
                _ => break,
            }
            let Some(sched) = self.queue.pop() else { break };
            if sched.epoch != self.epoch {
                continue;
            }
            // Follow-ups are scheduled from the task's own due time, so a
            // coarse host timer cannot drift the musical pulse.
            self.run_task(sched.task, sched.due_ms);
        }
        self.queue.peek().map(|s| (s.due_ms - now).max(0.0))
    }

    fn run_task(&mut self, task: Task, at_ms: f64) {
        match task {
            Task::Chord { index } => self.run_chord(index, at_ms),
            Task::Stroke {
                index,
                stroke,
                elapsed_ms,
            } => self.run_stroke(index, stroke, elapsed_ms, at_ms),
            Task::Note(note) => {
                self.instrument
                    .trigger(&note, &self.params.envelope, &self.params.reverb);
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_note_triggered(&note);
                }
            }
        }
    }

    fn run_chord(&mut self, index: usize, at_ms: f64) {
        if index >= self.run.len() {
            if self.loop_enabled {
                self.remaining = self.run.clone();
                self.remaining_base = 0;
                self.base_index = 0;
                self.schedule(at_ms, Task::Chord { index: 0 });
            } else {
                self.transition(PlaybackState::Stopped);
                self.current_index = 0;
                self.base_index = 0;
                self.remaining.clear();
                if let Some(first) = self.run.first() {
                    let first = first.clone();
                    self.notify_chord(0, &first);
                }
            }
            return;
        }

        let chord = self.run[index].clone();
        self.current_index = self.base_index + index;
        // One voicing lookup per chord; strokes reuse the shape.
        self.current_shape = self.resolver.resolve(chord.root, chord.quality);
        self.notify_chord(self.current_index, &chord);
        self.schedule(
            at_ms,
            Task::Stroke {
                index,
                stroke: 0,
                elapsed_ms: 0.0,
            },
        );
    }

    fn run_stroke(&mut self, index: usize, stroke: usize, elapsed_ms: f64, at_ms: f64) {
        let Some(chord) = self.run.get(index) else {
            return;
        };
        if stroke >= chord.pattern.len() {
            // Chord complete: capture the resume suffix and schedule the
            // next chord on the remainder of the pulse. A pause can land
            // while the next chord's strokes are already underway, so the
            // suffix remembers where it sits in the full sequence.
            self.remaining = self.run.get(index + 1..).map(<[_]>::to_vec).unwrap_or_default();
            self.remaining_base = self.base_index + index + 1;
            let gap = (self.params.strum_interval_ms() - elapsed_ms).max(0.0);
            self.schedule(at_ms + gap, Task::Chord { index: index + 1 });
            return;
        }

        let direction = chord.pattern[stroke];
        let shape = self.current_shape;
        self.schedule_stroke_notes(at_ms, &shape, direction);

        let stroke_duration = self.params.stroke_duration_ms();
        self.schedule(
            at_ms + stroke_duration,
            Task::Stroke {
                index,
                stroke: stroke + 1,
                elapsed_ms: elapsed_ms + stroke_duration,
            },
        );
    }

    /// Fan one stroke out into per-string note tasks: low to high strings
    /// for a downstroke, high to low for an upstroke, with monotonically
    /// increasing delays.
    fn schedule_stroke_notes(&mut self, at_ms: f64, shape: &FretShape, stroke: Stroke) {
        let spacing = (self.params.base_duration_ms() / STRING_COUNT as f64)
            / self.params.speed_multiplier();
        let order: Vec<usize> = if stroke.is_upstroke() {
            (0..STRING_COUNT).rev().collect()
        } else {
            (0..STRING_COUNT).collect()
        };

        for (position, string_index) in order.into_iter().enumerate() {
            let fret = shape[string_index];
            let Some(midi) = midi_note(string_index, fret) else {
                continue;
            };
            let mut delay = position as f64 * spacing;
            if stroke.is_upstroke() {
                delay /= self.params.upstroke_speed_factor;
            }
            let dampening = if string_index < BASS_SPLIT {
                self.params.bass_dampening
            } else {
                1.0
            };
            self.schedule(
                at_ms + delay,
                Task::Note(NoteTrigger {
                    midi_note: midi,
                    string_index,
                    fret_position: fret,
                    is_upstroke: stroke.is_upstroke(),
                    volume: dampening * self.params.volume,
                    duration_ms: self.params.note_duration_ms,
                }),
            );
        }
    }

    fn schedule(&mut self, due_ms: f64, task: Task) {
        self.seq_counter += 1;
        self.queue.push(Scheduled {
            due_ms,
            epoch: self.epoch,
            seq: self.seq_counter,
            task,
        });
    }

    fn cancel_pending(&mut self) {
        self.epoch += 1;
        self.queue.clear();
    }

    fn transition(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            if let Some(listener) = self.listener.as_mut() {
                listener.on_state_changed(state);
            }
        }
    }

    fn notify_chord(&mut self, index: usize, chord: &ChordEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_chord_changed(index, chord);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::clock::ManualClock;
    use crate::voicing::OpenChordTable;

    struct MuteInstrument;

    impl Instrument for MuteInstrument {
        fn trigger(&mut self, _: &NoteTrigger, _: &EnvelopeParams, _: &ReverbParams) {}
        fn process_block(&mut self, _: &mut [f64], _: &mut [f64]) {}
    }

    #[derive(Default, Clone)]
    struct Recorded {
        notes: Rc<RefCell<Vec<NoteTrigger>>>,
        chords: Rc<RefCell<Vec<usize>>>,
        states: Rc<RefCell<Vec<PlaybackState>>>,
    }

    struct Recorder(Recorded);

    impl PlaybackListener for Recorder {
        fn on_note_triggered(&mut self, note: &NoteTrigger) {
            self.0.notes.borrow_mut().push(note.clone());
        }

        fn on_chord_changed(&mut self, index: usize, _chord: &ChordEvent) {
            self.0.chords.borrow_mut().push(index);
        }

        fn on_state_changed(&mut self, state: PlaybackState) {
            self.0.states.borrow_mut().push(state);
        }
    }

    fn player_for(text: &str) -> (Player<ManualClock>, ManualClock, Recorded) {
        let clock = ManualClock::new();
        let recorded = Recorded::default();
        let mut player = Player::new(
            clock.clone(),
            Box::new(OpenChordTable),
            Box::new(MuteInstrument),
        );
        player.set_listener(Box::new(Recorder(recorded.clone())));
        player.set_source(text);
        (player, clock, recorded)
    }

    fn advance(player: &mut Player<ManualClock>, clock: &ManualClock, ms: f64) {
        clock.advance(ms);
        player.tick();
    }

    #[test]
    fn starts_stopped() {
        let (player, _, _) = player_for("C(D)");
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.current_chord_index(), 0);
    }

    #[test]
    fn play_transitions_to_playing() {
        let (mut player, _, _) = player_for("C(D)");
        player.play();
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn invalid_sequence_refuses_to_play() {
        let (mut player, _, recorded) = player_for("hello world");
        player.play();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(recorded.notes.borrow().is_empty());
    }

    #[test]
    fn empty_sequence_is_a_no_op() {
        let (mut player, _, _) = player_for("");
        player.play();
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn triggers_n_strokes_times_m_strings() {
        // E major sounds all 6 strings; two strokes means 12 triggers.
        let (mut player, clock, recorded) = player_for("E(D U)");
        player.play();
        advance(&mut player, &clock, 10_000.0);
        assert_eq!(recorded.notes.borrow().len(), 12);
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn muted_strings_produce_no_triggers() {
        // D major is x-x-0-2-3-2: four sounding strings.
        let (mut player, clock, recorded) = player_for("D(D)");
        player.play();
        advance(&mut player, &clock, 10_000.0);
        assert_eq!(recorded.notes.borrow().len(), 4);
    }

    #[test]
    fn downstroke_is_low_to_high_upstroke_reversed() {
        let (mut player, clock, recorded) = player_for("E(D U)");
        player.play();
        advance(&mut player, &clock, 10_000.0);

        let notes = recorded.notes.borrow();
        let down: Vec<usize> = notes[..6].iter().map(|n| n.string_index).collect();
        let up: Vec<usize> = notes[6..].iter().map(|n| n.string_index).collect();
        assert_eq!(down, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(up, vec![5, 4, 3, 2, 1, 0]);
        assert!(notes[..6].iter().all(|n| !n.is_upstroke));
        assert!(notes[6..].iter().all(|n| n.is_upstroke));
    }

    #[test]
    fn bass_strings_are_dampened() {
        let (mut player, clock, recorded) = player_for("E(D)");
        player.play();
        advance(&mut player, &clock, 10_000.0);

        for note in recorded.notes.borrow().iter() {
            let expected = if note.string_index < 3 { 0.7 * 0.5 } else { 0.5 };
            assert!(
                (note.volume - expected).abs() < 1e-12,
                "string {} volume {} != {expected}",
                note.string_index,
                note.volume
            );
        }
    }

    #[test]
    fn pause_cancels_already_scheduled_note_triggers() {
        let (mut player, clock, recorded) = player_for("E(D)");
        player.play();
        // Only the first string's note is due at t0; the other five are
        // pending when the pause lands.
        let fired_before_pause = recorded.notes.borrow().len();
        player.pause();
        advance(&mut player, &clock, 10_000.0);
        assert_eq!(
            recorded.notes.borrow().len(),
            fired_before_pause,
            "no note may fire after pause"
        );
    }

    #[test]
    fn pause_then_play_resumes_at_next_chord() {
        let (mut player, clock, recorded) = player_for("C(D U), G(D U), Am(D U)");
        player.play();
        // Past chord 0's strokes (2 * ~1068.8 ms) but before chord 1.
        advance(&mut player, &clock, 3000.0);
        player.pause();
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.current_chord_index(), 0);

        recorded.notes.borrow_mut().clear();
        player.play();
        advance(&mut player, &clock, 100.0);
        assert_eq!(player.current_chord_index(), 1, "resume must continue at G");

        // G major is 3-2-0-0-0-3; its first downstroke note is MIDI 43.
        let first = recorded.notes.borrow()[0].clone();
        assert_eq!(first.midi_note, 43);
    }

    #[test]
    fn pause_mid_chord_resumes_with_its_own_index() {
        let (mut player, clock, recorded) = player_for("C(D U), G(D U), Am(D U)");
        player.play();
        // Chord 1 starts at ~4545 ms; t=5000 is midway through its strokes,
        // so the captured suffix still begins with the in-progress G.
        advance(&mut player, &clock, 5000.0);
        assert_eq!(player.current_chord_index(), 1);
        player.pause();

        recorded.notes.borrow_mut().clear();
        recorded.chords.borrow_mut().clear();
        player.play();
        advance(&mut player, &clock, 100.0);
        assert_eq!(
            player.current_chord_index(),
            1,
            "the replayed chord keeps its position in the full sequence"
        );
        assert_eq!(recorded.notes.borrow()[0].midi_note, 43);

        advance(&mut player, &clock, 60_000.0);
        let chords = recorded.chords.borrow();
        assert!(chords.contains(&2), "Am should report index 2: {chords:?}");
        assert!(chords.iter().all(|&i| i < 3), "index overran the sequence: {chords:?}");
    }

    #[test]
    fn play_chord_once_is_ignored_while_playing() {
        let (mut player, clock, recorded) = player_for("C(D)");
        player.play();
        let total =
            player.play_chord_once(RootNote::E, ChordQuality::Major, &[Stroke::Down]);
        assert_eq!(total, 0.0);
        advance(&mut player, &clock, 60_000.0);
        assert_eq!(
            recorded.notes.borrow().len(),
            6,
            "only the sequence's own chord may sound"
        );
    }

    #[test]
    fn stop_resets_index_and_displays_first_chord() {
        let (mut player, clock, recorded) = player_for("C(D), G(D), Am(D)");
        player.play();
        advance(&mut player, &clock, 6000.0);
        assert!(player.current_chord_index() > 0);

        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.current_chord_index(), 0);
        assert_eq!(recorded.chords.borrow().last(), Some(&0));
    }

    #[test]
    fn sequence_end_without_loop_stops_and_shows_first_chord() {
        let (mut player, clock, recorded) = player_for("C(D), G(D)");
        player.play();
        advance(&mut player, &clock, 60_000.0);
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.current_chord_index(), 0);
        assert_eq!(recorded.chords.borrow().last(), Some(&0));
    }

    #[test]
    fn loop_repeats_from_the_top() {
        let (mut player, clock, recorded) = player_for("C(D), G(D)");
        player.toggle_loop();
        assert!(player.is_looping());
        player.play();
        advance(&mut player, &clock, 60_000.0);
        assert_eq!(player.state(), PlaybackState::Playing, "looping never stops by itself");

        let chords = recorded.chords.borrow();
        assert!(chords.len() > 4, "expected repeats, saw {chords:?}");
        assert!(chords.windows(2).any(|w| w == [1, 0]), "no wrap-around in {chords:?}");
    }

    #[test]
    fn toggle_loop_while_playing_restarts_from_start() {
        let (mut player, clock, recorded) = player_for("C(D), G(D), Am(D)");
        player.play();
        advance(&mut player, &clock, 6000.0);
        assert!(player.current_chord_index() > 0);

        player.toggle_loop();
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(player.current_chord_index(), 0);
        assert_eq!(recorded.chords.borrow().last(), Some(&0));
    }

    #[test]
    fn step_operations_clamp_and_ignore_while_playing() {
        let (mut player, _, _) = player_for("C(D), G(D)");
        player.step_forward();
        assert_eq!(player.current_chord_index(), 1);
        player.step_forward();
        assert_eq!(player.current_chord_index(), 1, "clamped at the last chord");
        player.step_backward();
        assert_eq!(player.current_chord_index(), 0);
        player.step_backward();
        assert_eq!(player.current_chord_index(), 0, "clamped at the first chord");

        player.skip_to_end();
        assert_eq!(player.current_chord_index(), 1);
        player.skip_to_start();
        assert_eq!(player.current_chord_index(), 0);

        player.play();
        player.step_forward();
        assert_eq!(player.current_chord_index(), 0, "stepping is ignored while playing");
    }

    #[test]
    fn play_starts_from_stepped_index() {
        let (mut player, clock, recorded) = player_for("C(D), G(D)");
        player.step_forward();
        player.play();
        advance(&mut player, &clock, 100.0);
        // G major's lowest sounding string is MIDI 43.
        assert_eq!(recorded.notes.borrow()[0].midi_note, 43);
    }

    #[test]
    fn note_triggers_carry_resolved_midi_notes() {
        let (mut player, clock, recorded) = player_for("E(D)");
        player.play();
        advance(&mut player, &clock, 10_000.0);
        let midis: Vec<u8> = recorded.notes.borrow().iter().map(|n| n.midi_note).collect();
        assert_eq!(midis, vec![40, 47, 52, 56, 59, 64]);
    }

    #[test]
    fn chord_pulse_is_steady() {
        // Chord starts should land one strum interval apart regardless of
        // stroke content: 1000 / (11/50) = ~4545.45 ms.
        let (mut player, clock, recorded) = player_for("C(D), G(D D D)");
        player.play();
        assert_eq!(recorded.chords.borrow().as_slice(), &[0]);
        advance(&mut player, &clock, 4500.0);
        assert_eq!(recorded.chords.borrow().as_slice(), &[0]);
        advance(&mut player, &clock, 100.0);
        assert_eq!(recorded.chords.borrow().as_slice(), &[0, 1]);
    }

    #[test]
    fn play_chord_once_reports_duration_and_fires_notes() {
        let (mut player, clock, recorded) = player_for("");
        let total = player.play_chord_once(
            RootNote::E,
            ChordQuality::Major,
            &[Stroke::Down, Stroke::Up],
        );
        // Two strokes at 350/0.61 ms apart plus the note duration.
        let expected = 2.0 * (350.0 / 0.61) + 495.0;
        assert!((total - expected).abs() < 1e-6, "duration {total} != {expected}");
        assert_eq!(player.state(), PlaybackState::Stopped, "one-shot leaves state alone");

        advance(&mut player, &clock, 5000.0);
        assert_eq!(recorded.notes.borrow().len(), 12);
    }

    #[test]
    fn state_change_notifications_fire() {
        let (mut player, clock, recorded) = player_for("C(D)");
        player.play();
        player.pause();
        player.play();
        advance(&mut player, &clock, 60_000.0);
        let states = recorded.states.borrow();
        assert_eq!(
            states.as_slice(),
            &[
                PlaybackState::Playing,
                PlaybackState::Paused,
                PlaybackState::Playing,
                PlaybackState::Stopped,
            ]
        );
    }

    #[test]
    fn tick_reports_time_to_next_task() {
        let (mut player, _, _) = player_for("E(D)");
        player.play();
        let next = player.tick();
        assert!(next.is_some(), "tasks should be pending right after play");
        let Some(ms) = next else { return };
        assert!(ms > 0.0);
    }
}
