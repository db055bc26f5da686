//! Playback scheduling: turns the display view into timed tone events.
//!
//! Each voice runs its own beat clock from zero. Every note, sounding or
//! not, advances the clock by its own duration; only sounding notes emit
//! events, and an extension run is folded into the note that starts it.

use serde::Serialize;

use crate::duration::{extension_count, total_duration};
use crate::model::Note;
use crate::pitch::{key_shift, midi_pitch, midi_to_frequency, Instrument};
use crate::transpose::DisplayScore;

/// Fraction of the written length a staccato note actually sounds.
pub const STACCATO_FACTOR: f64 = 0.5;

/// One tone to be started at a fixed offset from the beginning of playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneEvent {
    pub track_index: usize,
    /// Index of the note that produced this event (the host note for grace tones)
    pub note_index: usize,
    pub start_beat: f64,
    pub start_secs: f64,
    pub midi_pitch: i32,
    pub frequency: f64,
    /// Audible length after tie resolution and staccato
    pub duration_beats: f64,
    pub duration_secs: f64,
    pub is_grace: bool,
}

/// Events of one voice, in start order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSchedule {
    pub track_index: usize,
    pub name: String,
    pub instrument: Instrument,
    pub events: Vec<ToneEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub tempo_bpm: u32,
    pub tracks: Vec<TrackSchedule>,
}

impl Schedule {
    /// All events of all voices, ordered by start time (voice order breaks ties).
    pub fn events(&self) -> Vec<&ToneEvent> {
        let mut all: Vec<&ToneEvent> = self.tracks.iter().flat_map(|t| &t.events).collect();
        all.sort_by(|a, b| {
            a.start_secs
                .total_cmp(&b.start_secs)
                .then(a.track_index.cmp(&b.track_index))
        });
        all
    }

    /// End of the last sounding event, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| &t.events)
            .map(|e| e.start_secs + e.duration_secs)
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(|t| t.events.is_empty())
    }
}

/// Length of one beat at `tempo_bpm`. A tempo of zero is treated as 1 BPM.
pub fn seconds_per_beat(tempo_bpm: u32) -> f64 {
    60.0 / tempo_bpm.max(1) as f64
}

/// Build the playback schedule for every voice of the view.
pub fn schedule(view: &DisplayScore) -> Schedule {
    let shift = key_shift(&view.meta);
    let spb = seconds_per_beat(view.meta.tempo_bpm);

    let tracks: Vec<TrackSchedule> = view
        .tracks
        .iter()
        .enumerate()
        .map(|(track_index, track)| TrackSchedule {
            track_index,
            name: track.name.clone(),
            instrument: track.instrument,
            events: track_events(track_index, &track.notes, track.instrument, shift, spb),
        })
        .collect();

    log::debug!(
        "schedule: {} tracks, {} events at {} bpm (key shift {})",
        tracks.len(),
        tracks.iter().map(|t| t.events.len()).sum::<usize>(),
        view.meta.tempo_bpm,
        shift
    );

    Schedule {
        tempo_bpm: view.meta.tempo_bpm,
        tracks,
    }
}

fn track_events(
    track_index: usize,
    notes: &[Note],
    instrument: Instrument,
    shift: i32,
    spb: f64,
) -> Vec<ToneEvent> {
    let mut events = Vec::new();
    let mut clock = 0.0;

    for (note_index, note) in notes.iter().enumerate() {
        if let Some(degree) = note.degree() {
            let factor = if note.staccato { STACCATO_FACTOR } else { 1.0 };
            let audible = total_duration(notes, note_index) * factor;
            let held = extension_count(notes, note_index);
            if held > 0 {
                log::trace!(
                    "[SCHEDULE] track {} note {} held over {} extensions",
                    track_index,
                    note_index,
                    held
                );
            }

            let event = |pitch: i32, is_grace: bool| ToneEvent {
                track_index,
                note_index,
                start_beat: clock,
                start_secs: clock * spb,
                midi_pitch: pitch,
                frequency: midi_to_frequency(pitch),
                duration_beats: audible,
                duration_secs: audible * spb,
                is_grace,
            };

            let pitch = midi_pitch(degree, note.octave, instrument, shift, note.accidental);
            events.push(event(pitch, false));

            if let Some(grace) = note.grace_note {
                let grace_pitch = midi_pitch(grace, note.octave, instrument, shift, None);
                events.push(event(grace_pitch, true));
            }
        }
        clock += note.duration;
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Accidental, Degree, NotationSystem, PitchClass, Score, Track};

    fn deg(d: u8) -> Degree {
        Degree::new(d).unwrap()
    }

    fn one_track(notes: Vec<Note>) -> Score {
        let mut score = Score::new();
        let mut track = Track::new(1, "Melody", Instrument::Piano);
        track.notes = notes;
        score.tracks.push(track);
        score
    }

    fn first_pitch(score: &Score) -> i32 {
        schedule(&DisplayScore::new(score)).tracks[0].events[0].midi_pitch
    }

    #[test]
    fn middle_c_and_written_sharp() {
        let score = one_track(vec![Note::sounding(deg(1), 1.0)]);
        assert_eq!(first_pitch(&score), 60);

        let mut sharp = Note::sounding(deg(1), 1.0);
        sharp.accidental = Some(Accidental::Sharp);
        assert_eq!(first_pitch(&one_track(vec![sharp])), 61);
    }

    #[test]
    fn track_transpose_writes_sharp() {
        // Two sharps put 1 (and 4) under a sharp.
        let mut score = one_track(vec![Note::sounding(deg(1), 1.0)]);
        score.tracks[0].transpose = 2;
        assert_eq!(first_pitch(&score), 61);
    }

    #[test]
    fn key_ignored_under_fixed_do() {
        let mut score = one_track(vec![Note::sounding(deg(1), 1.0)]);
        score.meta.key = PitchClass::G;
        assert_eq!(first_pitch(&score), 67);
        score.meta.notation_system = NotationSystem::FixedDo;
        assert_eq!(first_pitch(&score), 60);
    }

    #[test]
    fn extension_run_is_one_event() {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Trace)
            .try_init();
        let score = one_track(vec![
            Note::sounding(deg(5), 1.0),
            Note::extension(1.0),
            Note::extension(1.0),
            Note::sounding(deg(3), 1.0),
        ]);
        let sched = schedule(&DisplayScore::new(&score));
        let events = &sched.tracks[0].events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].duration_beats, 3.0);
        assert_eq!(crate::duration::extension_count(&score.tracks[0].notes, 0), 2);
        assert_eq!(events[1].start_beat, 3.0);
        assert_eq!(events[1].note_index, 3);
    }

    #[test]
    fn rests_advance_the_clock() {
        let mut score = one_track(vec![Note::rest(2.0), Note::sounding(deg(1), 1.0)]);
        score.meta.tempo_bpm = 120;
        let sched = schedule(&DisplayScore::new(&score));
        let e = &sched.tracks[0].events[0];
        assert_eq!(e.start_beat, 2.0);
        assert!((e.start_secs - 1.0).abs() < 1e-9);
        assert!((e.duration_secs - 0.5).abs() < 1e-9);
    }

    #[test]
    fn staccato_halves_audible_length() {
        let mut note = Note::sounding(deg(2), 1.0);
        note.staccato = true;
        let score = one_track(vec![note, Note::extension(1.0), Note::sounding(deg(3), 1.0)]);
        let sched = schedule(&DisplayScore::new(&score));
        let events = &sched.tracks[0].events;
        assert_eq!(events[0].duration_beats, 1.0);
        assert_eq!(events[1].start_beat, 2.0);
    }

    #[test]
    fn grace_note_shares_host_start() {
        let mut host = Note::sounding(deg(3), 1.0);
        host.accidental = Some(Accidental::Flat);
        host.grace_note = Some(deg(2));
        let score = one_track(vec![Note::rest(1.0), host]);
        let sched = schedule(&DisplayScore::new(&score));
        let events = &sched.tracks[0].events;
        assert_eq!(events.len(), 2);
        assert!(!events[0].is_grace);
        assert!(events[1].is_grace);
        assert_eq!(events[0].midi_pitch, 63);
        assert_eq!(events[1].midi_pitch, 62);
        assert_eq!(events[1].start_beat, events[0].start_beat);
        assert_eq!(events[1].duration_beats, events[0].duration_beats);
    }

    #[test]
    fn instrument_offset_applies() {
        let mut score = one_track(vec![Note::sounding(deg(1), 1.0)]);
        score.tracks[0].instrument = Instrument::Bass;
        assert_eq!(first_pitch(&score), 36);
    }

    #[test]
    fn merged_events_are_time_ordered() {
        let mut score = one_track(vec![Note::sounding(deg(1), 2.0), Note::sounding(deg(2), 1.0)]);
        let mut alto = Track::new(2, "Alto", Instrument::Piano);
        alto.notes = vec![Note::sounding(deg(5), 1.0), Note::sounding(deg(6), 1.0)];
        score.tracks.push(alto);
        let sched = schedule(&DisplayScore::new(&score));
        let starts: Vec<(f64, usize)> = sched
            .events()
            .iter()
            .map(|e| (e.start_beat, e.track_index))
            .collect();
        assert_eq!(starts, vec![(0.0, 0), (0.0, 1), (1.0, 1), (2.0, 0)]);
        assert!((sched.duration_secs() - 3.0 * 0.6).abs() < 1e-9);
    }
}
