//! MIDI export: the playback schedule as plain note tuples per voice, and
//! as a Standard MIDI File (SMF) Type 1.
//!
//! Track 0 of the file carries the title, tempo and time signature; every
//! voice follows on its own track and channel.

use serde::Serialize;

use crate::model::TimeSignature;
use crate::schedule::{schedule, Schedule};
use crate::transpose::DisplayScore;

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Ticks per quarter note in our MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Note-on velocity for every exported note.
pub const DEFAULT_VELOCITY: u8 = 101;

/// Largest value the three-byte FF 51 tempo field holds.
const MAX_MICROS_PER_QUARTER: u32 = 0xFF_FFFF;

/// General MIDI reserves this channel for percussion.
const DRUM_CHANNEL: u8 = 9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiNote {
    pub pitch: u8,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiTrack {
    pub name: String,
    pub program: u8,
    pub channel: u8,
    pub notes: Vec<MidiNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiExport {
    pub title: String,
    pub tempo_bpm: u32,
    pub time_signature: TimeSignature,
    pub tracks: Vec<MidiTrack>,
}

/// A single MIDI event (note on/off, program change, meta)
#[derive(Debug, Clone)]
struct MidiEvent {
    /// Absolute time in ticks from the start of the track
    tick: u32,
    /// Raw message bytes (status + data)
    bytes: Vec<u8>,
}

/// Channel for the voice at `track_index`, skipping the drum channel and
/// wrapping after 15.
pub fn channel_for_track(track_index: usize) -> u8 {
    let melodic = (track_index % 15) as u8;
    if melodic >= DRUM_CHANNEL {
        melodic + 1
    } else {
        melodic
    }
}

/// Export every voice of the view.
pub fn export_midi(view: &DisplayScore) -> MidiExport {
    let sched = schedule(view);
    export_schedule(view, &sched)
}

/// Export from an already-built schedule of the same view.
pub fn export_schedule(view: &DisplayScore, sched: &Schedule) -> MidiExport {
    let tracks = sched
        .tracks
        .iter()
        .map(|ts| {
            let notes = ts
                .events
                .iter()
                .filter_map(|e| match u8::try_from(e.midi_pitch) {
                    Ok(pitch) if pitch <= 127 => Some(MidiNote {
                        pitch,
                        start_secs: e.start_secs,
                        duration_secs: e.duration_secs,
                        velocity: DEFAULT_VELOCITY,
                    }),
                    _ => {
                        log::warn!(
                            "midi: track {} note {} pitch {} out of range, skipped",
                            ts.track_index,
                            e.note_index,
                            e.midi_pitch
                        );
                        None
                    }
                })
                .collect();
            MidiTrack {
                name: ts.name.clone(),
                program: ts.instrument.gm_program(),
                channel: channel_for_track(ts.track_index),
                notes,
            }
        })
        .collect();

    MidiExport {
        title: view.meta.title.clone(),
        tempo_bpm: sched.tempo_bpm,
        time_signature: view.meta.time_signature,
        tracks,
    }
}

impl MidiExport {
    /// Serialize as SMF Type 1 bytes.
    pub fn to_smf(&self) -> Vec<u8> {
        let mut tracks = Vec::with_capacity(self.tracks.len() + 1);
        tracks.push(self.conductor_track());

        let (_, ticks_per_sec) = self.tempo_map();
        let to_ticks = |secs: f64| (secs * ticks_per_sec).round().max(0.0) as u32;

        for track in &self.tracks {
            let ch = track.channel & 0x0F;
            let mut events = vec![MidiEvent {
                tick: 0,
                bytes: vec![0xC0 | ch, track.program & 0x7F],
            }];
            for note in &track.notes {
                let on = to_ticks(note.start_secs);
                let off = to_ticks(note.start_secs + note.duration_secs).max(on);
                events.push(MidiEvent {
                    tick: on,
                    bytes: vec![0x90 | ch, note.pitch, note.velocity],
                });
                events.push(MidiEvent {
                    tick: off,
                    bytes: vec![0x80 | ch, note.pitch, 0],
                });
            }
            tracks.push(encode_track(&events, &track.name));
        }

        build_smf(&tracks)
    }

    /// Serialize the export summary to JSON.
    pub fn to_json(&self) -> Result<String, crate::ScoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Microseconds per quarter as written to FF 51, and the tick rate that
    /// goes with it. Below 4 BPM the value no longer fits in three bytes and
    /// is clamped; note ticks follow the clamped tempo so seconds still match.
    fn tempo_map(&self) -> (u32, f64) {
        let mut uspq = 60_000_000 / self.tempo_bpm.max(1);
        if uspq > MAX_MICROS_PER_QUARTER {
            log::warn!(
                "midi: tempo {} bpm is below the SMF range, writing {} us per quarter",
                self.tempo_bpm,
                MAX_MICROS_PER_QUARTER
            );
            uspq = MAX_MICROS_PER_QUARTER;
        }
        let ticks_per_sec = TICKS_PER_QUARTER as f64 * 1_000_000.0 / uspq as f64;
        (uspq, ticks_per_sec)
    }

    fn conductor_track(&self) -> Vec<u8> {
        let (uspq, _) = self.tempo_map();
        let (num, den) = self.time_signature.fraction();
        let mut events = vec![MidiEvent {
            tick: 0,
            bytes: vec![
                0xFF,
                0x51,
                0x03,
                ((uspq >> 16) & 0xFF) as u8,
                ((uspq >> 8) & 0xFF) as u8,
                (uspq & 0xFF) as u8,
            ],
        }];
        // FF 58 04 nn dd cc bb, denominator as a power of two
        events.push(MidiEvent {
            tick: 0,
            bytes: vec![0xFF, 0x58, 0x04, num, den.trailing_zeros() as u8, 24, 8],
        });
        encode_track(&events, &self.title)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SMF byte encoding
// ═══════════════════════════════════════════════════════════════════════

fn build_smf(tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();

    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes()); // header length
    out.extend_from_slice(&1u16.to_be_bytes()); // format type 1
    out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

    for track_data in tracks {
        out.extend_from_slice(b"MTrk");
        out.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
        out.extend_from_slice(track_data);
    }

    out
}

/// Encode one track's events into MTrk bytes, delta-timed. Note-offs sort
/// ahead of note-ons at the same tick so repeated pitches retrigger.
fn encode_track(events: &[MidiEvent], name: &str) -> Vec<u8> {
    let mut data = Vec::new();

    let name_bytes = name.as_bytes();
    data.push(0x00);
    data.push(0xFF);
    data.push(0x03); // track name
    write_vlq(&mut data, name_bytes.len() as u32);
    data.extend_from_slice(name_bytes);

    let mut sorted: Vec<&MidiEvent> = events.iter().collect();
    sorted.sort_by_key(|e| (e.tick, e.bytes[0] & 0xF0 != 0x80));

    let mut last_tick: u32 = 0;
    for event in &sorted {
        write_vlq(&mut data, event.tick.saturating_sub(last_tick));
        data.extend_from_slice(&event.bytes);
        last_tick = event.tick;
    }

    data.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
    data
}

fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut buf = [0u8; 5];
    let mut i = 0;
    loop {
        buf[i] = (value & 0x7F) as u8;
        if i > 0 {
            buf[i] |= 0x80;
        }
        value >>= 7;
        i += 1;
        if value == 0 {
            break;
        }
    }
    out.extend(buf[..i].iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Degree, Note, Score, Track};
    use crate::pitch::Instrument;

    #[test]
    fn vlq_encoding() {
        let mut buf = Vec::new();
        write_vlq(&mut buf, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        write_vlq(&mut buf, 127);
        assert_eq!(buf, vec![0x7F]);

        buf.clear();
        write_vlq(&mut buf, 128);
        assert_eq!(buf, vec![0x81, 0x00]);

        buf.clear();
        write_vlq(&mut buf, 480);
        assert_eq!(buf, vec![0x83, 0x60]);
    }

    #[test]
    fn channels_skip_drums() {
        let channels: Vec<u8> = (0..12).map(channel_for_track).collect();
        assert_eq!(channels, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12]);
        assert_eq!(channel_for_track(14), 15);
        assert_eq!(channel_for_track(15), 0);
    }

    fn sample() -> Score {
        let mut score = Score::new();
        score.meta.title = "Hymn".into();
        score.meta.tempo_bpm = 120;
        let mut track = Track::new(1, "Soprano", Instrument::Flute);
        track.notes = vec![
            Note::sounding(Degree::new(1).unwrap(), 1.0),
            Note::extension(1.0),
            Note::rest(1.0),
            Note::sounding(Degree::new(5).unwrap(), 1.0),
        ];
        score.tracks.push(track);
        score
    }

    #[test]
    fn export_tuples() {
        let export = export_midi(&DisplayScore::new(&sample()));
        assert_eq!(export.tracks.len(), 1);
        let t = &export.tracks[0];
        assert_eq!((t.program, t.channel), (73, 0));
        let tuples: Vec<(u8, f64, f64)> = t
            .notes
            .iter()
            .map(|n| (n.pitch, n.start_secs, n.duration_secs))
            .collect();
        assert_eq!(tuples, vec![(72, 0.0, 1.0), (79, 1.5, 0.5)]);
        assert!(t.notes.iter().all(|n| n.velocity == DEFAULT_VELOCITY));
    }

    #[test]
    fn out_of_range_pitches_are_dropped() {
        let mut score = sample();
        score.tracks[0].instrument = Instrument::Bass;
        score.tracks[0].notes[0].octave = -3;
        let export = export_midi(&DisplayScore::new(&score));
        // 60 - 36 - 24 = 0 is still valid; push one lower.
        assert_eq!(export.tracks[0].notes[0].pitch, 0);
        score.tracks[0].notes[0].accidental = Some(crate::model::Accidental::Flat);
        let export = export_midi(&DisplayScore::new(&score));
        assert_eq!(export.tracks[0].notes.len(), 1);
    }

    #[test]
    fn smf_header_and_tracks() {
        let smf = export_midi(&DisplayScore::new(&sample())).to_smf();
        assert_eq!(&smf[0..4], b"MThd");
        assert_eq!(&smf[8..10], &1u16.to_be_bytes()); // format 1
        assert_eq!(&smf[10..12], &2u16.to_be_bytes()); // conductor + one voice
        assert_eq!(&smf[12..14], &TICKS_PER_QUARTER.to_be_bytes());
        assert_eq!(smf.windows(4).filter(|w| *w == b"MTrk").count(), 2);
        // 120 bpm = 500_000 us per quarter
        assert!(smf.windows(6).any(|w| w == [0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]));
        // 4/4
        assert!(smf.windows(5).any(|w| w == [0xFF, 0x58, 0x04, 4, 2]));
        assert!(smf.windows(2).any(|w| w == [0xC0, 73]));
        assert!(smf.windows(3).any(|w| w == [0x90, 72, DEFAULT_VELOCITY]));
    }

    #[test]
    fn very_slow_tempo_is_clamped_to_the_tempo_field() {
        let mut score = sample();
        score.meta.tempo_bpm = 3;
        let export = export_midi(&DisplayScore::new(&score));

        let (uspq, ticks_per_sec) = export.tempo_map();
        assert_eq!(uspq, MAX_MICROS_PER_QUARTER);
        // ticks stay tied to the written tempo: one quarter is 480 ticks
        let quarter_secs = uspq as f64 / 1_000_000.0;
        assert!((quarter_secs * ticks_per_sec - TICKS_PER_QUARTER as f64).abs() < 1e-6);

        let smf = export.to_smf();
        assert!(smf.windows(6).any(|w| w == [0xFF, 0x51, 0x03, 0xFF, 0xFF, 0xFF]));

        // Second note starts 60s in (beat 3 at 3 bpm)
        let on = (60.0 * ticks_per_sec).round() as u32;
        assert_eq!(on, 1717);
    }

    #[test]
    fn normal_tempo_tick_rate() {
        let export = export_midi(&DisplayScore::new(&sample()));
        let (uspq, ticks_per_sec) = export.tempo_map();
        assert_eq!(uspq, 500_000);
        assert!((ticks_per_sec - 960.0).abs() < 1e-9);
    }
}
