//! Pitch tables: scale degrees to semitones, instruments, and MIDI
//! note numbers to frequencies.

use serde::{Deserialize, Serialize};

use crate::model::{Accidental, Degree, NotationSystem, PitchClass, ScoreMeta};

/// Semitone offset of each major-scale degree above the tonic.
pub const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// MIDI note number of degree 1, octave 0, key C (middle C).
pub const BASE_MIDI_NOTE: i32 = 60;

/// Concert A used for frequency conversion.
const A4_MIDI: i32 = 69;
const A4_HZ: f64 = 440.0;

/// Letter names used by `note_name`.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Playback voice of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Instrument {
    #[default]
    Piano,
    Organ,
    Violin,
    Flute,
    Bass,
    Synth,
}

impl Instrument {
    pub const ALL: [Instrument; 6] = [
        Instrument::Piano,
        Instrument::Organ,
        Instrument::Violin,
        Instrument::Flute,
        Instrument::Bass,
        Instrument::Synth,
    ];

    /// Octaves added to every note this instrument plays.
    pub fn octave_offset(self) -> i32 {
        match self {
            Instrument::Flute => 1,
            Instrument::Bass => -2,
            _ => 0,
        }
    }

    /// General MIDI program number.
    pub fn gm_program(self) -> u8 {
        match self {
            Instrument::Piano => 0,
            Instrument::Organ => 19,
            Instrument::Violin => 40,
            Instrument::Flute => 73,
            Instrument::Bass => 32,
            Instrument::Synth => 80,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Organ => "Organ",
            Instrument::Violin => "Violin",
            Instrument::Flute => "Flute",
            Instrument::Bass => "Bass",
            Instrument::Synth => "Synth",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.label() == label.trim())
    }
}

/// Semitone shift applied to the whole score for playback and export.
///
/// Under fixed-do, "1" is always C and the selected key is ignored.
pub fn key_shift(meta: &ScoreMeta) -> i32 {
    match meta.notation_system {
        NotationSystem::FixedDo => 0,
        NotationSystem::MovableDo => meta.key.semitones(),
    }
}

/// Semitone change for a written accidental.
pub fn accidental_shift(accidental: Option<Accidental>) -> i32 {
    match accidental {
        Some(Accidental::Sharp) => 1,
        Some(Accidental::Flat) => -1,
        Some(Accidental::Natural) | None => 0,
    }
}

/// Absolute MIDI note number for a degree in context.
///
/// The result may fall outside 0..=127 for extreme octave/instrument
/// combinations; callers that need a valid MIDI byte must check.
pub fn midi_pitch(
    degree: Degree,
    octave: i8,
    instrument: Instrument,
    key_shift: i32,
    accidental: Option<Accidental>,
) -> i32 {
    BASE_MIDI_NOTE
        + MAJOR_SCALE[degree.index()]
        + 12 * octave as i32
        + 12 * instrument.octave_offset()
        + key_shift
        + accidental_shift(accidental)
}

/// Equal-tempered frequency in Hz for a MIDI note number.
pub fn midi_to_frequency(midi: i32) -> f64 {
    A4_HZ * 2f64.powf((midi - A4_MIDI) as f64 / 12.0)
}

/// Scientific pitch name, e.g. 60 → "C4".
pub fn note_name(midi: i32) -> String {
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{name}{octave}")
}

/// Representing a key in the header ("Do = G").
pub fn key_label(key: PitchClass) -> String {
    format!("Do = {}", key.label())
}
