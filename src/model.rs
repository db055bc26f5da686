//! Data model for a numbered-notation score.
//!
//! A score is a list of voice tracks sharing one set of metadata. Each
//! track owns an ordered list of notes written as scale degrees (1–7),
//! rests, or extension markers that lengthen the previous note.

use serde::{Deserialize, Serialize};

use crate::pitch::Instrument;

/// A complete score: metadata plus voice tracks in top-to-bottom order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub meta: ScoreMeta,
    pub tracks: Vec<Track>,
}

/// Title block, tempo, key and meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMeta {
    pub title: String,
    pub subtitle: Option<String>,
    /// Author of the text
    pub lyricist: Option<String>,
    pub composer: Option<String>,
    /// Quarter-note beats per minute
    pub tempo_bpm: u32,
    /// Tonic of the movable-do scale ("Do = ...")
    pub key: PitchClass,
    pub notation_system: NotationSystem,
    pub time_signature: TimeSignature,
}

/// One voice (Soprano, Alto, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub name: String,
    pub instrument: Instrument,
    /// Written-accidental shift in semitones, -7..=7
    pub transpose: i8,
    pub notes: Vec<Note>,
}

/// A single note, rest, or extension marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: NotePitch,
    /// Octave dots: positive above, negative below, -3..=3
    pub octave: i8,
    /// Length in beats (quarter note = 1.0)
    pub duration: f64,
    pub accidental: Option<Accidental>,
    pub staccato: bool,
    /// Force a beam break before this note
    pub beam_break: bool,
    /// Number of rendered notes ahead the slur reaches, 0..=3
    pub slur_length: u8,
    pub lyric: Option<String>,
    /// Simultaneous ornament degree sounded with this note
    pub grace_note: Option<Degree>,
}

/// What a note slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePitch {
    /// A scale degree that produces sound
    Sounding(Degree),
    /// Silence ("0" in cipher notation)
    Rest,
    /// Continue the previous sounding note ("-" in cipher notation)
    Extension,
}

/// Movable-do scale degree, always within 1..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Degree(u8);

/// Written accidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp,
    Flat,
    /// Visually cancels a key-signature accidental; no pitch change
    Natural,
}

/// Whether "1" follows the selected key or is always C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotationSystem {
    #[default]
    #[serde(rename = "Movable Do")]
    MovableDo,
    #[serde(rename = "Fixed Do")]
    FixedDo,
}

/// The twelve selectable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PitchClass {
    #[default]
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

/// Supported meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeSignature {
    #[default]
    #[serde(rename = "4/4")]
    FourFour,
    #[serde(rename = "3/4")]
    ThreeFour,
    #[serde(rename = "2/4")]
    TwoFour,
    #[serde(rename = "6/8")]
    SixEight,
    #[serde(rename = "2/2")]
    TwoTwo,
    #[serde(rename = "3/8")]
    ThreeEight,
}

/// Static per-meter layout profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignatureProfile {
    /// Beat capacity of one bar
    pub beats_per_bar: u32,
    /// Maximum number of notes joined by one beam
    pub beam_group_size: usize,
}

// ═══════════════════════════════════════════════════════════════════════
// Degree
// ═══════════════════════════════════════════════════════════════════════

impl Degree {
    /// Returns `None` unless `value` is 1..=7.
    pub fn new(value: u8) -> Option<Self> {
        (1..=7).contains(&value).then_some(Degree(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into seven-entry scale tables.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for Degree {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Degree::new(value).ok_or_else(|| format!("scale degree must be 1-7, got {value}"))
    }
}

impl From<Degree> for u8 {
    fn from(d: Degree) -> u8 {
        d.0
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Note
// ═══════════════════════════════════════════════════════════════════════

impl Note {
    /// A sounding degree in the middle octave.
    pub fn sounding(degree: Degree, duration: f64) -> Self {
        Self::with_pitch(NotePitch::Sounding(degree), duration)
    }

    pub fn rest(duration: f64) -> Self {
        Self::with_pitch(NotePitch::Rest, duration)
    }

    pub fn extension(duration: f64) -> Self {
        Self::with_pitch(NotePitch::Extension, duration)
    }

    fn with_pitch(pitch: NotePitch, duration: f64) -> Self {
        Self {
            pitch,
            octave: 0,
            duration,
            accidental: None,
            staccato: false,
            beam_break: false,
            slur_length: 0,
            lyric: None,
            grace_note: None,
        }
    }

    pub fn degree(&self) -> Option<Degree> {
        match self.pitch {
            NotePitch::Sounding(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_sounding(&self) -> bool {
        matches!(self.pitch, NotePitch::Sounding(_))
    }

    pub fn is_rest(&self) -> bool {
        self.pitch == NotePitch::Rest
    }

    pub fn is_extension(&self) -> bool {
        self.pitch == NotePitch::Extension
    }

    /// Lyric text, treating an empty string as absent.
    pub fn lyric_text(&self) -> Option<&str> {
        self.lyric.as_deref().filter(|l| !l.trim().is_empty())
    }
}

impl Default for Note {
    fn default() -> Self {
        Note::sounding(Degree(1), 1.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Track / Score
// ═══════════════════════════════════════════════════════════════════════

impl Track {
    pub fn new(id: u64, name: impl Into<String>, instrument: Instrument) -> Self {
        Self {
            id,
            name: name.into(),
            instrument,
            transpose: 0,
            notes: Vec::new(),
        }
    }

    /// Total length of the track in beats, extensions included.
    pub fn total_beats(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

impl Score {
    /// An empty score with default metadata.
    pub fn new() -> Self {
        Self {
            meta: ScoreMeta::default(),
            tracks: Vec::new(),
        }
    }

    /// The four-voice choir template a new project starts with.
    pub fn satb() -> Self {
        let voice = |id: u64, name: &str, instrument: Instrument, degree: u8, octave: i8| {
            let mut track = Track::new(id, name, instrument);
            let mut note = Note::sounding(Degree(degree), 1.0);
            note.octave = octave;
            track.notes.push(note);
            track
        };
        Self {
            meta: ScoreMeta::default(),
            tracks: vec![
                voice(1, "Soprano", Instrument::Piano, 1, 0),
                voice(2, "Alto", Instrument::Piano, 3, 0),
                voice(3, "Tenor", Instrument::Piano, 5, 0),
                voice(4, "Bass", Instrument::Bass, 1, -1),
            ],
        }
    }

    /// Length of the longest track in beats.
    pub fn total_beats(&self) -> f64 {
        self.tracks.iter().map(Track::total_beats).fold(0.0, f64::max)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ScoreMeta {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            subtitle: None,
            lyricist: Some("NN".to_string()),
            composer: Some("NN".to_string()),
            tempo_bpm: 100,
            key: PitchClass::C,
            notation_system: NotationSystem::MovableDo,
            time_signature: TimeSignature::FourFour,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Key / meter tables
// ═══════════════════════════════════════════════════════════════════════

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C.
    pub fn semitones(self) -> i32 {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0) as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label.trim())
    }
}

impl TimeSignature {
    pub const ALL: [TimeSignature; 6] = [
        TimeSignature::FourFour,
        TimeSignature::ThreeFour,
        TimeSignature::TwoFour,
        TimeSignature::SixEight,
        TimeSignature::TwoTwo,
        TimeSignature::ThreeEight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeSignature::FourFour => "4/4",
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::TwoFour => "2/4",
            TimeSignature::SixEight => "6/8",
            TimeSignature::TwoTwo => "2/2",
            TimeSignature::ThreeEight => "3/8",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label.trim())
    }

    pub fn profile(self) -> TimeSignatureProfile {
        let (beats_per_bar, beam_group_size) = match self {
            TimeSignature::FourFour => (4, 4),
            TimeSignature::ThreeFour => (3, 6),
            TimeSignature::TwoFour => (2, 4),
            TimeSignature::SixEight => (3, 3),
            TimeSignature::TwoTwo => (4, 4),
            TimeSignature::ThreeEight => (3, 3),
        };
        TimeSignatureProfile {
            beats_per_bar,
            beam_group_size,
        }
    }

    /// Bars per system row; eighth-note compound bars are short, so 3/8
    /// packs twice as many.
    pub fn bars_per_system(self) -> u32 {
        match self {
            TimeSignature::ThreeEight => 8,
            _ => 4,
        }
    }

    /// Numerator and denominator as written.
    pub fn fraction(self) -> (u8, u8) {
        match self {
            TimeSignature::FourFour => (4, 4),
            TimeSignature::ThreeFour => (3, 4),
            TimeSignature::TwoFour => (2, 4),
            TimeSignature::SixEight => (6, 8),
            TimeSignature::TwoTwo => (2, 2),
            TimeSignature::ThreeEight => (3, 8),
        }
    }
}
