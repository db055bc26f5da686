//! Project document I/O.
//!
//! A project is a JSON object `{ "meta": {...}, "tracks": [...] }` using the
//! editor's field names (`tempo`, `timeSig`, `isRest`, `slurLength`, ...).
//! Loading is lenient the way the editor is: missing or empty fields take
//! defaults, out-of-range numbers are clamped, and unusable ornaments are
//! dropped with a warning. Only structurally broken JSON and note pitches
//! that cannot be a scale degree are errors.

use serde::{Deserialize, Serialize};

use crate::edit::{MAX_OCTAVE, MAX_SLUR_LENGTH, MAX_TRANSPOSE, MIN_OCTAVE};
use crate::error::ScoreError;
use crate::model::{
    Accidental, Degree, NotationSystem, Note, NotePitch, PitchClass, Score, ScoreMeta,
    TimeSignature, Track,
};
use crate::pitch::Instrument;

/// Written form of an extension marker.
const EXTENSION_MARK: &str = ".";

// ═══════════════════════════════════════════════════════════════════════
// Wire format
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ProjectDoc {
    meta: Option<MetaDoc>,
    tracks: Option<Vec<TrackDoc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MetaDoc {
    title: Option<String>,
    subtitle: Option<String>,
    lyricist: Option<String>,
    composer: Option<String>,
    tempo: Option<f64>,
    notation_system: Option<String>,
    key: Option<String>,
    time_sig: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TrackDoc {
    id: Option<f64>,
    name: Option<String>,
    instrument: Option<String>,
    transpose: Option<f64>,
    notes: Vec<NoteDoc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NoteDoc {
    pitch: Option<PitchDoc>,
    octave: Option<f64>,
    duration: Option<f64>,
    is_rest: Option<bool>,
    accidental: Option<String>,
    staccato: Option<bool>,
    beam_break: Option<bool>,
    slur_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lyric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grace_note: Option<PitchDoc>,
}

/// Pitches and grace notes are written either as numbers or as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PitchDoc {
    Number(f64),
    Text(String),
}

// ═══════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════

/// Parse a project document into a brand-new score.
pub fn parse_project_json(text: &str) -> Result<Score, ScoreError> {
    let doc: ProjectDoc = serde_json::from_str(text)?;

    let meta = doc.meta.map(meta_from_doc).unwrap_or_default();
    let tracks = doc
        .tracks
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, t)| track_from_doc(i, t))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "project: loaded '{}' with {} tracks",
        meta.title,
        tracks.len()
    );
    Ok(Score { meta, tracks })
}

/// Parse a project document from raw bytes.
pub fn parse_project_bytes(data: &[u8]) -> Result<Score, ScoreError> {
    let text = std::str::from_utf8(data)?;
    parse_project_json(text.trim_start_matches('\u{feff}'))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn meta_from_doc(doc: MetaDoc) -> ScoreMeta {
    let defaults = ScoreMeta::default();

    let notation_system = match doc.notation_system.as_deref().map(str::trim) {
        Some("Fixed Do") => NotationSystem::FixedDo,
        Some("Movable Do") | None | Some("") => NotationSystem::MovableDo,
        Some(other) => {
            log::warn!("project: unknown notation system '{other}', using Movable Do");
            NotationSystem::MovableDo
        }
    };
    let key = match non_empty(doc.key) {
        Some(label) => PitchClass::from_label(&label).unwrap_or_else(|| {
            log::warn!("project: unknown key '{label}', using C");
            PitchClass::C
        }),
        None => defaults.key,
    };
    let time_signature = match non_empty(doc.time_sig) {
        Some(label) => TimeSignature::from_label(&label).unwrap_or_else(|| {
            log::warn!("project: unsupported time signature '{label}', using 4/4");
            TimeSignature::FourFour
        }),
        None => defaults.time_signature,
    };
    let tempo_bpm = doc
        .tempo
        .filter(|t| t.is_finite() && *t >= 1.0)
        .map(|t| t.round() as u32)
        .unwrap_or(defaults.tempo_bpm);

    ScoreMeta {
        title: non_empty(doc.title).unwrap_or(defaults.title),
        subtitle: non_empty(doc.subtitle),
        lyricist: non_empty(doc.lyricist).or(defaults.lyricist),
        composer: non_empty(doc.composer).or(defaults.composer),
        tempo_bpm,
        key,
        notation_system,
        time_signature,
    }
}

fn track_from_doc(index: usize, doc: TrackDoc) -> Result<Track, ScoreError> {
    let instrument = match non_empty(doc.instrument) {
        Some(label) => Instrument::from_label(&label).unwrap_or_else(|| {
            log::warn!("project: track {index} has unknown instrument '{label}', using Piano");
            Instrument::Piano
        }),
        None => Instrument::Piano,
    };
    let id = doc
        .id
        .filter(|id| id.is_finite() && *id >= 0.0)
        .map(|id| id as u64)
        .unwrap_or(index as u64 + 1);
    let name = non_empty(doc.name).unwrap_or_else(|| format!("Voice {}", index + 1));

    let mut track = Track::new(id, name, instrument);
    track.transpose = clamp_i8(doc.transpose, -MAX_TRANSPOSE, MAX_TRANSPOSE);
    track.notes = doc
        .notes
        .into_iter()
        .enumerate()
        .map(|(n, note)| note_from_doc(index, n, note))
        .collect::<Result<_, _>>()?;
    Ok(track)
}

fn clamp_i8(value: Option<f64>, min: i8, max: i8) -> i8 {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(min as f64, max as f64) as i8)
        .unwrap_or(0)
}

fn note_from_doc(track: usize, index: usize, doc: NoteDoc) -> Result<Note, ScoreError> {
    let invalid = |message: String| ScoreError::InvalidNote {
        track,
        index,
        message,
    };

    let pitch = if doc.is_rest.unwrap_or(false) {
        NotePitch::Rest
    } else {
        match doc.pitch {
            None => Note::default().pitch,
            Some(PitchDoc::Text(t)) if t.trim() == EXTENSION_MARK => NotePitch::Extension,
            Some(PitchDoc::Text(t)) => match t.trim().parse::<f64>() {
                Ok(n) => pitch_from_number(n).ok_or_else(|| invalid(format!("pitch '{t}'")))?,
                Err(_) => return Err(invalid(format!("pitch '{t}' is not a scale degree"))),
            },
            Some(PitchDoc::Number(n)) => pitch_from_number(n)
                .ok_or_else(|| invalid(format!("pitch {n} is not a scale degree")))?,
        }
    };

    let accidental = match doc.accidental.as_deref().map(str::trim) {
        Some("sharp") => Some(Accidental::Sharp),
        Some("flat") => Some(Accidental::Flat),
        Some("natural") => Some(Accidental::Natural),
        None | Some("") => None,
        Some(other) => {
            log::warn!("project: track {track} note {index}: unknown accidental '{other}'");
            None
        }
    };

    let grace_note = doc.grace_note.and_then(|g| {
        let text = match g {
            PitchDoc::Number(n) => n.to_string(),
            PitchDoc::Text(t) => t,
        };
        if text.trim().is_empty() {
            return None;
        }
        match crate::edit::parse_grace_note(text.trim()) {
            Ok(degree) => Some(degree),
            Err(e) => {
                log::warn!("project: track {track} note {index}: {e}, dropped");
                None
            }
        }
    });

    let duration = doc
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(1.0);

    Ok(Note {
        pitch,
        octave: clamp_i8(doc.octave, MIN_OCTAVE, MAX_OCTAVE),
        duration,
        accidental,
        staccato: doc.staccato.unwrap_or(false),
        beam_break: doc.beam_break.unwrap_or(false),
        slur_length: doc
            .slur_length
            .filter(|v| v.is_finite())
            .map(|v| v.round().clamp(0.0, MAX_SLUR_LENGTH as f64) as u8)
            .unwrap_or(0),
        lyric: non_empty(doc.lyric),
        grace_note,
    })
}

/// `0` is the cipher rest; 1..=7 are degrees.
fn pitch_from_number(n: f64) -> Option<NotePitch> {
    if n.fract() != 0.0 {
        return None;
    }
    match n as i64 {
        0 => Some(NotePitch::Rest),
        d @ 1..=7 => Degree::new(d as u8).map(NotePitch::Sounding),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Saving
// ═══════════════════════════════════════════════════════════════════════

/// Serialize a score in the editor's project format.
pub fn project_to_json(score: &Score) -> Result<String, ScoreError> {
    Ok(serde_json::to_string_pretty(&doc_from_score(score))?)
}

fn doc_from_score(score: &Score) -> ProjectDoc {
    let m = &score.meta;
    let meta = MetaDoc {
        title: Some(m.title.clone()),
        subtitle: Some(m.subtitle.clone().unwrap_or_default()),
        lyricist: Some(m.lyricist.clone().unwrap_or_default()),
        composer: Some(m.composer.clone().unwrap_or_default()),
        tempo: Some(m.tempo_bpm as f64),
        notation_system: Some(
            match m.notation_system {
                NotationSystem::MovableDo => "Movable Do",
                NotationSystem::FixedDo => "Fixed Do",
            }
            .to_string(),
        ),
        key: Some(m.key.label().to_string()),
        time_sig: Some(m.time_signature.label().to_string()),
    };

    let tracks = score
        .tracks
        .iter()
        .map(|t| TrackDoc {
            id: Some(t.id as f64),
            name: Some(t.name.clone()),
            instrument: Some(t.instrument.label().to_string()),
            transpose: Some(t.transpose as f64),
            notes: t.notes.iter().map(doc_from_note).collect(),
        })
        .collect();

    ProjectDoc {
        meta: Some(meta),
        tracks: Some(tracks),
    }
}

fn doc_from_note(note: &Note) -> NoteDoc {
    let (pitch, is_rest) = match note.pitch {
        NotePitch::Sounding(d) => (PitchDoc::Number(d.get() as f64), false),
        NotePitch::Rest => (PitchDoc::Number(0.0), true),
        NotePitch::Extension => (PitchDoc::Text(EXTENSION_MARK.to_string()), false),
    };
    NoteDoc {
        pitch: Some(pitch),
        octave: Some(note.octave as f64),
        duration: Some(note.duration),
        is_rest: Some(is_rest),
        accidental: note.accidental.map(|a| {
            match a {
                Accidental::Sharp => "sharp",
                Accidental::Flat => "flat",
                Accidental::Natural => "natural",
            }
            .to_string()
        }),
        staccato: Some(note.staccato),
        beam_break: Some(note.beam_break),
        slur_length: Some(note.slur_length as f64),
        lyric: note.lyric.clone(),
        grace_note: note.grace_note.map(|g| PitchDoc::Text(g.get().to_string())),
    }
}
