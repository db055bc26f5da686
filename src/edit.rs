//! Note and track mutators used by an editing shell.
//!
//! These keep the document inside its valid ranges: octaves stay within
//! three dots, slurs reach at most three notes, grace notes are single
//! scale degrees, a score always keeps at least one voice.

use crate::error::ScoreError;
use crate::model::{Accidental, Degree, Note, NotePitch, Score, Track};
use crate::pitch::Instrument;

pub const MIN_OCTAVE: i8 = -3;
pub const MAX_OCTAVE: i8 = 3;
pub const MAX_SLUR_LENGTH: u8 = 3;
pub const MAX_TRANSPOSE: i8 = 7;

// ═══════════════════════════════════════════════════════════════════════
// Note mutators
// ═══════════════════════════════════════════════════════════════════════

/// Move the note up (`+1`) or down (`-1`) an octave. A change that would
/// leave -3..=3 is ignored. Returns whether the note changed.
pub fn shift_octave(note: &mut Note, direction: i8) -> bool {
    let Some(next) = note.octave.checked_add(direction) else {
        return false;
    };
    if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&next) {
        return false;
    }
    note.octave = next;
    true
}

/// Set the grace degree from user input. Blank input clears it; anything
/// other than a single digit 1-7 is rejected and leaves the note alone.
pub fn set_grace_note(note: &mut Note, input: &str) -> Result<(), ScoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        note.grace_note = None;
        return Ok(());
    }
    note.grace_note = Some(parse_grace_note(trimmed)?);
    Ok(())
}

/// Parse a grace note written as one digit 1-7.
pub fn parse_grace_note(input: &str) -> Result<Degree, ScoreError> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c
            .to_digit(10)
            .and_then(|d| Degree::new(d as u8))
            .ok_or_else(|| ScoreError::InvalidGraceNote(input.to_string())),
        _ => Err(ScoreError::InvalidGraceNote(input.to_string())),
    }
}

/// Slur length steps 0 → 1 → 2 → 3 → 0.
pub fn cycle_slur(note: &mut Note) {
    note.slur_length = if note.slur_length >= MAX_SLUR_LENGTH {
        0
    } else {
        note.slur_length + 1
    };
}

/// Selecting the accidental already present removes it.
pub fn toggle_accidental(note: &mut Note, accidental: Accidental) {
    note.accidental = if note.accidental == Some(accidental) {
        None
    } else {
        Some(accidental)
    };
}

pub fn toggle_staccato(note: &mut Note) {
    note.staccato = !note.staccato;
}

pub fn toggle_beam_break(note: &mut Note) {
    note.beam_break = !note.beam_break;
}

pub fn set_degree(note: &mut Note, degree: Degree) {
    note.pitch = NotePitch::Sounding(degree);
}

pub fn set_rest(note: &mut Note) {
    note.pitch = NotePitch::Rest;
}

/// Turn the slot into an extension of the previous note.
pub fn set_extension(note: &mut Note) {
    note.pitch = NotePitch::Extension;
}

/// Durations must be positive; anything else is ignored.
pub fn set_duration(note: &mut Note, beats: f64) -> bool {
    if beats.is_finite() && beats > 0.0 {
        note.duration = beats;
        true
    } else {
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Track and score mutators
// ═══════════════════════════════════════════════════════════════════════

/// Append a default quarter note (degree 1) and return its index.
pub fn add_note(track: &mut Track) -> usize {
    track.notes.push(Note::default());
    track.notes.len() - 1
}

pub fn remove_note(track: &mut Track, index: usize) -> Option<Note> {
    (index < track.notes.len()).then(|| track.notes.remove(index))
}

/// Clamp to -7..=7 sharps/flats.
pub fn set_transpose(track: &mut Track, semitones: i8) {
    track.transpose = semitones.clamp(-MAX_TRANSPOSE, MAX_TRANSPOSE);
}

/// Add a new voice holding one default note; returns its index.
pub fn add_track(score: &mut Score) -> usize {
    let id = score.tracks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    let mut track = Track::new(
        id,
        format!("Voice {}", score.tracks.len() + 1),
        Instrument::Piano,
    );
    track.notes.push(Note::default());
    score.tracks.push(track);
    score.tracks.len() - 1
}

/// Remove a voice. The last remaining voice cannot be removed.
pub fn remove_track(score: &mut Score, index: usize) -> Option<Track> {
    if score.tracks.len() <= 1 || index >= score.tracks.len() {
        return None;
    }
    Some(score.tracks.remove(index))
}
