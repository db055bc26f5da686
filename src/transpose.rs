//! Per-track transposition of written accidentals.
//!
//! A track's `transpose` value says how many sharps (positive) or flats
//! (negative) the written degrees pick up, in key-signature order. The
//! result is the *display view* every downstream stage reads: layout,
//! beaming, slurs, playback and MIDI export.

use crate::model::{Accidental, Degree, Note, Score, ScoreMeta, Track};

/// Degrees that pick up a sharp, in the order sharps are added.
const SHARP_ORDER: [u8; 7] = [4, 1, 5, 2, 6, 3, 7];
/// Degrees that pick up a flat, in the order flats are added.
const FLAT_ORDER: [u8; 7] = [7, 3, 6, 2, 5, 1, 4];

/// Apply a semitone shift to a single note's written accidental.
///
/// Rests and extensions pass through untouched, as does any note when the
/// shift is zero. Otherwise the existing accidental is discarded and
/// recomputed from scratch, so applying a second shift never stacks on
/// top of the first.
pub fn resolve(note: &Note, shift: i32) -> Note {
    let degree = match note.degree() {
        Some(d) if shift != 0 => d,
        _ => return note.clone(),
    };

    let mut resolved = note.clone();
    resolved.accidental = accidental_for(degree, shift);
    resolved
}

fn accidental_for(degree: Degree, shift: i32) -> Option<Accidental> {
    let count = shift.unsigned_abs().min(7) as usize;
    if shift > 0 && SHARP_ORDER[..count].contains(&degree.get()) {
        Some(Accidental::Sharp)
    } else if shift < 0 && FLAT_ORDER[..count].contains(&degree.get()) {
        Some(Accidental::Flat)
    } else {
        None
    }
}

/// A score with every track's transposition already applied.
///
/// Build it with [`DisplayScore::new`]. The fields are public for reading;
/// notes edited through them are not re-resolved, so rebuild the view from
/// the edited [`Score`] instead.
#[derive(Debug, Clone)]
pub struct DisplayScore {
    pub meta: ScoreMeta,
    pub tracks: Vec<Track>,
}

impl DisplayScore {
    pub fn new(score: &Score) -> Self {
        let tracks = score
            .tracks
            .iter()
            .map(|track| Track {
                notes: track
                    .notes
                    .iter()
                    .map(|n| resolve(n, track.transpose as i32))
                    .collect(),
                ..track.clone()
            })
            .collect();

        Self {
            meta: score.meta.clone(),
            tracks,
        }
    }
}

impl From<&Score> for DisplayScore {
    fn from(score: &Score) -> Self {
        DisplayScore::new(score)
    }
}
