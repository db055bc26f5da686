//! Beam grouping for short notes.
//!
//! Cipher notation marks eighths with one line above the digits and
//! sixteenths with a second line stacked on top. Each tier is grouped
//! independently from the laid-out notes of one voice.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::layout::{PlacedNote, ScoreLayout};

/// Which beam line a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamTier {
    Eighth,
    Sixteenth,
}

impl BeamTier {
    /// Longest duration (in beats) that takes this beam.
    pub fn threshold(self) -> f64 {
        match self {
            BeamTier::Eighth => 0.5,
            BeamTier::Sixteenth => 0.25,
        }
    }

    fn offset(self, config: &LayoutConfig) -> f64 {
        match self {
            BeamTier::Eighth => config.eighth_beam_offset,
            BeamTier::Sixteenth => config.sixteenth_beam_offset,
        }
    }
}

/// A straight beam line joining a run of notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamSegment {
    pub track_index: usize,
    pub tier: BeamTier,
    /// Note index (within the track) of the first and last beamed note
    pub first_note: usize,
    pub last_note: usize,
    /// Number of notes under the beam
    pub note_count: usize,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Group one voice's laid-out notes into beam segments for one tier.
///
/// A run is cut when the row changes, when a note asks for a manual
/// break, or once the run holds `group_size` notes. Anything that is not
/// a short enough sounding note ends the current run without starting a
/// new one. Single-note runs still produce a segment.
pub fn beams(
    notes: &[&PlacedNote],
    group_size: usize,
    tier: BeamTier,
    config: &LayoutConfig,
) -> Vec<BeamSegment> {
    let mut segments = Vec::new();
    let mut group_start: Option<usize> = None;
    let mut count = 0usize;

    let close = |start: usize, end: usize, segments: &mut Vec<BeamSegment>| {
        segments.push(segment(notes[start], notes[end], end - start + 1, tier, config));
    };

    for (i, note) in notes.iter().enumerate() {
        let eligible = note.note.is_sounding() && note.note.duration <= tier.threshold();
        let row_change = i > 0 && notes[i - 1].system_index != note.system_index;
        let should_break = row_change || note.note.beam_break || count >= group_size.max(1);

        if should_break {
            if let Some(start) = group_start.take() {
                close(start, i - 1, &mut segments);
                count = 0;
            }
        }

        if eligible {
            if group_start.is_none() {
                group_start = Some(i);
            }
            count += 1;
        } else if let Some(start) = group_start.take() {
            close(start, i - 1, &mut segments);
            count = 0;
        }
    }

    if let Some(start) = group_start {
        close(start, notes.len() - 1, &mut segments);
    }

    segments
}

fn segment(
    first: &PlacedNote,
    last: &PlacedNote,
    note_count: usize,
    tier: BeamTier,
    config: &LayoutConfig,
) -> BeamSegment {
    let offset = tier.offset(config);
    BeamSegment {
        track_index: first.track_index,
        tier,
        first_note: first.note_index,
        last_note: last.note_index,
        note_count,
        x1: first.x - config.beam_overhang,
        y1: first.y - offset,
        x2: last.x + config.beam_overhang,
        y2: last.y - offset,
    }
}

/// Both beam tiers for every voice of a layout.
pub fn beams_for_layout(layout: &ScoreLayout, config: &LayoutConfig) -> Vec<BeamSegment> {
    let mut out = Vec::new();
    for track_idx in 0..layout.track_count() {
        let notes = layout.track_notes(track_idx);
        for tier in [BeamTier::Eighth, BeamTier::Sixteenth] {
            out.extend(beams(&notes, layout.beam_group_size, tier, config));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Degree, Note};

    fn placed(i: usize, note: Note, system: usize) -> PlacedNote {
        PlacedNote {
            track_index: 0,
            note_index: i,
            system_index: system,
            x: 100.0 + i as f64 * 22.5,
            y: 80.0 + system as f64 * 180.0,
            start_beat: i as f64 * 0.5,
            beat_in_bar: 0.0,
            is_overflow: false,
            note,
        }
    }

    fn eighth() -> Note {
        Note::sounding(Degree::new(1).unwrap(), 0.5)
    }

    fn sizes(segments: &[BeamSegment]) -> Vec<usize> {
        segments.iter().map(|s| s.note_count).collect()
    }

    #[test]
    fn group_size_caps_runs() {
        let owned: Vec<PlacedNote> = (0..6).map(|i| placed(i, eighth(), 0)).collect();
        let notes: Vec<&PlacedNote> = owned.iter().collect();
        let segs = beams(&notes, 4, BeamTier::Eighth, &LayoutConfig::default());
        assert_eq!(sizes(&segs), vec![4, 2]);
        assert_eq!((segs[0].first_note, segs[0].last_note), (0, 3));
        assert_eq!((segs[1].first_note, segs[1].last_note), (4, 5));
        assert_eq!(segs[0].x1, 90.0);
        assert_eq!(segs[0].y1, 80.0 - 45.0);
    }

    #[test]
    fn quarter_notes_end_runs() {
        let mut owned: Vec<PlacedNote> = (0..2).map(|i| placed(i, eighth(), 0)).collect();
        owned.push(placed(2, Note::sounding(Degree::new(2).unwrap(), 1.0), 0));
        owned.push(placed(3, eighth(), 0));
        let notes: Vec<&PlacedNote> = owned.iter().collect();
        let segs = beams(&notes, 4, BeamTier::Eighth, &LayoutConfig::default());
        assert_eq!(sizes(&segs), vec![2, 1]);
    }

    #[test]
    fn manual_break_and_row_change() {
        let mut owned: Vec<PlacedNote> = (0..6).map(|i| placed(i, eighth(), 0)).collect();
        owned[2].note.beam_break = true;
        owned[4].system_index = 1;
        owned[5].system_index = 1;
        let notes: Vec<&PlacedNote> = owned.iter().collect();
        let segs = beams(&notes, 4, BeamTier::Eighth, &LayoutConfig::default());
        assert_eq!(sizes(&segs), vec![2, 2, 2]);
    }

    #[test]
    fn rests_and_extensions_are_not_beamed() {
        let owned = vec![
            placed(0, eighth(), 0),
            placed(1, Note::extension(0.5), 0),
            placed(2, Note::rest(0.5), 0),
            placed(3, eighth(), 0),
        ];
        let notes: Vec<&PlacedNote> = owned.iter().collect();
        let segs = beams(&notes, 4, BeamTier::Eighth, &LayoutConfig::default());
        assert_eq!(sizes(&segs), vec![1, 1]);
    }

    #[test]
    fn sixteenth_tier_only_takes_short_notes() {
        let mut owned: Vec<PlacedNote> = (0..4).map(|i| placed(i, eighth(), 0)).collect();
        owned[1].note.duration = 0.25;
        owned[2].note.duration = 0.25;
        let notes: Vec<&PlacedNote> = owned.iter().collect();
        let config = LayoutConfig::default();
        assert_eq!(sizes(&beams(&notes, 4, BeamTier::Eighth, &config)), vec![4]);
        let sixteenths = beams(&notes, 4, BeamTier::Sixteenth, &config);
        assert_eq!(sizes(&sixteenths), vec![2]);
        assert_eq!(sixteenths[0].y1, 80.0 - 53.0);
    }

    #[test]
    fn empty_input() {
        assert!(beams(&[], 4, BeamTier::Eighth, &LayoutConfig::default()).is_empty());
    }
}
