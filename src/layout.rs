//! Score layout — turns the flat note lists of all voices into absolute
//! positions on the page.
//!
//! Bars are metrically fixed-width: every beat gets the same horizontal
//! space regardless of what is written, so all voices of a system line up
//! vertically. Systems hold a fixed number of bars and simply wrap.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::model::Note;
use crate::transpose::DisplayScore;

/// Tolerance for beat comparisons.
pub const BEAT_EPSILON: f64 = 0.01;

/// Offset of voice labels left of the music block.
const LABEL_OFFSET_X: f64 = 40.0;
/// Offset of the system's opening bar line left of the music block.
const LEADING_BARLINE_OFFSET_X: f64 = 25.0;
/// Bar lines reach this far above the first row...
const BARLINE_TOP_EXTEND: f64 = 30.0;
/// ...and this far below the last row.
const BARLINE_BOTTOM_EXTEND: f64 = 65.0;
/// Lyric baseline below the last row of a system.
const LYRIC_OFFSET_Y: f64 = 50.0;
/// Bottom margin after the last system.
const BOTTOM_MARGIN: f64 = 100.0;

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

/// One drawable item with absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutElement {
    /// Voice name at the left of a row
    Label { text: String, x: f64, y: f64 },
    /// Vertical bar line spanning all voices of a system
    Barline { x: f64, y1: f64, y2: f64 },
    Note(PlacedNote),
    /// One syllable under a column
    Lyric { text: String, x: f64, y: f64 },
}

/// A note (or rest, or extension marker) with its page position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNote {
    pub track_index: usize,
    /// Index into the track's note list
    pub note_index: usize,
    pub system_index: usize,
    pub x: f64,
    pub y: f64,
    /// Beat offset from the start of the piece
    pub start_beat: f64,
    pub beat_in_bar: f64,
    /// The note runs past the end of its bar
    pub is_overflow: bool,
    pub note: Note,
}

/// Result of laying out a score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreLayout {
    pub elements: Vec<LayoutElement>,
    pub total_height: f64,
    pub system_count: usize,
    /// Baseline of the first voice row of each system
    pub system_origins: Vec<f64>,
    /// Distance from the first to the last voice row of a system
    pub system_height: f64,
    pub beats_per_bar: f64,
    pub beats_per_system: f64,
    pub beam_group_size: usize,
}

impl ScoreLayout {
    /// All placed notes in emission order (system, track, note).
    pub fn notes(&self) -> impl Iterator<Item = &PlacedNote> {
        self.elements.iter().filter_map(|e| match e {
            LayoutElement::Note(n) => Some(n),
            _ => None,
        })
    }

    /// Placed notes of one voice, left to right across systems.
    pub fn track_notes(&self, track_index: usize) -> Vec<&PlacedNote> {
        self.notes()
            .filter(|n| n.track_index == track_index)
            .collect()
    }

    /// Number of voices present in the layout.
    pub fn track_count(&self) -> usize {
        self.notes().map(|n| n.track_index + 1).max().unwrap_or(0)
    }

    /// Find the placed note for a given track/note index.
    pub fn find_note(&self, track_index: usize, note_index: usize) -> Option<&PlacedNote> {
        self.notes()
            .find(|n| n.track_index == track_index && n.note_index == note_index)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Main layout computation
// ═══════════════════════════════════════════════════════════════════════

/// Lay out every voice of the display view.
///
/// Never fails: an empty score yields no elements and the minimum page
/// height, and voices of different lengths are fine.
pub fn layout(view: &DisplayScore, config: &LayoutConfig) -> ScoreLayout {
    let time = view.meta.time_signature;
    let profile = time.profile();
    let beats_per_bar = profile.beats_per_bar as f64;
    let beats_per_system = beats_per_bar * time.bars_per_system() as f64;

    if view.tracks.is_empty() {
        return ScoreLayout {
            elements: Vec::new(),
            total_height: config.min_height,
            system_count: 0,
            system_origins: Vec::new(),
            system_height: 0.0,
            beats_per_bar,
            beats_per_system,
            beam_group_size: profile.beam_group_size,
        };
    }

    // Running beat offset of every note; extensions advance the cursor too.
    let mut max_beat: f64 = 0.0;
    let start_beats: Vec<Vec<f64>> = view
        .tracks
        .iter()
        .map(|track| {
            let mut cursor = 0.0;
            let starts = track
                .notes
                .iter()
                .map(|note| {
                    let start = cursor;
                    cursor += note.duration;
                    start
                })
                .collect();
            max_beat = max_beat.max(cursor);
            starts
        })
        .collect();

    let system_count = ((max_beat / beats_per_system).ceil() as usize).max(1);
    let system_height = (view.tracks.len() as f64 - 1.0) * config.voice_spacing;

    log::debug!(
        "layout: {} tracks, {:.2} beats, {} systems of {} beats",
        view.tracks.len(),
        max_beat,
        system_count,
        beats_per_system
    );

    let mut elements = Vec::new();
    let mut system_origins = Vec::with_capacity(system_count);
    let mut current_y = config.start_y;

    for system_idx in 0..system_count {
        let system_start = system_idx as f64 * beats_per_system;
        let system_end = system_start + beats_per_system;
        let origin_x = config.start_x;
        system_origins.push(current_y);

        for (i, track) in view.tracks.iter().enumerate() {
            elements.push(LayoutElement::Label {
                text: track.name.clone(),
                x: origin_x - LABEL_OFFSET_X,
                y: current_y + i as f64 * config.voice_spacing,
            });
        }

        let y1 = current_y - BARLINE_TOP_EXTEND;
        let y2 = current_y + system_height + BARLINE_BOTTOM_EXTEND;
        elements.push(LayoutElement::Barline {
            x: origin_x - LEADING_BARLINE_OFFSET_X,
            y1,
            y2,
        });
        for bar in 1..=time.bars_per_system() {
            let x = origin_x + bar as f64 * beats_per_bar * config.beat_spacing
                - config.beat_spacing / 2.0;
            elements.push(LayoutElement::Barline { x, y1, y2 });
        }

        // First lyric per column wins, across all voices.
        let mut column_lyrics: Vec<(f64, String)> = Vec::new();

        for (track_idx, track) in view.tracks.iter().enumerate() {
            for (note_idx, note) in track.notes.iter().enumerate() {
                let start_beat = start_beats[track_idx][note_idx];
                if start_beat < system_start || start_beat >= system_end {
                    continue;
                }

                let x = origin_x + (start_beat - system_start) * config.beat_spacing;
                let y = current_y + track_idx as f64 * config.voice_spacing;
                let beat_in_bar = start_beat.rem_euclid(beats_per_bar);
                let is_overflow = beat_in_bar + note.duration > beats_per_bar + BEAT_EPSILON;

                if let Some(text) = note.lyric_text() {
                    if !column_lyrics.iter().any(|(cx, _)| (cx - x).abs() < 1e-6) {
                        column_lyrics.push((x, text.to_string()));
                    }
                }

                elements.push(LayoutElement::Note(PlacedNote {
                    track_index: track_idx,
                    note_index: note_idx,
                    system_index: system_idx,
                    x,
                    y,
                    start_beat,
                    beat_in_bar,
                    is_overflow,
                    note: note.clone(),
                }));
            }
        }

        for (x, text) in column_lyrics {
            elements.push(LayoutElement::Lyric {
                text,
                x,
                y: current_y + system_height + LYRIC_OFFSET_Y,
            });
        }

        current_y += system_height + config.system_spacing;
    }

    ScoreLayout {
        elements,
        total_height: config.min_height.max(current_y + BOTTOM_MARGIN),
        system_count,
        system_origins,
        system_height,
        beats_per_bar,
        beats_per_system,
        beam_group_size: profile.beam_group_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Degree, Score, TimeSignature, Track};
    use crate::pitch::Instrument;

    fn quarter(d: u8) -> Note {
        Note::sounding(Degree::new(d).unwrap(), 1.0)
    }

    fn one_track(notes: Vec<Note>) -> DisplayScore {
        let mut score = Score::new();
        let mut track = Track::new(1, "Soprano", Instrument::Piano);
        track.notes = notes;
        score.tracks.push(track);
        DisplayScore::new(&score)
    }

    #[test]
    fn empty_score_has_min_height() {
        let view = DisplayScore::new(&Score::new());
        let layout = layout(&view, &LayoutConfig::default());
        assert!(layout.elements.is_empty());
        assert_eq!(layout.total_height, 1000.0);
        assert_eq!(layout.system_count, 0);
    }

    #[test]
    fn twenty_quarters_in_four_four_make_two_systems() {
        let view = one_track((0..20).map(|i| quarter(i % 7 + 1)).collect());
        let layout = layout(&view, &LayoutConfig::default());
        assert_eq!(layout.system_count, 2);
        let notes: Vec<_> = layout.notes().collect();
        assert_eq!(notes.len(), 20);
        assert_eq!(notes[15].system_index, 0);
        assert_eq!(notes[16].system_index, 1);
        // First note of the second system restarts at the left edge
        assert_eq!(notes[16].x, 100.0);
        assert_eq!(notes[16].y, 80.0 + 180.0);
        assert_eq!(layout.system_origins, vec![80.0, 260.0]);
    }

    #[test]
    fn unequal_tracks_are_laid_out_independently() {
        let mut score = Score::new();
        score.meta.time_signature = TimeSignature::FourFour;
        for (i, len) in [21usize, 1, 1, 1].into_iter().enumerate() {
            let mut track = Track::new(i as u64 + 1, "Voice", Instrument::Piano);
            track.notes = (0..len).map(|n| quarter((n % 7) as u8 + 1)).collect();
            score.tracks.push(track);
        }
        let layout = layout(&DisplayScore::new(&score), &LayoutConfig::default());

        // The longest voice decides how many systems the page has
        assert_eq!(layout.system_count, 2);
        let counts: Vec<usize> = (0..4).map(|t| layout.track_notes(t).len()).collect();
        assert_eq!(counts, vec![21, 1, 1, 1]);

        let second: Vec<_> = layout
            .track_notes(0)
            .into_iter()
            .filter(|n| n.system_index == 1)
            .collect();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].x, 100.0);
        assert!((1..4).all(|t| layout.track_notes(t)[0].system_index == 0));
        assert!(layout.notes().all(|n| !n.is_overflow));
    }

    #[test]
    fn empty_track_still_yields_one_system() {
        let view = one_track(Vec::new());
        let layout = layout(&view, &LayoutConfig::default());
        assert_eq!(layout.system_count, 1);
        assert_eq!(layout.notes().count(), 0);
    }

    #[test]
    fn note_positions_follow_beats() {
        let mut eighth = quarter(2);
        eighth.duration = 0.5;
        let view = one_track(vec![quarter(1), eighth, Note::extension(0.5), quarter(3)]);
        let layout = layout(&view, &LayoutConfig::default());
        let xs: Vec<f64> = layout.notes().map(|n| n.x).collect();
        assert_eq!(xs, vec![100.0, 145.0, 167.5, 190.0]);
    }

    #[test]
    fn barlines_are_fixed_width() {
        let view = one_track(vec![quarter(1)]);
        let layout = layout(&view, &LayoutConfig::default());
        let bars: Vec<f64> = layout
            .elements
            .iter()
            .filter_map(|e| match e {
                LayoutElement::Barline { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(bars, vec![75.0, 257.5, 437.5, 617.5, 797.5]);
    }

    #[test]
    fn overflow_is_flagged_past_bar_end() {
        let mut long = quarter(1);
        long.duration = 1.5;
        let view = one_track(vec![quarter(1), quarter(2), quarter(3), long]);
        let layout = layout(&view, &LayoutConfig::default());
        let flags: Vec<bool> = layout.notes().map(|n| n.is_overflow).collect();
        assert_eq!(flags, vec![false, false, false, true]);

        let view = one_track(vec![quarter(1), quarter(2), quarter(3), quarter(4)]);
        let layout = super::layout(&view, &LayoutConfig::default());
        assert!(layout.notes().all(|n| !n.is_overflow));
    }

    #[test]
    fn lyrics_first_writer_wins_per_column() {
        let mut score = Score::new();
        for (id, name, lyric) in [(1, "S", "Ha"), (2, "A", "Hey")] {
            let mut t = Track::new(id, name, Instrument::Piano);
            let mut n = quarter(1);
            n.lyric = Some(lyric.to_string());
            t.notes.push(n);
            let mut n2 = quarter(2);
            if id == 2 {
                n2.lyric = Some("le".to_string());
            }
            t.notes.push(n2);
            score.tracks.push(t);
        }
        let layout = layout(&DisplayScore::new(&score), &LayoutConfig::default());
        let lyrics: Vec<(String, f64)> = layout
            .elements
            .iter()
            .filter_map(|e| match e {
                LayoutElement::Lyric { text, x, .. } => Some((text.clone(), *x)),
                _ => None,
            })
            .collect();
        assert_eq!(lyrics, vec![("Ha".to_string(), 100.0), ("le".to_string(), 145.0)]);
    }

    #[test]
    fn three_eight_packs_eight_bars() {
        let mut score = Score::new();
        score.meta.time_signature = TimeSignature::ThreeEight;
        let mut t = Track::new(1, "S", Instrument::Piano);
        t.notes = (0..24).map(|_| quarter(1)).collect();
        score.tracks.push(t);
        let layout = layout(&DisplayScore::new(&score), &LayoutConfig::default());
        assert_eq!(layout.beats_per_system, 24.0);
        assert_eq!(layout.system_count, 1);
    }

    #[test]
    fn total_height_grows_with_systems() {
        let view = one_track((0..40).map(|_| quarter(1)).collect());
        let layout = layout(&view, &LayoutConfig::default());
        assert_eq!(layout.system_count, 3);
        // 80 + 3 * 180 + 100
        assert_eq!(layout.total_height, 1000.0_f64.max(720.0));
        let tall = LayoutConfig {
            system_spacing: 400.0,
            ..LayoutConfig::default()
        };
        let layout = super::layout(&view, &tall);
        assert_eq!(layout.total_height, 80.0 + 3.0 * 400.0 + 100.0);
    }
}
