//! Playback map: ties each scheduled tone to the position of its note in
//! the rendered page. This is the bridge between playback time and the
//! highlight cursor in the SVG.
//!
//! A shell looks up the cue whose `[start_secs, end_secs)` contains the
//! current transport position and highlights the note at `(x, y)`.

use serde::Serialize;

use crate::layout::ScoreLayout;
use crate::schedule::Schedule;

/// Complete playback map combining visual positions with timing data.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackMap {
    pub tempo_bpm: u32,
    /// Length of the whole run in seconds
    pub duration_secs: f64,
    /// Vertical band of each system row, for page scrolling
    pub systems: Vec<SystemPosition>,
    /// One cue per sounding (non-grace) tone, ordered by start time
    pub cues: Vec<NoteCue>,
}

/// Vertical extent of one system row in SVG units.
#[derive(Debug, Clone, Serialize)]
pub struct SystemPosition {
    pub y: f64,
    pub height: f64,
}

/// Timing and position of one highlighted note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteCue {
    pub track_index: usize,
    pub note_index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub x: f64,
    pub y: f64,
    pub system_index: usize,
}

/// Join a schedule with the layout built from the same view.
///
/// Tones whose note has no laid-out position (which only happens when the
/// two inputs disagree) are left out.
pub fn generate_playback_map(layout: &ScoreLayout, schedule: &Schedule) -> PlaybackMap {
    let cues: Vec<NoteCue> = schedule
        .events()
        .into_iter()
        .filter(|e| !e.is_grace)
        .filter_map(|e| {
            let placed = layout.find_note(e.track_index, e.note_index)?;
            Some(NoteCue {
                track_index: e.track_index,
                note_index: e.note_index,
                start_secs: e.start_secs,
                end_secs: e.start_secs + e.duration_secs,
                x: placed.x,
                y: placed.y,
                system_index: placed.system_index,
            })
        })
        .collect();

    let systems = layout
        .system_origins
        .iter()
        .map(|&y| SystemPosition {
            y,
            height: layout.system_height,
        })
        .collect();

    PlaybackMap {
        tempo_bpm: schedule.tempo_bpm,
        duration_secs: schedule.duration_secs(),
        systems,
        cues,
    }
}

impl PlaybackMap {
    /// Cues sounding at `position_secs`, at most one per voice.
    pub fn cues_at(&self, position_secs: f64) -> Vec<&NoteCue> {
        self.cues
            .iter()
            .filter(|c| c.start_secs <= position_secs && position_secs < c.end_secs)
            .collect()
    }
}

/// Serialize a PlaybackMap to JSON.
pub fn playback_map_to_json(map: &PlaybackMap) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}
