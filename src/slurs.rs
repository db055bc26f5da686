//! Slur pairing: each note with a `slur_length` arcs to the rendered note
//! that many positions later in the same voice.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::layout::{PlacedNote, ScoreLayout};

/// A quadratic curve above a run of notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlurCurve {
    pub track_index: usize,
    pub from_note: usize,
    pub to_note: usize,
    pub start: (f64, f64),
    pub control: (f64, f64),
    pub end: (f64, f64),
}

impl SlurCurve {
    /// SVG path data (`M ... Q ...`).
    pub fn path_data(&self) -> String {
        format!(
            "M {:.1} {:.1} Q {:.1} {:.1} {:.1} {:.1}",
            self.start.0, self.start.1, self.control.0, self.control.1, self.end.0, self.end.1
        )
    }
}

/// Pair slurs within one voice.
///
/// Extension markers are skipped when counting ahead. A slur whose target
/// is missing or sits on another system row is dropped rather than drawn
/// across the break.
pub fn slurs(notes: &[&PlacedNote], config: &LayoutConfig) -> Vec<SlurCurve> {
    let rendered: Vec<&PlacedNote> = notes
        .iter()
        .copied()
        .filter(|n| !n.note.is_extension())
        .collect();

    let mut curves = Vec::new();
    for (i, from) in rendered.iter().enumerate() {
        let len = from.note.slur_length as usize;
        if len == 0 {
            continue;
        }
        let Some(to) = rendered.get(i + len) else {
            continue;
        };
        if to.system_index != from.system_index || (to.y - from.y).abs() > f64::EPSILON {
            continue;
        }

        let sy = from.y - config.slur_arc_offset;
        let ey = to.y - config.slur_arc_offset;
        curves.push(SlurCurve {
            track_index: from.track_index,
            from_note: from.note_index,
            to_note: to.note_index,
            start: (from.x, sy),
            control: ((from.x + to.x) / 2.0, sy - config.slur_lift),
            end: (to.x, ey),
        });
    }
    curves
}

/// Slurs for every voice of a layout.
pub fn slurs_for_layout(layout: &ScoreLayout, config: &LayoutConfig) -> Vec<SlurCurve> {
    (0..layout.track_count())
        .flat_map(|t| slurs(&layout.track_notes(t), config))
        .collect()
}
