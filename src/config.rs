//! Layout geometry, in SVG user units.
//!
//! Defaults reproduce the editor's paper: 45 units per beat, voices 100
//! apart, systems separated by 180.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance of one beat
    pub beat_spacing: f64,
    /// Vertical distance between voice rows of one system
    pub voice_spacing: f64,
    /// Extra vertical gap after each system
    pub system_spacing: f64,
    /// Left edge of the music block (voice labels sit to its left)
    pub start_x: f64,
    /// Baseline of the first voice row of the first system
    pub start_y: f64,
    /// Paper is never shorter than this
    pub min_height: f64,
    /// Beam tier offsets above the note baseline
    pub eighth_beam_offset: f64,
    pub sixteenth_beam_offset: f64,
    /// How far a beam reaches past its outer notes
    pub beam_overhang: f64,
    /// Slur endpoints sit this far above the note baseline
    pub slur_arc_offset: f64,
    /// Slur control point rises this much further
    pub slur_lift: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            beat_spacing: 45.0,
            voice_spacing: 100.0,
            system_spacing: 180.0,
            start_x: 100.0,
            start_y: 80.0,
            min_height: 1000.0,
            eighth_beam_offset: 45.0,
            sixteenth_beam_offset: 53.0,
            beam_overhang: 10.0,
            slur_arc_offset: 55.0,
            slur_lift: 25.0,
        }
    }
}

impl LayoutConfig {
    /// Width of the paper needed for `beats_per_system` beats.
    pub fn page_width(&self, beats_per_system: f64) -> f64 {
        self.start_x + beats_per_system * self.beat_spacing + 80.0
    }
}
