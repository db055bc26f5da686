//! Score renderer — draws a laid-out cipher score as SVG.
//!
//! The renderer never decides where anything goes: positions come from
//! [`crate::layout`], beams from [`crate::beams`] and slurs from
//! [`crate::slurs`]. It only turns those into a self-contained SVG string
//! with a title block on top.

mod constants;
mod notes;
mod staff;
mod svg_builder;

use crate::beams::beams_for_layout;
use crate::config::LayoutConfig;
use crate::layout::{layout, ScoreLayout};
use crate::model::Score;
use crate::slurs::slurs_for_layout;
use crate::transpose::DisplayScore;

use constants::*;
use notes::{render_beams, render_note, render_slurs, Ink};
use staff::{render_header, render_system_furniture};
use svg_builder::{empty_svg, SvgBuilder};

/// What to draw besides the notes themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub config: LayoutConfig,
    /// Voice being edited: drawn bold, all others greyed out
    pub active_track: Option<usize>,
    /// `(track_index, note_index)` of the note sounding right now
    pub playing: Option<(usize, usize)>,
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render a score into a complete SVG string.
///
/// Transposition is applied before layout, so the page shows the
/// accidentals as they sound.
pub fn render_score_to_svg(score: &Score, options: &RenderOptions) -> String {
    if score.tracks.is_empty() {
        return empty_svg("No voices in score");
    }

    let view = DisplayScore::new(score);
    let layout = layout(&view, &options.config);
    render_layout(&view, &layout, options)
}

/// Render an already computed layout.
pub fn render_layout(view: &DisplayScore, layout: &ScoreLayout, options: &RenderOptions) -> String {
    let page_width = options.config.page_width(layout.beats_per_system);
    let page_height = HEADER_HEIGHT + layout.total_height;

    let mut svg = SvgBuilder::new(page_width, page_height);
    svg.background("white");
    render_header(&mut svg, &view.meta, page_width);

    svg.open_group("music", 0.0, HEADER_HEIGHT);
    render_system_furniture(&mut svg, layout);

    let ink = |track_index: usize| ink_for(options, track_index, None);
    render_beams(&mut svg, &beams_for_layout(layout, &options.config), ink);
    render_slurs(&mut svg, &slurs_for_layout(layout, &options.config), ink);

    for placed in layout.notes() {
        let ink = ink_for(options, placed.track_index, Some(placed.note_index));
        render_note(&mut svg, placed, ink);
    }
    svg.close_group();

    log::debug!(
        "render: {} systems, {:.0}x{:.0}",
        layout.system_count,
        page_width,
        page_height
    );

    svg.build()
}

fn ink_for(options: &RenderOptions, track_index: usize, note_index: Option<usize>) -> Ink {
    if let (Some(playing), Some(note_index)) = (options.playing, note_index) {
        if playing == (track_index, note_index) {
            return Ink::Playing;
        }
    }
    match options.active_track {
        None => Ink::Plain,
        Some(active) if active == track_index => Ink::Active,
        Some(_) => Ink::Muted,
    }
}
