//! Header, voice labels, bar lines and lyric rendering.

use crate::layout::{LayoutElement, ScoreLayout};
use crate::model::ScoreMeta;
use crate::pitch::key_label;

use super::constants::*;
use super::svg_builder::{SvgBuilder, TextStyle};

// ═══════════════════════════════════════════════════════════════════════
// Header rendering
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn render_header(svg: &mut SvgBuilder, meta: &ScoreMeta, page_width: f64) {
    let center_x = page_width / 2.0;

    svg.text(
        center_x,
        TITLE_Y,
        &meta.title,
        TextStyle::new(TITLE_SIZE, HEADER_COLOR).weight("bold"),
    );

    if let Some(ref subtitle) = meta.subtitle {
        svg.text(
            center_x,
            SUBTITLE_Y,
            subtitle,
            TextStyle::new(SUBTITLE_SIZE, SUBTITLE_COLOR),
        );
    }

    if let Some(ref lyricist) = meta.lyricist {
        svg.text(
            CREDITS_MARGIN_X,
            CREDITS_Y,
            &format!("Lyrics: {lyricist}"),
            TextStyle::new(CREDITS_SIZE, HEADER_COLOR).anchor("start"),
        );
    }
    if let Some(ref composer) = meta.composer {
        svg.text(
            page_width - CREDITS_MARGIN_X,
            CREDITS_Y,
            &format!("Music: {composer}"),
            TextStyle::new(CREDITS_SIZE, HEADER_COLOR).anchor("end"),
        );
    }

    let info = format!(
        "{}   {}   \u{2669} = {}",
        key_label(meta.key),
        meta.time_signature.label(),
        meta.tempo_bpm
    );
    svg.text(
        CREDITS_MARGIN_X,
        INFO_Y,
        &info,
        TextStyle::new(CREDITS_SIZE, HEADER_COLOR)
            .anchor("start")
            .weight("bold"),
    );
}

// ═══════════════════════════════════════════════════════════════════════
// System furniture
// ═══════════════════════════════════════════════════════════════════════

/// Bar lines first so notes draw over them, then labels and lyrics.
pub(super) fn render_system_furniture(svg: &mut SvgBuilder, layout: &ScoreLayout) {
    for element in &layout.elements {
        if let LayoutElement::Barline { x, y1, y2 } = element {
            svg.line(*x, *y1, *x, *y2, BARLINE_COLOR, BARLINE_WIDTH);
        }
    }

    for element in &layout.elements {
        match element {
            LayoutElement::Label { text, x, y } => svg.text(
                *x,
                *y,
                text,
                TextStyle::new(LABEL_SIZE, LABEL_COLOR)
                    .weight("bold")
                    .anchor("end"),
            ),
            LayoutElement::Lyric { text, x, y } => {
                svg.text(*x, *y, text, TextStyle::new(LYRIC_SIZE, LYRIC_COLOR).weight("500"))
            }
            _ => {}
        }
    }
}
