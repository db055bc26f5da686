//! Cipher note glyphs, beams and slurs.
//!
//! A note is drawn as its scale digit with octave dots above or below, a
//! slash through the digit for sharps and flats, a short stroke above for
//! staccato and a small ornament digit beneath for a grace note. Rests
//! draw as `0` and extension markers as a dash.

use crate::beams::BeamSegment;
use crate::layout::PlacedNote;
use crate::model::{Accidental, NotePitch};
use crate::slurs::SlurCurve;

use super::constants::*;
use super::svg_builder::{SvgBuilder, TextStyle};

/// How a note should stand out on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Ink {
    /// Normal weight, black
    Plain,
    /// Bold, black; the voice being edited
    Active,
    /// Greyed out; another voice is being edited
    Muted,
    /// Currently sounding during playback
    Playing,
}

impl Ink {
    fn color(self) -> &'static str {
        match self {
            Ink::Plain | Ink::Active => NOTE_COLOR,
            Ink::Muted => INACTIVE_COLOR,
            Ink::Playing => PLAYING_COLOR,
        }
    }

    fn weight(self) -> &'static str {
        match self {
            Ink::Active | Ink::Playing => "bold",
            Ink::Plain | Ink::Muted => "normal",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Single note
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn render_note(svg: &mut SvgBuilder, placed: &PlacedNote, ink: Ink) {
    let (x, y) = (placed.x, placed.y);
    let note = &placed.note;

    let color = if placed.is_overflow {
        svg.rect(
            x - BOX_HALF_WIDTH,
            y - BOX_TOP,
            BOX_HALF_WIDTH * 2.0,
            BOX_HEIGHT,
            OVERFLOW_FILL,
            OVERFLOW_COLOR,
            BOX_RADIUS,
        );
        OVERFLOW_COLOR
    } else {
        ink.color()
    };

    let digit = match note.pitch {
        NotePitch::Extension => {
            svg.line(
                x - EXTENSION_HALF_WIDTH,
                y - EXTENSION_OFFSET_Y,
                x + EXTENSION_HALF_WIDTH,
                y - EXTENSION_OFFSET_Y,
                color,
                ACCIDENTAL_WIDTH,
            );
            return;
        }
        NotePitch::Rest => {
            svg.text(x, y, "0", digit_style(color, ink));
            return;
        }
        NotePitch::Sounding(degree) => degree.get(),
    };

    svg.text(x, y, &digit.to_string(), digit_style(color, ink));

    match note.accidental {
        Some(Accidental::Sharp) => svg.line(
            x - ACCIDENTAL_HALF_WIDTH,
            y + ACCIDENTAL_LOW_Y,
            x + ACCIDENTAL_HALF_WIDTH,
            y - ACCIDENTAL_HIGH_Y,
            color,
            ACCIDENTAL_WIDTH,
        ),
        Some(Accidental::Flat) => svg.line(
            x - ACCIDENTAL_HALF_WIDTH,
            y - ACCIDENTAL_HIGH_Y,
            x + ACCIDENTAL_HALF_WIDTH,
            y + ACCIDENTAL_LOW_Y,
            color,
            ACCIDENTAL_WIDTH,
        ),
        Some(Accidental::Natural) => svg.text(
            x - NATURAL_OFFSET_X,
            y - 5.0,
            "\u{266E}",
            TextStyle::new(NATURAL_SIZE, color),
        ),
        None => {}
    }

    render_octave_dots(svg, x, y, note.octave, color);

    if note.staccato {
        svg.line(
            x - STACCATO_HALF_WIDTH,
            y - STACCATO_OFFSET_Y,
            x + STACCATO_HALF_WIDTH,
            y - STACCATO_OFFSET_Y,
            color,
            STACCATO_WIDTH,
        );
    }

    if let Some(grace) = note.grace_note {
        svg.text(
            x,
            y + GRACE_OFFSET_Y,
            &grace.get().to_string(),
            TextStyle::new(GRACE_SIZE, color).family(DIGIT_FONT),
        );
    }
}

fn digit_style(color: &str, ink: Ink) -> TextStyle<'_> {
    TextStyle::new(DIGIT_SIZE, color)
        .family(DIGIT_FONT)
        .weight(ink.weight())
}

fn render_octave_dots(svg: &mut SvgBuilder, x: f64, y: f64, octave: i8, color: &str) {
    let count = (octave.unsigned_abs() as usize).min(MAX_OCTAVE_DOTS);
    for i in 0..count {
        let step = i as f64 * OCTAVE_DOT_STEP;
        let cy = if octave > 0 {
            y - OCTAVE_DOT_ABOVE_Y - step
        } else {
            y + OCTAVE_DOT_BELOW_Y + step
        };
        svg.circle(x, cy, OCTAVE_DOT_RADIUS, color);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Beams and slurs
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn render_beams(svg: &mut SvgBuilder, beams: &[BeamSegment], ink: impl Fn(usize) -> Ink) {
    for beam in beams {
        let color = line_color(ink(beam.track_index));
        svg.line(beam.x1, beam.y1, beam.x2, beam.y2, color, BEAM_WIDTH);
    }
}

pub(super) fn render_slurs(svg: &mut SvgBuilder, slurs: &[SlurCurve], ink: impl Fn(usize) -> Ink) {
    for slur in slurs {
        let color = line_color(ink(slur.track_index));
        svg.path(&slur.path_data(), color, SLUR_WIDTH);
    }
}

/// Beams and slurs of a playing voice stay black.
fn line_color(ink: Ink) -> &'static str {
    match ink {
        Ink::Muted => INACTIVE_COLOR,
        _ => NOTE_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Degree, Note};

    fn placed(note: Note) -> PlacedNote {
        PlacedNote {
            track_index: 0,
            note_index: 0,
            system_index: 0,
            x: 100.0,
            y: 80.0,
            start_beat: 0.0,
            beat_in_bar: 0.0,
            is_overflow: false,
            note,
        }
    }

    fn draw(note: &PlacedNote, ink: Ink) -> String {
        let mut svg = SvgBuilder::new(200.0, 200.0);
        render_note(&mut svg, note, ink);
        svg.build()
    }

    #[test]
    fn digit_with_dots_and_sharp() {
        let mut note = Note::sounding(Degree::new(5).unwrap(), 1.0);
        note.octave = 2;
        note.accidental = Some(Accidental::Sharp);
        let out = draw(&placed(note), Ink::Active);
        assert!(out.contains(">5</text>"));
        assert!(out.contains(r#"font-weight="bold""#));
        assert_eq!(out.matches("<circle").count(), 2);
        assert!(out.contains(r#"cy="60.0""#));
        assert!(out.contains(r#"cy="54.0""#));
        assert!(out.contains(r#"x1="92.0" y1="86.0" x2="108.0" y2="66.0""#));
    }

    #[test]
    fn octave_dots_cap_at_three() {
        let mut note = Note::sounding(Degree::new(1).unwrap(), 1.0);
        note.octave = -3;
        let out = draw(&placed(note), Ink::Plain);
        assert_eq!(out.matches("<circle").count(), 3);
        assert!(out.contains(r#"cy="90.0""#));
    }

    #[test]
    fn rest_and_extension_glyphs() {
        let mut rest = Note::rest(1.0);
        rest.grace_note = Degree::new(3);
        rest.staccato = true;
        let out = draw(&placed(rest), Ink::Plain);
        assert!(out.contains(">0</text>"));
        assert!(!out.contains(">3</text>"));
        assert!(!out.contains("<line"));

        let out = draw(&placed(Note::extension(1.0)), Ink::Plain);
        assert!(out.contains("<line"));
        assert!(!out.contains("<text"));
    }

    #[test]
    fn overflow_is_boxed_in_red() {
        let mut p = placed(Note::default());
        p.is_overflow = true;
        let out = draw(&p, Ink::Playing);
        assert!(out.contains("<rect"));
        assert!(out.contains(OVERFLOW_FILL));
        assert!(out.contains(r##"fill="#FF0000" text-anchor="middle">1</text>"##));
    }

    #[test]
    fn grace_digit_sits_below() {
        let mut note = Note::sounding(Degree::new(2).unwrap(), 1.0);
        note.grace_note = Degree::new(7);
        let out = draw(&placed(note), Ink::Muted);
        assert!(out.contains(r#"y="125.0""#));
        assert!(out.contains(">7</text>"));
        assert!(out.contains(INACTIVE_COLOR));
    }
}
