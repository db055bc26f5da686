//! Shared constants for the cipher renderer (all in SVG user units).
//!
//! Geometry that decides where things go lives in `LayoutConfig`; these
//! are the drawing details around it.

// ── Header ──────────────────────────────────────────────────────────
pub(super) const HEADER_HEIGHT: f64 = 130.0; // band above the first system
pub(super) const TITLE_Y: f64 = 40.0;
pub(super) const SUBTITLE_Y: f64 = 64.0;
pub(super) const CREDITS_Y: f64 = 94.0;
pub(super) const INFO_Y: f64 = 118.0; // "Do = C  4/4  ♩ = 100"
pub(super) const CREDITS_MARGIN_X: f64 = 30.0;
pub(super) const TITLE_SIZE: f64 = 32.0;
pub(super) const SUBTITLE_SIZE: f64 = 18.0;
pub(super) const CREDITS_SIZE: f64 = 15.0;

// ── Page furniture ──────────────────────────────────────────────────
pub(super) const LABEL_SIZE: f64 = 14.0;
pub(super) const LYRIC_SIZE: f64 = 16.0;
pub(super) const BARLINE_WIDTH: f64 = 2.0;

// ── Cipher note glyph ───────────────────────────────────────────────
pub(super) const DIGIT_SIZE: f64 = 24.0;
pub(super) const GRACE_OFFSET_Y: f64 = 45.0; // grace digit sits below the host
pub(super) const GRACE_SIZE: f64 = 16.0;
pub(super) const ACCIDENTAL_HALF_WIDTH: f64 = 8.0;
pub(super) const ACCIDENTAL_LOW_Y: f64 = 6.0; // below the digit baseline
pub(super) const ACCIDENTAL_HIGH_Y: f64 = 14.0; // above the digit baseline
pub(super) const ACCIDENTAL_WIDTH: f64 = 2.0;
pub(super) const NATURAL_OFFSET_X: f64 = 14.0;
pub(super) const NATURAL_SIZE: f64 = 20.0;
pub(super) const MAX_OCTAVE_DOTS: usize = 3;
pub(super) const OCTAVE_DOT_RADIUS: f64 = 1.8;
pub(super) const OCTAVE_DOT_STEP: f64 = 6.0;
pub(super) const OCTAVE_DOT_ABOVE_Y: f64 = 20.0;
pub(super) const OCTAVE_DOT_BELOW_Y: f64 = 10.0;
pub(super) const STACCATO_OFFSET_Y: f64 = 40.0;
pub(super) const STACCATO_HALF_WIDTH: f64 = 3.0;
pub(super) const STACCATO_WIDTH: f64 = 2.5;
pub(super) const EXTENSION_HALF_WIDTH: f64 = 7.0; // dash drawn for an extension
pub(super) const EXTENSION_OFFSET_Y: f64 = 8.0;

// ── Note box (overflow / highlight) ─────────────────────────────────
pub(super) const BOX_HALF_WIDTH: f64 = 12.0;
pub(super) const BOX_TOP: f64 = 50.0;
pub(super) const BOX_HEIGHT: f64 = 90.0;
pub(super) const BOX_RADIUS: f64 = 4.0;

// ── Beams & slurs ───────────────────────────────────────────────────
pub(super) const BEAM_WIDTH: f64 = 2.0;
pub(super) const SLUR_WIDTH: f64 = 1.5;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const NOTE_COLOR: &str = "black";
pub(super) const INACTIVE_COLOR: &str = "#aaaaaa";
pub(super) const PLAYING_COLOR: &str = "#D50000";
pub(super) const OVERFLOW_COLOR: &str = "#FF0000";
pub(super) const OVERFLOW_FILL: &str = "rgba(255, 0, 0, 0.1)";
pub(super) const LABEL_COLOR: &str = "#888888";
pub(super) const LYRIC_COLOR: &str = "#444444";
pub(super) const BARLINE_COLOR: &str = "#cccccc";
pub(super) const HEADER_COLOR: &str = "#1a1a1a";
pub(super) const SUBTITLE_COLOR: &str = "#666666";

// ── Fonts ───────────────────────────────────────────────────────────
pub(super) const DIGIT_FONT: &str = "monospace";
pub(super) const TEXT_FONT: &str = "Arial, sans-serif";
