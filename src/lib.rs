//! cipherscore — numbered (cipher / jianpu) notation engine.
//!
//! Loads choir projects written as scale degrees, lays them out on fixed
//! width bars, groups beams and slurs, resolves every note into absolute
//! playback timings and MIDI pitches, and renders the page as SVG.
//!
//! # Example
//! ```no_run
//! use cipherscore::{parse_file, render_score_to_svg, schedule, DisplayScore, RenderOptions};
//!
//! let score = parse_file("samples/malam-kudus.json").unwrap();
//! println!("Title: {}", score.meta.title);
//! println!("Voices: {}", score.tracks.len());
//!
//! let svg = render_score_to_svg(&score, &RenderOptions::default());
//! let events = schedule(&DisplayScore::new(&score));
//! println!("{} bytes of SVG, {:.1}s of music", svg.len(), events.duration_secs());
//! ```

pub mod archive;
pub mod beams;
pub mod config;
pub mod duration;
pub mod edit;
pub mod error;
pub mod layout;
pub mod midi;
pub mod model;
pub mod pitch;
pub mod playback;
pub mod project;
pub mod renderer;
pub mod schedule;
pub mod slurs;
pub mod transport;
pub mod transpose;

#[cfg(target_os = "android")]
pub mod android;

use std::path::Path;

pub use archive::{looks_like_archive, parse_archive, write_archive};
pub use beams::{beams_for_layout, BeamSegment, BeamTier};
pub use config::LayoutConfig;
pub use error::ScoreError;
pub use layout::{layout, LayoutElement, PlacedNote, ScoreLayout};
pub use midi::{export_midi, MidiExport};
pub use model::*;
pub use pitch::Instrument;
pub use playback::{generate_playback_map, playback_map_to_json, PlaybackMap};
pub use project::{parse_project_bytes, parse_project_json, project_to_json};
pub use renderer::{render_score_to_svg, RenderOptions};
pub use schedule::{schedule, Schedule, ToneEvent};
pub use slurs::{slurs_for_layout, SlurCurve};
pub use transport::{PlayerState, ToneSink, Transport};
pub use transpose::DisplayScore;

/// Load a project from a file path.
/// Detects the format from the file extension:
/// - `.json` → plain project document
/// - `.cpz` or `.zip` → zipped bundle
///
/// Anything else is sniffed from its first bytes.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score, ScoreError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ScoreError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Load a project from raw bytes with an optional format hint.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score, ScoreError> {
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("cpz") | Some("zip") => parse_archive(data),
        Some("json") => parse_project_bytes(data),
        _ if looks_like_archive(data) => parse_archive(data),
        _ => parse_project_bytes(data),
    }
}

/// Save a project; `.cpz` and `.zip` paths get a zipped bundle, anything
/// else the plain JSON document.
pub fn save_file<P: AsRef<Path>>(score: &Score, path: P) -> Result<(), ScoreError> {
    let path = path.as_ref();
    let bundled = matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("cpz") | Some("zip")
    );

    let bytes = if bundled {
        write_archive(score)?
    } else {
        project_to_json(score)?.into_bytes()
    };

    std::fs::write(path, bytes).map_err(|source| ScoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("saved '{}' to {}", score.meta.title, path.display());
    Ok(())
}

/// Lay out a score and serialize the positioned elements.
pub fn layout_to_json(score: &Score, config: &LayoutConfig) -> Result<String, ScoreError> {
    let result = layout(&DisplayScore::new(score), config);
    Ok(serde_json::to_string(&result)?)
}

/// Load a project file and render it directly to SVG.
pub fn render_file_to_svg<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String, ScoreError> {
    let score = parse_file(path)?;
    Ok(render_score_to_svg(&score, options))
}

/// Load project bytes and render them to SVG.
pub fn render_bytes_to_svg(
    data: &[u8],
    extension: Option<&str>,
    options: &RenderOptions,
) -> Result<String, ScoreError> {
    let score = parse_bytes(data, extension)?;
    Ok(render_score_to_svg(&score, options))
}

/// Load project bytes and export them as a Standard MIDI File.
pub fn midi_bytes(data: &[u8], extension: Option<&str>) -> Result<Vec<u8>, ScoreError> {
    let score = parse_bytes(data, extension)?;
    Ok(export_midi(&DisplayScore::new(&score)).to_smf())
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

fn render_options(active_track: i32) -> RenderOptions {
    RenderOptions {
        active_track: usize::try_from(active_track).ok(),
        ..RenderOptions::default()
    }
}

/// Render a project JSON document to SVG as a C string.
/// The caller must free the returned string with `cipherscore_free_string`.
///
/// `active_track` highlights one voice; pass -1 to draw all voices alike.
///
/// # Safety
/// `json` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn cipherscore_render_json(
    json: *const c_char,
    active_track: i32,
) -> *mut c_char {
    if json.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(json) };
    let text = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    match parse_project_json(text) {
        Ok(score) => {
            let svg = render_score_to_svg(&score, &render_options(active_track));
            CString::new(svg).unwrap_or_default().into_raw()
        }
        Err(e) => {
            log::warn!("cipherscore_render_json: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Export a project JSON document as Standard MIDI File bytes.
/// The byte count is written to `out_len`; the caller must free the buffer
/// with `cipherscore_free_bytes`.
///
/// # Safety
/// `json` must be a valid null-terminated UTF-8 C string and `out_len` a
/// valid pointer.
#[no_mangle]
pub unsafe extern "C" fn cipherscore_midi_json(
    json: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    if json.is_null() || out_len.is_null() {
        return std::ptr::null_mut();
    }
    let text = match unsafe { CStr::from_ptr(json) }.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    match midi_bytes(text.as_bytes(), Some("json")) {
        Ok(bytes) => {
            let boxed = bytes.into_boxed_slice();
            unsafe { *out_len = boxed.len() };
            Box::into_raw(boxed) as *mut u8
        }
        Err(e) => {
            log::warn!("cipherscore_midi_json: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by cipherscore functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a cipherscore function, or null.
#[no_mangle]
pub unsafe extern "C" fn cipherscore_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

/// Free a buffer previously returned by `cipherscore_midi_json`.
///
/// # Safety
/// `ptr` and `len` must come from one `cipherscore_midi_json` call, or `ptr`
/// must be null.
#[no_mangle]
pub unsafe extern "C" fn cipherscore_free_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"meta": {"title": "Tiny"}, "tracks": [
        {"id": 1, "name": "Soprano", "notes": [{"pitch": 1}, {"pitch": 5, "duration": 2}]}
    ]}"#;

    #[test]
    fn parse_bytes_sniffs_archives() {
        let score = parse_bytes(DOC.as_bytes(), None).unwrap();
        let zipped = write_archive(&score).unwrap();
        assert_eq!(parse_bytes(&zipped, None).unwrap(), score);
        assert_eq!(parse_bytes(&zipped, Some("CPZ")).unwrap(), score);
        assert!(parse_bytes(&zipped, Some("json")).is_err());
    }

    #[test]
    fn ffi_render_and_midi() {
        let json = CString::new(DOC).unwrap();
        unsafe {
            let svg = cipherscore_render_json(json.as_ptr(), 0);
            assert!(!svg.is_null());
            let text = CStr::from_ptr(svg).to_str().unwrap().to_string();
            cipherscore_free_string(svg);
            assert!(text.contains(">Tiny</text>"));

            let mut len = 0usize;
            let midi = cipherscore_midi_json(json.as_ptr(), &mut len);
            assert!(!midi.is_null());
            let bytes = std::slice::from_raw_parts(midi, len).to_vec();
            cipherscore_free_bytes(midi, len);
            assert_eq!(&bytes[..4], b"MThd");

            let bad = CString::new("{not json").unwrap();
            assert!(cipherscore_render_json(bad.as_ptr(), -1).is_null());
            assert!(cipherscore_render_json(std::ptr::null(), -1).is_null());
        }
    }

    #[test]
    fn layout_serializes_tagged_elements() {
        let score = parse_project_json(DOC).unwrap();
        let json = layout_to_json(&score, &LayoutConfig::default()).unwrap();
        assert!(json.contains(r#""type":"label""#));
        assert!(json.contains(r#""type":"note""#));
        assert!(json.contains(r#""type":"barline""#));
    }
}
