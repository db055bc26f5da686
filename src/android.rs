//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::{jbyteArray, jint, jstring};
use jni::JNIEnv;

use crate::{midi_bytes, parse_project_json, render_score_to_svg, RenderOptions};

/// Render a project JSON document to SVG.
///
/// Called from Kotlin as:
///   external fun renderJson(json: String, activeTrack: Int): String?
#[no_mangle]
pub extern "system" fn Java_com_cipherscore_app_CipherScore_renderJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
    active_track: jint,
) -> jstring {
    let text: String = match env.get_string(&json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    let options = RenderOptions {
        active_track: usize::try_from(active_track).ok(),
        ..RenderOptions::default()
    };

    match parse_project_json(&text) {
        Ok(score) => match env.new_string(render_score_to_svg(&score, &options)) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            log::warn!("renderJson: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Export a project JSON document as Standard MIDI File bytes.
///
/// Called from Kotlin as:
///   external fun exportMidi(json: String): ByteArray?
#[no_mangle]
pub extern "system" fn Java_com_cipherscore_app_CipherScore_exportMidi(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jbyteArray {
    let text: String = match env.get_string(&json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    match midi_bytes(text.as_bytes(), Some("json")) {
        Ok(bytes) => match env.byte_array_from_slice(&bytes) {
            Ok(array) => array.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            log::warn!("exportMidi: {e}");
            std::ptr::null_mut()
        }
    }
}
