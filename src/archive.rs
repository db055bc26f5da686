//! Zipped project bundles (`.cpz` / `.zip`).
//!
//! A bundle is a ZIP archive holding the project document as
//! `project.json`. Archives written by hand may name the document
//! differently; the first `.json` entry outside `META-INF/` is used then.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ScoreError;
use crate::model::Score;
use crate::project::{parse_project_json, project_to_json};

/// Entry name of the project document inside a bundle.
pub const DOCUMENT_ENTRY: &str = "project.json";

/// Read and parse a project bundle from raw bytes.
pub fn parse_archive(data: &[u8]) -> Result<Score, ScoreError> {
    let json = extract_document(data)?;
    parse_project_json(&json)
}

/// Extract the project document text from bundle bytes.
pub fn extract_document(data: &[u8]) -> Result<String, ScoreError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let entry_name = find_document(&mut archive)?;

    let mut entry = archive.by_name(&entry_name)?;
    let mut json = String::new();
    entry
        .read_to_string(&mut json)
        .map_err(|e| ScoreError::Archive(format!("failed to read '{entry_name}': {e}")))?;
    log::debug!("archive: read {} bytes from '{}'", json.len(), entry_name);
    Ok(json)
}

fn find_document(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ScoreError> {
    if archive.by_name(DOCUMENT_ENTRY).is_ok() {
        return Ok(DOCUMENT_ENTRY.to_string());
    }

    (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .find(|name| !name.starts_with("META-INF/") && name.to_ascii_lowercase().ends_with(".json"))
        .ok_or_else(|| ScoreError::Archive("no project document in archive".to_string()))
}

/// Write a score as a deflate-compressed bundle.
pub fn write_archive(score: &Score) -> Result<Vec<u8>, ScoreError> {
    let json = project_to_json(score)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(DOCUMENT_ENTRY, options)?;
    writer
        .write_all(json.as_bytes())
        .map_err(|e| ScoreError::Archive(format!("failed to write '{DOCUMENT_ENTRY}': {e}")))?;
    Ok(writer.finish()?.into_inner())
}

/// Whether `data` starts with a ZIP local-file signature.
pub fn looks_like_archive(data: &[u8]) -> bool {
    data.starts_with(b"PK\x03\x04")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn bundle_round_trip() {
        let mut score = Score::satb();
        score.meta.title = "Bundled".into();
        let bytes = write_archive(&score).unwrap();
        assert!(looks_like_archive(&bytes));
        assert_eq!(parse_archive(&bytes).unwrap(), score);
    }

    #[test]
    fn falls_back_to_any_json_entry() {
        let bytes = zip_with(&[
            ("META-INF/manifest.json", "{}"),
            ("songs/hymn.json", r#"{"meta": {"title": "Hymn"}}"#),
        ]);
        assert_eq!(parse_archive(&bytes).unwrap().meta.title, "Hymn");
    }

    #[test]
    fn missing_document_is_an_error() {
        let bytes = zip_with(&[("readme.txt", "hello")]);
        assert!(matches!(parse_archive(&bytes), Err(ScoreError::Archive(_))));
        assert!(matches!(
            parse_archive(b"not a zip"),
            Err(ScoreError::Archive(_))
        ));
    }
}
