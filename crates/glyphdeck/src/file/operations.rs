//! Convenience functions for whole-file reads and atomic writes.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{FileError, FileResult};
use super::writer::AtomicWriter;

/// Reads the entire contents of a file as a UTF-8 string.
pub fn read_text(path: impl AsRef<Path>) -> FileResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| FileError::from_io(e, path))
}

/// Reads the entire contents of a file as bytes.
pub fn read_bytes(path: impl AsRef<Path>) -> FileResult<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| FileError::from_io(e, path))
}

/// Creates `path` and all missing parents. Succeeds if it already exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> FileResult<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| FileError::from_io(e, path))
}

/// Removes a file, returning whether it existed.
pub fn remove_if_exists(path: impl AsRef<Path>) -> FileResult<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FileError::from_io(e, path)),
    }
}

/// Last modification time of `path`.
pub fn modified_time(path: impl AsRef<Path>) -> FileResult<SystemTime> {
    let path = path.as_ref();
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| FileError::from_io(e, path))
}

/// Writes a file atomically using a temporary file and rename.
///
/// ```ignore
/// atomic_write("cache/material-symbols-outlined.codepoints", |w| {
///     w.write_all(&payload)
/// })?;
/// ```
pub fn atomic_write<F>(path: impl AsRef<Path>, f: F) -> FileResult<()>
where
    F: FnOnce(&mut AtomicWriter) -> FileResult<()>,
{
    AtomicWriter::write(path, f)
}

/// Reads and deserializes a JSON file.
///
/// Malformed content is reported as [`FileErrorKind::InvalidData`](super::FileErrorKind).
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> FileResult<T> {
    let path = path.as_ref();
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|e| FileError::invalid_data(path, e))
}

/// Serializes `value` as pretty JSON and writes it atomically, creating
/// parent directories first.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> FileResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value).map_err(|e| FileError::invalid_data(path, e))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    atomic_write(path, |writer| writer.write_all(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileErrorKind;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        query: String,
        size: u32,
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(dir.path().join("missing.txt")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.codepoints");
        fs::write(&path, "a 1").unwrap();
        assert!(remove_if_exists(&path).unwrap());
        assert!(!remove_if_exists(&path).unwrap());
    }

    #[test]
    fn test_json_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        let value = Sample {
            query: "arrow".into(),
            size: 7,
        };

        write_json(&path, &value).unwrap();
        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_read_json_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        fs::write(&path, "{\"query\": ").unwrap();

        let err = read_json::<Sample>(&path).unwrap_err();
        assert_eq!(err.kind(), FileErrorKind::InvalidData);
    }
}
