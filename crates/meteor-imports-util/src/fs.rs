use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;

/// Read a file to string, replacing invalid UTF-8 sequences with the
/// replacement character.
///
/// Meteor build output is UTF-8 in practice, but compiled package files can
/// embed arbitrary bytes in string literals; a lossy read keeps the
/// transformers total over whatever the build produced.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read and deserialize a JSON file.
///
/// # Errors
/// Returns the io error or the serde error, wrapped so the caller can tell
/// "missing" apart from "present but invalid".
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, JsonReadError> {
    let bytes = fs::read(path).map_err(JsonReadError::Io)?;
    serde_json::from_slice(&bytes).map_err(JsonReadError::Parse)
}

/// Error from [`read_json`].
#[derive(Debug)]
pub enum JsonReadError {
    /// The file could not be read.
    Io(io::Error),
    /// The file was read but is not valid JSON (or not the expected shape).
    Parse(serde_json::Error),
}

impl std::fmt::Display for JsonReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Parse(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl std::error::Error for JsonReadError {}

/// Atomically write bytes to a file by writing to a temp file then renaming.
///
/// The file will either have the old contents or the new contents, never a
/// partial write.
///
/// # Errors
/// Returns an error if the write or rename fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));

    // Temp file in the same directory so the rename stays on one filesystem.
    let mut temp_path = parent.to_path_buf();
    temp_path.push(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        std::process::id()
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    match fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            // On Windows, rename can fail if the target exists.
            if cfg!(windows) {
                fs::copy(&temp_path, path)?;
                let _ = fs::remove_file(&temp_path);
                Ok(())
            } else {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_read_to_string_lossy_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x68, 0x69, 0x80]).unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert!(content.starts_with("hi"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_json_missing_vs_invalid() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("nope.json");
        match read_json::<serde_json::Value>(&missing) {
            Err(JsonReadError::Io(_)) => {}
            other => panic!("expected Io error, got {other:?}"),
        }

        let bad = dir.path().join("bad.json");
        fs::write(&bad, b"{not json").unwrap();
        match read_json::<serde_json::Value>(&bad) {
            Err(JsonReadError::Parse(_)) => {}
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_atomic_write_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.js");

        atomic_write(&path, b"first").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");

        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        // No temp file left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
