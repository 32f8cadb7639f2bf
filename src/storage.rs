//! App-private document storage.
//!
//! tapeloop writes to exactly two places under the documents directory: the
//! fixed `recording.wav` artifact, and the `Inbox/` folder holding local
//! copies of picked files.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{INBOX_DIR_NAME, RECORDING_FILE_NAME};

pub fn recording_path(documents_dir: &Path) -> PathBuf {
    documents_dir.join(RECORDING_FILE_NAME)
}

pub fn inbox_dir(documents_dir: &Path) -> PathBuf {
    documents_dir.join(INBOX_DIR_NAME)
}

pub fn ensure_dir(dir: &Path) -> Result<(), Box<dyn Error>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    } else if !dir.is_dir() {
        return Err(format!("{} exists but is not a directory", dir.display()).into());
    }
    Ok(())
}

/// Copy a picked file into the inbox and return the copy's path.
///
/// A file with the same name already in the inbox is replaced. Picking a file
/// that already lives in the inbox returns it untouched.
pub fn import_copy(source: &Path, inbox: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let file_name = source
        .file_name()
        .ok_or_else(|| format!("Not a file: {}", source.display()))?;

    ensure_dir(inbox)?;
    let destination = inbox.join(file_name);

    if let (Ok(src), Ok(dst)) = (source.canonicalize(), destination.canonicalize())
        && src == dst
    {
        return Ok(destination);
    }

    fs::copy(source, &destination)?;
    log::info!(
        "Imported {} as {}",
        source.display(),
        destination.display()
    );

    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recording_path_is_fixed() {
        let docs = Path::new("/data/docs");
        assert_eq!(recording_path(docs), PathBuf::from("/data/docs/recording.wav"));
        assert_eq!(inbox_dir(docs), PathBuf::from("/data/docs/Inbox"));
    }

    #[test]
    fn test_import_copy_creates_inbox() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("drums.wav");
        fs::write(&source, b"RIFF").unwrap();
        let inbox = temp_dir.path().join("docs").join("Inbox");

        let copy = import_copy(&source, &inbox).unwrap();

        assert_eq!(copy, inbox.join("drums.wav"));
        assert_eq!(fs::read(&copy).unwrap(), b"RIFF");
        assert!(source.exists());
    }

    #[test]
    fn test_import_copy_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = temp_dir.path().join("Inbox");
        fs::create_dir_all(&inbox).unwrap();
        fs::write(inbox.join("bass.wav"), b"old").unwrap();

        let source = temp_dir.path().join("bass.wav");
        fs::write(&source, b"new").unwrap();

        let copy = import_copy(&source, &inbox).unwrap();
        assert_eq!(fs::read(copy).unwrap(), b"new");
    }

    #[test]
    fn test_import_copy_of_inbox_file_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = temp_dir.path().join("Inbox");
        fs::create_dir_all(&inbox).unwrap();
        let existing = inbox.join("keys.flac");
        fs::write(&existing, b"flac").unwrap();

        let copy = import_copy(&existing, &inbox).unwrap();

        assert_eq!(copy, existing);
        assert_eq!(fs::read(copy).unwrap(), b"flac");
    }

    #[test]
    fn test_import_copy_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let result = import_copy(
            &temp_dir.path().join("missing.wav"),
            &temp_dir.path().join("Inbox"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("docs");
        fs::write(&file, b"").unwrap();

        assert!(ensure_dir(&file).is_err());
    }
}
