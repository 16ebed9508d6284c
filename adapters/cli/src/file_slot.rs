use std::{
    fs, io,
    path::{Path, PathBuf},
};

use echo_defence_system_persistence::{SaveError, SaveSlot};

/// Save slot backed by a single file on disk.
#[derive(Debug, Clone)]
pub(crate) struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveSlot for FileSlot {
    fn write(&mut self, blob: &str) -> Result<(), SaveError> {
        // Write beside the target first so a crash never leaves half a save.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, blob)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|error| storage_error(&self.path, &error))
    }

    fn read(&self) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(storage_error(&self.path, &error)),
        }
    }
}

fn storage_error(path: &Path, error: &io::Error) -> SaveError {
    SaveError::Storage(format!("{}: {error}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("echo-defence-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir is writable");
        dir.join(name)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let slot = FileSlot::new(scratch("absent.save"));
        assert!(slot.read().expect("read succeeds").is_none());
    }

    #[test]
    fn written_blob_reads_back() {
        let mut slot = FileSlot::new(scratch("roundtrip.save"));
        slot.write("echo:v1:abc").expect("write succeeds");
        slot.write("echo:v1:def").expect("overwrite succeeds");
        assert_eq!(
            slot.read().expect("read succeeds").as_deref(),
            Some("echo:v1:def")
        );
        fs::remove_file(slot.path()).expect("cleanup");
    }

    #[test]
    fn unwritable_location_reports_storage_error() {
        let mut slot = FileSlot::new(scratch("missing-dir").join("nested").join("run.save"));
        assert!(matches!(
            slot.write("echo:v1:abc"),
            Err(SaveError::Storage(_))
        ));
    }
}
