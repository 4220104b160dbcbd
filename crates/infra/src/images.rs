//! Local-filesystem image store.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stockroom_inventory::{ImageError, ImageRef, ImageStore};

/// Suffixed names tried before an upload is refused.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Writes uploaded photos under one directory; the reference is the file path.
///
/// Files are never overwritten: a name already taken gets a numeric suffix
/// (`foto.jpg`, `foto-1.jpg`, ...).
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageStore for LocalImageStore {
    fn store(&mut self, file_name: &str, bytes: &[u8]) -> Result<ImageRef, ImageError> {
        // Keep only the final component so uploads cannot escape `dir`.
        let name = Path::new(file_name.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ImageError::InvalidName(file_name.to_string()))?;

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            ImageError::Unavailable(format!("failed to create image directory {:?}: {e}", self.dir))
        })?;

        let path = self.write_new(name, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "image stored");
        Ok(ImageRef::new(path.to_string_lossy()))
    }

    fn discard(&mut self, image: &ImageRef) -> Result<(), ImageError> {
        let path = Path::new(image.as_str());
        if !path.starts_with(&self.dir) {
            return Err(ImageError::InvalidName(image.to_string()));
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "image discarded");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageError::Unavailable(format!("failed to remove {path:?}: {e}"))),
        }
    }
}

impl LocalImageStore {
    fn write_new(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ImageError> {
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = match (attempt, ext) {
                (0, _) => name.to_string(),
                (n, Some(ext)) => format!("{stem}-{n}.{ext}"),
                (n, None) => format!("{stem}-{n}"),
            };
            let path = self.dir.join(candidate);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes).map_err(|e| {
                        ImageError::Unavailable(format!("failed to write {path:?}: {e}"))
                    })?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ImageError::Unavailable(format!("failed to create {path:?}: {e}")));
                }
            }
        }
        Err(ImageError::Unavailable(format!(
            "no free file name for {name:?} in {:?}",
            self.dir
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_bytes_and_returns_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalImageStore::new(dir.path().join("imagenes"));

        let reference = store.store("cayalti.jpg", b"\xff\xd8\xff").unwrap();

        let expected = dir.path().join("imagenes").join("cayalti.jpg");
        assert_eq!(reference.as_str(), expected.to_string_lossy());
        assert_eq!(std::fs::read(expected).unwrap(), b"\xff\xd8\xff");
    }

    #[test]
    fn repeated_names_never_overwrite_earlier_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalImageStore::new(dir.path());

        let first = store.store("foto.jpg", &[1]).unwrap();
        let second = store.store("foto.jpg", &[2]).unwrap();
        let third = store.store("foto.jpg", &[3]).unwrap();

        assert_ne!(first, second);
        assert_eq!(second.as_str(), dir.path().join("foto-1.jpg").to_string_lossy());
        assert_eq!(third.as_str(), dir.path().join("foto-2.jpg").to_string_lossy());
        assert_eq!(std::fs::read(first.as_str()).unwrap(), vec![1u8]);
        assert_eq!(std::fs::read(second.as_str()).unwrap(), vec![2u8]);
    }

    #[test]
    fn discard_removes_only_files_inside_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalImageStore::new(dir.path().join("imagenes"));
        let reference = store.store("cayalti.jpg", b"x").unwrap();

        store.discard(&reference).unwrap();
        assert!(!Path::new(reference.as_str()).exists());
        store.discard(&reference).unwrap();

        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"x").unwrap();
        let err = store.discard(&ImageRef::new(outside.to_string_lossy())).unwrap_err();
        assert!(matches!(err, ImageError::InvalidName(_)));
        assert!(outside.exists());
    }

    #[test]
    fn directory_components_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalImageStore::new(dir.path());

        let reference = store.store("../../etc/passwd.png", b"x").unwrap();
        assert_eq!(reference.as_str(), dir.path().join("passwd.png").to_string_lossy());
    }

    #[test]
    fn names_without_a_file_component_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalImageStore::new(dir.path());
        assert!(matches!(store.store("", b"x"), Err(ImageError::InvalidName(_))));
        assert!(matches!(store.store("..", b"x"), Err(ImageError::InvalidName(_))));
    }
}
