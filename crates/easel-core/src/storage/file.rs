//! One JSON file per canvas in a directory.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode, encode};
use crate::canvas::CanvasDocument;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

fn io_error(action: &str, path: &Path, err: io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {action} {}: {err}", path.display()))
}

/// Canvas files under a base directory.
///
/// Saves go to a sibling temporary file that is renamed over the target,
/// so an interrupted save leaves the previous version intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| io_error("create", &base_path, e))?;
        Ok(Self { base_path })
    }

    /// `easel/canvases` under the platform data directory, or the home
    /// directory when there is none.
    pub fn default_location() -> StorageResult<Self> {
        let root = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("No data or home directory available".to_string()))?;
        Self::new(root.join("easel").join("canvases"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Ids map to file stems; anything other than letters, digits, `-` and `_` becomes `_`.
    fn path_for(&self, id: &str) -> PathBuf {
        let stem: String = id
            .chars()
            .map(|c| match c {
                c if c.is_alphanumeric() => c,
                '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.base_path.join(stem).with_extension(EXTENSION)
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &CanvasDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(id);
        let encoded = encode(document);
        Box::pin(async move {
            let json = encoded?;
            let partial = path.with_extension("json.partial");
            fs::write(&partial, json).map_err(|e| io_error("write", &partial, e))?;
            fs::rename(&partial, &path).map_err(|e| io_error("replace", &path, e))?;
            log::debug!("Saved canvas to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        let path = self.path_for(id);
        let id = id.to_string();
        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(StorageError::NotFound(id));
                }
                Err(e) => return Err(io_error("read", &path, e)),
            };
            decode(&json).map_err(|e| match e {
                StorageError::Serialization(msg) => {
                    StorageError::Serialization(format!("{}: {msg}", path.display()))
                }
                other => other,
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(id);
        Box::pin(async move {
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_error("delete", &path, e)),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let dir = fs::read_dir(&self.base_path)
                .map_err(|e| io_error("list", &self.base_path, e))?;
            let mut ids: Vec<String> = dir
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION))
                .filter_map(|path| Some(path.file_stem()?.to_str()?.to_string()))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.path_for(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut doc = CanvasDocument::new();
        doc.name = "Birthday card".to_string();
        block_on(storage.save("card", &doc)).unwrap();

        let loaded = block_on(storage.load("card")).unwrap();
        assert_eq!(loaded.name, "Birthday card");
        assert_eq!(loaded.layers, doc.layers);
        assert!(!dir.path().join("card.json.partial").exists());
    }

    #[test]
    fn test_missing_document() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        block_on(storage.delete("nonexistent")).unwrap();
    }

    #[test]
    fn test_list_only_canvas_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        fs::write(storage.base_path().join("notes.txt"), "x").unwrap();
        fs::create_dir(storage.base_path().join("folder.json")).unwrap();

        let doc = CanvasDocument::new();
        block_on(storage.save("poster", &doc)).unwrap();
        block_on(storage.save("banner", &doc)).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["banner", "poster"]);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        block_on(storage.save("test", &CanvasDocument::new())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_ids_are_sanitized() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let doc = CanvasDocument::new();
        block_on(storage.save("a/b:c*d", &doc)).unwrap();
        assert!(dir.path().join("a_b_c_d.json").exists());
        assert_eq!(block_on(storage.load("a/b:c*d")).unwrap().id, doc.id);
    }

    #[test]
    fn test_corrupt_or_invalid_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));

        let mut doc = CanvasDocument::new();
        doc.layers.clear();
        fs::write(dir.path().join("empty.json"), doc.to_json().unwrap()).unwrap();
        let result = block_on(storage.load("empty"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
