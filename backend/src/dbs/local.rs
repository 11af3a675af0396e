use shared::StoreSyncError;
use shared::persistence::{BlobStore, SyncResult};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Blob store keeping one `<key>.json` file per key in a directory.
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> SyncResult<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreSyncError::Read(e.to_string())),
        }
    }

    fn set(&self, key: &str, blob: String) -> SyncResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreSyncError::Write(e.to_string()))?;
        // Atomic replace via rename.
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, blob).map_err(|e| StoreSyncError::Write(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| StoreSyncError::Write(e.to_string()))
    }
}
