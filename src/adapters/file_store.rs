//! Directory-backed [`StoragePort`] for host builds and simulation.
//!
//! Each record lives at `<root>/<namespace>/<key>`. Writes go to a
//! `.tmp` sibling first and are renamed over the target, so a reader sees
//! either the old blob or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::app::ports::{StorageError, StoragePort};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the storage root.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            warn!("FileStore: cannot create {}: {}", root.display(), e);
            StorageError::Unavailable
        })?;
        debug!("FileStore: root {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, namespace: &str, key: &str) -> Result<PathBuf, StorageError> {
        if !valid_name(namespace) || !valid_name(key) {
            return Err(StorageError::IoError);
        }
        Ok(self.root.join(namespace).join(key))
    }
}

/// Names become path components; keep them to one plain segment.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
}

fn map_io(e: &io::Error) -> StorageError {
    match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound,
        io::ErrorKind::StorageFull => StorageError::Full,
        _ => StorageError::IoError,
    }
}

impl StoragePort for FileStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = fs::read(self.path(namespace, key)?).map_err(|e| map_io(&e))?;
        if data.len() > buf.len() {
            return Err(StorageError::Full);
        }
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let target = self.path(namespace, key)?;
        let dir = self.root.join(namespace);
        fs::create_dir_all(&dir).map_err(|e| map_io(&e))?;

        let tmp = dir.join(format!("{key}.tmp"));
        let result = fs::File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(data)?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &target));
        if let Err(e) = result {
            warn!("FileStore: write {}/{} failed: {}", namespace, key, e);
            let _ = fs::remove_file(&tmp);
            return Err(map_io(&e));
        }
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(namespace, key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(&e)),
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.path(namespace, key).is_ok_and(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pixelpal-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn write_read_delete() {
        let dir = scratch("rw");
        let mut store = FileStore::open(&dir).unwrap();
        store.write("pixelpal", "stats", b"{\"headpats\":1}").unwrap();
        assert!(store.exists("pixelpal", "stats"));

        let mut buf = [0u8; 64];
        let n = store.read("pixelpal", "stats", &mut buf).unwrap();
        assert_eq!(&buf[..n], b"{\"headpats\":1}");
        assert!(!dir.join("pixelpal").join("stats.tmp").exists());

        store.delete("pixelpal", "stats").unwrap();
        store.delete("pixelpal", "stats").unwrap();
        assert_eq!(store.read("pixelpal", "stats", &mut buf), Err(StorageError::NotFound));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn overwrite_replaces_whole_blob() {
        let dir = scratch("overwrite");
        let mut store = FileStore::open(&dir).unwrap();
        store.write("ns", "k", b"a much longer first value").unwrap();
        store.write("ns", "k", b"short").unwrap();
        let mut buf = [0u8; 64];
        let n = store.read("ns", "k", &mut buf).unwrap();
        assert_eq!(&buf[..n], b"short");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn rejects_path_like_names() {
        let dir = scratch("names");
        let mut store = FileStore::open(&dir).unwrap();
        assert_eq!(store.write("..", "k", b"x"), Err(StorageError::IoError));
        assert_eq!(store.write("ns", "a/b", b"x"), Err(StorageError::IoError));
        assert!(!store.exists("ns", "../ns"));
        let _ = fs::remove_dir_all(dir);
    }
}
