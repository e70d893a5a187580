use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;

/// Persistent store for uploaded images, keyed by kind ("users",
/// "products") and file name.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, kind: &str, name: &str, body: Bytes) -> anyhow::Result<()>;
    async fn get(&self, kind: &str, name: &str) -> anyhow::Result<Option<Bytes>>;
    async fn delete(&self, kind: &str, name: &str) -> anyhow::Result<()>;
}

/// Disk-backed store: one subdirectory per kind under the uploads root.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, kind: &str, name: &str) -> PathBuf {
        self.root.join(kind).join(name)
    }
}

#[async_trait]
impl ImageStore for DiskStore {
    async fn put(&self, kind: &str, name: &str, body: Bytes) -> anyhow::Result<()> {
        let dir = self.root.join(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))?;
        let path = self.path_for(kind, name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn get(&self, kind: &str, name: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.path_for(kind, name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn delete(&self, kind: &str, name: &str) -> anyhow::Result<()> {
        let path = self.path_for(kind, name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // already gone is fine
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());

        store
            .put("users", "a.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();
        let read = store.get("users", "a.png").await.unwrap();
        assert_eq!(read, Some(Bytes::from_static(b"png-bytes")));

        store.delete("users", "a.png").await.unwrap();
        assert_eq!(store.get("users", "a.png").await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_missing_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        assert_eq!(store.get("products", "nope.jpg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        store.delete("products", "nope.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn kinds_are_segregated() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        store
            .put("users", "x.jpg", Bytes::from_static(b"u"))
            .await
            .unwrap();
        assert_eq!(store.get("products", "x.jpg").await.unwrap(), None);
    }
}
