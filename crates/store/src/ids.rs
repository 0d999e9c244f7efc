use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document::StoreError;

/// Persisted monotonic id counters, one `counters.json` object per data
/// directory. Allocation survives restarts and out-of-band record deletion;
/// a value is never handed out twice for a kind.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    path: PathBuf,
}

impl IdAllocator {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { path: data_dir.as_ref().join("counters.json") }
    }

    /// Allocate the next id for a record kind, e.g. `order-7`.
    pub async fn next_id(&self, kind: &str) -> Result<String, StoreError> {
        let lock = crate::document::document_lock(&self.path);
        let _guard = lock.lock().await;

        let mut counters = self.read().await?;
        let counter = counters.entry(kind.to_owned()).or_insert(0);
        *counter += 1;
        let id = format!("{kind}-{counter}");
        self.write(&counters).await?;
        Ok(id)
    }

    async fn read(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|source| StoreError::Malformed { path: self.path.clone(), source }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io { path: self.path.clone(), source }),
        }
    }

    async fn write(&self, counters: &BTreeMap<String, u64>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        }
        let encoded = serde_json::to_vec_pretty(counters)
            .map_err(|source| StoreError::Serialize { path: self.path.clone(), source })?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &encoded)
            .await
            .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::IdAllocator;

    #[tokio::test]
    async fn ids_are_monotonic_per_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ids = IdAllocator::new(dir.path());

        assert_eq!(ids.next_id("order").await.expect("alloc"), "order-1");
        assert_eq!(ids.next_id("order").await.expect("alloc"), "order-2");
        assert_eq!(ids.next_id("lead").await.expect("alloc"), "lead-1");
    }

    #[tokio::test]
    async fn counters_survive_a_fresh_allocator() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let ids = IdAllocator::new(dir.path());
            let _ = ids.next_id("order").await.expect("alloc");
            let _ = ids.next_id("order").await.expect("alloc");
        }

        let ids = IdAllocator::new(dir.path());
        assert_eq!(ids.next_id("order").await.expect("alloc"), "order-3");
    }
}
