use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access document `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not encode document `{path}`: {source}")]
    Serialize { path: PathBuf, source: serde_json::Error },
    #[error("document `{path}` is malformed: {source}")]
    Malformed { path: PathBuf, source: serde_json::Error },
}

/// Process-wide registry of per-document locks. Two sessions configured
/// against the same backing file serialize their read-modify-write cycles
/// through the same mutex; the guard is dropped on every path, errors
/// included.
pub(crate) fn document_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let locks = LOCKS.get_or_init(|| StdMutex::new(HashMap::new()));
    let mut locks = locks.lock().expect("document lock registry poisoned");
    locks.entry(path.to_path_buf()).or_default().clone()
}

/// One JSON array document holding a single record collection.
#[derive(Clone, Debug)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _record: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection. A missing or malformed document yields an empty
    /// collection; that recovery is logged, never propagated.
    pub async fn load(&self) -> Vec<T> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(error) => {
                    tracing::warn!(
                        event_name = "store.document_malformed",
                        path = %self.path.display(),
                        error = %error,
                        "recovering malformed document as empty collection"
                    );
                    Vec::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(error) => {
                tracing::warn!(
                    event_name = "store.document_unreadable",
                    path = %self.path.display(),
                    error = %error,
                    "recovering unreadable document as empty collection"
                );
                Vec::new()
            }
        }
    }

    /// Strict parse for preflight checks: unlike `load`, malformed content
    /// is an error here.
    pub async fn validate(&self) -> Result<usize, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let records: Vec<serde_json::Value> = serde_json::from_str(&raw)
                    .map_err(|source| StoreError::Malformed { path: self.path.clone(), source })?;
                Ok(records.len())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(source) => Err(StoreError::Io { path: self.path.clone(), source }),
        }
    }

    /// Append one record under the document's exclusive lock.
    pub async fn append(&self, record: T) -> Result<(), StoreError> {
        let lock = document_lock(&self.path);
        let _guard = lock.lock().await;
        let mut records = self.load().await;
        records.push(record);
        self.write(&records).await
    }

    /// Update the first record matching `predicate` in place. Returns whether
    /// a record matched. The document is rewritten only on a match.
    pub async fn update<P, M>(&self, predicate: P, mutate: M) -> Result<bool, StoreError>
    where
        P: Fn(&T) -> bool,
        M: FnOnce(&mut T),
    {
        let lock = document_lock(&self.path);
        let _guard = lock.lock().await;
        let mut records = self.load().await;
        let Some(record) = records.iter_mut().find(|record| predicate(record)) else {
            return Ok(false);
        };
        mutate(record);
        self.write(&records).await?;
        Ok(true)
    }

    /// Replace the whole collection under the lock.
    pub async fn replace_all(&self, records: &[T]) -> Result<(), StoreError> {
        let lock = document_lock(&self.path);
        let _guard = lock.lock().await;
        self.write(records).await
    }

    async fn write(&self, records: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        }

        let encoded = serde_json::to_vec_pretty(records)
            .map_err(|source| StoreError::Serialize { path: self.path.clone(), source })?;

        // Write-then-rename keeps readers from ever observing a torn document.
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
    use serde::{Deserialize, Serialize};

    use super::JsonDocument;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    fn note(id: &str, body: &str) -> Note {
        Note { id: id.to_owned(), body: body.to_owned() }
    }

    #[tokio::test]
    async fn append_then_reload_yields_record_as_last_element() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = JsonDocument::<Note>::new(dir.path().join("notes.json"));

        doc.append(note("n-1", "first")).await.expect("append");
        doc.append(note("n-2", "second")).await.expect("append");

        let records = doc.load().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records.last(), Some(&note("n-2", "second")));
    }

    #[tokio::test]
    async fn missing_document_loads_as_empty_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = JsonDocument::<Note>::new(dir.path().join("absent.json"));
        assert!(doc.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_document_loads_as_empty_but_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, b"{ not json ]").await.expect("write garbage");

        let doc = JsonDocument::<Note>::new(&path);
        assert!(doc.load().await.is_empty());
        assert!(doc.validate().await.is_err());
    }

    #[tokio::test]
    async fn update_mutates_first_match_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = JsonDocument::<Note>::new(dir.path().join("notes.json"));
        doc.append(note("n-1", "draft")).await.expect("append");

        let matched = doc
            .update(|n| n.id == "n-1", |n| n.body = "final".to_owned())
            .await
            .expect("update");
        assert!(matched);
        assert_eq!(doc.load().await[0].body, "final");

        let matched = doc.update(|n| n.id == "n-9", |_| {}).await.expect("update");
        assert!(!matched);
    }

    #[tokio::test]
    async fn concurrent_appends_through_the_lock_lose_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.json");

        let mut handles = Vec::new();
        for i in 0..16 {
            let doc = JsonDocument::<Note>::new(&path);
            handles.push(tokio::spawn(async move {
                doc.append(note(&format!("n-{i}"), "body")).await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("append");
        }

        let doc = JsonDocument::<Note>::new(&path);
        assert_eq!(doc.load().await.len(), 16);
    }
}
