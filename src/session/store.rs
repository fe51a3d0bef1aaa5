//! Session persistence.
//!
//! [`JsonFileStore`] keeps one pretty-printed `<id>.json` document per
//! session; [`MemoryStore`] keeps them in a map for tests and embedding.

use crate::error::AdvisorError;
use crate::model::ChatSession;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Storage for interview sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All sessions, newest first by creation time.
    async fn list(&self) -> Result<Vec<ChatSession>, AdvisorError>;

    /// Create and persist an empty session with a fresh id.
    async fn create(&self) -> Result<ChatSession, AdvisorError>;

    async fn get(&self, id: &str) -> Result<ChatSession, AdvisorError>;

    /// Insert or replace the session stored under `session.id`.
    async fn save(&self, session: &ChatSession) -> Result<(), AdvisorError>;

    /// Apply `edit` to the stored session and persist it, with no other
    /// `save` or `update` interleaving between the read and the write.
    /// Returns the session as saved.
    async fn update(&self, id: &str, edit: SessionEdit) -> Result<ChatSession, AdvisorError>;
}

/// In-place change applied by [`SessionStore::update`].
pub type SessionEdit = Box<dyn FnOnce(&mut ChatSession) + Send>;

/// Normalised form of a session id, or `InvalidSessionId`.
pub fn validate_id(id: &str) -> Result<String, AdvisorError> {
    Uuid::parse_str(id.trim())
        .map(|u| u.hyphenated().to_string())
        .map_err(|_| AdvisorError::InvalidSessionId { id: id.to_string() })
}

fn new_session() -> ChatSession {
    ChatSession::new(Uuid::new_v4().to_string())
}

fn newest_first(sessions: &mut [ChatSession]) {
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

// ── JSON file store ──────────────────────────────────────────────────────

/// One JSON document per session under a directory.
///
/// Writes are serialised within one store (and its clones); separate
/// processes sharing a directory are not coordinated.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open (and create if needed) the session directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AdvisorError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AdvisorError::Storage {
                path: dir.clone(),
                source: e,
            })?;
        debug!("Session store at {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn write(&self, session: &ChatSession) -> Result<(), AdvisorError> {
        let id = validate_id(&session.id)?;
        let path = self.path_for(&id);
        let json = serde_json::to_vec_pretty(session)?;

        // Atomic write: temp file, then rename over the target.
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| AdvisorError::Storage {
                path: tmp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| AdvisorError::Storage {
                path: path.clone(),
                source: e,
            })?;

        debug!("Saved session {id} ({} bytes)", json.len());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<ChatSession>, AdvisorError> {
        let storage_err = |e| AdvisorError::Storage {
            path: self.dir.clone(),
            source: e,
        };
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(storage_err)?;
        let mut sessions = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(storage_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice::<ChatSession>(&bytes).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match parsed {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Skipping unreadable session file {}: {e}", path.display()),
            }
        }

        newest_first(&mut sessions);
        Ok(sessions)
    }

    async fn create(&self) -> Result<ChatSession, AdvisorError> {
        let session = new_session();
        self.save(&session).await?;
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<ChatSession, AdvisorError> {
        let id = validate_id(id)?;
        let path = self.path_for(&id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AdvisorError::SessionNotFound { id });
            }
            Err(e) => return Err(AdvisorError::Storage { path, source: e }),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, session: &ChatSession) -> Result<(), AdvisorError> {
        let _guard = self.write_lock.lock().await;
        self.write(session).await
    }

    async fn update(&self, id: &str, edit: SessionEdit) -> Result<ChatSession, AdvisorError> {
        let _guard = self.write_lock.lock().await;
        let mut session = self.get(id).await?;
        edit(&mut session);
        self.write(&session).await?;
        Ok(session)
    }
}

// ── In-memory store ──────────────────────────────────────────────────────

/// Sessions held in memory; lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, ChatSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn list(&self) -> Result<Vec<ChatSession>, AdvisorError> {
        let mut sessions: Vec<ChatSession> = self.sessions.read().await.values().cloned().collect();
        newest_first(&mut sessions);
        Ok(sessions)
    }

    async fn create(&self) -> Result<ChatSession, AdvisorError> {
        let session = new_session();
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<ChatSession, AdvisorError> {
        let id = validate_id(id)?;
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AdvisorError::SessionNotFound { id })
    }

    async fn save(&self, session: &ChatSession) -> Result<(), AdvisorError> {
        let id = validate_id(&session.id)?;
        self.sessions.write().await.insert(id, session.clone());
        Ok(())
    }

    async fn update(&self, id: &str, edit: SessionEdit) -> Result<ChatSession, AdvisorError> {
        let id = validate_id(id)?;
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(AdvisorError::SessionNotFound { id })?;
        edit(session);
        Ok(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatTurn;
    use chrono::{Duration, Utc};

    #[test]
    fn ids_must_be_uuids() {
        assert!(validate_id("../../etc/passwd").is_err());
        assert!(validate_id("").is_err());
        let id = Uuid::new_v4().to_string();
        assert_eq!(validate_id(&id).unwrap(), id);
        assert_eq!(validate_id(&id.to_uppercase()).unwrap(), id);
    }

    #[tokio::test]
    async fn file_store_round_trips_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let mut session = store.create().await.unwrap();
        session.history.push(ChatTurn::user("hello"));
        store.save(&session).await.unwrap();

        let loaded = store.get(&session.id).await.unwrap();
        assert_eq!(loaded, session);
        assert!(dir.path().join(format!("{}.json", session.id)).exists());
        assert!(!dir.path().join(format!("{}.json.tmp", session.id)).exists());
    }

    #[tokio::test]
    async fn file_store_missing_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            store.get(&missing).await,
            Err(AdvisorError::SessionNotFound { .. })
        ));
        assert!(matches!(
            store.get("not-a-uuid").await,
            Err(AdvisorError::InvalidSessionId { .. })
        ));
    }

    #[tokio::test]
    async fn file_store_lists_newest_first_and_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let mut older = store.create().await.unwrap();
        older.created_at = Utc::now() - Duration::hours(1);
        store.save(&older).await.unwrap();
        let newer = store.create().await.unwrap();
        tokio::fs::write(dir.path().join("broken.json"), b"{not json")
            .await
            .unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let file_store = JsonFileStore::open(dir.path()).await.unwrap();
        let stores: [Arc<dyn SessionStore>; 2] = [Arc::new(file_store), Arc::new(MemoryStore::new())];

        for store in stores {
            let id = store.create().await.unwrap().id;
            let tasks: Vec<_> = (0..8)
                .map(|i| {
                    let store = Arc::clone(&store);
                    let id = id.clone();
                    let edit: SessionEdit =
                        Box::new(move |s: &mut ChatSession| s.history.push(ChatTurn::user(format!("m{i}"))));
                    tokio::spawn(async move { store.update(&id, edit).await })
                })
                .collect();
            for task in tasks {
                task.await.unwrap().unwrap();
            }
            assert_eq!(store.get(&id).await.unwrap().history.len(), 8);
        }
    }

    #[tokio::test]
    async fn update_of_missing_session_fails() {
        let store = MemoryStore::new();
        let edit: SessionEdit = Box::new(|s: &mut ChatSession| s.title = "x".into());
        let err = store
            .update(&Uuid::new_v4().to_string(), edit)
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn memory_store_behaves_like_file_store() {
        let store = MemoryStore::new();
        let mut older = store.create().await.unwrap();
        older.created_at = Utc::now() - Duration::minutes(5);
        store.save(&older).await.unwrap();
        let newer = store.create().await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert!(matches!(
            store.get(&Uuid::new_v4().to_string()).await,
            Err(AdvisorError::SessionNotFound { .. })
        ));
    }
}
