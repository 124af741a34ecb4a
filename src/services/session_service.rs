use crate::dto::interview_dto::SessionOverview;
use crate::error::{Error, Result};
use crate::models::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Explicit session store keyed by id, injected into the engine instead of
/// living as module state. The per-session mutex serializes submissions for
/// that session (per-session FIFO); different sessions never contend.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.inner
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::SessionNotFound(id))
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::SessionNotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn overviews(&self) -> Vec<SessionOverview> {
        let handles: Vec<Arc<Mutex<Session>>> =
            self.inner.read().await.values().cloned().collect();

        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            let session = handle.lock().await;
            out.push(SessionOverview {
                session_id: session.id,
                candidate_name: session.candidate.name.clone(),
                job_title: session.job.title.clone(),
                state: session.state,
                started_at: session.started_at,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{CandidateProfile, JobProfile};

    fn sample() -> Session {
        Session::new(
            CandidateProfile {
                name: "Ada".into(),
                skills: vec![],
                experience_years: None,
            },
            JobProfile {
                title: "Engineer".into(),
                company: "Acme".into(),
                skills_required: vec![],
                experience_level: None,
            },
        )
    }

    #[tokio::test]
    async fn insert_get_remove_roundtrip() {
        let store = SessionStore::new();
        let id = store.insert(sample()).await;
        assert_eq!(store.len().await, 1);

        let handle = store.get(id).await.unwrap();
        assert_eq!(handle.lock().await.id, id);

        store.remove(id).await.unwrap();
        assert!(matches!(
            store.get(id).await,
            Err(Error::SessionNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id).await, Err(Error::SessionNotFound(_))));
        assert!(matches!(store.remove(id).await, Err(Error::SessionNotFound(_))));
    }
}
