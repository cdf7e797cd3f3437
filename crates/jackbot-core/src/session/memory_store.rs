use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::CollaboratorError;
use crate::session::store::SessionStore;
use crate::session::Session;

/// In-process session store backed by a concurrent map. Sessions are
/// keyed per sender, so handlers for different users never contend.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, sender_id: &str) -> Result<Option<Session>, CollaboratorError> {
        Ok(self.sessions.get(sender_id).map(|s| s.clone()))
    }

    async fn put(&self, session: &Session) -> Result<(), CollaboratorError> {
        self.sessions
            .insert(session.sender_id.clone(), session.clone());
        Ok(())
    }

    async fn exists(&self, sender_id: &str) -> Result<bool, CollaboratorError> {
        Ok(self.sessions.contains_key(sender_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_exists() {
        let store = MemorySessionStore::new();
        assert!(!store.exists("1234").await.unwrap());
        assert_eq!(store.get("1234").await.unwrap(), None);

        let session = Session {
            sender_id: "1234".into(),
            user_id: "u1".into(),
            language: "en".into(),
            region: "en_US".into(),
            ..Default::default()
        };
        store.put(&session).await.unwrap();

        assert!(store.exists("1234").await.unwrap());
        assert_eq!(store.get("1234").await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = MemorySessionStore::new();
        let mut session = Session {
            sender_id: "1234".into(),
            language: "en".into(),
            region: "en_US".into(),
            ..Default::default()
        };
        store.put(&session).await.unwrap();

        session.region = "de_DE".into();
        store.put(&session).await.unwrap();

        let loaded = store.get("1234").await.unwrap().unwrap();
        assert_eq!(loaded.region, "de_DE");
    }
}
