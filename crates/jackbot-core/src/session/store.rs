use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::session::Session;

/// Trait for session storage backends: a hash per sender id, no TTL.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for a sender, if one exists.
    async fn get(&self, sender_id: &str) -> Result<Option<Session>, CollaboratorError>;

    /// Write a session, replacing any existing one for the sender.
    async fn put(&self, session: &Session) -> Result<(), CollaboratorError>;

    /// Check whether a session exists without fetching it.
    async fn exists(&self, sender_id: &str) -> Result<bool, CollaboratorError>;
}
