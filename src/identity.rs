//! Identity collaborator: who is signed in, and with which token.
//!
//! Sign-in itself (social or email/password) happens elsewhere; this crate
//! only consumes "current user or none" and "token or none".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Bearer token for the persistence and generation services.
    #[serde(default, skip_serializing)]
    pub token: String,
}

impl UserSession {
    pub fn new(uid: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            email_verified: false,
            token: token.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = Some(email.into());
        self.email_verified = verified;
        self
    }
}

/// Source of the current user and bearer token.
#[async_trait]
pub trait Identity: Send + Sync {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<UserSession>;

    /// Token for the current session, if any.
    async fn bearer_token(&self) -> Option<String> {
        self.current_user().map(|user| user.token)
    }
}

/// No session. Generation still works; persistence does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl Identity for Anonymous {
    fn current_user(&self) -> Option<UserSession> {
        None
    }
}

/// A fixed session, e.g. a token supplied through configuration.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    session: UserSession,
}

impl StaticIdentity {
    pub fn new(session: UserSession) -> Self {
        Self { session }
    }

    /// Wraps a bare token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(UserSession::new("token", token))
    }
}

#[async_trait]
impl Identity for StaticIdentity {
    fn current_user(&self) -> Option<UserSession> {
        Some(self.session.clone())
    }
}

/// A session that can change over time.
///
/// Every sign-in and sign-out is published to subscribers.
#[derive(Debug)]
pub struct SessionIdentity {
    tx: watch::Sender<Option<UserSession>>,
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionIdentity {
    /// Starts signed out.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replaces the current session.
    pub fn sign_in(&self, session: UserSession) {
        tracing::info!(uid = %session.uid, "Signed in");
        self.tx.send_replace(Some(session));
    }

    /// Clears the current session.
    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::info!("Signed out");
        }
    }

    /// Receives a notification on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl Identity for SessionIdentity {
    fn current_user(&self) -> Option<UserSession> {
        self.tx.borrow().clone()
    }
}
