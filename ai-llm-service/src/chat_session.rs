//! Process-lifetime conversational memory.
//!
//! The language-model APIs are stateless, so multi-turn context is kept here
//! and replayed on every call. Sessions are created lazily on first use and
//! live until evicted or the process exits.
//!
//! Each session sits behind its own `tokio::sync::Mutex`. Callers hold that
//! lock across the model call and the history append, which serializes
//! messages within one session while leaving other sessions untouched.
//! Creation goes through the `DashMap` entry API, so two concurrent first
//! messages for the same id end up sharing one session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Speaker of a [`ChatTurn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Conversation state for one session id.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub session_id: String,
    pub system_instruction: String,
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    max_exchanges: Option<usize>,
}

impl ChatSession {
    pub fn new(
        session_id: impl Into<String>,
        system_instruction: impl Into<String>,
        max_exchanges: Option<usize>,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            system_instruction: system_instruction.into(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
            max_exchanges,
        }
    }

    /// Appends a user message and the model reply. With a cap configured the
    /// oldest exchanges are dropped first.
    pub fn push_exchange(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.history.push(ChatTurn {
            role: ChatRole::User,
            text: user.into(),
        });
        self.history.push(ChatTurn {
            role: ChatRole::Model,
            text: reply.into(),
        });

        if let Some(max) = self.max_exchanges {
            let max_turns = max * 2;
            if self.history.len() > max_turns {
                let excess = self.history.len() - max_turns;
                self.history.drain(..excess);
            }
        }
        self.updated_at = Utc::now();
    }

    /// Completed user/model exchanges.
    pub fn exchanges(&self) -> usize {
        self.history.len() / 2
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            history: self.history.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only copy of a session, safe to hand out after the lock is released.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Handle to a session; lock it for the whole read-call-append cycle.
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Storage for conversational sessions, injected into the companion service.
pub trait SessionStore: Send + Sync {
    /// Returns the session for `session_id`, creating an empty one if needed.
    fn get_or_create(&self, session_id: &str) -> SharedSession;

    /// Returns the session only if it already exists.
    fn get(&self, session_id: &str) -> Option<SharedSession>;

    /// Drops a session. Returns `false` if there was none.
    fn evict(&self, session_id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`SessionStore`] backed by `DashMap`.
///
/// Never hold a `DashMap` guard across `.await`: handles are cloned out.
pub struct InMemorySessionStore {
    sessions: DashMap<String, SharedSession>,
    system_instruction: String,
    max_exchanges: Option<usize>,
}

impl InMemorySessionStore {
    /// New sessions are seeded with `system_instruction` and an empty history.
    pub fn new(system_instruction: impl Into<String>, max_exchanges: Option<usize>) -> Self {
        Self {
            sessions: DashMap::new(),
            system_instruction: system_instruction.into(),
            max_exchanges,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, session_id: &str) -> SharedSession {
        if let Some(existing) = self.sessions.get(session_id) {
            return existing.value().clone();
        }
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "creating chat session");
                Arc::new(Mutex::new(ChatSession::new(
                    session_id,
                    self.system_instruction.clone(),
                    self.max_exchanges,
                )))
            })
            .value()
            .clone()
    }

    fn get(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    fn evict(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
