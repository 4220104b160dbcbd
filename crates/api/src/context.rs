use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Session context for a request.
///
/// Inserted by the session middleware; present on every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: Uuid,
    opened_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(session_id: Uuid, opened_at: DateTime<Utc>) -> Self {
        Self {
            session_id,
            opened_at,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// Sessions opened with the shared dashboard password.
///
/// A session unused for longer than the idle timeout is dropped on its next
/// lookup; expired entries are also swept whenever a new session opens.
#[derive(Debug)]
pub struct SessionStore {
    password: String,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

#[derive(Debug, Copy, Clone)]
struct Entry {
    opened_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

/// Idle time after which a session stops authenticating.
pub const DEFAULT_IDLE_TIMEOUT_HOURS: i64 = 12;

impl SessionStore {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            idle_timeout: Duration::hours(DEFAULT_IDLE_TIMEOUT_HOURS),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Open a session if `password` matches.
    pub fn open(&self, password: &str, now: DateTime<Utc>) -> Option<SessionContext> {
        if password != self.password {
            return None;
        }
        let ctx = SessionContext::new(Uuid::now_v7(), now);
        let mut sessions = self.sessions.lock().ok()?;
        sessions.retain(|_, entry| now - entry.last_seen <= self.idle_timeout);
        sessions.insert(
            ctx.session_id,
            Entry {
                opened_at: now,
                last_seen: now,
            },
        );
        Some(ctx)
    }

    /// Look up a live session and mark it used at `now`.
    pub fn get(&self, session_id: Uuid, now: DateTime<Utc>) -> Option<SessionContext> {
        let mut sessions = self.sessions.lock().ok()?;
        let entry = sessions.get_mut(&session_id)?;
        if now - entry.last_seen > self.idle_timeout {
            sessions.remove(&session_id);
            tracing::debug!(session = %session_id, "session expired");
            return None;
        }
        entry.last_seen = entry.last_seen.max(now);
        Some(SessionContext::new(session_id, entry.opened_at))
    }

    pub fn close(&self, session_id: Uuid) -> bool {
        match self.sessions.lock() {
            Ok(mut sessions) => sessions.remove(&session_id).is_some(),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
