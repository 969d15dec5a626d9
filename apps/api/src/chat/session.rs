//! In-memory page sessions: the active view plus the chat transcript.
//!
//! A session is one page load. Its transcript is append-only and only grows in
//! user/assistant pairs: `begin_submission` appends the user message and marks
//! the session `Sending`, `finish_submission` appends the assistant message and
//! returns it to `Idle`. While `Sending`, further submissions are refused.
//!
//! The map lock is held only for the synchronous bookkeeping, never across the
//! generation call.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::chat::ChatMessage;

/// Which tab the page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Profile,
    Analyst,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question is already being analysed for this session")]
    Busy,

    #[error("session capacity of {0} reached and every session is busy")]
    CapacityExhausted(usize),
}

#[derive(Debug, Clone)]
pub struct PageSession {
    pub id: Uuid,
    pub view: View,
    pub state: SubmissionState,
    transcript: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    /// Store-wide activity counter value at the last touch; orders eviction.
    activity: u64,
}

impl PageSession {
    fn new(activity: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            view: View::default(),
            state: SubmissionState::Idle,
            transcript: Vec::new(),
            created_at: Utc::now(),
            activity,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// The loading indicator is on exactly while a submission is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state == SubmissionState::Sending
    }

    fn touch(&mut self, activity: u64) {
        self.activity = activity;
    }
}

/// What the page sees of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub view: View,
    pub loading: bool,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl From<&PageSession> for SessionView {
    fn from(session: &PageSession) -> Self {
        Self {
            id: session.id,
            view: session.view,
            loading: session.is_loading(),
            messages: session.messages().to_vec(),
            created_at: session.created_at,
        }
    }
}

#[derive(Default)]
struct Sessions {
    map: HashMap<Uuid, PageSession>,
    activity: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.activity += 1;
        self.activity
    }
}

/// Shared session map, cloned into `AppState`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<Sessions>>,
    capacity: usize,
}

impl SessionStore {
    /// `capacity` must be at least 1; `Config` rejects 0 at startup.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions::default())),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.read().map.len()
    }

    /// Starts a fresh session. At capacity, the least recently active idle
    /// session is dropped to make room.
    pub fn create(&self) -> Result<SessionView, SessionError> {
        let mut sessions = self.write();

        if sessions.map.len() >= self.capacity {
            let evict = sessions
                .map
                .values()
                .filter(|s| !s.is_loading())
                .min_by_key(|s| s.activity)
                .map(|s| s.id)
                .ok_or(SessionError::CapacityExhausted(self.capacity))?;
            sessions.map.remove(&evict);
            tracing::debug!("Evicted idle session {evict}");
        }

        let session = PageSession::new(sessions.tick());
        let view = SessionView::from(&session);
        sessions.map.insert(session.id, session);
        Ok(view)
    }

    pub fn get(&self, id: Uuid) -> Result<SessionView, SessionError> {
        self.read()
            .map
            .get(&id)
            .map(SessionView::from)
            .ok_or(SessionError::NotFound(id))
    }

    pub fn set_view(&self, id: Uuid, view: View) -> Result<SessionView, SessionError> {
        self.with_session(id, |session| {
            session.view = view;
            Ok(())
        })
    }

    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.write()
            .map
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    /// Appends the user's prompt and moves the session to `Sending`.
    ///
    /// Blank prompts and submissions while another is outstanding are refused
    /// without touching the transcript.
    pub fn begin_submission(&self, id: Uuid, prompt: &str) -> Result<SessionView, SessionError> {
        self.with_session(id, |session| {
            if prompt.trim().is_empty() {
                return Err(SessionError::EmptyPrompt);
            }
            if session.is_loading() {
                return Err(SessionError::Busy);
            }
            session.transcript.push(ChatMessage::user(prompt));
            session.state = SubmissionState::Sending;
            Ok(())
        })
    }

    /// Appends the assistant reply and returns the session to `Idle`.
    pub fn finish_submission(&self, id: Uuid, reply: &str) -> Result<SessionView, SessionError> {
        self.with_session(id, |session| {
            if !session.is_loading() {
                tracing::warn!("Session {id} finished a submission it never started");
            }
            session.transcript.push(ChatMessage::assistant(reply));
            session.state = SubmissionState::Idle;
            Ok(())
        })
    }

    fn with_session<F>(&self, id: Uuid, f: F) -> Result<SessionView, SessionError>
    where
        F: FnOnce(&mut PageSession) -> Result<(), SessionError>,
    {
        let mut sessions = self.write();
        let activity = sessions.tick();
        let session = sessions
            .map
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        f(session)?;
        session.touch(activity);
        Ok(SessionView::from(&*session))
    }

    // Mutations are single pushes or field stores; a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Sessions> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sessions> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
