//! In-memory session registry for games and position quizzes.

use crate::error::PiError;
use can_you_pi_core::{Game, PositionQuiz};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Unique identifier for a session.
pub type SessionId = String;

/// What a session id points at.
#[derive(Debug, Clone)]
pub enum Session {
    /// A digit recall game.
    Game(Game),
    /// A single position question.
    Quiz(PositionQuiz),
}

impl From<Game> for Session {
    fn from(game: Game) -> Self {
        Session::Game(game)
    }
}

impl From<PositionQuiz> for Session {
    fn from(quiz: PositionQuiz) -> Self {
        Session::Quiz(quiz)
    }
}

/// Shared, individually locked session.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug)]
struct Entry {
    session: SessionHandle,
    last_seen: Instant,
}

/// Manages all sessions.
///
/// The map lock is only held to look up, insert or remove an entry. Each
/// session has its own lock, so requests for one session are serialized
/// without blocking the others.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, Entry>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session registry");
        Self::default()
    }

    /// Stores a session under a fresh random id.
    #[instrument(skip(self, session))]
    pub fn create(&self, session: impl Into<Session>) -> SessionId {
        let id = uuid::Uuid::new_v4().to_string();
        let entry = Entry {
            session: Arc::new(Mutex::new(session.into())),
            last_seen: Instant::now(),
        };
        lock(&self.sessions).insert(id.clone(), entry);
        info!(session_id = %id, "Created session");
        id
    }

    /// Looks up a session and marks it as recently used.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = lock(&self.sessions);
        let handle = sessions.get_mut(id).map(|entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.session)
        });
        if handle.is_none() {
            debug!(session_id = id, "Session not found");
        }
        handle
    }

    /// Removes a session, returning its final state.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Option<Session> {
        let entry = lock(&self.sessions).remove(id)?;
        info!(session_id = id, "Removed session");
        let session = lock(&entry.session).clone();
        Some(session)
    }

    /// Runs `f` on the game stored under `id` while holding its lock.
    ///
    /// # Errors
    ///
    /// Not found if `id` is unknown or refers to a quiz.
    pub fn with_game<R>(&self, id: &str, f: impl FnOnce(&mut Game) -> R) -> Result<R, PiError> {
        let handle = self
            .get(id)
            .ok_or_else(|| PiError::not_found("Game not found"))?;
        let mut session = lock(&handle);
        match &mut *session {
            Session::Game(game) => Ok(f(game)),
            Session::Quiz(_) => Err(PiError::not_found("Game not found")),
        }
    }

    /// Runs `f` on the quiz stored under `id` while holding its lock.
    ///
    /// # Errors
    ///
    /// Not found if `id` is unknown or refers to a game.
    pub fn with_quiz<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut PositionQuiz) -> R,
    ) -> Result<R, PiError> {
        let handle = self
            .get(id)
            .ok_or_else(|| PiError::not_found("Quiz not found"))?;
        let mut session = lock(&handle);
        match &mut *session {
            Session::Quiz(quiz) => Ok(f(quiz)),
            Session::Game(_) => Err(PiError::not_found("Quiz not found")),
        }
    }

    /// Removes the game stored under `id`. Quizzes are left in place.
    ///
    /// The map lock is never held while waiting on the session's lock.
    ///
    /// # Errors
    ///
    /// Not found if `id` is unknown or refers to a quiz.
    #[instrument(skip(self))]
    pub fn remove_game(&self, id: &str) -> Result<Game, PiError> {
        let handle = self
            .get(id)
            .ok_or_else(|| PiError::not_found("Game not found"))?;
        if !matches!(*lock(&handle), Session::Game(_)) {
            return Err(PiError::not_found("Game not found"));
        }

        // Only remove the entry if it still holds the session checked above.
        {
            let mut sessions = lock(&self.sessions);
            match sessions.get(id) {
                Some(entry) if Arc::ptr_eq(&entry.session, &handle) => {
                    sessions.remove(id);
                }
                _ => return Err(PiError::not_found("Game not found")),
            }
        }

        let session = lock(&handle).clone();
        match session {
            Session::Game(game) => {
                info!(session_id = id, score = game.score(), "Removed game");
                Ok(game)
            }
            Session::Quiz(_) => Err(PiError::not_found("Game not found")),
        }
    }

    /// Drops every session untouched for longer than `max_idle`.
    /// Returns how many were evicted.
    #[instrument(skip(self))]
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// True when no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
