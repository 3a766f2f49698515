//! Session store: fetches, polls and mutates the session list.
//!
//! A fetch sequence is one initial attempt plus up to `max_retries` retries
//! separated by `retry_delay_ms`. Each sequence is tagged with a generation;
//! `refetch()` and `teardown()` bump it, and a sequence that wakes up to find
//! a newer generation abandons itself without touching state.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use echo_types::{
    Result,
    config::RetryPolicy,
    session::{Session, SessionId},
};
use crate::ports::{ApiPort, TimerPort};

/// Observable session list state
#[derive(Debug, Default)]
pub struct SessionListState {
    pub sessions: Vec<Session>,
    /// True for the whole fetch sequence, retries included
    pub loading: bool,
    /// Terminal fetch failure
    pub error: Option<String>,
    /// Last create/delete failure, shown inline without hiding the list
    pub action_error: Option<String>,
    generation: u64,
    torn_down: bool,
}

/// How a fetch sequence ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(usize),
    Failed(String),
    /// Superseded by a refetch or teardown
    Abandoned,
}

#[derive(Clone)]
pub struct SessionStore {
    state: Rc<RefCell<SessionListState>>,
    api: Rc<dyn ApiPort>,
    timer: Rc<dyn TimerPort>,
    policy: RetryPolicy,
}

impl SessionStore {
    pub fn new(api: Rc<dyn ApiPort>, timer: Rc<dyn TimerPort>, policy: RetryPolicy) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionListState::default())),
            api,
            timer,
            policy,
        }
    }

    pub fn state(&self) -> Ref<'_, SessionListState> {
        self.state.borrow()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.state.borrow().sessions.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Run a full fetch sequence. Used on mount and by `refetch()`.
    pub async fn fetch(&self) -> FetchOutcome {
        let generation = {
            let mut st = self.state.borrow_mut();
            if st.torn_down {
                return FetchOutcome::Abandoned;
            }
            st.generation += 1;
            st.loading = true;
            st.generation
        };

        let mut retries = 0;
        loop {
            let result = self.api.list_sessions().await;
            if !self.is_current(generation) {
                log::debug!("Session fetch #{} superseded", generation);
                return FetchOutcome::Abandoned;
            }

            match result {
                Ok(sessions) => return self.finish_loaded(sessions),
                Err(e) if e.is_not_found() => return self.finish_loaded(Vec::new()),
                Err(e) if e.is_retryable() && retries < self.policy.max_retries => {
                    retries += 1;
                    log::warn!(
                        "Failed to fetch sessions: {}. Retrying ({}/{})",
                        e,
                        retries,
                        self.policy.max_retries
                    );
                    self.timer.sleep(self.policy.retry_delay_ms).await;
                    if !self.is_current(generation) {
                        return FetchOutcome::Abandoned;
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    log::error!("Failed to fetch sessions: {}", message);
                    let mut st = self.state.borrow_mut();
                    st.error = Some(message.clone());
                    st.loading = false;
                    return FetchOutcome::Failed(message);
                }
            }
        }
    }

    /// Restart the fetch sequence from attempt zero.
    pub async fn refetch(&self) -> FetchOutcome {
        self.fetch().await
    }

    /// One silent attempt, used by the interval timer. Skipped while a fetch
    /// sequence runs; a failure leaves the current list and error untouched.
    pub async fn poll(&self) -> bool {
        let generation = {
            let st = self.state.borrow();
            if st.loading || st.torn_down {
                return false;
            }
            st.generation
        };

        let result = self.api.list_sessions().await;
        let mut st = self.state.borrow_mut();
        if st.generation != generation || st.loading || st.torn_down {
            return false;
        }
        match result {
            Ok(sessions) => {
                st.sessions = sessions;
                st.error = None;
                true
            }
            Err(e) if e.is_not_found() => {
                st.sessions.clear();
                st.error = None;
                true
            }
            Err(e) => {
                log::debug!("Session poll failed: {}", e);
                false
            }
        }
    }

    /// Create a session and add it to the list. A blank name gets a numbered default.
    pub async fn create(&self, name: &str) -> Result<Session> {
        let name = match name.trim() {
            "" => format!("Session {}", self.state.borrow().sessions.len() + 1),
            trimmed => trimmed.to_string(),
        };

        match self.api.create_session(&name).await {
            Ok(session) => {
                log::info!("Created session {} ({})", session.id, session.name);
                let mut st = self.state.borrow_mut();
                st.action_error = None;
                if !st.sessions.iter().any(|s| s.id == session.id) {
                    st.sessions.push(session.clone());
                }
                Ok(session)
            }
            Err(e) => {
                log::error!("Failed to create session: {}", e);
                self.state.borrow_mut().action_error =
                    Some(format!("Failed to create session: {}", e));
                Err(e)
            }
        }
    }

    /// Delete a session. A session the server no longer knows counts as deleted.
    pub async fn delete(&self, id: SessionId) -> Result<()> {
        match self.api.delete_session(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                log::info!("Session {} was already gone", id);
            }
            Err(e) => {
                log::error!("Failed to delete session {}: {}", id, e);
                self.state.borrow_mut().action_error =
                    Some(format!("Failed to delete session: {}", e));
                return Err(e);
            }
        }

        let mut st = self.state.borrow_mut();
        st.sessions.retain(|s| s.id != id);
        st.action_error = None;
        Ok(())
    }

    pub fn clear_action_error(&self) {
        self.state.borrow_mut().action_error = None;
    }

    /// Abandon any running sequence and ignore every later result.
    pub fn teardown(&self) {
        let mut st = self.state.borrow_mut();
        st.torn_down = true;
        st.generation += 1;
        st.loading = false;
    }

    fn is_current(&self, generation: u64) -> bool {
        let st = self.state.borrow();
        !st.torn_down && st.generation == generation
    }

    fn finish_loaded(&self, sessions: Vec<Session>) -> FetchOutcome {
        let mut st = self.state.borrow_mut();
        let count = sessions.len();
        st.sessions = sessions;
        st.error = None;
        st.loading = false;
        log::info!("Loaded {} sessions", count);
        FetchOutcome::Loaded(count)
    }
}
