//! Semantic search panel logic.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use echo_types::{
    search::{SearchMetadata, SearchResult, SemanticSearchRequest},
    session::SessionId,
};
use crate::orchestrator::NO_SESSION_ERROR;
use crate::ports::ApiPort;

#[derive(Debug, Default)]
pub struct SearchState {
    /// The query of the last issued search
    pub query: String,
    /// Ranked as returned by the server
    pub results: Vec<SearchResult>,
    pub metadata: Option<SearchMetadata>,
    pub loading: bool,
    pub error: Option<String>,
    /// At least one search completed since the last clear
    pub searched: bool,
    generation: u64,
}

impl SearchState {
    pub fn no_results(&self) -> bool {
        self.searched && !self.loading && self.error.is_none() && self.results.is_empty()
    }

    /// Metadata is only shown alongside results.
    pub fn visible_metadata(&self) -> Option<&SearchMetadata> {
        if self.results.is_empty() {
            None
        } else {
            self.metadata.as_ref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; no request was made
    Skipped,
    Rejected(String),
    Found(usize),
    NoResults,
    Failed(String),
    Superseded,
}

#[derive(Clone)]
pub struct SearchPanel {
    state: Rc<RefCell<SearchState>>,
    api: Rc<dyn ApiPort>,
    limit: usize,
}

impl SearchPanel {
    pub fn new(api: Rc<dyn ApiPort>, limit: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(SearchState::default())),
            api,
            limit,
        }
    }

    pub fn state(&self) -> Ref<'_, SearchState> {
        self.state.borrow()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn search(&self, query: &str, session_id: Option<SessionId>) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Skipped;
        }

        let (generation, session_id) = {
            let mut st = self.state.borrow_mut();
            let Some(session_id) = session_id else {
                st.error = Some(NO_SESSION_ERROR.to_string());
                return SearchOutcome::Rejected(NO_SESSION_ERROR.to_string());
            };
            st.generation += 1;
            st.query = query.to_string();
            st.loading = true;
            st.error = None;
            log::info!("Semantic search in session {}: '{}'", session_id, query);
            (st.generation, session_id)
        };

        let request = SemanticSearchRequest {
            query: query.to_string(),
            session_id,
            limit: self.limit,
        };
        let result = self.api.semantic_search(request).await;

        let mut st = self.state.borrow_mut();
        if st.generation != generation {
            return SearchOutcome::Superseded;
        }
        st.loading = false;
        st.searched = true;

        match result {
            Ok(mut response) => {
                response.results.truncate(self.limit);
                let count = response.results.len();
                st.results = response.results;
                st.metadata = response.metadata;
                if count == 0 {
                    SearchOutcome::NoResults
                } else {
                    SearchOutcome::Found(count)
                }
            }
            Err(e) if e.is_not_found() => {
                st.results.clear();
                st.metadata = None;
                SearchOutcome::NoResults
            }
            Err(e) => {
                log::error!("Semantic search failed: {}", e);
                let message = format!("Search failed: {}", e);
                st.results.clear();
                st.metadata = None;
                st.error = Some(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }

    /// Drop results, e.g. when another session is selected.
    pub fn clear(&self) {
        let mut st = self.state.borrow_mut();
        st.generation += 1;
        st.query.clear();
        st.results.clear();
        st.metadata = None;
        st.loading = false;
        st.error = None;
        st.searched = false;
    }
}
