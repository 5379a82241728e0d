use crate::models::{GeoLocation, SearchFilters, SearchResult};
use crate::normalize::normalize;
use crate::prompt::build_prompt;
use crate::traits::PlaceModel;
use crate::SearchError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

pub struct PlaceSearch<M>
where
    M: PlaceModel,
{
    model: M,
}

impl<M> PlaceSearch<M>
where
    M: PlaceModel + Send + Sync,
{
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        location: Option<GeoLocation>,
    ) -> Result<SearchResult, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let plan = build_prompt(query, filters, location);
        debug!(
            categories = filters.categories.len(),
            radius = %filters.radius,
            located = location.is_some(),
            "dispatching place search"
        );

        let raw = self.model.generate(&plan).await.map_err(|failure| {
            error!(error = %failure, "gemini api error");
            failure.into_user_facing()
        })?;

        let result = normalize(&raw);
        debug!(places = result.places.len(), "place search normalized");
        Ok(result)
    }
}

/// Identifies one search submission. Later submissions carry larger values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub result: Option<SearchResult>,
    pub loading: bool,
    pub error: Option<String>,
    pub locating: bool,
}

/// Current result/loading/error for one user. The latest started search owns it.
#[derive(Debug, Default)]
pub struct SearchSession {
    inner: Mutex<SessionInner>,
}

#[derive(Debug, Default)]
struct SessionInner {
    latest: u64,
    state: SessionState,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin(&self) -> RequestToken {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state.loading = true;
        inner.state.result = None;
        inner.state.error = None;
        RequestToken(inner.latest)
    }

    /// Applies the outcome only when `token` is still the latest submission.
    pub fn commit(
        &self,
        token: RequestToken,
        outcome: Result<SearchResult, SearchError>,
    ) -> bool {
        let mut inner = self.lock();
        if token.0 != inner.latest {
            debug!(token = token.0, latest = inner.latest, "discarding stale search outcome");
            return false;
        }

        inner.state.loading = false;
        match outcome {
            Ok(result) => {
                inner.state.result = Some(result);
                inner.state.error = None;
            }
            Err(failure) => {
                inner.state.result = None;
                inner.state.error = Some(failure.user_message());
            }
        }
        true
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Runs a search for this session. A blank query is not dispatched.
    pub async fn submit<M>(
        &self,
        search: &PlaceSearch<M>,
        query: &str,
        filters: &SearchFilters,
        location: Option<GeoLocation>,
    ) -> Option<SessionState>
    where
        M: PlaceModel + Send + Sync,
    {
        if query.trim().is_empty() {
            return None;
        }

        let token = self.begin();
        let outcome = search.search(query, filters, location).await;
        self.commit(token, outcome);
        Some(self.snapshot())
    }

    pub fn begin_locate(&self) -> Result<(), SearchError> {
        let mut inner = self.lock();
        if inner.state.locating {
            return Err(SearchError::Request(
                "location lookup already in progress".to_string(),
            ));
        }
        inner.state.locating = true;
        Ok(())
    }

    pub fn finish_locate(&self) {
        self.lock().state.locating = false;
    }
}
