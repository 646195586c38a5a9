use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pagination::{PaginationControls, RESULTS_PER_PAGE, next_page, prev_page, total_pages};
use super::query::{SearchKey, SearchQuery, derive_cache_key};
use crate::cache::{QueryCache, QueryOptions};
use crate::error::{LookupError, QueryError};
use crate::lookup::{MediaLookup, SearchParams};
use crate::media::{MediaCard, MediaSummary, MediaType};

const PROMPT_TITLE: &str = "Please search something to see results";
const LOADING_MESSAGE: &str = "Loading...";
const NO_RESULTS_MESSAGE: &str = "No results found. Try a different search term.";

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResultPage {
    pub items: Vec<MediaSummary>,
    pub total_result_count: u64,
}

impl SearchResultPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_result_count)
    }
}

/// Run one search against the lookup API
///
/// Blank text returns an empty page without a request. An in-band "not
/// found" answer is an empty page too; only transport failures are errors.
pub async fn fetch_page(
    lookup: &dyn MediaLookup,
    query: &SearchQuery,
) -> Result<SearchResultPage, LookupError> {
    if query.is_blank() {
        return Ok(SearchResultPage::empty());
    }

    let params = SearchParams::new(query.text.clone())
        .with_type(query.content_type)
        .with_page(query.page);

    let response = lookup.search(&params).await.inspect_err(|e| {
        warn!("Search for {:?} (page {}) failed: {}", query.text, query.page, e);
    })?;

    if !response.is_success() {
        debug!(
            "No results for {:?} (page {}): {}",
            query.text,
            query.page,
            response.error.as_deref().unwrap_or("unknown reason")
        );
        return Ok(SearchResultPage::empty());
    }

    let total_result_count = response.total_result_count();
    Ok(SearchResultPage {
        items: response.items,
        total_result_count,
    })
}

/// Cached search shared by every session
#[derive(Debug, Clone)]
pub struct SearchEngine {
    lookup: Arc<dyn MediaLookup>,
    cache: Arc<QueryCache<SearchKey, SearchResultPage>>,
    options: QueryOptions,
}

impl SearchEngine {
    pub fn new(lookup: Arc<dyn MediaLookup>, options: QueryOptions) -> Self {
        Self {
            lookup,
            cache: Arc::new(QueryCache::new()),
            options,
        }
    }

    pub fn cache(&self) -> &QueryCache<SearchKey, SearchResultPage> {
        &self.cache
    }

    /// Result page for `query`, served from cache when fresh
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage, QueryError> {
        if query.is_blank() {
            return Ok(SearchResultPage::empty());
        }

        let lookup = self.lookup.clone();
        let request = query.clone();
        self.cache
            .get(derive_cache_key(query), self.options, move || {
                let lookup = lookup.clone();
                let request = request.clone();
                async move { Ok::<_, anyhow::Error>(fetch_page(lookup.as_ref(), &request).await?) }
            })
            .await
    }
}

/// Lifecycle of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No query text
    Idle,
    /// Query changed and the result is not resolved yet
    Loading,
    /// Result available, possibly empty
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: &'static str,
    pub value: Option<MediaType>,
    pub selected: bool,
}

/// Render-ready snapshot of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchView {
    pub title: String,
    pub state: SessionState,
    pub loading: bool,
    pub filters: Vec<FilterOption>,
    pub items: Vec<MediaCard>,
    pub total_results: u64,
    pub total_pages: u32,
    pub page: u32,
    pub pagination: Option<PaginationControls>,
    pub message: Option<&'static str>,
}

/// Search state owned by one caller
///
/// Setters only record the change; [`SearchSession::refresh`] resolves it.
#[derive(Debug, Clone)]
pub struct SearchSession {
    engine: SearchEngine,
    query: SearchQuery,
    state: SessionState,
    result: SearchResultPage,
    failed: bool,
}

impl SearchSession {
    pub fn new(engine: SearchEngine, text: impl Into<String>) -> Self {
        let query = SearchQuery::new(text);
        let state = Self::pending_state(&query);
        Self {
            engine,
            query,
            state,
            result: SearchResultPage::empty(),
            failed: false,
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn result(&self) -> &SearchResultPage {
        &self.result
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    /// Whether the last resolution failed at the transport level
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn total_pages(&self) -> u32 {
        self.result.total_pages()
    }

    /// New text starts again from the first page
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.update(SearchQuery::new(text).with_filter(self.query.content_type));
    }

    /// Changing the filter keeps the text and returns to the first page
    pub fn set_filter(&mut self, content_type: Option<MediaType>) {
        self.update(SearchQuery::new(self.query.text.clone()).with_filter(content_type));
    }

    /// Jump to a page taken from the page window
    pub fn go_to_page(&mut self, page: u32) {
        self.update(self.query.clone().with_page(page));
    }

    pub fn next_page(&mut self) {
        let page = next_page(self.query.page, self.total_pages());
        self.go_to_page(page);
    }

    pub fn prev_page(&mut self) {
        let page = prev_page(self.query.page);
        self.go_to_page(page);
    }

    /// Resolve the current query and return the resulting view
    pub async fn refresh(&mut self) -> SearchView {
        if self.state == SessionState::Loading {
            match self.engine.search(&self.query).await {
                Ok(page) => {
                    info!(
                        "Search {:?} page {}: {} of {} results",
                        self.query.text,
                        self.query.page,
                        page.items.len(),
                        page.total_result_count
                    );
                    self.result = page;
                    self.failed = false;
                }
                Err(e) => {
                    warn!("Search {:?} failed: {}", self.query.text, e);
                    self.result = SearchResultPage::empty();
                    self.failed = true;
                }
            }
            self.state = SessionState::Loaded;
        }
        self.view()
    }

    /// The previous result is hidden while a new one is loading
    pub fn view(&self) -> SearchView {
        let loading = self.is_loading();
        let empty = SearchResultPage::empty();
        let result = if loading { &empty } else { &self.result };
        let total_pages = result.total_pages();
        let has_results = !result.items.is_empty();

        let message = if loading {
            Some(LOADING_MESSAGE)
        } else if has_results {
            None
        } else {
            Some(NO_RESULTS_MESSAGE)
        };

        SearchView {
            title: self.title(),
            state: self.state,
            loading,
            filters: MediaType::FILTERS
                .iter()
                .map(|&value| FilterOption {
                    label: MediaType::filter_label(value),
                    value,
                    selected: value == self.query.content_type,
                })
                .collect(),
            items: result
                .items
                .iter()
                .take(RESULTS_PER_PAGE as usize)
                .map(MediaCard::from)
                .collect(),
            total_results: result.total_result_count,
            total_pages,
            page: self.query.page,
            pagination: has_results.then(|| PaginationControls::new(self.query.page, total_pages)),
            message,
        }
    }

    fn title(&self) -> String {
        if self.query.is_blank() {
            PROMPT_TITLE.to_string()
        } else {
            format!("Search results for \"{}\"", self.query.text)
        }
    }

    fn update(&mut self, query: SearchQuery) {
        if query == self.query {
            return;
        }
        self.state = Self::pending_state(&query);
        if self.state == SessionState::Idle {
            self.result = SearchResultPage::empty();
            self.failed = false;
        }
        self.query = query;
    }

    fn pending_state(query: &SearchQuery) -> SessionState {
        if query.is_blank() {
            SessionState::Idle
        } else {
            SessionState::Loading
        }
    }
}
