#![allow(dead_code)]

use async_trait::async_trait;
use media_catalogue::config::Config;
use media_catalogue::error::LookupError;
use media_catalogue::lookup::{FetchParams, MediaLookup, SearchParams};
use media_catalogue::media::{MediaRecord, MediaSummary, MediaType, SearchResponse};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-process stand-in for the lookup API that records every call
#[derive(Debug, Default)]
pub struct StubLookup {
    records: HashMap<String, MediaRecord>,
    failing_ids: HashSet<String>,
    search_response: Option<SearchResponse>,
    search_failures: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub searches: Mutex<Vec<SearchParams>>,
    pub fetches: Mutex<Vec<FetchParams>>,
}

impl StubLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, record: MediaRecord) -> Self {
        self.records.insert(record.imdb_id.clone(), record);
        self
    }

    pub fn with_search(mut self, response: SearchResponse) -> Self {
        self.search_response = Some(response);
        self
    }

    /// The next `count` searches fail with a server error
    pub fn failing_searches(self, count: usize) -> Self {
        self.search_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_id(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }

    pub fn search_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn last_search(&self) -> Option<SearchParams> {
        self.searches.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MediaLookup for StubLookup {
    async fn fetch(&self, params: &FetchParams) -> Result<MediaRecord, LookupError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetches.lock().unwrap().push(params.clone());

        let Some(id) = params.media_id.as_deref().filter(|id| !id.is_empty()) else {
            if params.title.as_deref().is_none_or(str::is_empty) {
                return Err(LookupError::MissingIdentifier);
            }
            return Ok(not_found("Movie not found!"));
        };

        if self.failing_ids.contains(id) {
            return Err(LookupError::Http {
                status: 500,
                message: "API Error".to_string(),
            });
        }

        Ok(self
            .records
            .get(id)
            .cloned()
            .unwrap_or_else(|| not_found("Incorrect IMDb ID.")))
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, LookupError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches.lock().unwrap().push(params.clone());

        let failing = self
            .search_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LookupError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        Ok(self.search_response.clone().unwrap_or_else(|| SearchResponse {
            items: Vec::new(),
            total_results: None,
            response: "False".to_string(),
            error: Some("Movie not found!".to_string()),
        }))
    }
}

/// Config with instant retries
pub fn test_config() -> Config {
    Config {
        retry_base_delay_ms: 0,
        ..Config::default()
    }
}

pub fn summary(id: &str, title: &str, media_type: MediaType) -> MediaSummary {
    MediaSummary {
        imdb_id: id.to_string(),
        title: Some(title.to_string()),
        year: Some("2008".to_string()),
        media_type: Some(media_type),
        poster: Some("N/A".to_string()),
    }
}

pub fn record(id: &str, title: &str, media_type: MediaType) -> MediaRecord {
    MediaRecord {
        imdb_id: id.to_string(),
        title: Some(title.to_string()),
        year: Some("2008".to_string()),
        genre: Some("Action, Crime, Drama".to_string()),
        media_type: Some(media_type),
        response: "True".to_string(),
        ..Default::default()
    }
}

pub fn search_response(items: Vec<MediaSummary>, total_results: &str) -> SearchResponse {
    SearchResponse {
        items,
        total_results: Some(total_results.to_string()),
        response: "True".to_string(),
        error: None,
    }
}

pub fn not_found(message: &str) -> MediaRecord {
    MediaRecord {
        response: "False".to_string(),
        error: Some(message.to_string()),
        ..Default::default()
    }
}

/// Batman results as the lookup API returns them for a two-hit search
pub fn batman_results() -> SearchResponse {
    search_response(
        vec![
            summary("tt0372784", "Batman Begins", MediaType::Movie),
            summary("tt0468569", "The Dark Knight", MediaType::Movie),
        ],
        "2",
    )
}
