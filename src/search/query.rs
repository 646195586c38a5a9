use serde::{Deserialize, Serialize};

use crate::media::MediaType;

/// User-visible search state for one request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub content_type: Option<MediaType>,
    /// One based
    pub page: u32,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            content_type: None,
            page: 1,
        }
    }

    pub fn with_filter(mut self, content_type: Option<MediaType>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Empty or whitespace-only text never reaches the lookup API
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Cache key of a search request; equal queries give equal keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    text: String,
    content_type: Option<MediaType>,
    page: u32,
}

pub fn derive_cache_key(query: &SearchQuery) -> SearchKey {
    SearchKey {
        text: query.text.clone(),
        content_type: query.content_type,
        page: query.page,
    }
}
