//! Home and detail views of the catalogue.
//!
//! The home view shows three fixed rows of featured titles. The detail view
//! shows one full record plus a short row of related titles.

use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{QueryCache, QueryOptions};
use crate::config::Config;
use crate::error::QueryError;
use crate::lookup::{FetchParams, MediaLookup, SearchParams};
use crate::media::{
    DescriptionSize, MediaCard, MediaDetails, MediaRecord, MediaSummary, MediaType,
};
use crate::search::SearchEngine;

/// Related titles shown under a detail view
pub const RELATED_LIMIT: usize = 6;

const FEATURED_MOVIE_IDS: [&str; 6] = [
    "tt0372784", // Batman Begins
    "tt0468569", // The Dark Knight
    "tt4154796", // Avengers: Endgame
    "tt0111161", // The Shawshank Redemption
    "tt0133093", // The Matrix
    "tt0137523", // Fight Club
];

const FEATURED_SERIES_IDS: [&str; 6] = [
    "tt0944947", // Game of Thrones
    "tt0108778", // Friends
    "tt2861424", // Rick and Morty
    "tt0306414", // How I Met Your Mother
    "tt0903747", // Breaking Bad
    "tt1475582", // Sherlock
];

const FEATURED_EPISODE_IDS: [&str; 6] = [
    "tt1541289",
    "tt0583452",
    "tt2301451",
    "tt2861424",
    "tt2178784",
    "tt2301455",
];

/// Rows of the home view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeaturedRow {
    Movies,
    Series,
    Episodes,
}

impl FeaturedRow {
    pub const ALL: [FeaturedRow; 3] = [FeaturedRow::Movies, FeaturedRow::Series, FeaturedRow::Episodes];

    pub fn title(&self) -> &'static str {
        match self {
            FeaturedRow::Movies => "Featured Movies",
            FeaturedRow::Series => "Popular Series",
            FeaturedRow::Episodes => "Latest Episodes",
        }
    }

    pub fn media_type(&self) -> MediaType {
        match self {
            FeaturedRow::Movies => MediaType::Movie,
            FeaturedRow::Series => MediaType::Series,
            FeaturedRow::Episodes => MediaType::Episode,
        }
    }

    pub fn ids(&self) -> &'static [&'static str] {
        match self {
            FeaturedRow::Movies => &FEATURED_MOVIE_IDS,
            FeaturedRow::Series => &FEATURED_SERIES_IDS,
            FeaturedRow::Episodes => &FEATURED_EPISODE_IDS,
        }
    }

    /// Path segment used in resource URIs
    pub fn slug(&self) -> &'static str {
        match self {
            FeaturedRow::Movies => "movies",
            FeaturedRow::Series => "series",
            FeaturedRow::Episodes => "episodes",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|row| row.slug() == slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRow {
    pub title: &'static str,
    pub items: Vec<MediaCard>,
}

/// Outcome of opening a detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailView {
    NotFound,
    Found {
        details: Box<MediaDetails>,
        related_title: String,
        related: Vec<MediaCard>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RelatedKey {
    title: String,
    media_type: MediaType,
}

#[derive(Debug, Clone, Copy)]
struct Policies {
    detail: QueryOptions,
    featured: QueryOptions,
    related: QueryOptions,
}

/// Entry point for every view of the catalogue
#[derive(Debug, Clone)]
pub struct Catalogue {
    lookup: Arc<dyn MediaLookup>,
    search: SearchEngine,
    details: Arc<QueryCache<String, MediaRecord>>,
    featured: Arc<QueryCache<FeaturedRow, Vec<MediaRecord>>>,
    related: Arc<QueryCache<RelatedKey, Vec<MediaSummary>>>,
    policies: Policies,
}

impl Catalogue {
    pub fn new(lookup: Arc<dyn MediaLookup>, config: &Config) -> Self {
        Self {
            search: SearchEngine::new(lookup.clone(), config.search_options()),
            lookup,
            details: Arc::new(QueryCache::new()),
            featured: Arc::new(QueryCache::new()),
            related: Arc::new(QueryCache::new()),
            policies: Policies {
                detail: config.detail_options(),
                featured: config.featured_options(),
                related: config.related_options(),
            },
        }
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    /// Records of one featured row, fetched together
    ///
    /// One failed record fails the whole row.
    pub async fn featured_row(&self, row: FeaturedRow) -> Result<Vec<MediaRecord>, QueryError> {
        let lookup = self.lookup.clone();
        self.featured
            .get(row, self.policies.featured, move || {
                let lookup = lookup.clone();
                async move {
                    let requests = row.ids().iter().map(|id| {
                        let params = FetchParams::by_id(*id)
                            .with_type(row.media_type())
                            .with_description(DescriptionSize::Short);
                        let lookup = lookup.clone();
                        async move { lookup.fetch(&params).await }
                    });
                    let records = try_join_all(requests).await?;
                    info!("Loaded {} records for {}", records.len(), row.title());
                    Ok::<_, anyhow::Error>(records)
                }
            })
            .await
    }

    /// One featured row as cards
    pub async fn content_row(&self, row: FeaturedRow) -> Result<ContentRow, QueryError> {
        let records = self.featured_row(row).await?;
        Ok(ContentRow {
            title: row.title(),
            items: records.iter().map(MediaCard::from).collect(),
        })
    }

    /// All three rows of the home view; a failed row renders empty
    pub async fn home(&self) -> Vec<ContentRow> {
        let rows = futures::future::join_all(FeaturedRow::ALL.into_iter().map(|row| async move {
            self.content_row(row).await.unwrap_or_else(|e| {
                warn!("Failed to load {}: {}", row.title(), e);
                ContentRow {
                    title: row.title(),
                    items: Vec::new(),
                }
            })
        }));
        rows.await
    }

    /// Full record for `media_id`
    pub async fn media(&self, media_id: &str) -> Result<MediaRecord, QueryError> {
        let lookup = self.lookup.clone();
        let params = FetchParams::by_id(media_id).with_description(DescriptionSize::Full);
        self.details
            .get(media_id.to_string(), self.policies.detail, move || {
                let lookup = lookup.clone();
                let params = params.clone();
                async move { Ok::<_, anyhow::Error>(lookup.fetch(&params).await?) }
            })
            .await
    }

    /// Detail view for `media_id`
    ///
    /// Fails only when the record itself cannot be fetched; trouble loading
    /// related titles leaves that row empty.
    pub async fn media_detail(&self, media_id: &str) -> Result<DetailView, QueryError> {
        let record = self.media(media_id).await?;
        if !record.is_success() {
            debug!(
                "Media {} not found: {}",
                media_id,
                record.error.as_deref().unwrap_or("unknown reason")
            );
            return Ok(DetailView::NotFound);
        }

        let media_type = record.media_type.unwrap_or(MediaType::Movie);
        let related = match self.related_titles(&record, media_type).await {
            Ok(related) => related,
            Err(e) => {
                warn!("Failed to load related titles for {}: {}", media_id, e);
                Vec::new()
            }
        };

        Ok(DetailView::Found {
            details: Box::new(MediaDetails::from(&record)),
            related_title: format!("More {}", media_type.category()),
            related: related.iter().map(MediaCard::from).collect(),
        })
    }

    async fn related_titles(
        &self,
        record: &MediaRecord,
        media_type: MediaType,
    ) -> Result<Vec<MediaSummary>, QueryError> {
        let title = record
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "movie".to_string());
        let key = RelatedKey {
            title: title.clone(),
            media_type,
        };

        let lookup = self.lookup.clone();
        let related = self
            .related
            .get(key, self.policies.related, move || {
                let lookup = lookup.clone();
                let params = SearchParams::new(title.clone())
                    .with_type(Some(media_type))
                    .with_page(1);
                async move {
                    let response = lookup.search(&params).await?;
                    Ok::<_, anyhow::Error>(response.items)
                }
            })
            .await?;

        Ok(select_related(related, &record.imdb_id))
    }

    /// Drop every cached answer
    pub async fn clear_cache(&self) {
        self.search.cache().clear().await;
        self.details.clear().await;
        self.featured.clear().await;
        self.related.clear().await;
    }
}

/// First few search hits, minus the record being viewed
pub fn select_related(items: Vec<MediaSummary>, current_id: &str) -> Vec<MediaSummary> {
    items
        .into_iter()
        .take(RELATED_LIMIT)
        .filter(|item| item.imdb_id != current_id)
        .collect()
}
