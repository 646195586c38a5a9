pub mod cache;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod lookup;
pub mod mcp_server;
pub mod media;
pub mod search;

pub use cache::{QueryCache, QueryOptions};
pub use catalogue::{Catalogue, DetailView, FeaturedRow};
pub use config::Config;
pub use error::{LookupError, QueryError};
pub use lookup::{MediaLookup, OmdbClient};
pub use media::{MediaCard, MediaDetails, MediaRecord, MediaSummary, MediaType, SearchResponse};
