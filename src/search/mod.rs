// Module declarations
pub mod engine;
pub mod pagination;
pub mod query;

// Re-export public APIs
pub use engine::{
    FilterOption, SearchEngine, SearchResultPage, SearchSession, SearchView, SessionState,
    fetch_page,
};
pub use pagination::{
    DEFAULT_WINDOW_SIZE, PageButton, PaginationControls, RESULTS_PER_PAGE, compute_page_window,
    next_page, prev_page, total_pages,
};
pub use query::{SearchKey, SearchQuery, derive_cache_key};
