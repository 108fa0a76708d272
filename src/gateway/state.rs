use std::sync::Arc;

use crate::constants::DEFAULT_RATE_LIMIT_PER_MINUTE;
use crate::ratelimit::RateLimiter;
use crate::search::SearchService;
use crate::vectordb::VectorBackend;

pub struct AppState<B: VectorBackend> {
    pub search: Arc<SearchService<B>>,

    pub limiter: Arc<RateLimiter>,

    /// Requests per minute per client on `/api/search`.
    pub search_rate_limit: u32,
}

impl<B: VectorBackend> AppState<B> {
    pub fn new(search: Arc<SearchService<B>>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            search,
            limiter,
            search_rate_limit: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }

    pub fn with_search_rate_limit(mut self, limit: u32) -> Self {
        self.search_rate_limit = limit;
        self
    }
}

// Not derived: `B` is not required to be Clone.
impl<B: VectorBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            search: self.search.clone(),
            limiter: self.limiter.clone(),
            search_rate_limit: self.search_rate_limit,
        }
    }
}
