//! Search service: cached corpus search and cancellable search sessions

use crate::cache::SearchCache;
use crate::corpus::Corpus;
use crate::error::LectioError;
use crate::matcher::{self, MatchResult, Segment, Span, TermPattern};
use crate::verse::Verse;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 256;

/// Longest text accepted by [`highlight_checked`], in characters.
pub const MAX_HIGHLIGHT_CHARS: usize = 8192;

fn check_length(what: &str, value: &str, limit: usize) -> Result<(), LectioError> {
    let chars = value.chars().count();
    if chars > limit {
        return Err(LectioError::InvalidQuery(format!(
            "{} is {} characters long, the limit is {}",
            what, chars, limit
        )));
    }
    Ok(())
}

/// [`matcher::highlight`] for caller-supplied input. Terms longer than
/// [`MAX_QUERY_CHARS`] and texts longer than [`MAX_HIGHLIGHT_CHARS`] are
/// rejected, which bounds the work of a single call.
pub fn highlight_checked(text: &str, term: &str) -> Result<Vec<Segment>, LectioError> {
    check_length("term", term, MAX_QUERY_CHARS)?;
    check_length("text", text, MAX_HIGHLIGHT_CHARS)?;
    Ok(matcher::highlight(text, term))
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub reference: String,
    pub verse: Verse,
    pub spans: Vec<Span>,
    pub segments: Vec<Segment>,
}

impl From<&MatchResult> for SearchHit {
    fn from(result: &MatchResult) -> Self {
        Self {
            reference: result.verse.reference().to_string(),
            verse: result.verse.clone(),
            spans: result.spans.clone(),
            segments: result.segments(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHits {
    pub query: String,
    pub translation: String,
    pub total: usize,
    pub results: Vec<SearchHit>,
}

pub struct SearchService {
    corpus: Arc<Corpus>,
    cache: SearchCache,
}

impl SearchService {
    pub fn new(corpus: Arc<Corpus>, cache_capacity: usize) -> Self {
        Self { corpus, cache: SearchCache::new(cache_capacity) }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Trimmed query, or an error when it is too long to search.
    fn normalize(query: &str) -> Result<&str, LectioError> {
        let query = query.trim();
        check_length("query", query, MAX_QUERY_CHARS)?;
        Ok(query)
    }

    /// All matching verses in corpus order. Blank queries match nothing.
    pub fn matches(&self, query: &str) -> Result<Arc<Vec<MatchResult>>, LectioError> {
        let query = Self::normalize(query)?;
        if query.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }
        Ok(self.cache.get_or_compute(query, || {
            let results = match TermPattern::new(query) {
                Some(pattern) => matcher::search_with(self.corpus.verses(), &pattern),
                None => Vec::new(),
            };
            tracing::debug!(query, hits = results.len(), "search");
            results
        }))
    }

    pub fn search(&self, query: &str) -> Result<SearchHits, LectioError> {
        self.search_page(query, usize::MAX, 0)
    }

    /// One page of results; `total` counts every match.
    pub fn search_page(&self, query: &str, limit: usize, offset: usize) -> Result<SearchHits, LectioError> {
        let matches = self.matches(query)?;
        Ok(SearchHits {
            query: query.trim().to_string(),
            translation: self.corpus.translation().to_string(),
            total: matches.len(),
            results: matches.iter().skip(offset).take(limit).map(SearchHit::from).collect(),
        })
    }
}

/// Ticket for one submitted query. It goes stale as soon as a newer query is
/// submitted or the session is cancelled.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.id
    }
}

/// Runs searches off the caller's thread, delivering only the result of the
/// most recent query.
pub struct SearchSession {
    service: Arc<SearchService>,
    generation: Arc<AtomicU64>,
    latency: Duration,
}

impl SearchSession {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self::with_latency(service, Duration::ZERO)
    }

    /// `latency` delays every result before it is delivered.
    pub fn with_latency(service: Arc<SearchService>, latency: Duration) -> Self {
        Self {
            service,
            generation: Arc::new(AtomicU64::new(0)),
            latency,
        }
    }

    fn issue(&self) -> RequestToken {
        let id = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        RequestToken { id, generation: Arc::clone(&self.generation) }
    }

    /// Invalidate whatever is in flight.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Submit a query. The token is issued immediately, so any earlier
    /// submission resolves to [`LectioError::Superseded`] even if it has not
    /// been polled yet.
    pub fn submit(
        &self,
        query: impl Into<String>,
    ) -> impl Future<Output = Result<SearchHits, LectioError>> + Send + 'static {
        self.submit_page(query, usize::MAX, 0)
    }

    /// Like [`submit`](Self::submit), returning one page of the results.
    pub fn submit_page(
        &self,
        query: impl Into<String>,
        limit: usize,
        offset: usize,
    ) -> impl Future<Output = Result<SearchHits, LectioError>> + Send + 'static {
        let token = self.issue();
        let service = Arc::clone(&self.service);
        let latency = self.latency;
        let query = query.into();

        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if !token.is_current() {
                tracing::debug!(request = token.id(), "search superseded before it ran");
                return Err(LectioError::Superseded);
            }

            let hits = tokio::task::spawn_blocking(move || service.search_page(&query, limit, offset))
                .await
                .map_err(|e| LectioError::Search(format!("Task join error: {}", e)))??;

            if !token.is_current() {
                tracing::debug!(request = token.id(), "discarding stale search result");
                return Err(LectioError::Superseded);
            }
            Ok(hits)
        }
    }
}
