//! Application state management

use crate::config::Config;
use crate::corpus::Corpus;
use crate::lexicon::Lexicon;
use crate::service::{SearchService, SearchSession};
use crate::topics::TopicIndex;
use anyhow::Result;
use std::sync::Arc;

/// Application state holding the corpus, search service and reference data
pub struct AppState {
    pub corpus: Arc<Corpus>,
    pub search: Arc<SearchService>,
    pub topics: Arc<TopicIndex>,
    pub lexicon: Arc<Lexicon>,
    pub config: Config,
}

impl AppState {
    /// Initialize application state, loading the configured corpus or the
    /// bundled sample when none is configured
    pub fn new(config: Config) -> Result<Self> {
        let corpus = match config.resolve_corpus_path() {
            Some(path) => Corpus::load(&path, &config.translation)?,
            None => {
                tracing::info!("no corpus configured, using the bundled sample corpus");
                Corpus::bundled()?
            }
        };
        Self::with_corpus(config, corpus)
    }

    pub fn with_corpus(config: Config, corpus: Corpus) -> Result<Self> {
        let corpus = Arc::new(corpus);
        let search = Arc::new(SearchService::new(Arc::clone(&corpus), config.cache_capacity));

        Ok(Self {
            corpus,
            search,
            topics: Arc::new(TopicIndex::bundled()?),
            lexicon: Arc::new(Lexicon::bundled()?),
            config,
        })
    }

    /// A new last-query-wins search session using the configured latency
    pub fn session(&self) -> SearchSession {
        SearchSession::with_latency(Arc::clone(&self.search), self.config.latency())
    }
}
