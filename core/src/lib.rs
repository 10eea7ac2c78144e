//! Lectio - scripture reading, search and word lookup
//!
//! Backend library providing verse search, highlighting and reference data.

pub mod verse;
pub mod matcher;
pub mod canon;
pub mod corpus;
pub mod cache;
pub mod service;
pub mod reader;
pub mod topics;
pub mod lexicon;
pub mod config;
pub mod error;
pub mod state;

pub use error::LectioError;
pub use state::AppState;
pub use config::Config;
pub use verse::{Verse, VerseRef};
pub use matcher::{highlight, search, MatchResult, Segment, Span, TermPattern};
pub use corpus::Corpus;
pub use cache::SearchCache;
pub use service::{highlight_checked, RequestToken, SearchHit, SearchHits, SearchService, SearchSession};
pub use reader::{Panel, ReaderState};
pub use topics::{PopularTopic, Topic, TopicIndex, TopicVerse};
pub use lexicon::{Definition, Lexicon, OriginalWord, RelatedVerse, WordEntry};
