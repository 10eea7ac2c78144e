//! Reader navigation state: active panel, translation, book, chapter and the
//! selected verse

use crate::canon::{self, DEFAULT_TRANSLATION, MAX_CHAPTERS};
use crate::corpus::Corpus;
use crate::error::LectioError;
use crate::verse::Verse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    #[default]
    Reader,
    Search,
    Lookup,
    Topics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderState {
    pub panel: Panel,
    pub translation: String,
    pub book: String,
    pub chapter: u32,
    pub selected_verse: Option<u32>,
    /// Query handed to the search panel
    pub search_query: String,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            panel: Panel::Reader,
            translation: DEFAULT_TRANSLATION.to_string(),
            book: canon::BOOKS[0].to_string(),
            chapter: 1,
            selected_verse: None,
            search_query: String::new(),
        }
    }
}

impl ReaderState {
    pub fn set_translation(&mut self, id: &str) -> Result<(), LectioError> {
        let translation = canon::translation(id)
            .ok_or_else(|| LectioError::NotFound(format!("translation '{}'", id.trim())))?;
        self.translation = translation.id.to_string();
        Ok(())
    }

    /// Select a book, starting again at chapter 1.
    pub fn select_book(&mut self, book: &str) -> Result<(), LectioError> {
        let name = canon::canonical_name(book)
            .ok_or_else(|| LectioError::NotFound(format!("book '{}'", book.trim())))?;
        self.book = name.to_string();
        self.chapter = 1;
        self.selected_verse = None;
        Ok(())
    }

    pub fn select_chapter(&mut self, chapter: u32, corpus: &Corpus) -> Result<(), LectioError> {
        if chapter == 0 || chapter > self.last_chapter(corpus) {
            return Err(LectioError::InvalidReference(format!("{} has no chapter {}", self.book, chapter)));
        }
        self.chapter = chapter;
        self.selected_verse = None;
        Ok(())
    }

    /// Clicking the selected verse again clears the selection.
    pub fn toggle_verse(&mut self, verse: u32) {
        self.selected_verse = if self.selected_verse == Some(verse) { None } else { Some(verse) };
    }

    pub fn has_previous_chapter(&self) -> bool {
        self.chapter > 1
    }

    pub fn has_next_chapter(&self, corpus: &Corpus) -> bool {
        self.chapter < self.last_chapter(corpus)
    }

    /// Returns false when already at chapter 1.
    pub fn previous_chapter(&mut self) -> bool {
        if !self.has_previous_chapter() {
            return false;
        }
        self.chapter -= 1;
        self.selected_verse = None;
        true
    }

    pub fn next_chapter(&mut self, corpus: &Corpus) -> bool {
        if !self.has_next_chapter(corpus) {
            return false;
        }
        self.chapter += 1;
        self.selected_verse = None;
        true
    }

    /// Last chapter the corpus holds for the book, or the picker's upper
    /// bound when the corpus has none of it.
    fn last_chapter(&self, corpus: &Corpus) -> u32 {
        corpus.chapter_count(&self.book).unwrap_or(MAX_CHAPTERS)
    }

    /// Hand a query to the search panel. Blank queries are ignored.
    pub fn submit_search(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.search_query = query.to_string();
        self.panel = Panel::Search;
        true
    }

    pub fn current_chapter<'a>(&self, corpus: &'a Corpus) -> Vec<&'a Verse> {
        corpus.chapter(&self.book, self.chapter)
    }
}
