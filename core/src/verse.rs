//! Verse records and book/chapter/verse references

use crate::error::LectioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single addressable verse. Identity is the (book, chapter, verse) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl Verse {
    /// Build a verse, rejecting blank book names and zero chapter/verse numbers.
    pub fn new(
        book: impl Into<String>,
        chapter: u32,
        verse: u32,
        text: impl Into<String>,
    ) -> Result<Self, LectioError> {
        let verse = Self {
            book: book.into(),
            chapter,
            verse,
            text: text.into(),
        };
        verse.validate()?;
        Ok(verse)
    }

    pub fn validate(&self) -> Result<(), LectioError> {
        if self.book.trim().is_empty() {
            return Err(LectioError::InvalidCorpus("verse has an empty book name".to_string()));
        }
        if self.chapter == 0 || self.verse == 0 {
            return Err(LectioError::InvalidCorpus(format!(
                "{} {}:{} has a zero chapter or verse number",
                self.book, self.chapter, self.verse
            )));
        }
        Ok(())
    }

    pub fn reference(&self) -> VerseRef {
        VerseRef {
            book: self.book.clone(),
            chapter: self.chapter,
            verse: self.verse,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

impl FromStr for VerseRef {
    type Err = LectioError;

    /// Parses "John 3:16", "1 Corinthians 13:4" or "Song of Solomon 2:1".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| LectioError::InvalidReference(format!("'{}': {}", s.trim(), why));

        let (book, location) = s
            .trim()
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected '<book> <chapter>:<verse>'"))?;

        let book = book.split_whitespace().collect::<Vec<_>>().join(" ");
        if book.is_empty() {
            return Err(invalid("missing book name"));
        }

        let (chapter, verse) = location
            .split_once(':')
            .ok_or_else(|| invalid("expected '<chapter>:<verse>'"))?;
        let chapter: u32 = chapter.parse().map_err(|_| invalid("chapter is not a number"))?;
        let verse: u32 = verse.parse().map_err(|_| invalid("verse is not a number"))?;
        if chapter == 0 || verse == 0 {
            return Err(invalid("chapter and verse start at 1"));
        }

        Ok(Self { book, chapter, verse })
    }
}
