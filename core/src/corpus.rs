//! Read-only verse corpus with JSON and SQLite loaders

use crate::canon::{self, DEFAULT_TRANSLATION};
use crate::error::LectioError;
use crate::verse::{Verse, VerseRef};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const BUNDLED_CORPUS: &str = include_str!("../data/sample_corpus.json");

/// On-disk JSON layout of a corpus file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusFile {
    #[serde(default = "default_translation")]
    pub translation: String,
    pub verses: Vec<Verse>,
}

fn default_translation() -> String {
    DEFAULT_TRANSLATION.to_string()
}

/// Verses of one translation, in source order.
#[derive(Debug, Clone)]
pub struct Corpus {
    translation: String,
    verses: Vec<Verse>,
    /// (book key, chapter) -> verse indices sorted by verse number
    chapters: HashMap<(String, u32), Vec<usize>>,
}

/// Case-insensitive book key; "Psalm" and "Psalms" share one key.
fn book_key(name: &str) -> String {
    canon::canonical_name(name)
        .map(str::to_string)
        .unwrap_or_else(|| name.trim().to_string())
        .to_lowercase()
}

impl Corpus {
    /// Build a corpus, rejecting malformed and duplicate verses.
    pub fn new(translation: impl Into<String>, verses: Vec<Verse>) -> Result<Self, LectioError> {
        let translation = translation.into();
        if translation.trim().is_empty() {
            return Err(LectioError::InvalidCorpus("translation id is empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(verses.len());
        let mut chapters: HashMap<(String, u32), Vec<usize>> = HashMap::new();
        for (idx, verse) in verses.iter().enumerate() {
            verse.validate()?;
            let key = book_key(&verse.book);
            if !seen.insert((key.clone(), verse.chapter, verse.verse)) {
                return Err(LectioError::InvalidCorpus(format!(
                    "duplicate verse {}",
                    verse.reference()
                )));
            }
            chapters.entry((key, verse.chapter)).or_default().push(idx);
        }
        for indices in chapters.values_mut() {
            indices.sort_by_key(|&i| verses[i].verse);
        }

        tracing::debug!(translation = %translation, verses = verses.len(), "corpus built");
        Ok(Self { translation, verses, chapters })
    }

    /// The sample corpus compiled into the binary.
    pub fn bundled() -> Result<Self, LectioError> {
        Self::from_json_str(BUNDLED_CORPUS)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LectioError> {
        let file: CorpusFile = serde_json::from_str(json)
            .map_err(|e| LectioError::InvalidCorpus(format!("malformed corpus JSON: {}", e)))?;
        Self::new(file.translation, file.verses)
    }

    /// Load from a `verses` table:
    /// `verses(translation TEXT, book TEXT, chapter INTEGER, verse INTEGER, text TEXT)`.
    pub fn from_connection(conn: &Connection, translation: &str) -> Result<Self, LectioError> {
        let mut stmt = conn.prepare(
            "SELECT book, chapter, verse, text FROM verses
             WHERE translation = ?1 COLLATE NOCASE
             ORDER BY rowid",
        )?;

        let rows = stmt.query_map([translation], |row| {
            Ok((
                row.get::<_, String>(0)?, // book
                row.get::<_, i64>(1)?,    // chapter
                row.get::<_, i64>(2)?,    // verse
                row.get::<_, String>(3)?, // text
            ))
        })?;

        let mut verses = Vec::new();
        for row in rows {
            let (book, chapter, verse, text) = row?;
            let number = |n: i64, what: &str| {
                u32::try_from(n).map_err(|_| {
                    LectioError::InvalidCorpus(format!("{} {}:{} has an out of range {}", book, chapter, verse, what))
                })
            };
            let chapter_no = number(chapter, "chapter")?;
            let verse_no = number(verse, "verse")?;
            verses.push(Verse::new(book.clone(), chapter_no, verse_no, text)?);
        }

        Self::new(translation.to_uppercase(), verses)
    }

    /// Load a corpus file. `.db`, `.sqlite` and `.sqlite3` files are read as
    /// SQLite, anything else as JSON.
    pub fn load(path: &Path, translation: &str) -> Result<Self> {
        let is_sqlite = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "db" | "sqlite" | "sqlite3"))
            .unwrap_or(false);

        let corpus = if is_sqlite {
            let conn = Connection::open(path)
                .with_context(|| format!("Failed to open corpus database at {:?}", path))?;
            Self::from_connection(&conn, translation)?
        } else {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read corpus file at {:?}", path))?;
            Self::from_json_str(&json)?
        };

        tracing::info!(path = ?path, translation = %corpus.translation, verses = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn get(&self, reference: &VerseRef) -> Option<&Verse> {
        self.chapters
            .get(&(book_key(&reference.book), reference.chapter))?
            .iter()
            .map(|&i| &self.verses[i])
            .find(|v| v.verse == reference.verse)
    }

    /// Verses of one chapter ordered by verse number. Unknown chapters are empty.
    pub fn chapter(&self, book: &str, chapter: u32) -> Vec<&Verse> {
        self.chapters
            .get(&(book_key(book), chapter))
            .map(|indices| indices.iter().map(|&i| &self.verses[i]).collect())
            .unwrap_or_default()
    }

    /// Highest chapter number present for a book.
    pub fn chapter_count(&self, book: &str) -> Option<u32> {
        let key = book_key(book);
        self.chapters
            .keys()
            .filter(|(b, _)| *b == key)
            .map(|(_, c)| *c)
            .max()
    }

    /// Books present in the corpus, canonical books first in canon order.
    pub fn books(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut books: Vec<&str> = Vec::new();
        for verse in &self.verses {
            if seen.insert(book_key(&verse.book)) {
                books.push(&verse.book);
            }
        }
        books.sort_by_key(|b| canon::book_position(b).unwrap_or(usize::MAX));
        books
            .into_iter()
            .map(|b| canon::canonical_name(b).unwrap_or(b).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(book: &str, chapter: u32, verse: u32, text: &str) -> Verse {
        Verse::new(book, chapter, verse, text).unwrap()
    }

    #[test]
    fn test_bundled_corpus_loads() {
        let corpus = Corpus::bundled().unwrap();
        assert_eq!(corpus.translation(), "NIV");
        assert!(corpus.len() >= 10);
        let first = corpus.get(&"Genesis 1:1".parse().unwrap()).unwrap();
        assert!(first.text.starts_with("In the beginning God created"));
    }

    #[test]
    fn test_chapter_is_sorted_by_verse() {
        let corpus = Corpus::new(
            "KJV",
            vec![
                verse("Genesis", 1, 2, "b"),
                verse("Exodus", 1, 1, "x"),
                verse("Genesis", 1, 1, "a"),
            ],
        )
        .unwrap();
        let numbers: Vec<u32> = corpus.chapter("genesis", 1).iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(corpus.chapter("Genesis", 2).is_empty());
        // source order is kept for search
        assert_eq!(corpus.verses()[0].verse, 2);
    }

    #[test]
    fn test_psalm_alias_resolves() {
        let corpus = Corpus::new("NIV", vec![verse("Psalms", 23, 1, "The Lord is my shepherd")]).unwrap();
        assert!(corpus.get(&VerseRef::new("Psalm", 23, 1)).is_some());
        assert_eq!(corpus.chapter_count("Psalm"), Some(23));
        assert_eq!(corpus.books(), vec!["Psalms"]);
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = Corpus::new("NIV", vec![verse("John", 1, 1, "a"), verse("john", 1, 1, "b")]).unwrap_err();
        assert!(matches!(err, LectioError::InvalidCorpus(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Corpus::from_json_str(r#"{"verses":[{"book":"John","chapter":0,"verse":1,"text":"x"}]}"#).unwrap_err();
        assert!(err.to_string().contains("zero chapter"));

        let err = Corpus::from_json_str(r#"{"verses":[{"book":"John","chapter":1}]}"#).unwrap_err();
        assert!(err.to_string().contains("malformed corpus JSON"));
    }

    #[test]
    fn test_books_in_canon_order() {
        let corpus = Corpus::new(
            "NIV",
            vec![
                verse("John", 1, 1, "a"),
                verse("Apocrypha", 1, 1, "z"),
                verse("Genesis", 1, 1, "b"),
                verse("Psalm", 23, 1, "c"),
            ],
        )
        .unwrap();
        assert_eq!(corpus.books(), vec!["Genesis", "Psalms", "John", "Apocrypha"]);
    }

    #[test]
    fn test_from_sqlite_connection() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE verses (translation TEXT, book TEXT, chapter INTEGER, verse INTEGER, text TEXT);
            INSERT INTO verses VALUES ('KJV', 'John', 3, 16, 'For God so loved the world');
            INSERT INTO verses VALUES ('KJV', 'Genesis', 1, 1, 'In the beginning God created the heaven and the earth.');
            INSERT INTO verses VALUES ('NIV', 'Genesis', 1, 1, 'In the beginning God created the heavens and the earth.');
            "#,
        )
        .unwrap();

        let corpus = Corpus::from_connection(&conn, "kjv").unwrap();
        assert_eq!(corpus.translation(), "KJV");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.verses()[0].book, "John");
        assert!(corpus.get(&VerseRef::new("Genesis", 1, 1)).unwrap().text.contains("heaven and"));
    }

    #[test]
    fn test_from_sqlite_rejects_negative_numbers() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE verses (translation TEXT, book TEXT, chapter INTEGER, verse INTEGER, text TEXT);
            INSERT INTO verses VALUES ('NIV', 'John', -3, 16, 'x');
            "#,
        )
        .unwrap();
        let err = Corpus::from_connection(&conn, "NIV").unwrap_err();
        assert!(matches!(err, LectioError::InvalidCorpus(_)));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(
            &path,
            r#"{"translation":"ESV","verses":[{"book":"Mark","chapter":11,"verse":24,"text":"Therefore I tell you"}]}"#,
        )
        .unwrap();
        let corpus = Corpus::load(&path, "ignored").unwrap();
        assert_eq!(corpus.translation(), "ESV");
        assert_eq!(corpus.chapter("Mark", 11).len(), 1);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = Corpus::load(Path::new("/nonexistent/corpus.json"), "NIV").unwrap_err();
        assert!(err.to_string().contains("Failed to read corpus file"));
    }
}
