//! Book canon and translation tables

use serde::Serialize;

/// Books in canonical order.
pub const BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy",
    "Joshua", "Judges", "Ruth", "1 Samuel", "2 Samuel",
    "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles",
    "Ezra", "Nehemiah", "Esther", "Job", "Psalms",
    "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel",
    "Daniel", "Hosea", "Joel", "Amos", "Obadiah",
    "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah",
    "Haggai", "Zechariah", "Malachi", "Matthew", "Mark",
    "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians",
    "Colossians", "1 Thessalonians", "2 Thessalonians",
    "1 Timothy", "2 Timothy", "Titus", "Philemon",
    "Hebrews", "James", "1 Peter", "2 Peter",
    "1 John", "2 John", "3 John", "Jude", "Revelation",
];

/// Chapter picker upper bound when the corpus does not know a book.
pub const MAX_CHAPTERS: u32 = 50;

/// Position of a book in the canon, case-insensitive. Single psalms are
/// cited as "Psalm", so that form is accepted too.
pub fn book_position(name: &str) -> Option<usize> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("psalm") {
        return BOOKS.iter().position(|b| *b == "Psalms");
    }
    BOOKS.iter().position(|b| b.eq_ignore_ascii_case(name))
}

/// Canonical spelling of a book name.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    book_position(name).map(|i| BOOKS[i])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub id: &'static str,
    pub name: &'static str,
}

pub const TRANSLATIONS: [Translation; 5] = [
    Translation { id: "NIV", name: "New International Version" },
    Translation { id: "ESV", name: "English Standard Version" },
    Translation { id: "KJV", name: "King James Version" },
    Translation { id: "NASB", name: "New American Standard Bible" },
    Translation { id: "NLT", name: "New Living Translation" },
];

pub const DEFAULT_TRANSLATION: &str = "NIV";

pub fn translation(id: &str) -> Option<&'static Translation> {
    let id = id.trim();
    TRANSLATIONS.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_positions() {
        assert_eq!(book_position("Genesis"), Some(0));
        assert_eq!(book_position("revelation"), Some(65));
        assert_eq!(book_position(" 1 corinthians "), Some(45));
        assert_eq!(book_position("Psalm"), book_position("Psalms"));
        assert_eq!(book_position("Hezekiah"), None);
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("song of solomon"), Some("Song of Solomon"));
        assert_eq!(canonical_name("psalm"), Some("Psalms"));
    }

    #[test]
    fn test_translation_lookup() {
        assert_eq!(translation("kjv").map(|t| t.name), Some("King James Version"));
        assert!(translation("XYZ").is_none());
        assert!(translation(DEFAULT_TRANSLATION).is_some());
    }
}
