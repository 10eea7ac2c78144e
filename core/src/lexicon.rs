//! Word lookup: definitions, original-language words and related verses

use crate::error::LectioError;
use crate::verse::VerseRef;
use serde::{Deserialize, Serialize};

const BUNDLED_LEXICON: &str = include_str!("../data/lexicon.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub part_of_speech: String,
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalWord {
    pub language: String,
    pub word: String,
    pub definition: String,
    /// Strong's concordance number, `H` (Hebrew) or `G` (Greek) followed by digits.
    pub strongs: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedVerse {
    pub reference: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub original_languages: Vec<OriginalWord>,
    #[serde(default)]
    pub related_verses: Vec<RelatedVerse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    entries: Vec<WordEntry>,
}

pub fn is_valid_strongs(number: &str) -> bool {
    let mut chars = number.chars();
    matches!(chars.next(), Some('H' | 'G'))
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit())
}

impl Lexicon {
    pub fn bundled() -> Result<Self, LectioError> {
        Self::from_json_str(BUNDLED_LEXICON)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LectioError> {
        let lexicon: Lexicon = serde_json::from_str(json)
            .map_err(|e| LectioError::InvalidCorpus(format!("malformed lexicon JSON: {}", e)))?;

        for entry in &lexicon.entries {
            if entry.word.trim().is_empty() {
                return Err(LectioError::InvalidCorpus("lexicon entry with an empty word".to_string()));
            }
            for original in &entry.original_languages {
                if !is_valid_strongs(&original.strongs) {
                    return Err(LectioError::InvalidCorpus(format!(
                        "'{}' has an invalid Strong's number '{}'",
                        entry.word, original.strongs
                    )));
                }
            }
            for verse in &entry.related_verses {
                verse.reference.parse::<VerseRef>()?;
            }
        }
        Ok(lexicon)
    }

    pub fn lookup(&self, word: &str) -> Option<&WordEntry> {
        let word = word.trim();
        if word.is_empty() {
            return None;
        }
        let wanted = word.to_lowercase();
        self.entries.iter().find(|e| e.word.to_lowercase() == wanted)
    }
}
