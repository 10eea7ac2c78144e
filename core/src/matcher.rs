//! Case-insensitive verse matching and highlight segmentation
//!
//! A search term is compiled into a literal pattern where every cased
//! character becomes a one-character class of its case variants, e.g. `Lord`
//! becomes `[lL][oO][rR][dD]`. Every other character is escaped, so terms such
//! as `(light)` or `a.b*` match literally. Each class matches exactly one
//! character, which keeps a matched span the same length (in characters) as
//! the term.

use crate::verse::Verse;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Byte range of one match inside a verse's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub verse: Verse,
    pub spans: Vec<Span>,
}

impl MatchResult {
    pub fn segments(&self) -> Vec<Segment> {
        segments_from_spans(&self.verse.text, &self.spans)
    }
}

/// A piece of highlighted text. Concatenating all segments in order gives
/// back the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_match: false }
    }

    pub fn matched(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_match: true }
    }
}

/// A compiled, non-empty search term.
#[derive(Debug, Clone)]
pub struct TermPattern {
    regex: Regex,
}

impl TermPattern {
    /// Returns `None` for an empty term, which matches nothing.
    pub fn new(term: &str) -> Option<Self> {
        if term.is_empty() {
            return None;
        }
        match Regex::new(&case_folded_pattern(term)) {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                tracing::warn!(term, error = %e, "search term could not be compiled, treating as no match");
                None
            }
        }
    }

    /// Leftmost, non-overlapping occurrences in ascending order.
    pub fn find_spans(&self, text: &str) -> Vec<Span> {
        self.regex
            .find_iter(text)
            .map(|m| Span { start: m.start(), end: m.end() })
            .collect()
    }

    pub fn segments(&self, text: &str) -> Vec<Segment> {
        segments_from_spans(text, &self.find_spans(text))
    }
}

/// Case-insensitive substring search over a corpus.
///
/// The query is trimmed first; an empty query yields no results. Results keep
/// corpus order.
pub fn search<'a, I>(corpus: I, query: &str) -> Vec<MatchResult>
where
    I: IntoIterator<Item = &'a Verse>,
{
    match TermPattern::new(query.trim()) {
        Some(pattern) => search_with(corpus, &pattern),
        None => Vec::new(),
    }
}

pub fn search_with<'a, I>(corpus: I, pattern: &TermPattern) -> Vec<MatchResult>
where
    I: IntoIterator<Item = &'a Verse>,
{
    corpus
        .into_iter()
        .filter_map(|verse| {
            let spans = pattern.find_spans(&verse.text);
            if spans.is_empty() {
                None
            } else {
                Some(MatchResult { verse: verse.clone(), spans })
            }
        })
        .collect()
}

/// Split `text` on case-insensitive occurrences of `term`.
///
/// The term is used as given (not trimmed). An empty term, or a term that
/// does not occur, yields the whole text as one non-matching segment.
pub fn highlight(text: &str, term: &str) -> Vec<Segment> {
    match TermPattern::new(term) {
        Some(pattern) => pattern.segments(text),
        None => vec![Segment::plain(text)],
    }
}

fn segments_from_spans(text: &str, spans: &[Span]) -> Vec<Segment> {
    if spans.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            segments.push(Segment::plain(&text[cursor..span.start]));
        }
        segments.push(Segment::matched(&text[span.start..span.end]));
        cursor = span.end;
    }
    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

fn case_folded_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 4);
    let mut buf = [0u8; 4];
    for c in term.chars() {
        let variants = case_variants(c);
        if variants.len() > 1 {
            // Variants are all letters, none of them is special inside a class.
            pattern.push('[');
            pattern.extend(variants);
            pattern.push(']');
        } else {
            pattern.push_str(&regex_lite::escape(c.encode_utf8(&mut buf)));
        }
    }
    pattern
}

/// `c` plus its single-character lower and upper case mappings.
///
/// Only mappings out of `c` are followed. Characters that fold into `c` from
/// elsewhere, such as KELVIN SIGN (U+212A) lowering to `k`, are not added, so
/// the term `k` does not match a Kelvin sign in the text.
fn case_variants(c: char) -> Vec<char> {
    let mut variants = vec![c];
    for mapped in [single_char(c.to_lowercase()), single_char(c.to_uppercase())]
        .into_iter()
        .flatten()
    {
        if !variants.contains(&mapped) {
            variants.push(mapped);
        }
    }
    variants
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    match chars.next() {
        Some(_) => None,
        None => Some(first),
    }
}
