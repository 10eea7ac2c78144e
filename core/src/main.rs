//! Lectio - command-line scripture reader

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use lectio_lib::{AppState, Config, Segment, VerseRef};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Lectio: read, search and look up scripture")]
struct Cli {
    /// Corpus file (JSON, or SQLite with a `verses` table)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,
    /// Translation id to load from a SQLite corpus
    #[arg(long, global = true)]
    translation: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Case-insensitive full-text search
    Search {
        query: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Print one chapter
    Chapter { book: String, chapter: u32 },
    /// Print one verse, e.g. "John 3:16"
    Verse { reference: String },
    /// List popular topics
    Topics,
    /// Show the key verses of a topic
    Topic { name: String },
    /// Look up a word
    Lookup { word: String },
    /// List the books in the corpus
    Books,
}

fn render(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| if s.is_match { format!("[{}]", s.text) } else { s.text.clone() })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if cli.corpus.is_some() {
        config.corpus_path = cli.corpus;
    }
    if let Some(translation) = cli.translation {
        config.translation = translation;
    }
    let state = AppState::new(config)?;

    match cli.cmd {
        Cmd::Search { query, limit, offset } => {
            let hits = state.search.search_page(&query, limit, offset)?;
            println!("Results for \"{}\": {} verses found ({})", hits.query, hits.total, hits.translation);
            for hit in hits.results {
                println!("{:<22} {}", hit.reference, render(&hit.segments));
            }
        }
        Cmd::Chapter { book, chapter } => {
            let verses = state.corpus.chapter(&book, chapter);
            if verses.is_empty() {
                return Err(anyhow!("{} {} is not in the corpus", book, chapter));
            }
            println!("{} {} ({})", verses[0].book, chapter, state.corpus.translation());
            for verse in verses {
                println!("{:>3}  {}", verse.verse, verse.text);
            }
        }
        Cmd::Verse { reference } => {
            let reference: VerseRef = reference.parse()?;
            let verse = state
                .corpus
                .get(&reference)
                .ok_or_else(|| anyhow!("{} is not in the corpus", reference))?;
            println!("{}  {}", verse.reference(), verse.text);
        }
        Cmd::Topics => {
            for topic in state.topics.popular() {
                println!("{:<14} {} verses", topic.name, topic.count);
            }
        }
        Cmd::Topic { name } => {
            let topic = state
                .topics
                .lookup(&name)
                .ok_or_else(|| anyhow!("no topic named '{}'", name.trim()))?;
            println!("{} ({} verses)\n{}\n", topic.name, topic.verses.len(), topic.description);
            for verse in &topic.verses {
                println!("{:<22} {}", verse.reference, verse.text);
            }
            if !topic.related.is_empty() {
                println!("\nRelated: {}", topic.related.join(", "));
            }
        }
        Cmd::Lookup { word } => {
            let entry = state
                .lexicon
                .lookup(&word)
                .ok_or_else(|| anyhow!("no entry for '{}'", word.trim()))?;
            match &entry.pronunciation {
                Some(p) => println!("{} /{}/", entry.word, p),
                None => println!("{}", entry.word),
            }
            for def in &entry.definitions {
                println!("  ({}) {}", def.part_of_speech, def.definition);
                if let Some(example) = &def.example {
                    println!("      Example: \"{}\"", example);
                }
            }
            for original in &entry.original_languages {
                println!("  {} {} [{}]: {}", original.language, original.word, original.strongs, original.definition);
            }
            for verse in &entry.related_verses {
                println!("  {:<20} {}", verse.reference, verse.text);
            }
        }
        Cmd::Books => {
            for book in state.corpus.books() {
                let chapters = state.corpus.chapter_count(&book).unwrap_or(0);
                println!("{:<18} {} chapters", book, chapters);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectio_lib::highlight;

    #[test]
    fn test_render_brackets_matches() {
        let segments = highlight("In the beginning God created", "beginning");
        assert_eq!(render(&segments), "In the [beginning] God created");

        let segments = highlight("Light and LIGHT", "light");
        assert_eq!(render(&segments), "[Light] and [LIGHT]");
    }

    #[test]
    fn test_render_without_matches_is_plain() {
        assert_eq!(render(&highlight("The Lord is my shepherd", "xyzzy")), "The Lord is my shepherd");
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lectio", "search", "light", "--limit", "5", "--corpus", "kjv.db"]).unwrap();
        assert_eq!(cli.corpus, Some(PathBuf::from("kjv.db")));
        match cli.cmd {
            Cmd::Search { query, limit, offset } => {
                assert_eq!(query, "light");
                assert_eq!(limit, 5);
                assert_eq!(offset, 0);
            }
            _ => panic!("expected search"),
        }
    }
}
