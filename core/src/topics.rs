//! Topical index: popular topics and key verses per topic

use crate::error::LectioError;
use crate::verse::VerseRef;
use serde::{Deserialize, Serialize};

const BUNDLED_TOPICS: &str = include_str!("../data/topics.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularTopic {
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicVerse {
    pub reference: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub description: String,
    pub verses: Vec<TopicVerse>,
    #[serde(default)]
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicIndex {
    #[serde(default)]
    popular: Vec<PopularTopic>,
    #[serde(default)]
    topics: Vec<Topic>,
}

impl TopicIndex {
    pub fn bundled() -> Result<Self, LectioError> {
        Self::from_json_str(BUNDLED_TOPICS)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LectioError> {
        let index: TopicIndex = serde_json::from_str(json)
            .map_err(|e| LectioError::InvalidCorpus(format!("malformed topics JSON: {}", e)))?;
        index.validate()?;
        Ok(index)
    }

    fn validate(&self) -> Result<(), LectioError> {
        for topic in &self.topics {
            if topic.name.trim().is_empty() {
                return Err(LectioError::InvalidCorpus("topic with an empty name".to_string()));
            }
            for verse in &topic.verses {
                verse.reference.parse::<VerseRef>()?;
            }
        }
        Ok(())
    }

    /// Popular topics in declared order.
    pub fn popular(&self) -> &[PopularTopic] {
        &self.popular
    }

    /// Case-insensitive lookup by name; blank names find nothing.
    pub fn lookup(&self, name: &str) -> Option<&Topic> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let wanted = name.to_lowercase();
        self.topics.iter().find(|t| t.name.to_lowercase() == wanted)
    }
}
