use serde::{Deserialize, Serialize};

/// A teachable concept in the tutor's shared content list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub sample_question: String,
}

impl Concept {
    /// The tutor creates concepts on demand when the user names one that is
    /// not in the content list yet.
    pub fn synthesize(name: &str) -> Self {
        let title = name.trim().to_owned();
        let id = title.to_lowercase().replace(' ', "_");
        Self {
            summary: format!("This is an auto-generated summary for {title}."),
            sample_question: format!("What is {title}?"),
            id,
            title,
        }
    }

    /// Concept identity matches on id or title, case-insensitively.
    pub fn matches_name(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.id.to_lowercase() == needle || self.title.to_lowercase() == needle
    }
}
