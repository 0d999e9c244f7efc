use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessEntry {
    pub date: String,
    pub mood: String,
    pub goals: Vec<String>,
    pub summary: String,
}
