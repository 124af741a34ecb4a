use crate::models::session::TerminationReason;
use serde::{Deserialize, Serialize};

/// Anti-cheating flags attached to a single response, plus the termination
/// decision derived from them and the session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntiCheatVerdict {
    pub is_duplicate: bool,
    /// How many earlier responses this one duplicates.
    pub prior_duplicates: usize,
    pub max_similarity: f64,
    pub is_off_topic: bool,

    pub duplicate_flags: Vec<String>,
    pub timing_flags: Vec<String>,
    pub content_flags: Vec<String>,
    pub behavioral_flags: Vec<String>,

    pub total_flags: usize,
    pub confidence: f64,
    pub should_terminate: bool,
    pub termination_reason: Option<TerminationReason>,
}

impl AntiCheatVerdict {
    pub fn all_flags(&self) -> impl Iterator<Item = &String> {
        self.duplicate_flags
            .iter()
            .chain(&self.timing_flags)
            .chain(&self.content_flags)
            .chain(&self.behavioral_flags)
    }
}
