use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Zero-based position within the session. Immutable once issued.
    pub index: usize,
    pub round_number: u8,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    General,
    Technical,
    Theoretical,
}
