use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scored assessment of a single response. Derived once, never mutated.
/// All scores lie in [0, 10].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub relevance_score: f64,
    pub technical_accuracy_score: f64,
    pub communication_score: f64,
    pub depth_score: f64,
    pub job_fit_score: f64,
    pub overall_score: f64,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub is_duplicate: bool,
    pub is_off_topic: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn sub_scores(&self) -> [f64; 5] {
        [
            self.relevance_score,
            self.technical_accuracy_score,
            self.communication_score,
            self.depth_score,
            self.job_fit_score,
        ]
    }
}
