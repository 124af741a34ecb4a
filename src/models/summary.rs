use crate::models::question::QuestionType;
use crate::models::session::TerminationReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Hire,
    #[serde(rename = "Strong Consider")]
    StrongConsider,
    Consider,
    #[serde(rename = "Do Not Hire")]
    DoNotHire,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Hire => "Hire",
            Recommendation::StrongConsider => "Strong Consider",
            Recommendation::Consider => "Consider",
            Recommendation::DoNotHire => "Do Not Hire",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisAssessment {
    pub score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBreakdown {
    pub question_number: usize,
    pub question: String,
    pub question_type: QuestionType,
    pub response: String,
    pub overall_score: f64,
    pub is_duplicate: bool,
    pub is_off_topic: bool,
}

/// One per closed session; aggregates every Evaluation into an executive
/// narrative and a hire recommendation. Template-driven and deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub session_id: Uuid,
    pub executive_summary: String,
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    pub technical_assessment: AxisAssessment,
    pub communication_assessment: AxisAssessment,
    pub cultural_fit: AxisAssessment,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub key_highlights: Vec<String>,
    pub red_flags: Vec<String>,
    pub improvement_tips: Vec<String>,
    pub next_steps: Vec<String>,
    pub total_responses: usize,
    pub duplicate_responses: usize,
    pub off_topic_responses: usize,
    pub termination_reason: Option<TerminationReason>,
    pub question_breakdown: Vec<QuestionBreakdown>,
    pub generated_at: DateTime<Utc>,
}
