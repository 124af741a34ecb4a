use crate::models::evaluation::Evaluation;
use crate::models::question::Question;
use crate::models::session::{ExperienceLevel, SessionState};
use crate::models::summary::Summary;
use crate::models::verdict::AntiCheatVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartInterviewRequest {
    #[validate(length(min = 1, max = 200))]
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_skills: Vec<String>,
    pub experience_years: Option<u32>,
    #[validate(length(min = 1, max = 200))]
    pub job_title: String,
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[serde(default)]
    pub skills_required: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitResponseRequest {
    /// Rejected before evaluation when empty or oversized.
    #[validate(length(min = 1, max = 20000))]
    pub text: String,
    #[validate(range(min = 0.0))]
    pub latency_secs: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedInterview {
    pub session_id: Uuid,
    pub question: Question,
}

/// Result of one submitted response: either the interview goes on with the
/// next question, or the session closed and the summary is attached.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    NextQuestion {
        evaluation: Evaluation,
        verdict: AntiCheatVerdict,
        question: Question,
    },
    Completed {
        evaluation: Evaluation,
        verdict: AntiCheatVerdict,
        summary: Summary,
    },
}

impl TurnOutcome {
    pub fn evaluation(&self) -> &Evaluation {
        match self {
            TurnOutcome::NextQuestion { evaluation, .. } => evaluation,
            TurnOutcome::Completed { evaluation, .. } => evaluation,
        }
    }

    pub fn verdict(&self) -> &AntiCheatVerdict {
        match self {
            TurnOutcome::NextQuestion { verdict, .. } => verdict,
            TurnOutcome::Completed { verdict, .. } => verdict,
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            TurnOutcome::Completed { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub state: SessionState,
    pub questions_asked: usize,
    pub responses_given: usize,
    pub duplicate_count: usize,
    pub off_topic_count: usize,
    pub average_score: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub job_title: String,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
}
