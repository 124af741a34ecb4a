use crate::error::{Error, Result};
use crate::models::evaluation::Evaluation;
use crate::models::question::Question;
use crate::models::summary::Summary;
use crate::models::verdict::AntiCheatVerdict;
use crate::utils::text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub skills: Vec<String>,
    pub experience_years: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: String,
    pub company: String,
    pub skills_required: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    MidLevel,
    Senior,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    pub received_at: DateTime<Utc>,
    /// Client-reported seconds between question display and submission.
    pub latency_secs: Option<f64>,
}

/// One answered question with its derived artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub question: Question,
    pub response: Response,
    pub evaluation: Evaluation,
    pub verdict: AntiCheatVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Terminated { reason: TerminationReason },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    ExcessiveDuplicateResponses,
    MultipleSuspiciousActivities,
    ExcessiveOffTopicResponses,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::ExcessiveDuplicateResponses => "excessive_duplicate_responses",
            TerminationReason::MultipleSuspiciousActivities => "multiple_suspicious_activities",
            TerminationReason::ExcessiveOffTopicResponses => "excessive_off_topic_responses",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate's interview attempt from start to termination/completion.
/// All per-session analyzer history lives here; the services are stateless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub candidate: CandidateProfile,
    pub job: JobProfile,
    pub state: SessionState,
    pub current_question: Option<Question>,
    pub turns: Vec<Turn>,

    /// Cumulative count of duplicate-flagged responses.
    pub duplicate_count: usize,
    /// Cumulative count of off-topic-flagged responses.
    pub off_topic_count: usize,

    /// Bounded rolling window of response latencies.
    pub latency_window: VecDeque<f64>,
    pub word_counts: Vec<usize>,
    pub complexity_scores: Vec<f64>,

    pub summary: Option<Summary>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(candidate: CandidateProfile, job: JobProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            job,
            state: SessionState::Active,
            current_question: None,
            turns: Vec::new(),
            duplicate_count: 0,
            off_topic_count: 0,
            latency_window: VecDeque::new(),
            word_counts: Vec::new(),
            complexity_scores: Vec::new(),
            summary: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, SessionState::Terminated { .. })
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self.state {
            SessionState::Terminated { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn prior_response_texts(&self) -> Vec<&str> {
        self.turns.iter().map(|t| t.response.text.as_str()).collect()
    }

    pub fn average_overall_score(&self) -> f64 {
        if self.turns.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.turns.iter().map(|t| t.evaluation.overall_score).sum();
        sum / self.turns.len() as f64
    }

    /// Append a completed turn and roll the analyzer histories forward.
    /// Turns are appended strictly in submission order; the per-session lock
    /// in the store guarantees no interleaving.
    pub fn record_turn(&mut self, turn: Turn, timing_window: usize) {
        if turn.verdict.is_duplicate {
            self.duplicate_count += 1;
        }
        if turn.verdict.is_off_topic {
            self.off_topic_count += 1;
        }
        if let Some(latency) = turn.response.latency_secs {
            self.latency_window.push_back(latency);
            while self.latency_window.len() > timing_window {
                self.latency_window.pop_front();
            }
        }
        self.word_counts.push(text::word_count(&turn.response.text));
        self.complexity_scores.push(text::complexity_score(&turn.response.text));
        self.turns.push(turn);
    }

    /// Active -> Terminated. The terminal state is absorbing: closing an
    /// already-closed session is a hard failure.
    pub fn terminate(&mut self, reason: TerminationReason) -> Result<()> {
        self.close(SessionState::Terminated { reason })
    }

    /// Active -> Completed (question budget exhausted or manual end).
    pub fn complete(&mut self) -> Result<()> {
        self.close(SessionState::Completed)
    }

    fn close(&mut self, next: SessionState) -> Result<()> {
        if !self.is_active() {
            return Err(Error::InvalidState(format!(
                "session {} is already closed ({:?})",
                self.id, self.state
            )));
        }
        self.state = next;
        self.current_question = None;
        self.ended_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            CandidateProfile {
                name: "Ada".into(),
                skills: vec!["rust".into()],
                experience_years: Some(4),
            },
            JobProfile {
                title: "Backend Engineer".into(),
                company: "Acme".into(),
                skills_required: vec!["rust".into()],
                experience_level: Some(ExperienceLevel::MidLevel),
            },
        )
    }

    #[test]
    fn terminated_state_is_absorbing() {
        let mut s = session();
        s.terminate(TerminationReason::ExcessiveDuplicateResponses)
            .unwrap();
        assert!(s.is_terminated());
        assert_eq!(
            s.termination_reason().unwrap().as_str(),
            "excessive_duplicate_responses"
        );
        assert!(s.terminate(TerminationReason::ExcessiveOffTopicResponses).is_err());
        assert!(s.complete().is_err());
    }

    #[test]
    fn latency_window_is_bounded() {
        let mut s = session();
        for i in 0..15 {
            s.latency_window.push_back(i as f64);
            while s.latency_window.len() > 10 {
                s.latency_window.pop_front();
            }
        }
        assert_eq!(s.latency_window.len(), 10);
        assert_eq!(*s.latency_window.front().unwrap(), 5.0);
    }
}
