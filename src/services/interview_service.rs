use crate::config::Config;
use crate::dto::interview_dto::{
    SessionOverview, SessionStatus, StartInterviewRequest, StartedInterview,
    SubmitResponseRequest, TurnOutcome,
};
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionType};
use crate::models::session::{
    CandidateProfile, JobProfile, Response, Session, Turn,
};
use crate::models::summary::Summary;
use crate::services::anti_cheat_service::AntiCheatService;
use crate::services::provider_service::ModelProvider;
use crate::services::scoring_service::ScoringService;
use crate::services::session_service::SessionStore;
use crate::services::summary_service::SummaryService;
use crate::utils::validation::validate;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const GENERAL_TEMPLATES: &[&str] = &[
    "Tell me about your background and what drew you to work in this field.",
    "What do you consider your greatest professional achievement in this field?",
    "Describe a challenging problem you solved in this field and how you approached it.",
    "How do you stay current with new developments in this field?",
    "Where do you see your career in this field heading over the next few years?",
];

const TECHNICAL_TEMPLATES: &[&str] = &[
    "Walk me through a recent project in this field and the technical decisions you made.",
    "How would you design a system in this field to handle rapid growth?",
    "Describe a difficult bug you tracked down in this field and how you found it.",
    "What trade-offs do you weigh when choosing tools or frameworks in this field?",
    "How do you approach testing and code quality in this field?",
];

const THEORETICAL_TEMPLATES: &[&str] = &[
    "How would you handle a disagreement with a teammate about an approach in this field?",
    "A critical deadline is at risk; how do you prioritize your work in this field?",
    "If you could change one common practice in this field, what would it be and why?",
    "How do you evaluate whether a new technology in this field is worth adopting?",
    "What does a healthy engineering culture in this field look like to you?",
];

/// Orchestrates the full interview loop: question issuing, anti-cheat
/// analysis, scoring, state transitions and summary generation. The services
/// it composes are stateless; every mutation happens under the session's
/// store lock, so turns for one session are strictly serialized.
#[derive(Clone)]
pub struct InterviewService {
    config: Arc<Config>,
    store: SessionStore,
    anti_cheat: AntiCheatService,
    scoring: ScoringService,
    summary: SummaryService,
}

impl InterviewService {
    pub fn new(
        config: Arc<Config>,
        store: SessionStore,
        provider: Option<Arc<dyn ModelProvider>>,
    ) -> Self {
        Self {
            anti_cheat: AntiCheatService::new(config.clone()),
            scoring: ScoringService::new(provider),
            summary: SummaryService::new(config.clone()),
            config,
            store,
        }
    }

    pub async fn start_session(&self, req: StartInterviewRequest) -> Result<StartedInterview> {
        validate(&req)?;

        let candidate = CandidateProfile {
            name: req.candidate_name,
            skills: req.candidate_skills,
            experience_years: req.experience_years,
        };
        let job = JobProfile {
            title: req.job_title,
            company: req.company,
            skills_required: req.skills_required,
            experience_level: req.experience_level,
        };

        let mut session = Session::new(candidate, job);
        let question = build_question(0, &session.job);
        session.current_question = Some(question.clone());

        tracing::info!(
            session_id = %session.id,
            candidate = %session.candidate.name,
            job = %session.job.title,
            "interview session started"
        );

        let session_id = self.store.insert(session).await;
        Ok(StartedInterview { session_id, question })
    }

    /// One full turn: analyze, score, record, then either continue with the
    /// next question or close the session. Submissions against a closed
    /// session fail with InvalidState and leave it unchanged.
    pub async fn submit_response(
        &self,
        session_id: Uuid,
        req: SubmitResponseRequest,
    ) -> Result<TurnOutcome> {
        validate(&req)?;

        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;

        if !session.is_active() {
            return Err(Error::InvalidState(format!(
                "session {} is no longer accepting responses",
                session_id
            )));
        }
        let question = session.current_question.take().ok_or_else(|| {
            Error::InvalidState(format!("session {} has no pending question", session_id))
        })?;

        let response = Response {
            text: req.text,
            received_at: Utc::now(),
            latency_secs: req.latency_secs,
        };

        let verdict = self.anti_cheat.analyze(&response, &session);
        let evaluation = self
            .scoring
            .evaluate(&question, &response.text, &session.candidate, &session.job, &verdict)
            .await;

        tracing::debug!(
            session_id = %session_id,
            question_index = question.index,
            overall = evaluation.overall_score,
            flags = verdict.total_flags,
            "response evaluated"
        );

        session.record_turn(
            Turn {
                question,
                response,
                evaluation: evaluation.clone(),
                verdict: verdict.clone(),
            },
            self.config.timing_window,
        );

        if let (true, Some(reason)) = (verdict.should_terminate, verdict.termination_reason) {
            session.terminate(reason)?;
            let summary = self.summary.generate(&session);
            session.summary = Some(summary.clone());
            return Ok(TurnOutcome::Completed { evaluation, verdict, summary });
        }

        if session.turns.len() >= self.config.max_questions {
            session.complete()?;
            let summary = self.summary.generate(&session);
            session.summary = Some(summary.clone());
            return Ok(TurnOutcome::Completed { evaluation, verdict, summary });
        }

        let next = build_question(session.turns.len(), &session.job);
        session.current_question = Some(next.clone());
        Ok(TurnOutcome::NextQuestion { evaluation, verdict, question: next })
    }

    /// Close an active session early at the caller's request and return its
    /// summary.
    pub async fn end_session(&self, session_id: Uuid) -> Result<Summary> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;

        session.complete()?;
        let summary = self.summary.generate(&session);
        session.summary = Some(summary.clone());

        tracing::info!(session_id = %session_id, "interview session ended by caller");
        Ok(summary)
    }

    /// Summary of a closed session. Asking while the session is still active
    /// is an ordering error, not an empty result.
    pub async fn summary(&self, session_id: Uuid) -> Result<Summary> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;

        if session.is_active() {
            return Err(Error::InvalidState(format!(
                "session {} is still active; end it before requesting the summary",
                session_id
            )));
        }
        if let Some(summary) = &session.summary {
            return Ok(summary.clone());
        }
        let summary = self.summary.generate(&session);
        session.summary = Some(summary.clone());
        Ok(summary)
    }

    pub async fn session_status(&self, session_id: Uuid) -> Result<SessionStatus> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;

        let questions_asked =
            session.turns.len() + usize::from(session.current_question.is_some());
        Ok(SessionStatus {
            session_id: session.id,
            candidate_name: session.candidate.name.clone(),
            job_title: session.job.title.clone(),
            state: session.state,
            questions_asked,
            responses_given: session.turns.len(),
            duplicate_count: session.duplicate_count,
            off_topic_count: session.off_topic_count,
            average_score: session.average_overall_score(),
            started_at: session.started_at,
            ended_at: session.ended_at,
        })
    }

    pub async fn should_terminate(&self, session_id: Uuid) -> Result<bool> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;
        Ok(self.anti_cheat.should_terminate(&session))
    }

    pub async fn list_sessions(&self) -> Vec<SessionOverview> {
        self.store.overviews().await
    }
}

/// Deterministic question for a given position: rounds of five, general then
/// technical then theoretical, personalized to the job profile.
fn build_question(index: usize, job: &JobProfile) -> Question {
    let (templates, question_type, round_number) = if index < 5 {
        (GENERAL_TEMPLATES, QuestionType::General, 1)
    } else if index < 10 {
        (TECHNICAL_TEMPLATES, QuestionType::Technical, 2)
    } else {
        (THEORETICAL_TEMPLATES, QuestionType::Theoretical, 3)
    };

    let template = templates[index % templates.len()];
    let focus = if job.skills_required.is_empty() {
        format!("as a {}", job.title)
    } else {
        let highlighted: Vec<&str> = job
            .skills_required
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        format!("as a {} working with {}", job.title, highlighted.join(" and "))
    };

    Question {
        index,
        round_number,
        question_type,
        text: template.replace("in this field", &focus),
        asked_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(skills: &[&str]) -> JobProfile {
        JobProfile {
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            experience_level: None,
        }
    }

    #[test]
    fn question_rounds_follow_position() {
        let j = job(&["rust"]);
        assert_eq!(build_question(0, &j).question_type, QuestionType::General);
        assert_eq!(build_question(4, &j).round_number, 1);
        assert_eq!(build_question(5, &j).question_type, QuestionType::Technical);
        assert_eq!(build_question(9, &j).round_number, 2);
        assert_eq!(build_question(10, &j).question_type, QuestionType::Theoretical);
        assert_eq!(build_question(12, &j).round_number, 3);
    }

    #[test]
    fn questions_are_personalized_to_the_job() {
        let q = build_question(0, &job(&["rust", "sql", "docker"]));
        assert!(q.text.contains("Backend Engineer"));
        assert!(q.text.contains("rust and sql"));
        assert!(!q.text.contains("in this field"));

        let bare = build_question(0, &job(&[]));
        assert!(bare.text.contains("as a Backend Engineer"));
    }

    #[test]
    fn question_text_is_deterministic_per_index() {
        let j = job(&["rust"]);
        assert_eq!(build_question(3, &j).text, build_question(3, &j).text);
        assert_ne!(build_question(0, &j).text, build_question(1, &j).text);
    }
}
