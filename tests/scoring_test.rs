use async_trait::async_trait;
use interview_engine::config::Config;
use interview_engine::dto::interview_dto::{StartInterviewRequest, SubmitResponseRequest};
use interview_engine::error::{Error, Result};
use interview_engine::services::provider_service::ModelProvider;
use interview_engine::InterviewEngine;
use std::sync::Arc;

/// Returns the same embedding for every input (cosine 1.0) and a fixed
/// refined-feedback payload.
struct StaticProvider;

#[async_trait]
impl ModelProvider for StaticProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.6, 0.8, 0.0])
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(r#"{"feedback": "Well grounded answer with concrete numbers.", "strengths": ["Specific metrics"], "weaknesses": []}"#.to_string())
    }
}

/// Every call fails, as if the upstream API were down.
struct FailingProvider;

#[async_trait]
impl ModelProvider for FailingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Provider("upstream unavailable".into()))
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::Provider("upstream unavailable".into()))
    }
}

fn start_request() -> StartInterviewRequest {
    StartInterviewRequest {
        candidate_name: "Grace Hopper".into(),
        candidate_skills: vec!["rust".into()],
        experience_years: Some(10),
        job_title: "Platform Engineer".into(),
        company: "Initech".into(),
        skills_required: vec!["rust".into(), "terraform".into()],
        experience_level: Some(interview_engine::models::session::ExperienceLevel::Senior),
    }
}

fn submit(text: &str) -> SubmitResponseRequest {
    SubmitResponseRequest {
        text: text.to_string(),
        latency_secs: None,
    }
}

const ANSWER: &str = "I have years of experience running rust services and terraform stacks. \
                      For example, last year my team shipped a provisioning project in 3 months \
                      because we automated the rollout end to end.";

#[tokio::test]
async fn provider_embeddings_lift_relevance() {
    let with_provider =
        InterviewEngine::new(Config::default(), Some(Arc::new(StaticProvider)));
    let heuristic_only = InterviewEngine::new(Config::default(), None);

    let a = with_provider.start_session(start_request()).await.expect("start");
    let b = heuristic_only.start_session(start_request()).await.expect("start");

    let scored = with_provider
        .submit_response(a.session_id, submit(ANSWER))
        .await
        .expect("submit");
    let plain = heuristic_only
        .submit_response(b.session_id, submit(ANSWER))
        .await
        .expect("submit");

    // identical embeddings give the semantic component its full weight
    assert!(scored.evaluation().relevance_score >= 7.0);
    assert!(scored.evaluation().relevance_score > plain.evaluation().relevance_score);
}

#[tokio::test]
async fn refined_feedback_comes_from_the_provider() {
    let engine = InterviewEngine::new(Config::default(), Some(Arc::new(StaticProvider)));
    let started = engine.start_session(start_request()).await.expect("start");

    let outcome = engine
        .submit_response(started.session_id, submit(ANSWER))
        .await
        .expect("submit");

    assert_eq!(
        outcome.evaluation().feedback,
        "Well grounded answer with concrete numbers."
    );
    assert_eq!(
        outcome.evaluation().strengths,
        vec!["Specific metrics".to_string()]
    );
}

#[tokio::test]
async fn provider_outage_degrades_to_deterministic_heuristics() {
    let failing = InterviewEngine::new(Config::default(), Some(Arc::new(FailingProvider)));
    let heuristic_only = InterviewEngine::new(Config::default(), None);

    let a = failing.start_session(start_request()).await.expect("start");
    let b = heuristic_only.start_session(start_request()).await.expect("start");

    let degraded = failing
        .submit_response(a.session_id, submit(ANSWER))
        .await
        .expect("a failing provider must not fail evaluation");
    let plain = heuristic_only
        .submit_response(b.session_id, submit(ANSWER))
        .await
        .expect("submit");

    assert_eq!(
        degraded.evaluation().sub_scores(),
        plain.evaluation().sub_scores()
    );
    assert_eq!(degraded.evaluation().feedback, plain.evaluation().feedback);
    assert_eq!(
        degraded.evaluation().overall_score,
        plain.evaluation().overall_score
    );
}

#[tokio::test]
async fn same_input_scores_identically_across_engines() {
    let first = InterviewEngine::new(Config::default(), None);
    let second = InterviewEngine::new(Config::default(), None);

    let a = first.start_session(start_request()).await.expect("start");
    let b = second.start_session(start_request()).await.expect("start");

    let x = first
        .submit_response(a.session_id, submit(ANSWER))
        .await
        .expect("submit");
    let y = second
        .submit_response(b.session_id, submit(ANSWER))
        .await
        .expect("submit");

    assert_eq!(x.evaluation().sub_scores(), y.evaluation().sub_scores());
    assert_eq!(x.evaluation().overall_score, y.evaluation().overall_score);
    assert_eq!(x.verdict().total_flags, y.verdict().total_flags);
}
