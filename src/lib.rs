pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::dto::interview_dto::{
    SessionOverview, SessionStatus, StartInterviewRequest, StartedInterview,
    SubmitResponseRequest, TurnOutcome,
};
use crate::error::Result;
use crate::models::summary::Summary;
use crate::services::interview_service::InterviewService;
use crate::services::provider_service::{ModelProvider, OpenAiProvider};
use crate::services::session_service::SessionStore;
use std::sync::Arc;
use uuid::Uuid;

/// The engine's public face: owns the configuration, the session store and
/// the composed services. Cloning is cheap; all clones share the same
/// sessions.
#[derive(Clone)]
pub struct InterviewEngine {
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub interview_service: InterviewService,
}

impl InterviewEngine {
    pub fn new(config: Config, provider: Option<Arc<dyn ModelProvider>>) -> Self {
        let config = Arc::new(config);
        let sessions = SessionStore::new();
        let interview_service =
            InterviewService::new(config.clone(), sessions.clone(), provider);

        Self { config, sessions, interview_service }
    }

    /// Environment-driven construction; wires up the OpenAI provider when an
    /// API key is configured and runs heuristics-only otherwise.
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        let provider: Option<Arc<dyn ModelProvider>> = if config.openai_api_key.is_some() {
            Some(Arc::new(OpenAiProvider::from_config(&config)?))
        } else {
            tracing::info!("no OPENAI_API_KEY set, running heuristics-only");
            None
        };
        Ok(Self::new(config, provider))
    }

    pub async fn start_session(&self, req: StartInterviewRequest) -> Result<StartedInterview> {
        self.interview_service.start_session(req).await
    }

    pub async fn submit_response(
        &self,
        session_id: Uuid,
        req: SubmitResponseRequest,
    ) -> Result<TurnOutcome> {
        self.interview_service.submit_response(session_id, req).await
    }

    pub async fn end_session(&self, session_id: Uuid) -> Result<Summary> {
        self.interview_service.end_session(session_id).await
    }

    pub async fn summary(&self, session_id: Uuid) -> Result<Summary> {
        self.interview_service.summary(session_id).await
    }

    pub async fn session_status(&self, session_id: Uuid) -> Result<SessionStatus> {
        self.interview_service.session_status(session_id).await
    }

    pub async fn should_terminate(&self, session_id: Uuid) -> Result<bool> {
        self.interview_service.should_terminate(session_id).await
    }

    pub async fn list_sessions(&self) -> Vec<SessionOverview> {
        self.interview_service.list_sessions().await
    }
}
