pub mod anti_cheat_service;
pub mod interview_service;
pub mod provider_service;
pub mod scoring_service;
pub mod session_service;
pub mod summary_service;
