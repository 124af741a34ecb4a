use crate::models::evaluation::Evaluation;
use crate::models::question::Question;
use crate::models::session::{CandidateProfile, ExperienceLevel, JobProfile};
use crate::models::verdict::AntiCheatVerdict;
use crate::services::provider_service::{cosine_sim, ModelProvider};
use crate::utils::text;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

const TECHNICAL_INDICATORS: &[&str] = &[
    "experience",
    "project",
    "implemented",
    "developed",
    "architecture",
    "algorithm",
    "optimization",
    "performance",
    "scalability",
    "security",
    "testing",
    "debugging",
];

const EXAMPLE_INDICATORS: &[&str] = &[
    "for example",
    "specifically",
    "in my experience",
    "one time",
    "recently",
    "last year",
    "at my previous job",
];

const DETAIL_INDICATORS: &[&str] = &[
    "because",
    "therefore",
    "as a result",
    "due to",
    "in order to",
    "the reason",
    "this allowed",
];

const PROFESSIONAL_WORDS: &[&str] =
    &["collaborate", "coordinate", "analyze", "manage", "strategize"];

const FIT_INDICATORS: &[&str] = &[
    "relevant",
    "applicable",
    "transferable",
    "similar",
    "related experience",
    "background in",
    "expertise in",
];

#[derive(Debug, Deserialize)]
struct RefinedFeedback {
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
}

/// Scores one response against the question and the candidate/job profiles.
/// Heuristics always produce a full Evaluation; the model provider only
/// sharpens relevance and feedback, and every provider failure falls back to
/// the heuristic result, so evaluation itself never errors.
#[derive(Clone)]
pub struct ScoringService {
    provider: Option<Arc<dyn ModelProvider>>,
}

impl ScoringService {
    pub fn new(provider: Option<Arc<dyn ModelProvider>>) -> Self {
        Self { provider }
    }

    pub async fn evaluate(
        &self,
        question: &Question,
        response_text: &str,
        candidate: &CandidateProfile,
        job: &JobProfile,
        verdict: &AntiCheatVerdict,
    ) -> Evaluation {
        let lower = response_text.to_lowercase();

        let relevance = self.relevance_score(&question.text, response_text).await;
        let technical = self.technical_score(&lower, job);
        let communication = self.communication_score(response_text, &lower);
        let depth = self.depth_score(response_text, &lower);
        let job_fit = self.job_fit_score(&lower, candidate, job);

        let overall = if verdict.is_duplicate {
            0.0
        } else {
            round1(
                relevance * 0.25
                    + technical * 0.20
                    + communication * 0.20
                    + depth * 0.15
                    + job_fit * 0.20,
            )
        };

        let scores = [relevance, technical, communication, depth, job_fit];
        let (mut strengths, mut weaknesses) = extract_strengths_weaknesses(&scores);
        let mut feedback = template_feedback(overall, verdict);

        if let Some(refined) = self.refine_feedback(question, response_text, &scores).await {
            feedback = refined.feedback;
            if !refined.strengths.is_empty() {
                strengths = refined.strengths;
            }
            if !refined.weaknesses.is_empty() {
                weaknesses = refined.weaknesses;
            }
        }

        Evaluation {
            relevance_score: round1(relevance),
            technical_accuracy_score: round1(technical),
            communication_score: round1(communication),
            depth_score: round1(depth),
            job_fit_score: round1(job_fit),
            overall_score: overall,
            feedback,
            strengths,
            weaknesses,
            is_duplicate: verdict.is_duplicate,
            is_off_topic: verdict.is_off_topic,
            evaluated_at: Utc::now(),
        }
    }

    /// Embedding cosine similarity blended with keyword overlap when a
    /// provider is configured; pure keyword overlap otherwise.
    async fn relevance_score(&self, question_text: &str, response_text: &str) -> f64 {
        let q_words: HashSet<String> = text::normalize(question_text)
            .split_whitespace()
            .map(String::from)
            .collect();
        let r_words: HashSet<String> = text::normalize(response_text)
            .split_whitespace()
            .map(String::from)
            .collect();
        let overlap = q_words.intersection(&r_words).count();

        if let Some(provider) = &self.provider {
            match self.semantic_similarity(provider, question_text, response_text).await {
                Ok(similarity) => {
                    let semantic = clamp10(f64::from(similarity) * 10.0);
                    let keyword = (overlap as f64 * 2.0).min(10.0);
                    return clamp10(semantic * 0.7 + keyword * 0.3);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "embedding unavailable, keyword-only relevance");
                }
            }
        }

        if q_words.is_empty() {
            return 5.0;
        }
        clamp10(overlap as f64 / q_words.len() as f64 * 10.0)
    }

    async fn semantic_similarity(
        &self,
        provider: &Arc<dyn ModelProvider>,
        question_text: &str,
        response_text: &str,
    ) -> crate::error::Result<f32> {
        let q_emb = provider.embed(question_text).await?;
        let r_emb = provider.embed(response_text).await?;
        Ok(cosine_sim(&q_emb, &r_emb))
    }

    fn technical_score(&self, lower: &str, job: &JobProfile) -> f64 {
        let base = if job.skills_required.is_empty() {
            5.0
        } else {
            let found = job
                .skills_required
                .iter()
                .filter(|s| lower.contains(&s.to_lowercase()))
                .count();
            (found as f64 / job.skills_required.len() as f64 * 10.0).min(10.0)
        };

        let indicators = TECHNICAL_INDICATORS.iter().filter(|i| lower.contains(*i)).count();
        clamp10(base + (indicators as f64 * 0.5).min(2.0))
    }

    fn communication_score(&self, response_text: &str, lower: &str) -> f64 {
        let words = text::word_count(response_text);
        let length_component = match words {
            0..=9 => 2.0,
            10..=49 => 5.0,
            50..=199 => 8.0,
            _ => 6.0,
        };

        let lengths = text::sentence_lengths(response_text);
        let avg_sentence = if lengths.is_empty() {
            0.0
        } else {
            lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
        };
        let structure_component = if (10.0..=20.0).contains(&avg_sentence) {
            8.0
        } else if (5.0..=30.0).contains(&avg_sentence) {
            6.0
        } else {
            4.0
        };

        let professional = PROFESSIONAL_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let vocabulary_component = (professional as f64 * 0.5).min(2.0);

        clamp10(
            length_component * 0.3
                + structure_component * 0.3
                + vocabulary_component * 0.2
                + 6.0 * 0.2,
        )
    }

    fn depth_score(&self, response_text: &str, lower: &str) -> f64 {
        let example_component = if EXAMPLE_INDICATORS.iter().any(|i| lower.contains(*i)) {
            8.0
        } else {
            4.0
        };

        let digits = response_text.chars().filter(|c| c.is_ascii_digit()).count();
        let specificity_component = (5.0 + digits as f64 * 0.5).min(8.0);

        let detail_component = if DETAIL_INDICATORS.iter().any(|i| lower.contains(*i)) {
            7.0
        } else {
            4.0
        };

        let words = text::word_count(response_text);
        let completeness_component = match words {
            0..=19 => 3.0,
            20..=99 => 6.0,
            _ => 8.0,
        };

        clamp10(
            example_component * 0.3
                + specificity_component * 0.2
                + detail_component * 0.3
                + completeness_component * 0.2,
        )
    }

    fn job_fit_score(&self, lower: &str, candidate: &CandidateProfile, job: &JobProfile) -> f64 {
        let skill_component = if job.skills_required.is_empty() {
            5.0
        } else {
            let mentioned = job
                .skills_required
                .iter()
                .filter(|s| lower.contains(&s.to_lowercase()))
                .count();
            (mentioned as f64 * 2.0).min(8.0)
        };

        let experience_component = match (candidate.experience_years, job.experience_level) {
            (Some(years), Some(level)) => {
                if experience_aligned(years, level) {
                    8.0
                } else {
                    5.0
                }
            }
            _ => 5.0,
        };

        let indicators = FIT_INDICATORS.iter().filter(|i| lower.contains(*i)).count();
        let fit_component = (5.0 + indicators as f64 * 0.5).min(7.0);

        clamp10(skill_component * 0.4 + experience_component * 0.3 + fit_component * 0.3)
    }

    /// Ask the chat model for sharper feedback. Fails closed: any transport,
    /// timeout or decode problem keeps the heuristic text.
    async fn refine_feedback(
        &self,
        question: &Question,
        response_text: &str,
        scores: &[f64; 5],
    ) -> Option<RefinedFeedback> {
        let provider = self.provider.as_ref()?;

        let prompt = format!(
            "You are reviewing one interview answer.\n\
             Question: {}\n\
             Answer: {}\n\
             Heuristic scores (relevance, technical, communication, depth, job fit): \
             {:.1}, {:.1}, {:.1}, {:.1}, {:.1}\n\
             Return a JSON object with keys \"feedback\" (2-3 sentences for the \
             candidate), \"strengths\" (array of short strings) and \"weaknesses\" \
             (array of short strings).",
            question.text, response_text, scores[0], scores[1], scores[2], scores[3], scores[4],
        );

        let raw = match provider.complete(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "feedback refinement unavailable");
                return None;
            }
        };

        match decode_refined(&raw) {
            Some(refined) => Some(refined),
            None => {
                tracing::warn!("feedback refinement returned malformed output");
                None
            }
        }
    }
}

/// Strict JSON decode, then a brace-extraction retry for models that wrap the
/// object in prose.
fn decode_refined(raw: &str) -> Option<RefinedFeedback> {
    if let Ok(refined) = serde_json::from_str::<RefinedFeedback>(raw) {
        return Some(refined);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn extract_strengths_weaknesses(scores: &[f64; 5]) -> (Vec<String>, Vec<String>) {
    let axes = [
        ("Highly relevant answer", "Answer strays from the question"),
        ("Solid technical grounding", "Technical depth below the role's bar"),
        ("Clear, well-structured communication", "Hard-to-follow communication"),
        ("Detailed, concrete answer", "Answer lacks depth and examples"),
        ("Strong alignment with the role", "Weak alignment with the role"),
    ];

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for (score, (strong, weak)) in scores.iter().zip(axes) {
        if *score >= 7.0 {
            strengths.push(strong.to_string());
        } else if *score <= 4.0 {
            weaknesses.push(weak.to_string());
        }
    }
    (strengths, weaknesses)
}

fn template_feedback(overall: f64, verdict: &AntiCheatVerdict) -> String {
    if verdict.is_duplicate {
        return "This answer repeats an earlier response and was not scored.".to_string();
    }
    let base = if overall >= 8.0 {
        "Excellent response that addresses the question thoroughly."
    } else if overall >= 6.0 {
        "Good response with room to add specifics."
    } else if overall >= 4.0 {
        "Adequate response; consider adding concrete examples and detail."
    } else {
        "The response does not sufficiently address the question."
    };
    if verdict.is_off_topic {
        format!("{} Note: the answer drifts away from the question asked.", base)
    } else {
        base.to_string()
    }
}

fn experience_aligned(years: u32, level: ExperienceLevel) -> bool {
    match level {
        ExperienceLevel::Junior => years <= 2,
        ExperienceLevel::MidLevel => (2..=5).contains(&years),
        ExperienceLevel::Senior => years >= 5,
    }
}

fn clamp10(value: f64) -> f64 {
    value.clamp(0.0, 10.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
