use crate::config::Config;
use crate::models::evaluation::Evaluation;
use crate::models::session::Session;
use crate::models::summary::{
    AxisAssessment, QuestionBreakdown, Recommendation, Summary,
};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Builds the final report for a closed session. Pure aggregation over the
/// recorded turns; same session state always yields the same summary (bar the
/// generation timestamp).
#[derive(Clone)]
pub struct SummaryService {
    config: Arc<Config>,
}

impl SummaryService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn generate(&self, session: &Session) -> Summary {
        let evaluations: Vec<&Evaluation> =
            session.turns.iter().map(|t| &t.evaluation).collect();
        let overall = round1(session.average_overall_score());

        let (recommendation, reason) = self.recommend(session, overall);

        let technical = avg(&evaluations, |e| e.technical_accuracy_score);
        let communication = avg(&evaluations, |e| e.communication_score);
        let fit = avg(&evaluations, |e| e.job_fit_score);

        tracing::info!(
            session_id = %session.id,
            overall,
            recommendation = %recommendation,
            responses = session.turns.len(),
            "summary generated"
        );

        Summary {
            session_id: session.id,
            executive_summary: self.executive_summary(session, overall, recommendation),
            overall_score: overall,
            recommendation,
            recommendation_reason: reason,
            technical_assessment: axis(technical, "technical grounding"),
            communication_assessment: axis(communication, "communication"),
            cultural_fit: axis(fit, "role fit"),
            strengths: dedup_capped(evaluations.iter().flat_map(|e| e.strengths.clone()), 5),
            areas_for_improvement: dedup_capped(
                evaluations.iter().flat_map(|e| e.weaknesses.clone()),
                5,
            ),
            key_highlights: self.key_highlights(session),
            red_flags: self.red_flags(session, &evaluations),
            improvement_tips: self.improvement_tips(&evaluations),
            next_steps: next_steps(recommendation),
            total_responses: session.turns.len(),
            duplicate_responses: session.duplicate_count,
            off_topic_responses: session.off_topic_count,
            termination_reason: session.termination_reason(),
            question_breakdown: question_breakdown(session),
            generated_at: Utc::now(),
        }
    }

    /// Integrity overrides come before score thresholds: heavy duplication or
    /// off-topic drift caps the recommendation regardless of the average.
    fn recommend(&self, session: &Session, overall: f64) -> (Recommendation, String) {
        if session.duplicate_count >= 3 || session.off_topic_count >= 3 {
            return (
                Recommendation::DoNotHire,
                "Excessive duplicate or off-topic responses indicate lack of engagement"
                    .to_string(),
            );
        }
        if session.turns.len() < self.config.min_responses {
            return (
                Recommendation::DoNotHire,
                format!(
                    "Only {} of {} expected responses were given, too few to assess",
                    session.turns.len(),
                    self.config.min_responses
                ),
            );
        }
        if overall >= 8.5 {
            (
                Recommendation::Hire,
                "Consistently strong answers across all evaluation axes".to_string(),
            )
        } else if overall >= 7.0 {
            (
                Recommendation::StrongConsider,
                "Strong overall performance with minor gaps".to_string(),
            )
        } else if overall >= 5.0 {
            (
                Recommendation::Consider,
                "Mixed performance; a follow-up round is advised".to_string(),
            )
        } else {
            (
                Recommendation::DoNotHire,
                "Scores fall below the bar for this role".to_string(),
            )
        }
    }

    fn executive_summary(
        &self,
        session: &Session,
        overall: f64,
        recommendation: Recommendation,
    ) -> String {
        let mut parts = vec![format!(
            "{} interviewed for {} at {} and answered {} question{} with an average score of {:.1}/10.",
            session.candidate.name,
            session.job.title,
            session.job.company,
            session.turns.len(),
            if session.turns.len() == 1 { "" } else { "s" },
            overall,
        )];

        if let Some(reason) = session.termination_reason() {
            parts.push(format!(
                "The interview was terminated early ({}).",
                reason
            ));
        }
        if session.duplicate_count > 0 {
            parts.push(format!(
                "{} response{} duplicated earlier answers.",
                session.duplicate_count,
                if session.duplicate_count == 1 { "" } else { "s" },
            ));
        }
        parts.push(format!("Recommendation: {}.", recommendation));
        parts.join(" ")
    }

    fn key_highlights(&self, session: &Session) -> Vec<String> {
        let mut highlights = Vec::new();
        if let Some(best) = session
            .turns
            .iter()
            .max_by(|a, b| {
                a.evaluation
                    .overall_score
                    .total_cmp(&b.evaluation.overall_score)
            })
            .filter(|t| t.evaluation.overall_score >= 7.0)
        {
            highlights.push(format!(
                "Best answer scored {:.1}/10 on \"{}\"",
                best.evaluation.overall_score, best.question.text,
            ));
        }
        if session.state == crate::models::session::SessionState::Completed
            && session.turns.len() >= self.config.min_responses
        {
            highlights.push("Completed the interview without integrity incidents".to_string());
        }
        highlights
    }

    fn red_flags(&self, session: &Session, evaluations: &[&Evaluation]) -> Vec<String> {
        let mut flags = Vec::new();
        if session.duplicate_count >= 2 {
            flags.push(format!(
                "{} duplicate responses detected",
                session.duplicate_count
            ));
        }
        if session.off_topic_count >= 2 {
            flags.push(format!(
                "{} off-topic responses detected",
                session.off_topic_count
            ));
        }
        if !evaluations.is_empty() {
            let low = evaluations.iter().filter(|e| e.overall_score < 4.0).count();
            if low * 2 >= evaluations.len() {
                flags.push("Half or more of the answers scored below 4/10".to_string());
            }
        }
        if let Some(reason) = session.termination_reason() {
            flags.push(format!("Session terminated: {}", reason));
        }
        flags
    }

    fn improvement_tips(&self, evaluations: &[&Evaluation]) -> Vec<String> {
        if evaluations.is_empty() {
            return Vec::new();
        }
        let mut tips = Vec::new();
        if avg(evaluations, |e| e.depth_score) < 6.0 {
            tips.push("Back answers with concrete examples and measurable outcomes".to_string());
        }
        if avg(evaluations, |e| e.relevance_score) < 6.0 {
            tips.push("Address the question asked before adding context".to_string());
        }
        if avg(evaluations, |e| e.technical_accuracy_score) < 6.0 {
            tips.push("Reference the specific technologies the role requires".to_string());
        }
        if avg(evaluations, |e| e.communication_score) < 6.0 {
            tips.push("Structure answers into shorter, complete sentences".to_string());
        }
        if avg(evaluations, |e| e.job_fit_score) < 6.0 {
            tips.push("Connect past experience directly to the role's requirements".to_string());
        }
        tips.truncate(5);
        tips
    }
}

fn avg(evaluations: &[&Evaluation], f: impl Fn(&Evaluation) -> f64) -> f64 {
    if evaluations.is_empty() {
        return 0.0;
    }
    round1(evaluations.iter().map(|e| f(e)).sum::<f64>() / evaluations.len() as f64)
}

fn axis(score: f64, label: &str) -> AxisAssessment {
    let summary = if score >= 8.0 {
        format!("Excellent {}", label)
    } else if score >= 6.0 {
        format!("Good {}", label)
    } else if score >= 4.0 {
        format!("Adequate {}, with gaps", label)
    } else {
        format!("Insufficient {}", label)
    };
    AxisAssessment { score, summary }
}

fn next_steps(recommendation: Recommendation) -> Vec<String> {
    match recommendation {
        Recommendation::Hire => vec![
            "Move to offer discussion".to_string(),
            "Run reference checks".to_string(),
        ],
        Recommendation::StrongConsider => vec![
            "Schedule a final round with the hiring manager".to_string(),
            "Probe the weaker axes in a focused follow-up".to_string(),
        ],
        Recommendation::Consider => vec![
            "Compare against the rest of the pipeline".to_string(),
            "Request a practical exercise before advancing".to_string(),
        ],
        Recommendation::DoNotHire => vec!["Send a polite rejection".to_string()],
    }
}

fn question_breakdown(session: &Session) -> Vec<QuestionBreakdown> {
    session
        .turns
        .iter()
        .map(|t| QuestionBreakdown {
            question_number: t.question.index + 1,
            question: t.question.text.clone(),
            question_type: t.question.question_type,
            response: t.response.text.clone(),
            overall_score: t.evaluation.overall_score,
            is_duplicate: t.evaluation.is_duplicate,
            is_off_topic: t.evaluation.is_off_topic,
        })
        .collect()
}

/// Preserve first-seen order while dropping repeats, then cap the list.
fn dedup_capped(items: impl Iterator<Item = String>, cap: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
        if out.len() == cap {
            break;
        }
    }
    out
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, QuestionType};
    use crate::models::session::{
        CandidateProfile, JobProfile, Response, TerminationReason, Turn,
    };
    use crate::models::verdict::AntiCheatVerdict;

    fn service() -> SummaryService {
        SummaryService::new(Arc::new(Config::default()))
    }

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
                experience_level: None,
            },
        )
    }

    fn turn(index: usize, overall: f64, is_duplicate: bool, is_off_topic: bool) -> Turn {
        Turn {
            question: Question {
                index,
                round_number: 1,
                question_type: QuestionType::General,
                text: format!("Question {}", index + 1),
                asked_at: Utc::now(),
            },
            response: Response {
                text: "I build backend systems with my team".into(),
                received_at: Utc::now(),
                latency_secs: None,
            },
            evaluation: Evaluation {
                relevance_score: overall,
                technical_accuracy_score: overall,
                communication_score: overall,
                depth_score: overall,
                job_fit_score: overall,
                overall_score: overall,
                feedback: String::new(),
                strengths: vec![],
                weaknesses: vec![],
                is_duplicate,
                is_off_topic,
                evaluated_at: Utc::now(),
            },
            verdict: AntiCheatVerdict {
                is_duplicate,
                prior_duplicates: usize::from(is_duplicate),
                max_similarity: 0.0,
                is_off_topic,
                duplicate_flags: vec![],
                timing_flags: vec![],
                content_flags: vec![],
                behavioral_flags: vec![],
                total_flags: 0,
                confidence: 0.0,
                should_terminate: false,
                termination_reason: None,
            },
        }
    }

    #[test]
    fn high_scores_recommend_hire() {
        let svc = service();
        let mut s = session();
        for i in 0..6 {
            s.record_turn(turn(i, 9.0, false, false), 10);
        }
        s.complete().unwrap();

        let summary = svc.generate(&s);
        assert_eq!(summary.recommendation, Recommendation::Hire);
        assert_eq!(summary.overall_score, 9.0);
        assert_eq!(summary.question_breakdown.len(), 6);
    }

    #[test]
    fn duplicates_override_a_high_average() {
        let svc = service();
        let mut s = session();
        for i in 0..3 {
            s.record_turn(turn(i, 9.0, false, false), 10);
        }
        for i in 3..6 {
            s.record_turn(turn(i, 9.0, true, false), 10);
        }
        s.terminate(TerminationReason::ExcessiveDuplicateResponses)
            .unwrap();

        let summary = svc.generate(&s);
        assert_eq!(summary.recommendation, Recommendation::DoNotHire);
        assert!(summary.recommendation_reason.contains("duplicate"));
        assert!(summary
            .red_flags
            .iter()
            .any(|f| f.contains("duplicate responses detected")));
        assert_eq!(
            summary.termination_reason,
            Some(TerminationReason::ExcessiveDuplicateResponses)
        );
    }

    #[test]
    fn too_few_responses_cannot_recommend_hiring() {
        let svc = service();
        let mut s = session();
        for i in 0..3 {
            s.record_turn(turn(i, 9.5, false, false), 10);
        }
        s.complete().unwrap();

        let summary = svc.generate(&s);
        assert_eq!(summary.recommendation, Recommendation::DoNotHire);
        assert!(summary.recommendation_reason.contains("too few"));
    }

    #[test]
    fn mid_band_scores_recommend_strong_consider() {
        let svc = service();
        let mut s = session();
        for i in 0..5 {
            s.record_turn(turn(i, 7.4, false, false), 10);
        }
        s.complete().unwrap();

        let summary = svc.generate(&s);
        assert_eq!(summary.recommendation, Recommendation::StrongConsider);
        assert!(summary
            .key_highlights
            .iter()
            .any(|h| h.contains("Best answer scored")));
    }

    #[test]
    fn empty_session_summarizes_without_panicking() {
        let svc = service();
        let mut s = session();
        s.complete().unwrap();

        let summary = svc.generate(&s);
        assert_eq!(summary.total_responses, 0);
        assert_eq!(summary.overall_score, 0.0);
        assert_eq!(summary.recommendation, Recommendation::DoNotHire);
    }
}
