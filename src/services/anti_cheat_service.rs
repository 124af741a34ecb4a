use crate::config::Config;
use crate::models::session::{Response, Session, TerminationReason};
use crate::models::verdict::AntiCheatVerdict;
use crate::utils::text;
use std::collections::HashSet;
use std::sync::Arc;

const GENERIC_PHRASES: &[&str] = &[
    "i don't know",
    "not sure",
    "can't remember",
    "no idea",
    "not applicable",
    "n/a",
    "none",
    "same as before",
    "as mentioned",
    "like i said",
];

const CONFUSION_INDICATORS: &[&str] = &[
    "i don't understand",
    "what do you mean",
    "can you repeat",
    "i'm not sure what you're asking",
    "this doesn't make sense",
];

const RELEVANT_KEYWORDS: &[&str] = &[
    "experience",
    "project",
    "work",
    "team",
    "develop",
    "implement",
    "manage",
    "create",
    "build",
    "solve",
];

const AI_CONNECTIVES: &[&str] = &[
    "in conclusion",
    "furthermore",
    "moreover",
    "additionally",
    "it is important to note",
    "it should be noted",
    "it is worth mentioning",
    "as previously mentioned",
    "as stated earlier",
];

const FORMAL_WORDS: &[&str] = &["utilize", "facilitate", "implement", "optimize", "leverage"];

/// Anti-cheating analysis: duplicate detection, timing anomalies, content
/// heuristics, behavioral trend tracking and the termination policy that
/// combines them. Stateless; all per-session history lives on the Session.
#[derive(Clone)]
pub struct AntiCheatService {
    config: Arc<Config>,
}

impl AntiCheatService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Analyze a new response against the session's accumulated history.
    /// Does not mutate the session; the orchestrator appends the turn after
    /// scoring.
    pub fn analyze(&self, response: &Response, session: &Session) -> AntiCheatVerdict {
        let (prior_duplicates, max_similarity, duplicate_flags) =
            self.detect_duplicates(&response.text, session);
        let timing_flags = self.analyze_timing(response, session);
        let (content_flags, is_off_topic) = self.analyze_content(&response.text, session);
        let behavioral_flags = self.analyze_behavior(&response.text, session);

        let is_duplicate = prior_duplicates > 0;
        let total_flags = duplicate_flags.len()
            + timing_flags.len()
            + content_flags.len()
            + behavioral_flags.len();

        let (should_terminate, termination_reason) =
            self.decide_termination(prior_duplicates, total_flags, is_off_topic, session);

        if let (true, Some(reason)) = (should_terminate, termination_reason) {
            tracing::warn!(
                session_id = %session.id,
                reason = %reason,
                total_flags,
                "anti-cheat termination triggered"
            );
        }

        AntiCheatVerdict {
            is_duplicate,
            prior_duplicates,
            max_similarity,
            is_off_topic,
            duplicate_flags,
            timing_flags,
            content_flags,
            behavioral_flags,
            total_flags,
            confidence: (total_flags as f64 / 10.0).min(1.0),
            should_terminate,
            termination_reason,
        }
    }

    /// Monotonic view over the accumulated state: stays true once the session
    /// has entered the terminal state.
    pub fn should_terminate(&self, session: &Session) -> bool {
        session.is_terminated()
            || session
                .turns
                .last()
                .map(|t| t.verdict.should_terminate)
                .unwrap_or(false)
    }

    /// Jaccard similarity over normalized word sets against each prior
    /// response, plus an exact hash check. Heuristic; no false-negative
    /// guarantee.
    fn detect_duplicates(
        &self,
        response_text: &str,
        session: &Session,
    ) -> (usize, f64, Vec<String>) {
        let priors = session.prior_response_texts();
        if priors.is_empty() {
            return (0, 0.0, Vec::new());
        }

        let normalized = text::normalize(response_text);
        let current_hash = text::response_hash(&normalized);

        let mut similar = 0usize;
        let mut exact = 0usize;
        let mut max_similarity = 0.0f64;

        for prior in &priors {
            let prior_norm = text::normalize(prior);
            let similarity = text::jaccard(&normalized, &prior_norm);
            if similarity >= self.config.duplicate_threshold {
                similar += 1;
                max_similarity = max_similarity.max(similarity);
            }
            if text::response_hash(&prior_norm) == current_hash {
                exact += 1;
            }
        }

        let prior_duplicates = similar.max(exact);
        let flags = if prior_duplicates > 0 {
            vec!["Duplicate response detected".to_string()]
        } else {
            Vec::new()
        };
        (prior_duplicates, max_similarity, flags)
    }

    /// Pure statistics over a bounded rolling latency window.
    fn analyze_timing(&self, response: &Response, session: &Session) -> Vec<String> {
        let latency = match response.latency_secs {
            Some(l) => l,
            None => return Vec::new(),
        };

        let mut flags = Vec::new();

        if latency < self.config.fast_response_secs && response.text.chars().count() > 100 {
            flags.push("Response time suspiciously fast (possible paste)".to_string());
        }
        if latency > self.config.slow_response_secs {
            flags.push("Response time unusually slow".to_string());
        }

        let mut window: Vec<f64> = session.latency_window.iter().copied().collect();
        window.push(latency);
        if window.len() > self.config.timing_window {
            window.remove(0);
        }
        if window.len() >= 3 {
            let max = window.iter().copied().fold(f64::MIN, f64::max);
            let min = window.iter().copied().fold(f64::MAX, f64::min);
            let inconsistent = if min > 0.0 {
                max / min > self.config.timing_ratio_limit
            } else {
                max > 0.0
            };
            if inconsistent {
                flags.push("Inconsistent response timing".to_string());
            }
        }

        flags
    }

    fn analyze_content(&self, response_text: &str, session: &Session) -> (Vec<String>, bool) {
        let mut flags = Vec::new();
        let lower = response_text.to_lowercase();

        if response_text.trim().chars().count() < self.config.min_response_chars {
            flags.push("Response too short".to_string());
        }

        let generic_count = GENERIC_PHRASES.iter().filter(|p| lower.contains(*p)).count();
        if generic_count >= 2 {
            flags.push("Multiple generic filler phrases".to_string());
        }

        if session.turns.len() >= 2 && !self.repeated_phrases(response_text, session).is_empty() {
            flags.push("Repeated phrases across responses".to_string());
        }

        let is_off_topic = self.is_off_topic(&lower);
        if is_off_topic {
            flags.push("Response appears off-topic".to_string());
        }

        if self.looks_ai_generated(response_text, &lower) {
            flags.push("Possible AI-generated content".to_string());
        }

        (flags, is_off_topic)
    }

    fn repeated_phrases(&self, response_text: &str, session: &Session) -> Vec<String> {
        let current = text::extract_phrases(response_text);
        let mut repeated: HashSet<String> = HashSet::new();

        for turn in session.turns.iter().rev().take(3) {
            let prior = text::extract_phrases(&turn.response.text);
            for phrase in current.intersection(&prior) {
                repeated.insert(phrase.clone());
            }
        }

        repeated.into_iter().collect()
    }

    fn is_off_topic(&self, lower: &str) -> bool {
        if CONFUSION_INDICATORS.iter().any(|i| lower.contains(i)) {
            return true;
        }
        if text::word_count(lower) < 5 {
            return true;
        }
        !RELEVANT_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    fn looks_ai_generated(&self, response_text: &str, lower: &str) -> bool {
        let connective_count = AI_CONNECTIVES.iter().filter(|c| lower.contains(*c)).count();
        let formal_count = FORMAL_WORDS.iter().filter(|w| lower.contains(*w)).count();

        let lengths = text::sentence_lengths(response_text);
        if lengths.len() >= 3 {
            let distinct: HashSet<usize> = lengths.iter().copied().collect();
            if distinct.len() <= 2 {
                return true;
            }
        }

        connective_count >= 2 || formal_count >= 3
    }

    /// Flags a monotonic non-increase across the last three responses of
    /// either the word-count or the complexity series.
    fn analyze_behavior(&self, response_text: &str, session: &Session) -> Vec<String> {
        let mut flags = Vec::new();

        let mut lengths = session.word_counts.clone();
        lengths.push(text::word_count(response_text));
        if declining(&lengths) {
            flags.push("Declining response engagement".to_string());
        }

        let mut complexity = session.complexity_scores.clone();
        complexity.push(text::complexity_score(response_text));
        if declining_f64(&complexity) {
            flags.push("Declining response complexity".to_string());
        }

        flags
    }

    /// Termination policy: Active -> Terminated on any trigger; duplicate
    /// pressure outranks the combined flag count, which outranks the
    /// cumulative off-topic count.
    fn decide_termination(
        &self,
        prior_duplicates: usize,
        total_flags: usize,
        is_off_topic: bool,
        session: &Session,
    ) -> (bool, Option<TerminationReason>) {
        if prior_duplicates >= self.config.max_duplicates {
            return (true, Some(TerminationReason::ExcessiveDuplicateResponses));
        }
        if total_flags >= self.config.max_flags {
            return (true, Some(TerminationReason::MultipleSuspiciousActivities));
        }
        let off_topic_total = session.off_topic_count + usize::from(is_off_topic);
        if is_off_topic && off_topic_total >= self.config.max_off_topic {
            return (true, Some(TerminationReason::ExcessiveOffTopicResponses));
        }
        (false, None)
    }
}

fn declining(series: &[usize]) -> bool {
    if series.len() < 3 {
        return false;
    }
    let tail = &series[series.len() - 3..];
    tail.windows(2).all(|w| w[0] >= w[1])
}

fn declining_f64(series: &[f64]) -> bool {
    if series.len() < 3 {
        return false;
    }
    let tail = &series[series.len() - 3..];
    tail.windows(2).all(|w| w[0] >= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::Evaluation;
    use crate::models::question::{Question, QuestionType};
    use crate::models::session::{CandidateProfile, JobProfile, Turn};
    use chrono::Utc;

    fn service() -> AntiCheatService {
        AntiCheatService::new(Arc::new(Config::default()))
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

    fn response(text: &str, latency: Option<f64>) -> Response {
        Response {
            text: text.to_string(),
            received_at: Utc::now(),
            latency_secs: latency,
        }
    }

    fn dummy_evaluation() -> Evaluation {
        Evaluation {
            relevance_score: 5.0,
            technical_accuracy_score: 5.0,
            communication_score: 5.0,
            depth_score: 5.0,
            job_fit_score: 5.0,
            overall_score: 5.0,
            feedback: String::new(),
            strengths: vec![],
            weaknesses: vec![],
            is_duplicate: false,
            is_off_topic: false,
            evaluated_at: Utc::now(),
        }
    }

    /// Record a turn the way the orchestrator does, running the analyzer over
    /// the state as it stood before the turn.
    fn push(svc: &AntiCheatService, session: &mut Session, text: &str, latency: Option<f64>) -> AntiCheatVerdict {
        let resp = response(text, latency);
        let verdict = svc.analyze(&resp, session);
        let question = Question {
            index: session.turns.len(),
            round_number: 1,
            question_type: QuestionType::General,
            text: "q".into(),
            asked_at: Utc::now(),
        };
        session.record_turn(
            Turn {
                question,
                response: resp,
                evaluation: dummy_evaluation(),
                verdict: verdict.clone(),
            },
            10,
        );
        verdict
    }

    #[test]
    fn identical_resubmission_increments_duplicate_count() {
        let svc = service();
        let mut s = session();
        let text = "I worked on a large data migration project with my team last year";

        let first = push(&svc, &mut s, text, None);
        assert!(!first.is_duplicate);

        let second = push(&svc, &mut s, text, None);
        assert!(second.is_duplicate);
        assert_eq!(second.prior_duplicates, 1);
        assert!(!second.should_terminate);

        let third = push(&svc, &mut s, text, None);
        assert_eq!(third.prior_duplicates, 2);
        assert!(third.should_terminate);
        assert_eq!(
            third.termination_reason,
            Some(TerminationReason::ExcessiveDuplicateResponses)
        );
    }

    #[test]
    fn near_duplicate_above_threshold_is_flagged() {
        let svc = service();
        let mut s = session();
        let base = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike november oscar papa quebec romeo sierra tango";
        let variant = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike november oscar papa quebec romeo sierra uniform";

        push(&svc, &mut s, base, None);
        let verdict = svc.analyze(&response(variant, None), &s);
        assert!(verdict.is_duplicate);
        assert!(verdict.max_similarity >= 0.85);
    }

    #[test]
    fn dissimilar_response_is_not_flagged() {
        let svc = service();
        let mut s = session();
        push(&svc, &mut s, "I built a billing service that processed invoices", None);

        let verdict = svc.analyze(
            &response("My team managed the kubernetes cluster upgrades last quarter", None),
            &s,
        );
        assert!(!verdict.is_duplicate);
        assert_eq!(verdict.prior_duplicates, 0);
    }

    #[test]
    fn fast_long_response_flags_possible_paste() {
        let svc = service();
        let s = session();
        let long = "I have extensive experience building distributed systems and I implemented several large projects with my team over the years in production.";
        assert!(long.chars().count() > 100);

        let verdict = svc.analyze(&response(long, Some(1.0)), &s);
        assert!(verdict
            .timing_flags
            .iter()
            .any(|f| f.contains("suspiciously fast")));
    }

    #[test]
    fn slow_response_is_flagged() {
        let svc = service();
        let s = session();
        let verdict = svc.analyze(
            &response("I worked through a project example in detail here", Some(400.0)),
            &s,
        );
        assert!(verdict.timing_flags.iter().any(|f| f.contains("unusually slow")));
    }

    #[test]
    fn inconsistent_window_is_flagged() {
        let svc = service();
        let mut s = session();
        s.latency_window.push_back(2.0);
        s.latency_window.push_back(30.0);

        let verdict = svc.analyze(
            &response("I developed the reporting project with the team", Some(45.0)),
            &s,
        );
        assert!(verdict.timing_flags.iter().any(|f| f.contains("Inconsistent")));
    }

    #[test]
    fn missing_latency_produces_no_timing_flags() {
        let svc = service();
        let s = session();
        let verdict = svc.analyze(&response("I managed a team project recently", None), &s);
        assert!(verdict.timing_flags.is_empty());
    }

    #[test]
    fn short_answer_is_off_topic_and_too_short() {
        let svc = service();
        let s = session();
        let verdict = svc.analyze(&response("idk", None), &s);
        assert!(verdict.content_flags.iter().any(|f| f.contains("too short")));
        assert!(verdict.is_off_topic);
    }

    #[test]
    fn answer_without_relevant_keywords_is_off_topic() {
        let svc = service();
        let s = session();
        let verdict = svc.analyze(
            &response("The weather has been quite nice around here lately honestly", None),
            &s,
        );
        assert!(verdict.is_off_topic);
    }

    #[test]
    fn ai_connectives_flag_generated_content() {
        let svc = service();
        let s = session();
        let verdict = svc.analyze(
            &response(
                "Furthermore, my project experience is broad. Moreover, I build teams that deliver resilient systems every single quarter.",
                None,
            ),
            &s,
        );
        assert!(verdict
            .content_flags
            .iter()
            .any(|f| f.contains("AI-generated")));
    }

    #[test]
    fn declining_word_counts_flag_engagement() {
        let svc = service();
        let mut s = session();
        push(&svc, &mut s, "I led a project building a payments platform with my team, covering design reviews, implementation milestones and the production rollout process end to end", None);
        push(&svc, &mut s, "We managed the develop and release work for that project together", None);

        let verdict = svc.analyze(&response("I solve build problems", None), &s);
        assert!(verdict
            .behavioral_flags
            .iter()
            .any(|f| f.contains("Declining response engagement")));
    }

    #[test]
    fn off_topic_accumulation_terminates() {
        let svc = service();
        let mut s = session();
        s.off_topic_count = 2;

        let verdict = svc.analyze(&response("what do you mean", None), &s);
        assert!(verdict.is_off_topic);
        assert!(verdict.should_terminate);
        assert_eq!(
            verdict.termination_reason,
            Some(TerminationReason::ExcessiveOffTopicResponses)
        );
    }

    #[test]
    fn termination_view_is_monotonic() {
        let svc = service();
        let mut s = session();
        let text = "I worked on a large data migration project with my team last year";
        push(&svc, &mut s, text, None);
        push(&svc, &mut s, text, None);
        push(&svc, &mut s, text, None);
        s.terminate(TerminationReason::ExcessiveDuplicateResponses)
            .unwrap();

        assert!(svc.should_terminate(&s));
        // stays true no matter how often it is asked
        assert!(svc.should_terminate(&s));
    }
}
