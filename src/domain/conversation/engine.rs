//! Workflow step inference.
//!
//! The service keeps no cursor between requests, so the step is recomputed
//! from the extracted facts plus evidence that the model already completed a
//! step in an earlier turn.

use super::context::ExtractedContext;
use super::message::ConversationMessage;
use super::step::WorkflowStep;

/// Keyword families used to recognise steps the model has already completed.
#[derive(Debug, Clone)]
pub struct CompletionKeywords {
    /// Words that mark a recap or confirmation.
    pub validation_markers: Vec<&'static str>,
    /// USP/ICP mentions that must accompany a validation marker.
    pub validation_subjects: Vec<&'static str>,
    /// Phrases that mark a confirmed audience circle.
    pub circle_markers: Vec<&'static str>,
    /// Words that mark an appropriateness judgement.
    pub analysis_markers: Vec<&'static str>,
    /// Outcome words that must accompany an analysis marker.
    pub analysis_outcome_words: Vec<&'static str>,
    /// Segment words that must accompany an analysis marker.
    pub analysis_segment_words: Vec<&'static str>,
}

impl Default for CompletionKeywords {
    fn default() -> Self {
        Self {
            validation_markers: vec![
                "understanding",
                "summary",
                "confirm",
                "correct",
                "accurate",
                "let me summarize",
                "to confirm",
                "based on",
                "so you",
            ],
            validation_subjects: vec![
                "usp",
                "unique selling",
                "icp",
                "ideal customer",
                "target audience",
            ],
            circle_markers: vec![
                "circle of trust",
                "buyers' circle",
                "intended audience",
                "targeting",
                "focusing on",
                "audience is",
            ],
            analysis_markers: vec![
                "appropriate",
                "inappropriate",
                "aligns",
                "well-suited",
                "matches",
                "fits",
                "circle of trust",
                "desired outcome",
                "analysis",
                "demonstrating",
                "motivations",
                "relationship status",
            ],
            analysis_outcome_words: vec!["outcome", "goal"],
            analysis_segment_words: vec![
                "circle", "customer", "stranger", "follower", "advocate",
            ],
        }
    }
}

/// Evidence, found in model-authored turns, that a step was already done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionSignals {
    pub validation_done: bool,
    pub circle_confirmed: bool,
    pub analysis_done: bool,
}

impl CompletionSignals {
    /// Scans model messages only. User messages never count as evidence.
    pub fn detect(history: &[ConversationMessage], keywords: &CompletionKeywords) -> Self {
        let mut signals = Self::default();

        for message in history.iter().filter(|m| m.role.is_model()) {
            let content = message.content.to_lowercase();
            let has_any = |words: &[&str]| words.iter().any(|w| content.contains(w));

            if has_any(&keywords.validation_markers) && has_any(&keywords.validation_subjects) {
                signals.validation_done = true;
            }
            if has_any(&keywords.circle_markers) {
                signals.circle_confirmed = true;
            }
            if has_any(&keywords.analysis_markers)
                && has_any(&keywords.analysis_outcome_words)
                && has_any(&keywords.analysis_segment_words)
            {
                signals.analysis_done = true;
            }
        }

        signals
    }
}

/// Maps extracted facts to the current workflow step.
#[derive(Debug, Clone, Default)]
pub struct WorkflowStateMachine {
    keywords: CompletionKeywords,
}

impl WorkflowStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses custom completion keyword families.
    pub fn with_keywords(keywords: CompletionKeywords) -> Self {
        Self { keywords }
    }

    /// Computes the step for a context, scanning its history for completion evidence.
    pub fn step(&self, context: &ExtractedContext) -> WorkflowStep {
        let signals = CompletionSignals::detect(context.history(), &self.keywords);
        Self::step_with_signals(context, signals)
    }

    /// Pure step mapping given precomputed completion signals.
    ///
    /// A step is skipped only when its completion signal is set; otherwise the
    /// conversation stays on it.
    pub fn step_with_signals(context: &ExtractedContext, signals: CompletionSignals) -> WorkflowStep {
        let has_usp = context.usp().is_some();
        let has_icp = context.icp().is_some();
        let has_tier = context.trust_tier().is_some();
        let has_outcome = context.proposed_outcome().is_some();

        match context.filled_count() {
            0 => return WorkflowStep::Introduction,
            1 if has_usp || has_icp => return WorkflowStep::Discovery,
            _ => {}
        }

        if has_usp && has_icp {
            if !has_tier {
                return if signals.validation_done {
                    WorkflowStep::FrameworkApplication
                } else {
                    WorkflowStep::Validation
                };
            }
            if !has_outcome {
                return if signals.circle_confirmed {
                    WorkflowStep::GoalSetting
                } else {
                    WorkflowStep::CircleConfirmation
                };
            }
            return if signals.analysis_done {
                WorkflowStep::Execution
            } else {
                WorkflowStep::Analysis
            };
        }

        WorkflowStep::Introduction
    }
}
