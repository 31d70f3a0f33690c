//! The eight steps of the guided sequence-building conversation.

use serde::{Deserialize, Serialize};

/// Current phase of the guided conversation, ordinal 0 through 7.
///
/// Steps have a total order but progression is not enforced: the step is
/// recomputed from the transcript on every request and may move backward if
/// earlier facts disappear from the history.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Greet and ask for the USP and ICP.
    #[default]
    Introduction,
    /// One of USP/ICP known; ask for the other.
    Discovery,
    /// Confirm understanding of the USP and ICP.
    Validation,
    /// Choose a copywriting framework for the audience.
    FrameworkApplication,
    /// Confirm which circle of trust is being targeted.
    CircleConfirmation,
    /// Pin down the sequence goal.
    GoalSetting,
    /// Judge whether the goal suits the audience.
    Analysis,
    /// Produce the full sequence.
    Execution,
}

impl WorkflowStep {
    /// All steps in order.
    pub const ALL: [WorkflowStep; 8] = [
        WorkflowStep::Introduction,
        WorkflowStep::Discovery,
        WorkflowStep::Validation,
        WorkflowStep::FrameworkApplication,
        WorkflowStep::CircleConfirmation,
        WorkflowStep::GoalSetting,
        WorkflowStep::Analysis,
        WorkflowStep::Execution,
    ];

    /// Zero-based ordinal reported to callers.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Looks a step up by ordinal.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// The directive injected into the prompt while this step is active.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Introduction => "STEP 1: Introduce yourself and ask for USP/ICP",
            Self::Discovery => "STEP 2: Confirm USP and ICP, ask for outcome",
            Self::Validation => "STEP 3: Validate understanding, recommend Circle of Trust",
            Self::FrameworkApplication => "STEP 4: Select framework (PAS/AIDA) based on circle",
            Self::CircleConfirmation => "STEP 5: Confirm Buyer Circle and cadence",
            Self::GoalSetting => "STEP 6: Define specific sequence goal",
            Self::Analysis => "STEP 7: Analyze and recommend triggers/branching",
            Self::Execution => "STEP 8: Generate complete sequence with table",
        }
    }

    /// Short label for logs and status output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::Discovery => "Discovery",
            Self::Validation => "Validation",
            Self::FrameworkApplication => "Framework Application",
            Self::CircleConfirmation => "Circle Confirmation",
            Self::GoalSetting => "Goal Setting",
            Self::Analysis => "Analysis",
            Self::Execution => "Execution",
        }
    }

    /// Returns true for the step that produces the deliverable.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Execution)
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_step_is_introduction() {
        assert_eq!(WorkflowStep::default(), WorkflowStep::Introduction);
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        for (i, step) in WorkflowStep::ALL.iter().enumerate() {
            assert_eq!(step.ordinal() as usize, i);
            assert_eq!(WorkflowStep::from_ordinal(i as u8), Some(*step));
        }
        assert_eq!(WorkflowStep::from_ordinal(8), None);
    }

    #[test]
    fn directives_are_numbered_one_based() {
        for step in WorkflowStep::ALL {
            let expected = format!("STEP {}:", step.ordinal() + 1);
            assert!(step.directive().starts_with(&expected), "{step}");
        }
    }

    #[test]
    fn only_execution_is_terminal() {
        let terminal: Vec<_> = WorkflowStep::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&WorkflowStep::Execution]);
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&WorkflowStep::CircleConfirmation).unwrap();
        assert_eq!(json, "\"circle_confirmation\"");
    }
}
