//! Required response shape per workflow step.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::WorkflowStep;

pub const SEQUENCE_TABLE_COLUMNS: [&str; 3] = ["Email #", "Subject Line", "Day Delay"];
pub const MAX_EMAIL_LENGTH: usize = 220;
pub const READABILITY_LEVEL: &str = "Grade6";

/// Spacing used when no sequence template resolved.
pub const DEFAULT_CADENCE: &str = "every 2-3 days";

/// Response shape the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFormatSpec {
    pub kind: String,
    /// True only at the execution step.
    pub include_table: bool,
    pub table_columns: Vec<String>,
    pub max_content_length: usize,
    pub readability_level: String,
}

impl OutputFormatSpec {
    pub fn for_step(step: WorkflowStep) -> Self {
        Self {
            kind: "text".to_string(),
            include_table: step.is_terminal(),
            table_columns: SEQUENCE_TABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            max_content_length: MAX_EMAIL_LENGTH,
            readability_level: READABILITY_LEVEL.to_string(),
        }
    }

    /// Renders the output-format layer.
    ///
    /// `cadence` is the resolved template cadence used for the delay rules.
    pub fn render(&self, cadence: Option<&str>) -> String {
        let mut out = format!(
            "OUTPUT FORMAT REQUIREMENTS:\n\
             - Type: {}\n\
             - Max Email Length: {} chars\n\
             - Readability: {} level",
            self.kind, self.max_content_length, self.readability_level
        );

        if self.include_table && !self.table_columns.is_empty() {
            let header = self.table_columns.join(" | ");
            let separator = vec!["---"; self.table_columns.len()].join(" | ");
            let spacing = cadence.filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_CADENCE);
            out.push_str(&format!(
                "\n- REQUIRED TABLE FORMAT:\n\
                 | {header} |\n\
                 | {separator} |\n\
                 - Day Delay is a plain integer number of days with no units.\n\
                 - Row 1 MUST have a Day Delay of 0.\n\
                 - Each later Day Delay must be greater than or equal to the row above it.\n\
                 - Space the delays according to the cadence: {spacing}."
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_only_at_execution() {
        for step in WorkflowStep::ALL {
            assert_eq!(OutputFormatSpec::for_step(step).include_table, step == WorkflowStep::Execution);
        }
    }

    #[test]
    fn execution_render_contains_header_and_zero_delay_rule() {
        let text = OutputFormatSpec::for_step(WorkflowStep::Execution).render(Some("Every 3-4 days"));
        assert!(text.contains("| Email # | Subject Line | Day Delay |"));
        assert!(text.contains("| --- | --- | --- |"));
        assert!(text.contains("Row 1 MUST have a Day Delay of 0"));
        assert!(text.contains("cadence: Every 3-4 days"));
    }

    #[test]
    fn missing_cadence_uses_default_spacing() {
        let text = OutputFormatSpec::for_step(WorkflowStep::Execution).render(None);
        assert!(text.contains("cadence: every 2-3 days"));
    }

    #[test]
    fn non_terminal_render_has_no_table() {
        let text = OutputFormatSpec::for_step(WorkflowStep::Discovery).render(Some("daily"));
        assert!(text.starts_with("OUTPUT FORMAT REQUIREMENTS:"));
        assert!(!text.contains("Day Delay"));
    }
}
