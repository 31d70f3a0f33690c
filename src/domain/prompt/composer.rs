//! Six-layer instruction composition.
//!
//! Layers are rendered in a fixed order and joined by blank lines:
//!
//! 1. base persona and mission (caller-overridable)
//! 2. compliance mandate
//! 3. step focus directive
//! 4. knowledge context
//! 5. output format requirements
//! 6. recap of extracted facts
//!
//! Later layers may refine earlier ones but never override the compliance layer.
//! Layers that render empty are skipped.

use crate::domain::conversation::{ExtractedContext, WorkflowStep};
use crate::domain::knowledge::KnowledgeContext;

use super::base_prompt::DEFAULT_BASE_PROMPT;
use super::output_format::OutputFormatSpec;

pub const COMPLIANCE_MANDATE: &str = "SECURITY & COMPLIANCE MANDATE:
- CAN-SPAM: Include unsubscribe link and physical address in every email
- GDPR/CASL: No personal data collection without explicit consent
- Spam Rate Target: <0.3% - Avoid trigger words, use balanced design
- Subject Lines: 40 chars max, personalized where possible";

const LAYER_SEPARATOR: &str = "\n\n";

/// The rendered instruction document sent as system instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs to one composition.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInput<'a> {
    /// Per-request override of layer 1. Blank overrides are ignored.
    pub base_instructions: Option<&'a str>,
    pub step: WorkflowStep,
    pub context: &'a ExtractedContext,
    pub knowledge: &'a KnowledgeContext,
    pub output_format: &'a OutputFormatSpec,
}

#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, input: CompositionInput<'_>) -> ComposedPrompt {
        let base = input
            .base_instructions
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_PROMPT);

        let layers = [
            base.trim().to_string(),
            COMPLIANCE_MANDATE.to_string(),
            step_directive(input.step),
            input.knowledge.rendered.trim().to_string(),
            input.output_format.render(input.knowledge.cadence.as_deref()),
            fact_recap(input.context),
        ];

        let text = layers
            .iter()
            .filter(|layer| !layer.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(LAYER_SEPARATOR);

        ComposedPrompt(text)
    }
}

fn step_directive(step: WorkflowStep) -> String {
    format!(
        "CURRENT WORKFLOW STEP: {}\nFOCUS YOUR RESPONSE ON THIS STEP ONLY.",
        step.directive()
    )
}

/// One labelled line per present fact. Absent facts are omitted entirely.
fn fact_recap(context: &ExtractedContext) -> String {
    let vertical = context.vertical().map(|v| v.as_str());
    let tier = context.trust_tier().map(|t| t.as_str());

    [
        ("EXTRACTED USP", context.usp()),
        ("EXTRACTED ICP", context.icp()),
        ("DETECTED VERTICAL", vertical),
        ("CURRENT CIRCLE", tier),
        ("PROPOSED OUTCOME", context.proposed_outcome()),
    ]
    .iter()
    .filter_map(|(label, value)| value.map(|v| format!("{label}: {v}")))
    .collect::<Vec<_>>()
    .join("\n")
}
