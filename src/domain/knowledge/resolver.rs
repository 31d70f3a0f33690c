//! Cached lookups over the knowledge tables.
//!
//! The resolver answers the questions prompt composition asks: which
//! frameworks suit a step or vertical, which sequence template fits an outcome,
//! and what guidance applies to a vertical. Resolved entries are cached by the
//! key they were requested under; the tables never change after startup so the
//! cache is never invalidated.

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::conversation::WorkflowStep;

use super::base::KnowledgeBase;
use super::framework::{similarity_score, Framework, FUZZY_MATCH_THRESHOLD};
use super::sequence::{normalize_key, sequence_key, SequenceTemplate, FALLBACK_VERTICAL};
use super::vertical::VerticalGuidance;

/// Framework keys recommended for each workflow step.
pub fn step_framework_keys(step: WorkflowStep) -> &'static [&'static str] {
    match step {
        WorkflowStep::Introduction => &["hero"],
        WorkflowStep::Discovery => &["aida"],
        WorkflowStep::Validation => &["aida", "fab"],
        WorkflowStep::FrameworkApplication => &["aida"],
        WorkflowStep::CircleConfirmation => &["pas", "bab"],
        WorkflowStep::GoalSetting => &["pas"],
        WorkflowStep::Analysis => &["4ps", "bab"],
        WorkflowStep::Execution => &["4ps", "fab", "pas"],
    }
}

/// Framework keys recommended for a vertical, or none if unknown.
pub fn vertical_framework_keys(vertical: &str) -> &'static [&'static str] {
    match normalize_key(vertical).as_str() {
        "supplements" => &["fab", "4ps", "aida"],
        "coaching" => &["bab", "4ps", "pas"],
        "dtc" => &["aida", "hero", "pas"],
        "nonprofit" => &["bab", "4ps"],
        "ecommerce" => &["pas", "fab", "hero"],
        _ => &[],
    }
}

/// Knowledge injected into the prompt for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeContext {
    /// Rendered markdown blocks, empty when nothing applies.
    pub rendered: String,
    /// Cadence of the resolved sequence template, if one resolved.
    pub cadence: Option<String>,
}

/// Read-only resolver over an immutable [`KnowledgeBase`].
#[derive(Debug)]
pub struct KnowledgeResolver {
    base: Arc<KnowledgeBase>,
    framework_cache: DashMap<String, Arc<Framework>>,
    sequence_cache: DashMap<String, Arc<SequenceTemplate>>,
}

impl KnowledgeResolver {
    pub fn new(base: Arc<KnowledgeBase>) -> Self {
        Self {
            base,
            framework_cache: DashMap::new(),
            sequence_cache: DashMap::new(),
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.base
    }

    /// Looks a framework up by acronym, falling back to fuzzy name matching.
    pub fn framework(&self, name: &str) -> Option<Arc<Framework>> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        if let Some(hit) = self.framework_cache.get(&key) {
            return Some(Arc::clone(hit.value()));
        }

        let found = self
            .base
            .framework(&key)
            .cloned()
            .or_else(|| self.best_fuzzy_match(&key))?;
        self.framework_cache.insert(key, Arc::clone(&found));
        Some(found)
    }

    fn best_fuzzy_match(&self, query: &str) -> Option<Arc<Framework>> {
        let mut candidates: Vec<_> = self.base.frameworks().collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));

        let mut best: Option<(f64, &Arc<Framework>)> = None;
        for (key, framework) in candidates {
            let score = similarity_score(query, key, &framework.name);
            if score > FUZZY_MATCH_THRESHOLD && best.map_or(true, |(top, _)| score > top) {
                best = Some((score, framework));
            }
        }
        best.map(|(_, framework)| Arc::clone(framework))
    }

    pub fn frameworks_for_step(&self, step: WorkflowStep) -> Vec<Arc<Framework>> {
        self.resolve_all(step_framework_keys(step))
    }

    pub fn frameworks_for_vertical(&self, vertical: &str) -> Vec<Arc<Framework>> {
        self.resolve_all(vertical_framework_keys(vertical))
    }

    fn resolve_all(&self, keys: &[&str]) -> Vec<Arc<Framework>> {
        keys.iter().filter_map(|key| self.framework(key)).collect()
    }

    /// Finds the template for an outcome, trying the exact vertical then the DTC fallback.
    pub fn sequence_for(&self, outcome: &str, vertical: &str) -> Option<Arc<SequenceTemplate>> {
        let key = sequence_key(outcome, vertical);
        if let Some(hit) = self.sequence_cache.get(&key) {
            return Some(Arc::clone(hit.value()));
        }

        let fallback = sequence_key(outcome, FALLBACK_VERTICAL);
        let found = self
            .base
            .sequence(&key)
            .or_else(|| self.base.sequence(&fallback))
            .cloned()?;
        self.sequence_cache.insert(key, Arc::clone(&found));
        Some(found)
    }

    pub fn vertical_guidance(&self, vertical: &str) -> Option<Arc<VerticalGuidance>> {
        self.base.vertical(&normalize_key(vertical)).cloned()
    }

    /// Every framework, highest relevance first.
    pub fn list_frameworks(&self) -> Vec<Arc<Framework>> {
        let mut all: Vec<_> = self.base.frameworks().map(|(_, f)| Arc::clone(f)).collect();
        all.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.acronym.cmp(&b.acronym))
        });
        all
    }

    /// Templates registered for a vertical, ordered by key.
    pub fn sequences_for_vertical(&self, vertical: &str) -> Vec<Arc<SequenceTemplate>> {
        let wanted = normalize_key(vertical);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<_> = self
            .base
            .sequences()
            .filter(|(_, template)| normalize_key(&template.vertical) == wanted)
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches.into_iter().map(|(_, t)| Arc::clone(t)).collect()
    }

    /// Renders the knowledge relevant to a step, outcome and vertical.
    ///
    /// Frameworks are only injected at the execution step. The sequence block
    /// needs both an outcome and a vertical.
    pub fn context_for(
        &self,
        step: WorkflowStep,
        outcome: Option<&str>,
        vertical: Option<&str>,
    ) -> KnowledgeContext {
        let mut blocks = Vec::new();

        if step.is_terminal() {
            let mut frameworks = self.frameworks_for_step(step);
            if let Some(vertical) = vertical {
                for fw in self.frameworks_for_vertical(vertical) {
                    if !frameworks.iter().any(|known| known.acronym == fw.acronym) {
                        frameworks.push(fw);
                    }
                }
            }
            if !frameworks.is_empty() {
                blocks.push(render_frameworks(&frameworks));
            }
        }

        let mut cadence = None;
        if let (Some(outcome), Some(vertical)) = (outcome, vertical) {
            if let Some(template) = self.sequence_for(outcome, vertical) {
                cadence = Some(template.cadence.clone());
                blocks.push(render_sequence(&template));
            }
        }

        if let Some(guidance) = vertical.and_then(|v| self.vertical_guidance(v)) {
            blocks.push(render_guidance(&guidance));
        }

        KnowledgeContext {
            rendered: blocks.join("\n"),
            cadence,
        }
    }
}

fn render_frameworks(frameworks: &[Arc<Framework>]) -> String {
    let mut out = String::from("## APPLICABLE COPYWRITING FRAMEWORKS\n\n");
    for fw in frameworks {
        out.push_str(&format!(
            "**{} ({}):** {}\n",
            fw.name,
            fw.acronym,
            fw.primary_use().unwrap_or("general use")
        ));
        if !fw.tone.is_empty() {
            out.push_str(&format!("**Tone:** {}\n", fw.tone));
        }
        if !fw.components.is_empty() {
            out.push_str(&format!("**Components:** {}\n", fw.components.join(", ")));
        }
    }
    out
}

fn render_sequence(template: &SequenceTemplate) -> String {
    format!(
        "## SEQUENCE TEMPLATE\n\n\
         Outcome: {} ({})\n\
         Duration: {}\n\
         Touch Points: {}\n\
         Cadence: {}\n\
         Frameworks: {}\n\
         Key Messages: {}\n\
         Branching Logic: {}\n",
        template.outcome,
        template.vertical,
        template.duration,
        template.touch_point_count,
        template.cadence,
        template.frameworks.join(", "),
        template.key_messages.join(" → "),
        template.branching_logic,
    )
}

fn render_guidance(guidance: &VerticalGuidance) -> String {
    let mut out = format!(
        "## VERTICAL GUIDANCE: {}\n\nCharacteristics: {}\nKey Principles: {}\n",
        guidance.vertical_name,
        guidance.characteristics.join("; "),
        guidance.key_principles.join("; "),
    );
    if !guidance.unique_considerations.is_empty() {
        out.push_str(&format!("Considerations: {}\n", guidance.unique_considerations));
    }
    out
}
