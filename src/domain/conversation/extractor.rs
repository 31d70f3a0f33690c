//! Heuristic fact extraction from conversation transcripts.
//!
//! Extraction is rule driven. Each free-text fact owns an ordered list of
//! case-insensitive patterns (most specific first) and the first capture wins.
//! The vertical is chosen by keyword vote, and the trust tier by word-bounded
//! keyword matches behind a targeting gate. None of this is language
//! understanding; a missing fact is a normal outcome, not an error.

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::{ExtractedContext, TrustTier, Vertical};
use super::message::ConversationMessage;

/// Free-text facts captured by pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Usp,
    Icp,
    Outcome,
}

/// Ordered pattern table. Within a field, earlier rules take priority.
const PATTERN_RULES: &[(TextField, &str)] = &[
    (TextField::Usp, r"(?i)usp[:\s]+([^.!?\n]+)"),
    (TextField::Usp, r"(?i)unique(?:\s+selling\s+proposition)?[:\s]+([^.!?\n]+)"),
    (TextField::Usp, r"(?i)what\s+makes\s+us\s+different\s+is[:\s]+([^.!?\n]+)"),
    (TextField::Icp, r"(?i)icp[:\s]+([^.!?\n]+)"),
    (TextField::Icp, r"(?i)target(?:\s+audience|\s+customer|\s+market)?[:\s]+([^.!?\n]+)"),
    (TextField::Icp, r"(?i)we\s+sell\s+to[:\s]+([^.!?\n]+)"),
    (TextField::Icp, r"(?i)my\s+customers\s+are[:\s]+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)(?:goal|outcome|objective)[:\s]+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)(?:my|our)\s+goal\s+is\s+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)desired\s+(?:outcome|result)[:\s]+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)(?:i|we)\s+want\s+to\s+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)(?:i|we)\s+need\s+to\s+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)(?:i|we)(?:'m|'re)?\s+looking\s+to\s+([^.!?\n]+)"),
    (TextField::Outcome, r"(?i)(?:i|we)'d\s+like\s+to\s+([^.!?\n]+)"),
    (
        TextField::Outcome,
        r"(?i)(?:achieve|accomplish|obtain|generate|create|build|establish|develop)\s+([^.!?\n]{5,50})",
    ),
];

/// Generic continuations that are never an outcome on their own.
const OUTCOME_STOPLIST: &[&str] = &[
    "to", "started", "going", "start", "begin", "beginning", "here", "there", "this", "that",
    "it", "them", "us", "more", "less", "better", "worse", "good", "bad", "some", "any", "all",
    "none", "one", "two", "three",
];

const MIN_OUTCOME_LEN: usize = 5;
const MIN_SINGLE_WORD_OUTCOME_LEN: usize = 8;

/// Distinct keywords a vertical needs before it is selected.
pub const VERTICAL_VOTE_THRESHOLD: usize = 2;

fn vertical_keywords(vertical: Vertical) -> &'static [&'static str] {
    match vertical {
        Vertical::Supplements => &["supplement", "vitamin", "nutrition", "protein", "fda", "health"],
        Vertical::Coaching => &["coach", "training", "mentorship", "course", "learning", "transformation"],
        Vertical::Ecommerce => &["product", "store", "shop", "merchandise", "inventory", "cart"],
        Vertical::Skincare => &["skin", "beauty", "cosmetic", "skincare", "serum", "routine"],
        Vertical::Subscription => &["subscription", "recurring", "membership", "box", "monthly"],
        Vertical::Nonprofit => &["nonprofit", "charity", "donation", "cause", "mission", "advocacy"],
        Vertical::Education => &["school", "college", "university", "campus", "students", "enroll"],
    }
}

fn tier_keywords(tier: TrustTier) -> &'static [&'static str] {
    match tier {
        TrustTier::Stranger => &[
            "stranger",
            "cold audience",
            "cold lead",
            "new audience",
            "new prospect",
            "top of funnel",
            "tofu",
            "awareness stage",
            "strangers",
        ],
        TrustTier::Follower => &[
            "follower",
            "subscriber",
            "email subscriber",
            "newsletter subscriber",
            "warm lead",
            "engaged audience",
            "followers",
        ],
        TrustTier::Customer => &[
            "customer",
            "buyer",
            "purchased",
            "made a purchase",
            "bought",
            "client",
            "paid customer",
            "existing customer",
            "customers",
        ],
        TrustTier::Advocate => &[
            "advocate",
            "loyal customer",
            "repeat customer",
            "champion",
            "referral",
            "brand advocate",
            "advocates",
        ],
    }
}

/// Phrases showing the user is actually talking about audience targeting.
const TARGETING_GATE_PHRASES: &[&str] = &[
    "circle of trust",
    "buyers' circle",
    "targeting",
    "intended audience",
    "audience is",
];

/// Weaker discourse words accepted when no gate phrase is present.
const TARGETING_DISCOURSE_WORDS: &[&str] = &["circle", "audience", "target", "focus"];

struct CompiledRule {
    field: TextField,
    regex: Regex,
}

static COMPILED_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    PATTERN_RULES
        .iter()
        .map(|(field, pattern)| CompiledRule {
            field: *field,
            regex: Regex::new(pattern).expect("extraction pattern is valid"),
        })
        .collect()
});

static TIER_MATCHERS: Lazy<Vec<(TrustTier, Vec<Regex>)>> = Lazy::new(|| {
    TrustTier::ALL
        .iter()
        .map(|tier| {
            let matchers = tier_keywords(*tier)
                .iter()
                .map(|keyword| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))
                        .expect("escaped keyword is a valid pattern")
                })
                .collect();
            (*tier, matchers)
        })
        .collect()
});

/// Pulls structured business facts out of a transcript.
///
/// Stateless and pure: identical input always yields an identical context.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts every fact from the current message plus the full history.
    pub fn extract(
        &self,
        current_message: &str,
        history: &[ConversationMessage],
    ) -> ExtractedContext {
        let text = combined_text(current_message, history);

        ExtractedContext::new(history.to_vec())
            .with_usp(self.capture(TextField::Usp, &text))
            .with_icp(self.capture(TextField::Icp, &text))
            .with_vertical(self.detect_vertical(&text))
            .with_trust_tier(self.detect_trust_tier(&text))
            .with_proposed_outcome(self.capture(TextField::Outcome, &text))
    }

    /// Applies the pattern rules of one field in priority order.
    ///
    /// Returns the first acceptable trimmed capture. Outcome captures that
    /// fail the post-filter fall through to the next rule.
    pub fn capture(&self, field: TextField, text: &str) -> Option<String> {
        COMPILED_RULES
            .iter()
            .filter(|rule| rule.field == field)
            .filter_map(|rule| rule.regex.captures(text))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .find(|value| match field {
                TextField::Outcome => is_plausible_outcome(value),
                _ => !value.is_empty(),
            })
    }

    /// Returns the first vertical (in vote order) with enough distinct keyword hits.
    pub fn detect_vertical(&self, text: &str) -> Option<Vertical> {
        let lower = text.to_lowercase();
        Vertical::ALL.iter().copied().find(|vertical| {
            vertical_keywords(*vertical)
                .iter()
                .filter(|keyword| lower.contains(*keyword))
                .count()
                >= VERTICAL_VOTE_THRESHOLD
        })
    }

    /// Detects the audience tier the user is targeting.
    ///
    /// A keyword hit counts only when the text also contains a targeting gate
    /// phrase, or failing that, one of the weaker discourse words.
    pub fn detect_trust_tier(&self, text: &str) -> Option<TrustTier> {
        let lower = text.to_lowercase();
        let gated = TARGETING_GATE_PHRASES.iter().any(|p| lower.contains(p))
            || TARGETING_DISCOURSE_WORDS.iter().any(|w| lower.contains(w));
        if !gated {
            return None;
        }

        TIER_MATCHERS
            .iter()
            .find(|(_, matchers)| matchers.iter().any(|re| re.is_match(&lower)))
            .map(|(tier, _)| *tier)
    }
}

fn combined_text(current_message: &str, history: &[ConversationMessage]) -> String {
    let mut text = String::with_capacity(
        current_message.len() + history.iter().map(|m| m.content.len() + 1).sum::<usize>() + 1,
    );
    text.push_str(current_message);
    text.push(' ');
    for message in history {
        text.push_str(&message.content);
        text.push(' ');
    }
    text
}

fn is_plausible_outcome(candidate: &str) -> bool {
    if candidate.len() < MIN_OUTCOME_LEN {
        return false;
    }

    let lower = candidate.to_lowercase();
    let generic = OUTCOME_STOPLIST
        .iter()
        .any(|stop| lower == *stop || lower.starts_with(&format!("{stop} ")));
    if generic {
        return false;
    }

    let mut words = lower.split_whitespace();
    match (words.next(), words.next()) {
        (Some(only), None) => only.len() >= MIN_SINGLE_WORD_OUTCOME_LEN,
        _ => true,
    }
}
