//! Facts extracted from a conversation transcript.
//!
//! An [`ExtractedContext`] is rebuilt from scratch on every request and is
//! never mutated once built; the consuming `with_*` builders are the only way
//! to populate it.

use serde::{Deserialize, Serialize};

use super::message::ConversationMessage;

/// Audience segment describing relationship depth with the brand.
///
/// Ordered from weakest to strongest relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    Stranger,
    Follower,
    Customer,
    Advocate,
}

impl TrustTier {
    /// All tiers in relationship order.
    pub const ALL: [TrustTier; 4] = [
        TrustTier::Stranger,
        TrustTier::Follower,
        TrustTier::Customer,
        TrustTier::Advocate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stranger => "stranger",
            Self::Follower => "follower",
            Self::Customer => "customer",
            Self::Advocate => "advocate",
        }
    }
}

impl std::fmt::Display for TrustTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business vertical recognised by the keyword vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Supplements,
    Coaching,
    Ecommerce,
    Skincare,
    Subscription,
    Nonprofit,
    Education,
}

impl Vertical {
    /// All verticals in vote order. The first to reach the threshold wins.
    pub const ALL: [Vertical; 7] = [
        Vertical::Supplements,
        Vertical::Coaching,
        Vertical::Ecommerce,
        Vertical::Skincare,
        Vertical::Subscription,
        Vertical::Nonprofit,
        Vertical::Education,
    ];

    /// Lowercase key used by the knowledge tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplements => "supplements",
            Self::Coaching => "coaching",
            Self::Ecommerce => "ecommerce",
            Self::Skincare => "skincare",
            Self::Subscription => "subscription",
            Self::Nonprofit => "nonprofit",
            Self::Education => "education",
        }
    }
}

impl std::fmt::Display for Vertical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured facts pulled out of one request's transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContext {
    usp: Option<String>,
    icp: Option<String>,
    vertical: Option<Vertical>,
    trust_tier: Option<TrustTier>,
    proposed_outcome: Option<String>,
    history: Vec<ConversationMessage>,
}

impl ExtractedContext {
    /// Creates an empty context over the given history.
    pub fn new(history: Vec<ConversationMessage>) -> Self {
        Self {
            history,
            ..Default::default()
        }
    }

    pub fn with_usp(mut self, usp: Option<String>) -> Self {
        self.usp = non_empty(usp);
        self
    }

    pub fn with_icp(mut self, icp: Option<String>) -> Self {
        self.icp = non_empty(icp);
        self
    }

    pub fn with_vertical(mut self, vertical: Option<Vertical>) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn with_trust_tier(mut self, tier: Option<TrustTier>) -> Self {
        self.trust_tier = tier;
        self
    }

    pub fn with_proposed_outcome(mut self, outcome: Option<String>) -> Self {
        self.proposed_outcome = non_empty(outcome);
        self
    }

    pub fn usp(&self) -> Option<&str> {
        self.usp.as_deref()
    }

    pub fn icp(&self) -> Option<&str> {
        self.icp.as_deref()
    }

    pub fn vertical(&self) -> Option<Vertical> {
        self.vertical
    }

    pub fn trust_tier(&self) -> Option<TrustTier> {
        self.trust_tier
    }

    pub fn proposed_outcome(&self) -> Option<&str> {
        self.proposed_outcome.as_deref()
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    /// Number of progression facts present (USP, ICP, trust tier, outcome).
    ///
    /// The vertical is informational and does not count toward progress.
    pub fn filled_count(&self) -> usize {
        [
            self.usp.is_some(),
            self.icp.is_some(),
            self.trust_tier.is_some(),
            self.proposed_outcome.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_facts() {
        let ctx = ExtractedContext::new(Vec::new());
        assert_eq!(ctx.filled_count(), 0);
        assert!(ctx.usp().is_none());
        assert!(ctx.vertical().is_none());
    }

    #[test]
    fn blank_strings_are_treated_as_absent() {
        let ctx = ExtractedContext::new(Vec::new())
            .with_usp(Some("   ".to_string()))
            .with_icp(Some(String::new()));
        assert!(ctx.usp().is_none());
        assert!(ctx.icp().is_none());
        assert_eq!(ctx.filled_count(), 0);
    }

    #[test]
    fn vertical_does_not_count_toward_progress() {
        let ctx = ExtractedContext::new(Vec::new())
            .with_vertical(Some(Vertical::Coaching))
            .with_trust_tier(Some(TrustTier::Follower));
        assert_eq!(ctx.filled_count(), 1);
    }

    #[test]
    fn trust_tiers_are_ordered_by_relationship_depth() {
        assert!(TrustTier::Stranger < TrustTier::Follower);
        assert!(TrustTier::Customer < TrustTier::Advocate);
    }

    #[test]
    fn vertical_serializes_lowercase() {
        let json = serde_json::to_string(&Vertical::Ecommerce).unwrap();
        assert_eq!(json, "\"ecommerce\"");
    }
}
