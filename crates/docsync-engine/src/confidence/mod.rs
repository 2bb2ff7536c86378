//! Confidence score to display tier.
//!
//! The overlay renderer and the low-confidence banner share one palette so a
//! block outlined in red on the page is the same red the banner warns with.

use crate::models::LayoutBlock;

pub const HIGH_THRESHOLD: f64 = 0.90;
pub const MEDIUM_THRESHOLD: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

/// Fill and border colours for one tier, as CSS colour strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierStyle {
    pub fill: &'static str,
    pub border: &'static str,
}

pub const HIGH_STYLE: TierStyle = TierStyle {
    fill: "rgba(34, 197, 94, 0.15)",
    border: "#22c55e",
};

pub const MEDIUM_STYLE: TierStyle = TierStyle {
    fill: "rgba(245, 158, 11, 0.15)",
    border: "#f59e0b",
};

pub const LOW_STYLE: TierStyle = TierStyle {
    fill: "rgba(239, 68, 68, 0.15)",
    border: "#ef4444",
};

impl ConfidenceTier {
    /// Map a score to its tier. Lower bounds are inclusive; anything that is
    /// not at least `MEDIUM_THRESHOLD` (NaN included) is `Low`.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if score >= MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn style(&self) -> TierStyle {
        match self {
            ConfidenceTier::High => HIGH_STYLE,
            ConfidenceTier::Medium => MEDIUM_STYLE,
            ConfidenceTier::Low => LOW_STYLE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "HIGH",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::Low => "LOW",
        }
    }
}

/// Shorthand for [`ConfidenceTier::from_score`].
pub fn encode(score: f64) -> ConfidenceTier {
    ConfidenceTier::from_score(score)
}

/// Data for the "some blocks need review" banner.
#[derive(Debug, Clone, PartialEq)]
pub struct LowConfidenceBanner {
    pub block_ids: Vec<String>,
    pub lowest_score: f64,
    pub style: TierStyle,
}

impl LowConfidenceBanner {
    pub fn message(&self) -> String {
        let n = self.block_ids.len();
        let noun = if n == 1 { "block" } else { "blocks" };
        format!(
            "{n} {noun} below {:.0}% confidence (lowest {:.0}%)",
            MEDIUM_THRESHOLD * 100.0,
            self.lowest_score * 100.0
        )
    }
}

/// Banner for the low-tier blocks, or `None` when there are none.
pub fn low_confidence_banner(blocks: &[LayoutBlock]) -> Option<LowConfidenceBanner> {
    let low: Vec<&LayoutBlock> = blocks
        .iter()
        .filter(|b| encode(b.confidence) == ConfidenceTier::Low)
        .collect();
    if low.is_empty() {
        return None;
    }
    let lowest_score = low
        .iter()
        .map(|b| b.confidence)
        .filter(|c| !c.is_nan())
        .fold(f64::INFINITY, f64::min);
    Some(LowConfidenceBanner {
        block_ids: low.iter().map(|b| b.id.clone()).collect(),
        lowest_score: if lowest_score.is_finite() { lowest_score } else { 0.0 },
        style: LOW_STYLE,
    })
}
