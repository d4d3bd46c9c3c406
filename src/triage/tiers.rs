use serde::{Deserialize, Serialize};

/// Score at or above which a test lands in the Highest tier.
pub const HIGHEST_THRESHOLD: f64 = 90.0;
/// Score at or above which a test lands in the High tier.
pub const HIGH_THRESHOLD: f64 = 80.0;
/// Score at or above which a test lands in the Medium tier.
pub const MEDIUM_THRESHOLD: f64 = 60.0;
/// Score at or above which a test lands in the Low tier; below is Lowest.
pub const LOW_THRESHOLD: f64 = 40.0;

/// Priority tier assigned to every test. `WontAutomate` is reserved for tests
/// whose automation gate answered "No"; the remaining tiers are cut from the
/// normalized 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
    WontAutomate,
}

impl PriorityTier {
    /// Classify a normalized score. Thresholds are evaluated top-down; the
    /// gate answer overrides the score entirely.
    pub fn classify(normalized_score: f64, can_automate: bool) -> Self {
        if !can_automate {
            return Self::WontAutomate;
        }

        if normalized_score >= HIGHEST_THRESHOLD {
            Self::Highest
        } else if normalized_score >= HIGH_THRESHOLD {
            Self::High
        } else if normalized_score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else if normalized_score >= LOW_THRESHOLD {
            Self::Low
        } else {
            Self::Lowest
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Lowest => "Lowest",
            Self::WontAutomate => "Won't Automate",
        }
    }

    /// Sort rank: Highest first, Won't Automate last.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Highest => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Lowest => 4,
            Self::WontAutomate => 5,
        }
    }

    pub const fn ordered() -> [Self; 6] {
        [
            Self::Highest,
            Self::High,
            Self::Medium,
            Self::Low,
            Self::Lowest,
            Self::WontAutomate,
        ]
    }

    /// Automation recommendation shown alongside the tier in reports.
    pub const fn guidance(self) -> &'static str {
        match self {
            Self::Highest => "Recommended for immediate automation",
            Self::High => "Recommended for second phase automation",
            Self::Medium => "Recommended for third phase automation",
            Self::Low => "Consider for later phases or keep as manual tests",
            Self::Lowest => "Not recommended for automation",
            Self::WontAutomate => "Identified as not to be automated",
        }
    }
}
