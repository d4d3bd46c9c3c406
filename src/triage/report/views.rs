use serde::Serialize;

use crate::triage::domain::TestId;
use crate::triage::tiers::PriorityTier;

/// Markup-free report structure walked by the concrete renderers (plain
/// text, CSV, external GUI). Grouping, ordering, and field selection happen
/// here; styling does not.
#[derive(Debug, Clone, Serialize)]
pub struct TierReport {
    pub total_tests: usize,
    pub tiers: Vec<TierGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub section_breakdown: Vec<SectionBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierGroup {
    pub tier: PriorityTier,
    pub tier_label: &'static str,
    pub guidance: &'static str,
    pub entries: Vec<TestReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReportEntry {
    pub name: String,
    pub id: TestId,
    pub ticket_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_score: f64,
    pub factors: Vec<FactorLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub yes_no_answers: Vec<YesNoLine>,
}

/// One scored factor with its display name and option label.
#[derive(Debug, Clone, Serialize)]
pub struct FactorLine {
    pub display_name: String,
    pub score: u8,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct YesNoLine {
    pub question: String,
    pub answer: bool,
}

/// Per-section tier distribution for the breakdown summary.
#[derive(Debug, Clone, Serialize)]
pub struct SectionBreakdown {
    pub section: String,
    pub total_tests: usize,
    pub tier_counts: Vec<TierCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierCount {
    pub tier: PriorityTier,
    pub tier_label: &'static str,
    pub count: usize,
}
