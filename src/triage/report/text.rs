use chrono::{DateTime, Local};

use crate::triage::catalog::FactorCatalog;
use crate::triage::scoring::round_to_tenth;
use crate::triage::tiers::{
    PriorityTier, HIGHEST_THRESHOLD, HIGH_THRESHOLD, LOW_THRESHOLD, MEDIUM_THRESHOLD,
};

use super::views::{TestReportEntry, TierGroup, TierReport};

const RULE: &str = "----------------------------------------------------------------------";
const DOUBLE_RULE: &str =
    "======================================================================";

/// Render the structured report as plain text for terminals and .txt export.
pub fn render_report(report: &TierReport, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("TEST AUTOMATION PRIORITY REPORT\n");
    out.push_str(&format!(
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M")
    ));
    out.push_str(&format!("Total Tests: {}\n", report.total_tests));
    if !report.section_breakdown.is_empty() {
        out.push_str(&format!("Sections: {}\n", report.section_breakdown.len()));
    }
    out.push_str(DOUBLE_RULE);
    out.push_str("\n\n");

    for group in &report.tiers {
        render_tier(&mut out, group);
    }

    render_breakdown(&mut out, report);

    out
}

fn render_tier(out: &mut String, group: &TierGroup) {
    // An empty Won't Automate bucket is simply omitted; the scored tiers
    // always appear, with a placeholder when nothing landed in them.
    if group.tier == PriorityTier::WontAutomate && group.entries.is_empty() {
        return;
    }

    match group.tier {
        PriorityTier::WontAutomate => out.push_str("TESTS THAT WON'T BE AUTOMATED:\n"),
        tier => out.push_str(&format!(
            "{} PRIORITY TESTS ({}):\n",
            tier.label().to_uppercase(),
            score_band(tier)
        )),
    }
    out.push_str(&format!("{}\n", group.guidance));
    out.push_str(RULE);
    out.push('\n');

    if group.entries.is_empty() {
        out.push_str("| (no tests in this category)\n");
    }

    for (index, entry) in group.entries.iter().enumerate() {
        render_entry(out, index, entry, group.tier);
    }

    out.push_str(RULE);
    out.push_str("\n\n");
}

fn render_entry(out: &mut String, index: usize, entry: &TestReportEntry, tier: PriorityTier) {
    out.push_str(&format!("| {}. {} (ID: {})\n", index + 1, entry.name, entry.id));
    if tier != PriorityTier::WontAutomate {
        out.push_str(&format!("|    Score: {:.1}\n", entry.total_score));
    }
    if let Some(section) = &entry.section {
        out.push_str(&format!("|    Section: {}\n", section));
    }
    if let Some(description) = &entry.description {
        out.push_str(&format!("|    Description: {}\n", description));
    }
    if !entry.factors.is_empty() {
        out.push_str("|    Factor Scores:\n");
        for factor in &entry.factors {
            out.push_str(&format!(
                "|      - {}: {} - {}\n",
                factor.display_name, factor.score, factor.label
            ));
        }
    }
    for line in &entry.yes_no_answers {
        out.push_str(&format!(
            "|    * {}: {}\n",
            line.question,
            if line.answer { "Yes" } else { "No" }
        ));
    }
    out.push_str("|\n");
}

fn score_band(tier: PriorityTier) -> String {
    match tier {
        PriorityTier::Highest => format!("Score >= {HIGHEST_THRESHOLD:.1}"),
        PriorityTier::High => format!("Score {HIGH_THRESHOLD:.1} - {HIGHEST_THRESHOLD:.1}"),
        PriorityTier::Medium => format!("Score {MEDIUM_THRESHOLD:.1} - {HIGH_THRESHOLD:.1}"),
        PriorityTier::Low => format!("Score {LOW_THRESHOLD:.1} - {MEDIUM_THRESHOLD:.1}"),
        PriorityTier::Lowest => format!("Score < {LOW_THRESHOLD:.1}"),
        PriorityTier::WontAutomate => String::new(),
    }
}

fn render_breakdown(out: &mut String, report: &TierReport) {
    if report.section_breakdown.is_empty() {
        return;
    }

    out.push_str("SECTION BREAKDOWN:\n");
    out.push_str(RULE);
    out.push('\n');

    for section in &report.section_breakdown {
        out.push_str(&format!("Section: {}\n", section.section));
        out.push_str(&format!("Total Tests: {}\n", section.total_tests));
        out.push_str("Priority Distribution:\n");
        for count in &section.tier_counts {
            out.push_str(&format!("  - {}: {} tests\n", count.tier_label, count.count));
        }
        out.push('\n');
    }

    out.push_str(RULE);
    out.push('\n');
}

/// Render the scoring guide describing the rubric, the formula, and the
/// cannot-automate override.
pub fn scoring_guide(catalog: &FactorCatalog) -> String {
    let mut out = String::new();

    out.push_str("TEST AUTOMATION PRIORITIZATION SCORING GUIDE\n");
    out.push_str("============================================\n\n");
    out.push_str("This service uses the following weighted factors to calculate\n");
    out.push_str("which manual tests should be prioritized for automation:\n\n");

    for definition in catalog.factors() {
        out.push_str(&format!(
            "{} (Weight: {})\n",
            definition.display_name, definition.weight
        ));
        out.push_str("--------------------------------------------------\n");
        if let Some(options) = catalog.score_options(&definition.key) {
            for (score, label) in options {
                out.push_str(&format!("  {} - {}\n", score, label));
            }
        }
        out.push('\n');
    }

    out.push_str("How scores are calculated:\n");
    out.push_str("--------------------------------------------------\n");
    out.push_str("1. Each factor score is multiplied by its weight\n");
    out.push_str("2. These weighted scores are summed to get a raw score\n");
    out.push_str("3. The raw score is converted to a 100-point scale\n\n");
    out.push_str("Formula: Final Score = (Raw Score / Max Possible Raw Score) x 100\n\n");

    let max_raw = catalog.max_raw_score();
    let min_raw = catalog.min_raw_score();
    out.push_str(&format!("Maximum possible raw score: {max_raw}\n"));
    out.push_str("Maximum possible final score: 100\n");
    out.push_str(&format!("Minimum possible raw score: {min_raw}\n"));
    if max_raw > 0 {
        out.push_str(&format!(
            "Minimum possible final score: {:.1}\n\n",
            round_to_tenth(f64::from(min_raw) / f64::from(max_raw) * 100.0)
        ));
    }

    if catalog.has_automation_gate() {
        out.push_str("Special case - tests that cannot be automated:\n");
        out.push_str("--------------------------------------------------\n");
        out.push_str("If a test answers 'No' to the 'Can it be Automated' factor,\n");
        out.push_str("it automatically receives:\n");
        out.push_str("  - A score of 0\n");
        out.push_str("  - Priority category of 'Won't Automate'\n");
        out.push_str("These tests are excluded from normal prioritization and shown separately.\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::triage::catalog::{FactorKey, GATE_NO, GATE_YES};
    use crate::triage::domain::TestDraft;
    use crate::triage::report::build_tier_report;
    use crate::triage::repository::TestRepository;

    fn rendered() -> String {
        let mut repository = TestRepository::new(Arc::new(FactorCatalog::standard()));
        let mut scores = BTreeMap::new();
        scores.insert(FactorKey::automation_gate(), GATE_YES);
        for key in [
            "regression_frequency",
            "customer_impact",
            "manual_effort",
            "automation_complexity",
            "existing_framework",
            "angular_framework",
            "repetitive",
        ] {
            scores.insert(FactorKey::new(key), 5);
        }
        repository.add_test(TestDraft {
            name: "login works".to_string(),
            section: "Login".to_string(),
            description: "Valid credentials land on the dashboard".to_string(),
            scores: scores.clone(),
            ..TestDraft::default()
        });

        let mut blocked = scores;
        blocked.insert(FactorKey::automation_gate(), GATE_NO);
        repository.add_test(TestDraft {
            name: "visual polish".to_string(),
            section: "Dashboard".to_string(),
            scores: blocked,
            ..TestDraft::default()
        });

        let tests = repository.get_sorted(None);
        let tiers = repository.priority_tiers(None);
        let report = build_tier_report(&tests, &tiers, repository.catalog());
        let generated = Local.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap();
        render_report(&report, generated)
    }

    #[test]
    fn report_text_carries_header_tiers_and_breakdown() {
        let text = rendered();

        assert!(text.starts_with("TEST AUTOMATION PRIORITY REPORT\n"));
        assert!(text.contains("Generated: 2025-06-02 09:30"));
        assert!(text.contains("Total Tests: 2"));
        assert!(text.contains("HIGHEST PRIORITY TESTS (Score >= 90.0):"));
        assert!(text.contains("| 1. login works (ID: 1)"));
        assert!(text.contains("|    Score: 100.0"));
        assert!(text.contains("|      - Regression Frequency: 5 - Always"));
        assert!(text.contains("TESTS THAT WON'T BE AUTOMATED:"));
        assert!(text.contains("|      - Can it be Automated: 1 - No"));
        assert!(text.contains("SECTION BREAKDOWN:"));
        assert!(text.contains("Section: Dashboard"));
        assert!(text.contains("  - Won't Automate: 1 tests"));
    }

    #[test]
    fn empty_tiers_render_a_placeholder() {
        let text = rendered();
        assert!(text.contains("| (no tests in this category)"));
    }

    #[test]
    fn guide_documents_the_standard_rubric() {
        let guide = scoring_guide(&FactorCatalog::standard());

        assert!(guide.contains("Regression Frequency (Weight: 3)"));
        assert!(guide.contains("  5 - Always"));
        assert!(guide.contains("Maximum possible raw score: 70"));
        assert!(guide.contains("Minimum possible raw score: 14"));
        assert!(guide.contains("Minimum possible final score: 20.0"));
        assert!(guide.contains("Priority category of 'Won't Automate'"));
    }
}
