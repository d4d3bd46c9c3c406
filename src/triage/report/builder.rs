use std::collections::BTreeMap;

use crate::triage::catalog::{FactorCatalog, FactorKey};
use crate::triage::domain::TestRecord;
use crate::triage::repository::PriorityTiers;
use crate::triage::tiers::PriorityTier;

use super::views::{
    FactorLine, SectionBreakdown, TestReportEntry, TierCount, TierGroup, TierReport, YesNoLine,
};

/// Assemble the structured tier report consumed by every renderer. `tests`
/// is the flat (already filtered) collection; `tiers` the partitioned view
/// of the same tests.
pub fn build_tier_report(
    tests: &[TestRecord],
    tiers: &PriorityTiers,
    catalog: &FactorCatalog,
) -> TierReport {
    let tier_groups = PriorityTier::ordered()
        .into_iter()
        .map(|tier| TierGroup {
            tier,
            tier_label: tier.label(),
            guidance: tier.guidance(),
            entries: tiers
                .tier(tier)
                .iter()
                .map(|test| report_entry(test, tier, catalog))
                .collect(),
        })
        .collect();

    TierReport {
        total_tests: tests.len(),
        tiers: tier_groups,
        section_breakdown: section_breakdown(tests),
    }
}

fn report_entry(test: &TestRecord, tier: PriorityTier, catalog: &FactorCatalog) -> TestReportEntry {
    let gate = FactorKey::automation_gate();
    let mut factors = Vec::new();

    // The gate answer explains why a test sits in Won't Automate, so it
    // leads the factor list there and is skipped in the generic loop below.
    if tier == PriorityTier::WontAutomate {
        if let Some(line) = factor_line(test, &gate, catalog) {
            factors.push(line);
        }
    }

    for definition in catalog.factors() {
        if tier == PriorityTier::WontAutomate && definition.key.is_automation_gate() {
            continue;
        }
        if let Some(line) = factor_line(test, &definition.key, catalog) {
            factors.push(line);
        }
    }

    TestReportEntry {
        name: test.name.clone(),
        id: test.id.clone(),
        ticket_id: test.ticket_id.clone(),
        section: non_empty(&test.section),
        description: non_empty(&test.description),
        total_score: test.total_score,
        factors,
        yes_no_answers: test
            .yes_no_answers
            .iter()
            .map(|(question, &answer)| YesNoLine {
                question: question.clone(),
                answer,
            })
            .collect(),
    }
}

/// An optional display field: an empty value becomes `None` so renderers can
/// omit the line entirely rather than printing a blank.
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A factor renders only when the test scored it and the score has a label.
fn factor_line(test: &TestRecord, key: &FactorKey, catalog: &FactorCatalog) -> Option<FactorLine> {
    let score = *test.scores.get(key)?;
    let display_name = catalog.display_name(key)?;
    let label = catalog.score_label(key, score)?;
    Some(FactorLine {
        display_name: display_name.to_string(),
        score,
        label: label.to_string(),
    })
}

/// Group tests by section label. The breakdown only appears when the
/// collection actually spans more than one grouping (counting the unlabeled
/// group); single-section backlogs skip it.
fn section_breakdown(tests: &[TestRecord]) -> Vec<SectionBreakdown> {
    let mut groups: BTreeMap<&str, Vec<&TestRecord>> = BTreeMap::new();
    for test in tests {
        groups.entry(test.section.as_str()).or_default().push(test);
    }

    if groups.len() <= 1 {
        return Vec::new();
    }

    groups
        .into_iter()
        .filter(|(section, _)| !section.is_empty())
        .map(|(section, section_tests)| {
            let tier_counts = PriorityTier::ordered()
                .into_iter()
                .map(|tier| TierCount {
                    tier,
                    tier_label: tier.label(),
                    count: section_tests
                        .iter()
                        .filter(|test| test.priority == tier)
                        .count(),
                })
                .filter(|count| count.count > 0)
                .collect();

            SectionBreakdown {
                section: section.to_string(),
                total_tests: section_tests.len(),
                tier_counts,
            }
        })
        .collect()
}
