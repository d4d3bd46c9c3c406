use std::collections::BTreeMap;

use super::catalog::{FactorCatalog, FactorKey, GATE_NO};

/// Weighted score for a single test.
///
/// Factors absent from `scores` contribute nothing. The automation gate never
/// participates in the sum; answering it with "No" short-circuits to zero.
/// The normalized score is the raw score as a percentage of the catalog's
/// maximum, rounded to one decimal place.
pub fn compute_score(scores: &BTreeMap<FactorKey, u8>, catalog: &FactorCatalog) -> (u32, f64) {
    if automation_blocked(scores, catalog) {
        return (0, 0.0);
    }

    let raw_score: u32 = catalog
        .scoring_factors()
        .filter_map(|definition| {
            scores
                .get(&definition.key)
                .map(|&score| u32::from(score) * definition.weight)
        })
        .sum();

    let max_raw_score = catalog.max_raw_score();
    if max_raw_score == 0 {
        // A catalog without positive weights is a construction bug; report a
        // zero score instead of dividing by zero.
        return (raw_score, 0.0);
    }

    let normalized = f64::from(raw_score) / f64::from(max_raw_score) * 100.0;
    (raw_score, round_to_tenth(normalized))
}

/// True when the catalog carries the automation gate and the test answered
/// it with "No".
pub fn automation_blocked(scores: &BTreeMap<FactorKey, u8>, catalog: &FactorCatalog) -> bool {
    catalog.has_automation_gate()
        && scores.get(&FactorKey::automation_gate()) == Some(&GATE_NO)
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
