use std::collections::{BTreeMap, HashMap};

use crate::triage::catalog::{FactorCatalog, FactorKey, GATE_YES};
use crate::triage::domain::{TestDraft, TestId};
use crate::triage::repository::TestRepository;

/// One parsed row from an external source, keyed by column display name.
pub type RawRecord = HashMap<String, String>;

/// Score used when a non-gate factor is missing or unparseable.
const DEFAULT_FACTOR_SCORE: u8 = 3;

/// Fold raw rows into the repository. Every row produces a test; malformed
/// values are defaulted, never rejected, so the return value is simply the
/// number of rows processed.
///
/// With `replace` the existing rows and section labels are dropped first;
/// the id counter is kept so re-imports cannot hand out stale ids.
pub fn reconcile(repository: &mut TestRepository, records: Vec<RawRecord>, replace: bool) -> usize {
    if replace {
        repository.clear_for_replace();
    }

    let count = records.len();
    let mut next_id = repository.counter();

    for record in records {
        let scores = resolve_scores(&record, repository.catalog());
        let draft = TestDraft {
            name: plain_field(&record, "Test Name"),
            ticket_id: plain_field(&record, "Ticket ID"),
            description: text_field(&record, "Description"),
            section: text_field(&record, "Section"),
            scores,
            yes_no_answers: BTreeMap::new(),
        };

        let id = record
            .get("Test ID")
            .filter(|value| !value.is_empty())
            .map(|value| TestId(value.clone()))
            .unwrap_or_else(|| TestId(next_id.to_string()));

        repository.insert_imported(id.clone(), draft);

        // Numeric ids pull the counter forward so later add_test calls never
        // collide with imported rows. Textual ids leave it alone.
        if let Ok(numeric) = id.as_str().parse::<u64>() {
            if numeric >= next_id {
                next_id = numeric + 1;
            }
        }
    }

    repository.set_counter(next_id);
    count
}

/// Resolve every catalog factor from the row by display name. The gate
/// defaults to "Yes" so a missing automatability column cannot silently mark
/// a whole batch as unautomatable; everything else defaults to the medium
/// option.
fn resolve_scores(record: &RawRecord, catalog: &FactorCatalog) -> BTreeMap<FactorKey, u8> {
    let mut scores = BTreeMap::new();

    for definition in catalog.factors() {
        let parsed = record
            .get(&definition.display_name)
            .and_then(|value| value.parse::<u8>().ok());
        let fallback = if definition.key.is_automation_gate() {
            GATE_YES
        } else {
            DEFAULT_FACTOR_SCORE
        };
        scores.insert(definition.key.clone(), parsed.unwrap_or(fallback));
    }

    scores
}

fn plain_field(record: &RawRecord, column: &str) -> String {
    record.get(column).cloned().unwrap_or_default()
}

/// Free-text columns: a missing value or the literal "nan" (numeric-library
/// artifact from upstream tooling) collapses to empty.
fn text_field(record: &RawRecord, column: &str) -> String {
    match record.get(column) {
        Some(value) if !value.eq_ignore_ascii_case("nan") => value.clone(),
        _ => String::new(),
    }
}
