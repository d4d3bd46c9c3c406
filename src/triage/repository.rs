use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use super::catalog::FactorCatalog;
use super::domain::{TestDraft, TestId, TestRecord};
use super::scoring::{automation_blocked, compute_score};
use super::tiers::{
    PriorityTier, HIGHEST_THRESHOLD, HIGH_THRESHOLD, LOW_THRESHOLD, MEDIUM_THRESHOLD,
};

/// In-memory store owning the test collection, the monotonic id counter, and
/// the set of section labels currently in use. All scoring and tier
/// assignment flows through here so stored records never drift from their
/// `scores`.
#[derive(Debug, Clone)]
pub struct TestRepository {
    catalog: Arc<FactorCatalog>,
    tests: Vec<TestRecord>,
    current_id: u64,
    sections: BTreeSet<String>,
}

impl TestRepository {
    pub fn new(catalog: Arc<FactorCatalog>) -> Self {
        Self {
            catalog,
            tests: Vec::new(),
            current_id: 1,
            sections: BTreeSet::new(),
        }
    }

    pub fn catalog(&self) -> &FactorCatalog {
        &self.catalog
    }

    pub fn tests(&self) -> &[TestRecord] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Section labels referenced by at least one live test.
    pub fn sections(&self) -> &BTreeSet<String> {
        &self.sections
    }

    /// Create a test: assign the next id, derive scores and tier, track the
    /// section. Input is never rejected; missing fields stay empty.
    pub fn add_test(&mut self, draft: TestDraft) -> TestRecord {
        let id = TestId(self.current_id.to_string());
        let record = self.build_record(id, draft);

        self.register_section(&record.section);
        self.tests.push(record.clone());
        self.current_id += 1;

        record
    }

    /// Replace every mutable field of an existing test and re-derive its
    /// scores and tier. Returns `None` when the id is unknown.
    pub fn update_test(&mut self, id: &TestId, draft: TestDraft) -> Option<TestRecord> {
        let index = self.tests.iter().position(|test| &test.id == id)?;
        let previous_section = self.tests[index].section.clone();

        let record = self.build_record(id.clone(), draft);
        self.register_section(&record.section);
        self.tests[index] = record.clone();

        if previous_section != record.section {
            self.prune_section(&previous_section);
        }

        Some(record)
    }

    /// Remove one test. Returns false when the id is unknown.
    pub fn delete_one(&mut self, id: &TestId) -> bool {
        let Some(index) = self.tests.iter().position(|test| &test.id == id) else {
            return false;
        };

        let removed = self.tests.remove(index);
        self.prune_section(&removed.section);
        true
    }

    /// Clear the collection, the section set, and reset the id counter.
    /// Returns false when there was nothing to delete.
    pub fn delete_all(&mut self) -> bool {
        if self.tests.is_empty() {
            return false;
        }

        self.tests.clear();
        self.sections.clear();
        self.current_id = 1;
        true
    }

    pub fn find_by_id(&self, id: &TestId) -> Option<&TestRecord> {
        self.tests.iter().find(|test| &test.id == id)
    }

    /// First test whose name matches exactly. Duplicate names resolve to the
    /// earliest insertion; callers needing determinism must key by id.
    pub fn find_id_by_name(&self, name: &str) -> Option<TestId> {
        self.tests
            .iter()
            .find(|test| test.name == name)
            .map(|test| test.id.clone())
    }

    /// Tests ordered for display: tier rank ascending, then total score
    /// descending within a tier. Optionally restricted to one section.
    pub fn get_sorted(&self, section: Option<&str>) -> Vec<TestRecord> {
        let mut tests: Vec<TestRecord> = self
            .tests
            .iter()
            .filter(|test| section.map_or(true, |wanted| test.section == wanted))
            .cloned()
            .collect();

        tests.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| b.total_score.total_cmp(&a.total_score))
        });

        tests
    }

    /// Partition the sorted view by each test's already-assigned tier. The
    /// stored `priority` is authoritative here so override-driven tests never
    /// get reclassified by score.
    pub fn priority_tiers(&self, section: Option<&str>) -> PriorityTiers {
        let mut tiers = PriorityTiers::default();

        for test in self.get_sorted(section) {
            match test.priority {
                PriorityTier::Highest => tiers.highest.push(test),
                PriorityTier::High => tiers.high.push(test),
                PriorityTier::Medium => tiers.medium.push(test),
                PriorityTier::Low => tiers.low.push(test),
                PriorityTier::Lowest => tiers.lowest.push(test),
                PriorityTier::WontAutomate => tiers.wont_automate.push(test),
            }
        }

        tiers
    }

    fn build_record(&self, id: TestId, draft: TestDraft) -> TestRecord {
        let TestDraft {
            name,
            section,
            description,
            ticket_id,
            scores,
            yes_no_answers,
        } = draft;

        let (raw_score, total_score) = compute_score(&scores, &self.catalog);
        let can_automate = !automation_blocked(&scores, &self.catalog);
        let priority = PriorityTier::classify(total_score, can_automate);

        TestRecord {
            id,
            name,
            section,
            description,
            ticket_id,
            scores,
            yes_no_answers,
            raw_score,
            total_score,
            priority,
        }
    }

    fn register_section(&mut self, section: &str) {
        if !section.is_empty() {
            self.sections.insert(section.to_string());
        }
    }

    /// Drop a section label once no live test references it. O(n) scan,
    /// acceptable at the hundreds-of-tests scale this store targets.
    fn prune_section(&mut self, section: &str) {
        if section.is_empty() {
            return;
        }
        if self.tests.iter().all(|test| test.section != section) {
            self.sections.remove(section);
        }
    }

    /// Insert a reconciled record under an explicit id without touching the
    /// counter; the importer manages counter advancement itself.
    pub(crate) fn insert_imported(&mut self, id: TestId, draft: TestDraft) -> TestRecord {
        let record = self.build_record(id, draft);
        self.register_section(&record.section);
        self.tests.push(record.clone());
        record
    }

    /// Clear rows and sections ahead of a replacing import. The id counter is
    /// deliberately preserved.
    pub(crate) fn clear_for_replace(&mut self) {
        self.tests.clear();
        self.sections.clear();
    }

    pub(crate) fn counter(&self) -> u64 {
        self.current_id
    }

    pub(crate) fn set_counter(&mut self, value: u64) {
        self.current_id = value;
    }
}

/// Sorted tests partitioned by tier, plus the fixed classification
/// thresholds restated for display.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityTiers {
    pub highest: Vec<TestRecord>,
    pub high: Vec<TestRecord>,
    pub medium: Vec<TestRecord>,
    pub low: Vec<TestRecord>,
    pub lowest: Vec<TestRecord>,
    pub wont_automate: Vec<TestRecord>,
    pub highest_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
    pub low_threshold: f64,
}

impl Default for PriorityTiers {
    fn default() -> Self {
        Self {
            highest: Vec::new(),
            high: Vec::new(),
            medium: Vec::new(),
            low: Vec::new(),
            lowest: Vec::new(),
            wont_automate: Vec::new(),
            highest_threshold: HIGHEST_THRESHOLD,
            high_threshold: HIGH_THRESHOLD,
            medium_threshold: MEDIUM_THRESHOLD,
            low_threshold: LOW_THRESHOLD,
        }
    }
}

impl PriorityTiers {
    pub fn tier(&self, tier: PriorityTier) -> &[TestRecord] {
        match tier {
            PriorityTier::Highest => &self.highest,
            PriorityTier::High => &self.high,
            PriorityTier::Medium => &self.medium,
            PriorityTier::Low => &self.low,
            PriorityTier::Lowest => &self.lowest,
            PriorityTier::WontAutomate => &self.wont_automate,
        }
    }

    pub fn total(&self) -> usize {
        PriorityTier::ordered()
            .into_iter()
            .map(|tier| self.tier(tier).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::triage::catalog::{FactorDefinition, FactorKey, GATE_NO, GATE_YES};

    fn small_catalog() -> Arc<FactorCatalog> {
        let factors = vec![
            FactorDefinition {
                key: FactorKey::automation_gate(),
                display_name: "Can it be Automated".to_string(),
                weight: 0,
            },
            FactorDefinition {
                key: FactorKey::new("regression"),
                display_name: "Regression Frequency".to_string(),
                weight: 3,
            },
            FactorDefinition {
                key: FactorKey::new("impact"),
                display_name: "Customer Impact".to_string(),
                weight: 3,
            },
        ];
        Arc::new(FactorCatalog::new(factors, BTreeMap::new(), BTreeMap::new()))
    }

    fn draft(name: &str, section: &str, scores: &[(&str, u8)]) -> TestDraft {
        TestDraft {
            name: name.to_string(),
            section: section.to_string(),
            scores: scores
                .iter()
                .map(|(key, score)| (FactorKey::new(*key), *score))
                .collect(),
            ..TestDraft::default()
        }
    }

    #[test]
    fn add_test_derives_scores_and_tier() {
        let mut repository = TestRepository::new(small_catalog());
        let record = repository.add_test(draft(
            "checkout total",
            "Cart",
            &[("can_be_automated", GATE_YES), ("regression", 5), ("impact", 5)],
        ));

        assert_eq!(record.id, TestId::from("1"));
        assert_eq!(record.raw_score, 30);
        assert_eq!(record.total_score, 100.0);
        assert_eq!(record.priority, PriorityTier::Highest);
        assert_eq!(repository.sections().len(), 1);
    }

    #[test]
    fn gate_no_forces_wont_automate() {
        let mut repository = TestRepository::new(small_catalog());
        let record = repository.add_test(draft(
            "visual check",
            "",
            &[("can_be_automated", GATE_NO), ("regression", 5), ("impact", 5)],
        ));

        assert_eq!(record.raw_score, 0);
        assert_eq!(record.total_score, 0.0);
        assert_eq!(record.priority, PriorityTier::WontAutomate);
        assert!(repository.sections().is_empty());
    }

    #[test]
    fn ids_stay_unique_across_adds_and_deletes() {
        let mut repository = TestRepository::new(small_catalog());
        for i in 0..5 {
            repository.add_test(draft(&format!("test {i}"), "", &[("regression", 3)]));
        }
        assert!(repository.delete_one(&TestId::from("2")));
        assert!(repository.delete_one(&TestId::from("4")));
        repository.add_test(draft("replacement", "", &[("impact", 1)]));

        let mut ids: Vec<&str> = repository.tests().iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), repository.len());
        // Deleted ids are not reused mid-session.
        assert_eq!(repository.find_by_id(&TestId::from("6")).map(|t| t.name.as_str()), Some("replacement"));
    }

    #[test]
    fn sections_track_live_tests_exactly() {
        let mut repository = TestRepository::new(small_catalog());
        repository.add_test(draft("a", "Login", &[("regression", 3)]));
        repository.add_test(draft("b", "Login", &[("regression", 3)]));
        repository.add_test(draft("c", "Cart", &[("regression", 3)]));

        assert_eq!(
            repository.sections().iter().collect::<Vec<_>>(),
            ["Cart", "Login"]
        );

        // One Login test remains, so the label survives this delete.
        assert!(repository.delete_one(&TestId::from("1")));
        assert!(repository.sections().contains("Login"));

        // Moving the last Login test away garbage-collects the label.
        let updated = repository.update_test(
            &TestId::from("2"),
            draft("b", "Checkout", &[("regression", 3)]),
        );
        assert!(updated.is_some());
        assert!(!repository.sections().contains("Login"));
        assert!(repository.sections().contains("Checkout"));

        assert!(repository.delete_one(&TestId::from("3")));
        assert!(!repository.sections().contains("Cart"));

        let expected: BTreeSet<String> = repository
            .tests()
            .iter()
            .filter(|test| !test.section.is_empty())
            .map(|test| test.section.clone())
            .collect();
        assert_eq!(repository.sections(), &expected);
    }

    #[test]
    fn delete_all_resets_the_counter() {
        let mut repository = TestRepository::new(small_catalog());
        for i in 0..5 {
            repository.add_test(draft(&format!("test {i}"), "Reports", &[("impact", 3)]));
        }

        assert!(repository.delete_all());
        assert!(repository.is_empty());
        assert!(repository.sections().is_empty());

        let record = repository.add_test(draft("fresh", "", &[("impact", 3)]));
        assert_eq!(record.id, TestId::from("1"));

        // Second purge is an observable no-op.
        assert!(repository.delete_all());
        assert!(!repository.delete_all());
    }

    #[test]
    fn update_miss_returns_none_without_side_effects() {
        let mut repository = TestRepository::new(small_catalog());
        repository.add_test(draft("only", "Login", &[("regression", 3)]));

        let miss = repository.update_test(&TestId::from("99"), draft("x", "Cart", &[]));
        assert!(miss.is_none());
        assert_eq!(repository.len(), 1);
        assert!(!repository.sections().contains("Cart"));
        assert!(!repository.delete_one(&TestId::from("99")));
    }

    #[test]
    fn sorted_view_orders_by_tier_then_score() {
        let mut repository = TestRepository::new(small_catalog());
        // 3+3 weights, max 30: raw 30 -> 100.0 Highest, raw 27 -> 90.0 Highest,
        // raw 24 -> 80.0 High, raw 9 -> 30.0 Lowest, gate-no -> Won't Automate.
        repository.add_test(draft("high", "", &[("regression", 3), ("impact", 5)]));
        repository.add_test(draft("top", "", &[("regression", 5), ("impact", 5)]));
        repository.add_test(draft(
            "blocked",
            "",
            &[("can_be_automated", GATE_NO), ("regression", 5), ("impact", 5)],
        ));
        repository.add_test(draft("floor", "", &[("regression", 1), ("impact", 1)]));
        repository.add_test(draft("near top", "", &[("regression", 4), ("impact", 5)]));

        let sorted = repository.get_sorted(None);
        let names: Vec<&str> = sorted.iter().map(|test| test.name.as_str()).collect();
        assert_eq!(names, ["top", "near top", "high", "floor", "blocked"]);
    }

    #[test]
    fn sorted_view_filters_by_exact_section() {
        let mut repository = TestRepository::new(small_catalog());
        repository.add_test(draft("a", "Login", &[("regression", 5), ("impact", 5)]));
        repository.add_test(draft("b", "Log", &[("regression", 1), ("impact", 1)]));

        let filtered = repository.get_sorted(Some("Login"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "a");
        assert!(repository.get_sorted(Some("login")).is_empty());
    }

    #[test]
    fn tiers_partition_by_stored_priority() {
        let mut repository = TestRepository::new(small_catalog());
        repository.add_test(draft("top", "", &[("regression", 5), ("impact", 5)]));
        repository.add_test(draft(
            "blocked",
            "",
            &[("can_be_automated", GATE_NO), ("regression", 5), ("impact", 5)],
        ));
        repository.add_test(draft("floor", "", &[("regression", 1), ("impact", 1)]));

        let tiers = repository.priority_tiers(None);
        assert_eq!(tiers.highest.len(), 1);
        assert_eq!(tiers.lowest.len(), 1);
        assert_eq!(tiers.wont_automate.len(), 1);
        assert_eq!(tiers.total(), repository.len());
        assert_eq!(tiers.highest_threshold, 90.0);
        assert_eq!(tiers.high_threshold, 80.0);
        assert_eq!(tiers.medium_threshold, 60.0);
        assert_eq!(tiers.low_threshold, 40.0);
    }

    #[test]
    fn find_id_by_name_returns_first_match() {
        let mut repository = TestRepository::new(small_catalog());
        repository.add_test(draft("dup", "", &[("regression", 1)]));
        repository.add_test(draft("dup", "", &[("regression", 5)]));

        assert_eq!(repository.find_id_by_name("dup"), Some(TestId::from("1")));
        assert_eq!(repository.find_id_by_name("missing"), None);
    }
}
