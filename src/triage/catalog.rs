use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key of the gate factor that decides whether a test can be automated at all.
pub const AUTOMATION_GATE_KEY: &str = "can_be_automated";

/// Discrete score values every factor accepts.
pub const SCORE_VALUES: [u8; 3] = [1, 3, 5];

/// Gate answer meaning "No, this test cannot be automated".
pub const GATE_NO: u8 = 1;

/// Gate answer meaning "Yes, this test can be automated".
pub const GATE_YES: u8 = 5;

/// Identifier wrapper for scoring factors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactorKey(pub String);

impl FactorKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn automation_gate() -> Self {
        Self(AUTOMATION_GATE_KEY.to_string())
    }

    pub fn is_automation_gate(&self) -> bool {
        self.0 == AUTOMATION_GATE_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One weighted factor in the prioritization rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorDefinition {
    pub key: FactorKey,
    pub display_name: String,
    pub weight: u32,
}

/// Human-readable labels for the discrete score values of one factor.
pub type ScoreLabels = BTreeMap<u8, String>;

/// Immutable factor metadata: keys, display names, weights, and the
/// score-to-label mapping per factor. Constructed once and passed explicitly
/// to the scoring function, the classifier, and the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorCatalog {
    factors: Vec<FactorDefinition>,
    score_options: BTreeMap<FactorKey, ScoreLabels>,
    yes_no_questions: BTreeMap<String, String>,
}

impl FactorCatalog {
    pub fn new(
        factors: Vec<FactorDefinition>,
        score_options: BTreeMap<FactorKey, ScoreLabels>,
        yes_no_questions: BTreeMap<String, String>,
    ) -> Self {
        Self {
            factors,
            score_options,
            yes_no_questions,
        }
    }

    /// The production rubric: the automation gate plus seven weighted factors.
    pub fn standard() -> Self {
        let mut factors = Vec::new();
        let mut score_options = BTreeMap::new();

        let mut define = |key: &str, display_name: &str, weight: u32, labels: [(u8, &str); 3]| {
            let key = FactorKey::new(key);
            factors.push(FactorDefinition {
                key: key.clone(),
                display_name: display_name.to_string(),
                weight,
            });
            let labels = labels
                .into_iter()
                .map(|(value, label)| (value, label.to_string()))
                .collect();
            score_options.insert(key, labels);
        };

        define(
            AUTOMATION_GATE_KEY,
            "Can it be Automated",
            0,
            [(1, "No"), (3, "Maybe"), (5, "Yes")],
        );
        define(
            "regression_frequency",
            "Regression Frequency",
            3,
            [(1, "Semi-annual"), (3, "Quarterly"), (5, "Always")],
        );
        define(
            "customer_impact",
            "Customer Impact",
            3,
            [
                (1, "Minor functionality"),
                (3, "Important functionality"),
                (5, "Critical business process"),
            ],
        );
        define(
            "manual_effort",
            "Manual Test Effort",
            2,
            [(1, "< 5 minutes"), (3, "5-20 minutes"), (5, "> 20 minutes")],
        );
        define(
            "automation_complexity",
            "Automation Complexity",
            2,
            [
                (1, "Very difficult to automate"),
                (3, "Moderate effort"),
                (5, "Easy to automate"),
            ],
        );
        define(
            "existing_framework",
            "Existing Framework",
            2,
            [
                (1, "No Page Objects"),
                (3, "Some Page Objects"),
                (5, "Established Page Objects"),
            ],
        );
        define(
            "angular_framework",
            "Angular Framework",
            1,
            [
                (1, "Old Angular JS framework"),
                (3, "Migrating soon"),
                (5, "New Angular framework"),
            ],
        );
        define(
            "repetitive",
            "Repetitive",
            1,
            [
                (1, "Not repetitive"),
                (3, "Somewhat repetitive"),
                (5, "Highly repetitive"),
            ],
        );

        Self {
            factors,
            score_options,
            yes_no_questions: BTreeMap::new(),
        }
    }

    /// All factors in catalog order, including the automation gate.
    pub fn factors(&self) -> &[FactorDefinition] {
        &self.factors
    }

    /// Factors that participate in scoring math, i.e. everything but the gate.
    pub fn scoring_factors(&self) -> impl Iterator<Item = &FactorDefinition> {
        self.factors
            .iter()
            .filter(|definition| !definition.key.is_automation_gate())
    }

    pub fn definition(&self, key: &FactorKey) -> Option<&FactorDefinition> {
        self.factors.iter().find(|definition| &definition.key == key)
    }

    pub fn display_name(&self, key: &FactorKey) -> Option<&str> {
        self.definition(key)
            .map(|definition| definition.display_name.as_str())
    }

    pub fn score_label(&self, key: &FactorKey, value: u8) -> Option<&str> {
        self.score_options
            .get(key)
            .and_then(|labels| labels.get(&value))
            .map(String::as_str)
    }

    pub fn score_options(&self, key: &FactorKey) -> Option<&ScoreLabels> {
        self.score_options.get(key)
    }

    pub fn yes_no_questions(&self) -> &BTreeMap<String, String> {
        &self.yes_no_questions
    }

    pub fn has_automation_gate(&self) -> bool {
        self.factors
            .iter()
            .any(|definition| definition.key.is_automation_gate())
    }

    /// Theoretical ceiling assuming every scoring factor gets the maximum
    /// option. Zero only for a degenerate catalog without positive weights.
    pub fn max_raw_score(&self) -> u32 {
        self.scoring_factors()
            .map(|definition| u32::from(SCORE_VALUES[2]) * definition.weight)
            .sum()
    }

    /// Floor assuming every scoring factor gets the minimum option.
    pub fn min_raw_score(&self) -> u32 {
        self.scoring_factors()
            .map(|definition| u32::from(SCORE_VALUES[0]) * definition.weight)
            .sum()
    }
}
