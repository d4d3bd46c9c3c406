//! Prioritization engine for manual-test automation triage: factor catalog,
//! weighted scoring, tier classification, the test repository, CSV import
//! reconciliation, and report building.

pub mod catalog;
pub mod domain;
pub mod import;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod tiers;

pub use catalog::{FactorCatalog, FactorDefinition, FactorKey};
pub use domain::{TestDraft, TestId, TestRecord};
pub use import::{CsvTestImporter, ImportError};
pub use report::{build_tier_report, TierReport};
pub use repository::{PriorityTiers, TestRepository};
pub use router::{triage_router, TriageState};
pub use tiers::PriorityTier;
