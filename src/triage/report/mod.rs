mod builder;
pub mod export;
pub mod text;
mod views;

pub use builder::build_tier_report;
pub use views::{
    FactorLine, SectionBreakdown, TestReportEntry, TierCount, TierGroup, TierReport, YesNoLine,
};
