mod parser;
mod reconciler;

use std::io::Read;
use std::path::Path;

use crate::triage::repository::TestRepository;

pub use reconciler::{reconcile, RawRecord};

/// Error enumeration for import failures. Malformed row *values* never land
/// here; they are defaulted by the reconciler. Only unreadable input does.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read test export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid test CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Facade turning a CSV export into repository rows. Parsing stays in the
/// file layer; everything behavioral lives in the reconciler.
pub struct CsvTestImporter;

impl CsvTestImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        repository: &mut TestRepository,
        replace: bool,
    ) -> Result<usize, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, repository, replace)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        repository: &mut TestRepository,
        replace: bool,
    ) -> Result<usize, ImportError> {
        let rows = parser::parse_rows(reader)?;
        Ok(reconciler::reconcile(repository, rows, replace))
    }
}
