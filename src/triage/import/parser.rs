use std::io::Read;

use super::reconciler::RawRecord;

/// Read a CSV export into string-keyed rows, one map per record, keyed by the
/// header row. Unknown columns are carried along untouched; the reconciler
/// decides what to do with them.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut row = RawRecord::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), value.to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}
