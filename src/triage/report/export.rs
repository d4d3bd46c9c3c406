use crate::triage::catalog::FactorCatalog;
use crate::triage::domain::TestRecord;

/// Write the ranked backlog as CSV. Column order is part of the export
/// contract: Rank, Priority, Ticket ID, Section, Test Name, Description,
/// yes/no question columns, Total Score (100-point), Raw Score, one column
/// per factor display name, Test ID. Rank follows the order of `tests`, so
/// callers pass the sorted view.
pub fn to_csv(tests: &[TestRecord], catalog: &FactorCatalog) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let question_columns: Vec<String> = tests
        .first()
        .map(|test| test.yes_no_answers.keys().cloned().collect())
        .unwrap_or_default();

    let mut header: Vec<String> = [
        "Rank",
        "Priority",
        "Ticket ID",
        "Section",
        "Test Name",
        "Description",
    ]
    .iter()
    .map(|column| column.to_string())
    .collect();
    header.extend(
        question_columns
            .iter()
            .map(|question| format!("Question: {question}")),
    );
    header.push("Total Score (100-point)".to_string());
    header.push("Raw Score".to_string());
    header.extend(
        catalog
            .factors()
            .iter()
            .map(|definition| definition.display_name.clone()),
    );
    header.push("Test ID".to_string());
    writer.write_record(&header)?;

    for (index, test) in tests.iter().enumerate() {
        let mut row: Vec<String> = vec![
            (index + 1).to_string(),
            test.priority.label().to_string(),
            if test.ticket_id.is_empty() {
                "N/A".to_string()
            } else {
                test.ticket_id.clone()
            },
            test.section.clone(),
            test.name.clone(),
            clean_description(&test.description),
        ];
        for question in &question_columns {
            let answer = match test.yes_no_answers.get(question) {
                Some(true) => "Yes",
                Some(false) => "No",
                None => "",
            };
            row.push(answer.to_string());
        }
        row.push(format!("{:.1}", test.total_score));
        row.push(test.raw_score.to_string());
        for definition in catalog.factors() {
            let score = test
                .scores
                .get(&definition.key)
                .map(|score| score.to_string())
                .unwrap_or_else(|| "0".to_string());
            row.push(score);
        }
        row.push(test.id.as_str().to_string());
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.error().to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Upstream numeric tooling occasionally leaks the literal "nan" into text
/// fields; never export it.
fn clean_description(description: &str) -> String {
    if description.eq_ignore_ascii_case("nan") {
        String::new()
    } else {
        description.to_string()
    }
}
