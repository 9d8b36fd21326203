//! Results table for one test: newest result first, followed by the target
//! ranges the results are judged against.

use std::fmt;

use serde::Serialize;

use crate::core::acceptability::{color_for, NEUTRAL_COLOR};
use crate::core::data::{
    get_results_for_test, round_to_decimal_places, sort_results_by_date, DISPLAY_DECIMAL_PLACES,
};
use crate::error::{LabError, Result};
use crate::models::{AllResults, ResultOutcome, TestResult};

pub const INVALID_STATUS: &str = "Invalid";
pub const INVALID_DISPLAY: &str = "Invalid Result";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub date: String,
    pub display_value: String,
    pub status: String,
    pub status_color: &'static str,
    pub notes: String,
    pub additional_info: String,
}

impl ResultRow {
    fn new(result: &TestResult, units: &str) -> Self {
        let (display_value, status, status_color) = match &result.result {
            ResultOutcome::Valid(valid) => (
                format!(
                    "{} {}",
                    round_to_decimal_places(valid.value, DISPLAY_DECIMAL_PLACES),
                    units
                ),
                valid.acceptability.to_string(),
                color_for(Some(valid.acceptability)),
            ),
            ResultOutcome::Invalid => (
                INVALID_DISPLAY.to_string(),
                INVALID_STATUS.to_string(),
                NEUTRAL_COLOR,
            ),
        };
        Self {
            date: result.date.clone(),
            display_value,
            status,
            status_color,
            notes: result.result_notes.clone(),
            additional_info: result.additional_info.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetLine {
    pub acceptability: String,
    pub color: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsTable {
    pub test_name: String,
    pub description: String,
    pub rows: Vec<ResultRow>,
    pub targets: Vec<TargetLine>,
    pub target_description: String,
}

impl ResultsTable {
    /// Fails with `TestNotFound` when the test is undefined or has no results.
    pub fn build(data: &AllResults, test_name: &str) -> Result<Self> {
        let test = data
            .find_test(test_name)
            .ok_or_else(|| LabError::TestNotFound(test_name.to_string()))?;
        let results = sort_results_by_date(&get_results_for_test(data, test_name));
        if results.is_empty() {
            return Err(LabError::TestNotFound(test_name.to_string()));
        }

        Ok(Self {
            test_name: test.name.clone(),
            description: test.description.clone(),
            rows: results
                .into_iter()
                .map(|result| ResultRow::new(result, &test.units))
                .collect(),
            targets: test
                .target
                .range
                .iter()
                .map(|range| TargetLine {
                    acceptability: range.value.to_string(),
                    color: range.value.color(),
                    description: range.describe(&test.units),
                })
                .collect(),
            target_description: test.target.description.clone(),
        })
    }
}

impl fmt::Display for ResultsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Results", self.test_name)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        writeln!(f)?;
        writeln!(f, "{:<12}  {:<20}  {:<10}  Notes", "Date", "Result", "Status")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<12}  {:<20}  {:<10}  {}",
                row.date, row.display_value, row.status, row.notes
            )?;
        }
        if !self.targets.is_empty() {
            writeln!(f)?;
            writeln!(f, "Target Ranges:")?;
            for target in &self.targets {
                writeln!(f, "  {}: {}", target.acceptability, target.description)?;
            }
        }
        if !self.target_description.is_empty() {
            writeln!(f, "{}", self.target_description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::acceptability::{BAD_COLOR, EXCELLENT_COLOR};
    use serde_json::json;

    fn data() -> AllResults {
        serde_json::from_value(json!({
            "tests": [{
                "name": "HBA1c",
                "description": "Average blood sugar",
                "units": "mmol/mol",
                "target": {
                    "description": "Lower is better",
                    "range": [
                        { "top": 48, "value": "Excellent" },
                        { "bottom": 48, "top": 58, "value": "Acceptable" },
                        { "bottom": 58, "value": "Bad" }
                    ]
                }
            }],
            "results": [
                {
                    "test": "HBA1c", "date": "01 Jan 2024",
                    "result": { "result": 60, "resultValid": true, "resultAcceptability": "Bad" },
                    "resultNotes": "High"
                },
                {
                    "test": "HBA1c", "date": "01 Jun 2024",
                    "result": { "result": 44.5, "resultValid": true, "resultAcceptability": "Excellent" }
                },
                {
                    "test": "HBA1c", "date": "01 Mar 2024",
                    "result": { "resultValid": false },
                    "resultNotes": "Haemolysed",
                    "additionalInfo": "Repeat requested"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_rows_newest_first() {
        let table = ResultsTable::build(&data(), "HBA1c").unwrap();
        let dates: Vec<&str> = table.rows.iter().map(|row| row.date.as_str()).collect();
        assert_eq!(dates, vec!["01 Jun 2024", "01 Mar 2024", "01 Jan 2024"]);

        assert_eq!(table.rows[0].display_value, "44.5 mmol/mol");
        assert_eq!(table.rows[0].status_color, EXCELLENT_COLOR);
        assert_eq!(table.rows[1].display_value, INVALID_DISPLAY);
        assert_eq!(table.rows[1].status, INVALID_STATUS);
        assert_eq!(table.rows[1].status_color, NEUTRAL_COLOR);
        assert_eq!(table.rows[1].additional_info, "Repeat requested");
        assert_eq!(table.rows[2].display_value, "60 mmol/mol");
        assert_eq!(table.rows[2].status_color, BAD_COLOR);
    }

    #[test]
    fn test_display_value_is_rounded() {
        let mut data = data();
        if let ResultOutcome::Valid(valid) = &mut data.results[1].result {
            valid.value = 44.5678;
        }
        let table = ResultsTable::build(&data, "HBA1c").unwrap();
        assert_eq!(table.rows[0].display_value, "44.57 mmol/mol");
    }

    #[test]
    fn test_target_lines() {
        let table = ResultsTable::build(&data(), "HBA1c").unwrap();
        let lines: Vec<&str> = table.targets.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(
            lines,
            vec!["Below 48 mmol/mol", "48 to 58 mmol/mol", "Above 58 mmol/mol"]
        );
        assert_eq!(table.target_description, "Lower is better");
    }

    #[test]
    fn test_unknown_test() {
        assert!(matches!(
            ResultsTable::build(&data(), "Ferritin"),
            Err(LabError::TestNotFound(name)) if name == "Ferritin"
        ));
    }

    #[test]
    fn test_display() {
        let rendered = ResultsTable::build(&data(), "HBA1c").unwrap().to_string();
        assert!(rendered.starts_with("HBA1c Results\n"));
        assert!(rendered.contains("Target Ranges:"));
        assert!(rendered.contains("Bad: Above 58 mmol/mol"));
    }
}
