use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::dates;
use crate::error::Result;

/// Qualitative classification of a result against its target ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Acceptability {
    Excellent,
    Acceptable,
    Bad,
}

impl Acceptability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acceptability::Excellent => "Excellent",
            Acceptability::Acceptable => "Acceptable",
            Acceptability::Bad => "Bad",
        }
    }
}

impl fmt::Display for Acceptability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecimenType {
    Blood,
    Serum,
    Urine,
    #[serde(other)]
    Other,
}

impl Default for SpecimenType {
    fn default() -> Self {
        SpecimenType::Other
    }
}

/// An open or closed interval on the value axis. Only `top` means "below top",
/// only `bottom` means "above bottom".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    pub value: Acceptability,
}

impl TargetRange {
    /// Human readable form used in the target list under a results table.
    pub fn describe(&self, units: &str) -> String {
        match (self.bottom, self.top) {
            (Some(bottom), Some(top)) => format!("{} to {} {}", bottom, top, units),
            (Some(bottom), None) => format!("Above {} {}", bottom, units),
            (None, Some(top)) => format!("Below {} {}", top, units),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub range: Vec<TargetRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub specimen_type: SpecimenType,
    #[serde(default)]
    pub target: Target,
}

/// Bounds reported with a censored result, e.g. `>12` carries `bottom: 12`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidResult {
    pub value: f64,
    pub range: Option<ResultRange>,
    pub acceptability: Acceptability,
}

/// Outcome of a single test run. On the wire the variants are discriminated by
/// the `resultValid` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOutcome", into = "RawOutcome")]
pub enum ResultOutcome {
    Valid(ValidResult),
    Invalid,
}

impl ResultOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ResultOutcome::Valid(_))
    }

    pub fn as_valid(&self) -> Option<&ValidResult> {
        match self {
            ResultOutcome::Valid(valid) => Some(valid),
            ResultOutcome::Invalid => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutcome {
    result_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_range: Option<ResultRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_acceptability: Option<Acceptability>,
}

impl TryFrom<RawOutcome> for ResultOutcome {
    type Error = String;

    fn try_from(raw: RawOutcome) -> std::result::Result<Self, Self::Error> {
        if !raw.result_valid {
            return Ok(ResultOutcome::Invalid);
        }
        let value = raw
            .result
            .ok_or_else(|| "valid result is missing its numeric `result`".to_string())?;
        Ok(ResultOutcome::Valid(ValidResult {
            value,
            range: raw.result_range,
            // Unlabelled valid results are treated as out of range.
            acceptability: raw.result_acceptability.unwrap_or(Acceptability::Bad),
        }))
    }
}

impl From<ResultOutcome> for RawOutcome {
    fn from(outcome: ResultOutcome) -> Self {
        match outcome {
            ResultOutcome::Valid(valid) => RawOutcome {
                result_valid: true,
                result: Some(valid.value),
                result_range: valid.range,
                result_acceptability: Some(valid.acceptability),
            },
            ResultOutcome::Invalid => RawOutcome {
                result_valid: false,
                result: None,
                result_range: None,
                result_acceptability: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// References `Test::name`.
    pub test: String,
    /// Literal `dd MMM yyyy` date as recorded in the data files.
    pub date: String,
    pub result: ResultOutcome,
    #[serde(default)]
    pub result_notes: String,
    #[serde(default)]
    pub additional_info: String,
}

impl TestResult {
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        dates::parse_date(&self.date)
    }
}

/// The whole dataset. Replaced wholesale on reload, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllResults {
    #[serde(default)]
    pub tests: Vec<Test>,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

impl AllResults {
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty() && self.results.is_empty()
    }

    /// Appends another file's records. No de-duplication.
    pub fn merge(&mut self, other: AllResults) {
        self.tests.extend(other.tests);
        self.results.extend(other.results);
    }

    pub fn find_test(&self, name: &str) -> Option<&Test> {
        self.tests.iter().find(|test| test.name == name)
    }

    /// Drops results whose date does not parse and returns how many were removed.
    pub fn retain_parseable_dates(&mut self) -> usize {
        let before = self.results.len();
        self.results.retain(|result| result.parsed_date().is_ok());
        before - self.results.len()
    }
}
