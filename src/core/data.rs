use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::models::{Acceptability, AllResults, Test, TestResult};

/// A valid numeric result flattened for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
    pub acceptability: Acceptability,
}

pub fn find_test_by_name<'a>(tests: &'a [Test], name: &str) -> Option<&'a Test> {
    tests.iter().find(|test| test.name == name)
}

/// All results for one test in their original order.
pub fn get_results_for_test<'a>(data: &'a AllResults, test_name: &str) -> Vec<&'a TestResult> {
    data.results
        .iter()
        .filter(|result| result.test == test_name)
        .collect()
}

/// Newest first. Stable, so same-day results keep their recorded order.
/// Results with unparseable dates sink to the end.
pub fn sort_results_by_date<'a>(results: &[&'a TestResult]) -> Vec<&'a TestResult> {
    let mut keyed: Vec<(Option<NaiveDate>, &'a TestResult)> = results
        .iter()
        .map(|result| (result.parsed_date().ok(), *result))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed.into_iter().map(|(_, result)| result).collect()
}

/// Distinct `results[].test` values in first-seen order.
pub fn get_unique_test_names(data: &AllResults) -> Vec<String> {
    let mut seen = HashSet::new();
    data.results
        .iter()
        .filter(|result| seen.insert(result.test.as_str()))
        .map(|result| result.test.clone())
        .collect()
}

/// Partitions results by test name, each partition newest first.
pub fn group_results_by_test(data: &AllResults) -> IndexMap<String, Vec<&TestResult>> {
    let mut grouped: IndexMap<String, Vec<&TestResult>> = IndexMap::new();
    for result in &data.results {
        grouped.entry(result.test.clone()).or_default().push(result);
    }
    for results in grouped.values_mut() {
        *results = sort_results_by_date(results);
    }
    grouped
}

/// Valid results for one test, oldest first.
pub fn get_valid_results_with_dates(data: &AllResults, test_name: &str) -> Vec<DatedValue> {
    let mut values: Vec<DatedValue> = data
        .results
        .iter()
        .filter(|result| result.test == test_name)
        .filter_map(|result| {
            let valid = result.result.as_valid()?;
            match result.parsed_date() {
                Ok(date) => Some(DatedValue {
                    date,
                    value: valid.value,
                    acceptability: valid.acceptability,
                }),
                Err(e) => {
                    debug!("Skipping result for {}: {}", test_name, e);
                    None
                }
            }
        })
        .collect();
    values.sort_by_key(|value| value.date);
    values
}

/// Test shown on the main dashboard before the user picks one.
pub fn default_test_name(data: &AllResults) -> Option<String> {
    let names = get_unique_test_names(data);
    names
        .iter()
        .find(|name| name.contains("HBA1c"))
        .or_else(|| names.first())
        .cloned()
}

/// Places shown for result values.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Rounds half up, so `-2.5` becomes `-2`.
pub fn round_to_decimal_places(num: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places as i32);
    (num * factor + 0.5).floor() / factor
}
