//! Renderable series for single-test and comparison charts.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::core::data::{get_valid_results_with_dates, DatedValue};
use crate::core::dates::{format_date, parse_input_date, timestamp_millis};
use crate::error::{LabError, Result};
use crate::models::{Acceptability, AllResults, TargetRange};

/// Line colors for comparison charts, cycled by test index.
pub const SERIES_COLORS: [&str; 7] = [
    "#4f46e5", // Indigo
    "#0ea5e9", // Sky
    "#059669", // Emerald
    "#d946ef", // Fuchsia
    "#f97316", // Orange
    "#f59e0b", // Amber
    "#84cc16", // Lime
];

const DOMAIN_LOWER_PADDING: f64 = 0.9;
const DOMAIN_UPPER_PADDING: f64 = 1.1;

/// Inclusive date window shared by the charts of a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

/// Y-axis domain covering both the data and every finite target bound, padded
/// 10% on each side. A bound missing from a range contributes nothing.
pub fn compute_domain(values: &[f64], ranges: &[TargetRange]) -> Option<AxisDomain> {
    let data_min = values.iter().copied().reduce(f64::min)?;
    let data_max = values.iter().copied().reduce(f64::max)?;

    let range_min = ranges
        .iter()
        .filter_map(|range| range.bottom)
        .fold(data_min, f64::min);
    let range_max = ranges
        .iter()
        .filter_map(|range| range.top)
        .fold(data_max, f64::max);

    Some(AxisDomain {
        min: range_min * DOMAIN_LOWER_PADDING,
        max: range_max * DOMAIN_UPPER_PADDING,
    })
}

/// Shaded band for one target range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRegion {
    pub bottom: f64,
    pub top: f64,
    pub acceptability: Acceptability,
    pub fill: String,
}

/// One region per target range, open sides clipped to the domain.
pub fn target_regions(ranges: &[TargetRange], domain: AxisDomain) -> Vec<RangeRegion> {
    ranges
        .iter()
        .map(|range| RangeRegion {
            bottom: range.bottom.unwrap_or(domain.min),
            top: range.top.unwrap_or(domain.max),
            acceptability: range.value,
            fill: range.value.background_color(),
        })
        .collect()
}

fn window_filter(values: Vec<DatedValue>, window: Option<DateWindow>) -> Vec<DatedValue> {
    match window {
        Some(window) => values.into_iter().filter(|v| window.contains(v.date)).collect(),
        None => values,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub timestamp: i64,
    pub value: f64,
    pub acceptability: Acceptability,
    pub color: &'static str,
}

impl From<&DatedValue> for SeriesPoint {
    fn from(value: &DatedValue) -> Self {
        Self {
            date: value.date,
            label: format_date(value.date),
            timestamp: timestamp_millis(value.date),
            value: value.value,
            acceptability: value.acceptability,
            color: value.acceptability.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSeries {
    pub test_name: String,
    pub description: String,
    pub target_description: String,
    pub units: String,
    pub points: Vec<SeriesPoint>,
    pub domain: AxisDomain,
    pub regions: Vec<RangeRegion>,
}

/// Chart data for one test, or `None` when nothing valid falls in the window.
/// A test missing from `tests` still charts, without units or target bands.
pub fn build_single_series(
    data: &AllResults,
    test_name: &str,
    window: Option<DateWindow>,
) -> Option<SingleSeries> {
    let values = window_filter(get_valid_results_with_dates(data, test_name), window);
    if values.is_empty() {
        return None;
    }

    let test = data.find_test(test_name);
    let ranges: &[TargetRange] = test.map(|t| t.target.range.as_slice()).unwrap_or(&[]);
    let raw: Vec<f64> = values.iter().map(|v| v.value).collect();
    let domain = compute_domain(&raw, ranges)?;

    Some(SingleSeries {
        test_name: test_name.to_string(),
        description: test.map(|t| t.description.clone()).unwrap_or_default(),
        target_description: test.map(|t| t.target.description.clone()).unwrap_or_default(),
        units: test.map(|t| t.units.clone()).unwrap_or_default(),
        points: values.iter().map(SeriesPoint::from).collect(),
        domain,
        regions: target_regions(ranges, domain),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
}

/// Y axis for one test of a comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAxis {
    pub index: usize,
    pub test_name: String,
    pub units: String,
    pub color: &'static str,
    pub side: AxisSide,
    pub domain: AxisDomain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointValue {
    pub value: f64,
    pub acceptability: Acceptability,
}

/// One date on the combined axis. `values[i]` belongs to axis `i`; `None`
/// means no point on that date, not zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub timestamp: i64,
    pub values: Vec<Option<PointValue>>,
}

impl Serialize for CombinedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("date", &format_date(self.date))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        for (index, value) in self.values.iter().enumerate() {
            if let Some(point) = value {
                map.serialize_entry(&format!("value{}", index), &point.value)?;
                map.serialize_entry(&format!("acceptability{}", index), &point.acceptability)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSeries {
    pub axes: Vec<SeriesAxis>,
    pub points: Vec<CombinedPoint>,
    /// Millisecond bounds of the x axis: the window when given, else the data.
    pub x_domain: (i64, i64),
}

/// Comparison chart data over a merged date axis. Tests with no valid results
/// in the window are left out; `None` when none remain.
pub fn build_multi_series(
    data: &AllResults,
    test_names: &[String],
    window: Option<DateWindow>,
) -> Option<MultiSeries> {
    let series: Vec<(&String, Vec<DatedValue>)> = test_names
        .iter()
        .map(|name| (name, window_filter(get_valid_results_with_dates(data, name), window)))
        .filter(|(_, values)| !values.is_empty())
        .collect();
    if series.is_empty() {
        return None;
    }

    let mut axes = Vec::with_capacity(series.len());
    let mut by_date: Vec<BTreeMap<NaiveDate, PointValue>> = Vec::with_capacity(series.len());
    let mut all_dates = BTreeSet::new();

    for (index, (name, values)) in series.iter().enumerate() {
        let test = data.find_test(name);
        let ranges: &[TargetRange] = test.map(|t| t.target.range.as_slice()).unwrap_or(&[]);
        let raw: Vec<f64> = values.iter().map(|v| v.value).collect();
        let domain = compute_domain(&raw, ranges)?;

        axes.push(SeriesAxis {
            index,
            test_name: name.to_string(),
            units: test.map(|t| t.units.clone()).unwrap_or_default(),
            color: SERIES_COLORS[index % SERIES_COLORS.len()],
            side: if index % 2 == 0 { AxisSide::Left } else { AxisSide::Right },
            domain,
        });

        // Ascending input, so the last result of a day wins.
        let points: BTreeMap<NaiveDate, PointValue> = values
            .iter()
            .map(|v| (v.date, PointValue { value: v.value, acceptability: v.acceptability }))
            .collect();
        all_dates.extend(points.keys().copied());
        by_date.push(points);
    }

    let points: Vec<CombinedPoint> = all_dates
        .into_iter()
        .map(|date| CombinedPoint {
            date,
            timestamp: timestamp_millis(date),
            values: by_date.iter().map(|points| points.get(&date).copied()).collect(),
        })
        .collect();

    let x_domain = match window {
        Some(window) => (timestamp_millis(window.start), timestamp_millis(window.end)),
        None => (
            points.first().map(|p| p.timestamp).unwrap_or_default(),
            points.last().map(|p| p.timestamp).unwrap_or_default(),
        ),
    };

    Some(MultiSeries { axes, points, x_domain })
}

/// Earliest and latest valid result dates across the given tests. Seeds the
/// dashboard's date range control.
pub fn shared_date_range(data: &AllResults, test_names: &[String]) -> Option<DateWindow> {
    let dates: Vec<NaiveDate> = test_names
        .iter()
        .flat_map(|name| get_valid_results_with_dates(data, name))
        .map(|value| value.date)
        .collect();
    let start = dates.iter().min()?;
    let end = dates.iter().max()?;
    Some(DateWindow::new(*start, *end))
}

/// Resolves an optional start/end pair, as typed into a date input or in
/// `dd MMM yyyy` form. A missing side falls back to the data's own range for
/// the given tests. `None` when neither side is given.
///
/// Only a caller-supplied pair can be inverted. A filled-in side that would
/// land before the given one collapses the window onto the given date, which
/// selects no points instead of failing.
pub fn resolve_window(
    data: &AllResults,
    test_names: &[String],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateWindow>> {
    let start = start.filter(|s| !s.is_empty()).map(parse_input_date).transpose()?;
    let end = end.filter(|s| !s.is_empty()).map(parse_input_date).transpose()?;

    let window = match (start, end) {
        (None, None) => return Ok(None),
        (Some(start), Some(end)) if start > end => {
            return Err(LabError::InvalidRequest(format!(
                "start date {} is after end date {}",
                format_date(start),
                format_date(end)
            )));
        }
        (Some(start), Some(end)) => DateWindow::new(start, end),
        (Some(start), None) => {
            let end = shared_date_range(data, test_names).map_or(start, |span| span.end.max(start));
            DateWindow::new(start, end)
        }
        (None, Some(end)) => {
            let start = shared_date_range(data, test_names).map_or(end, |span| span.start.min(end));
            DateWindow::new(start, end)
        }
    };
    Ok(Some(window))
}
