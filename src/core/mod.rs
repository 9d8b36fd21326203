//! Core lab data logic: dates, aggregation, categories, colors, charts and
//! the custom dashboard layout.

pub mod acceptability;
pub mod categories;
pub mod charts;
pub mod data;
pub mod dates;
pub mod layout;
