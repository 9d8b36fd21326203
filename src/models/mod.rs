//! Data model for lab results and dashboard panels

pub mod dashboard;
pub mod lab;

pub use dashboard::{GraphConfig, GraphType};
pub use lab::{
    Acceptability, AllResults, ResultOutcome, ResultRange, SpecimenType, Target, TargetRange, Test,
    TestResult, ValidResult,
};
