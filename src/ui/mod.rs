//! View models shared by the API and the CLI.

pub mod table;

pub use table::{ResultRow, ResultsTable, TargetLine};
