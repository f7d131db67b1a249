//! Report module - charts, terminal summaries and the JSON run report

pub mod charts;
pub mod run_report;
pub mod summary;

pub use charts::*;
pub use run_report::*;
pub use summary::*;
