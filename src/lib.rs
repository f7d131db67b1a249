//! Income-Health: GDP and Mortality Wrangling Library
//!
//! Loads the World Bank GDP extract and the WHO mortality indicator, cleans
//! both, joins them on country code and reshapes the result into a tidy
//! long table with one row per country and year.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
