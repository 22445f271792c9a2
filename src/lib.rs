//! Terminal dashboard over a customer-support interaction dataset: load a CSV,
//! filter it by sex, product, age decade and year, and chart the aggregates.

pub mod aggregator;
pub mod app;
pub mod config;
pub mod csv_reader;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod report;
pub mod terminal;
pub mod ui;
