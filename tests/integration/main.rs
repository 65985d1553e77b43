//! Integration test harness

mod common;
mod config_tests;
mod crawl_tests;
mod graph_tests;
