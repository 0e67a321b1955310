//! Integration tests for Catalog-Harvest
//!
//! These tests use wiremock to stand in for the catalog API and exercise
//! the fetcher and full harvest runs end-to-end.

mod common;
mod fetcher_tests;
mod harvest_tests;
