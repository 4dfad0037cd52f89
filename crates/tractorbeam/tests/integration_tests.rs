//! Integration tests for the Tractorbeam SDK
//!
//! This is the top-level integration test harness that Cargo discovers.
//! Test modules are organized in the integration/ subdirectory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

#[path = "integration/token_tests.rs"]
mod token_tests;

#[path = "integration/query_tests.rs"]
mod query_tests;

#[path = "integration/connections_tests.rs"]
mod connections_tests;
