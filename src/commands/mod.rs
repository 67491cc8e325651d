//! Command implementations for the CLI
//!
//! - start: Start the HTTP server
//! - stop: Stop a running instance
//! - reload: Reload the district price table
//! - estimate: One-shot price estimate
//! - districts: List the district price table
//! - test: Test configuration and price table
//! - config: Configuration display and validation

pub mod config;
pub mod districts;
pub mod estimate;
pub mod reload;
pub mod start;
pub mod stop;
