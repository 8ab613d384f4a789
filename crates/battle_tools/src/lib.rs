//! # Battle Development Tools
//!
//! Command-line tools for development:
//! - Scenario runner (one battle, JSON report)
//! - Batch balance runs over many seeds
//! - Pre-battle estimates
//! - Data validators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod estimate;
pub mod scenario;
pub mod validate;

pub use error::ToolError;
