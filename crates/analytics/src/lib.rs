//! # Equity Lens Analytics Engine
//!
//! This crate computes the diagnostic metrics reported for a single equity:
//! Sharpe ratio, market beta, Piotroski F-Score and Altman Z-Score.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It depends only on
//!   `core-types` and never fetches data itself.
//! - **Stateless Calculation:** The `MetricsEngine` takes already-fetched price series and
//!   financial statements and returns one rounded number per metric, or an `AnalyticsError`.
//!
//! ## Public API
//!
//! - `MetricsEngine`: The struct that contains the four metric calculations.
//! - `AnalysisRecord`: The aggregate of the four metrics for one symbol.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::AnalysisRecord;
