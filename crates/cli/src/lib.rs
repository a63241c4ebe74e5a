//! CLI utilities for signkit
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Progress indicators
//! - Tracing subscriber setup

#![warn(missing_docs)]

pub mod logging;
pub mod output;
pub mod progress;
