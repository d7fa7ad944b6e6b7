//! Utility functions and helpers for the KALE pool client.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and token sanitization.
//! - `retry`: The retry budget and the doubling backoff schedule.

pub mod logging;
pub mod retry;
