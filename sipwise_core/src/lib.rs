#![forbid(unsafe_code)]

//! Core domain model and BAC estimation for Sipwise.
//!
//! This crate provides:
//! - Domain types (profile, drink and water events, BAC results)
//! - The BAC engine
//! - Gauge and countdown helpers
//! - The session container and hydration signals
//! - Drink-kind catalog, configuration and logging

pub mod types;
pub mod error;
pub mod engine;
pub mod display;
pub mod session;
pub mod catalog;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use engine::{compute_bac, compute_bac_with_thresholds, Thresholds};
pub use display::{gauge_fraction, sober_at, Countdown};
pub use session::{drinking_pattern, Session};
pub use catalog::get_default_catalog;
pub use config::Config;
