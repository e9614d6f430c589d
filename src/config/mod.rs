//! Configuration for harvesting runs
//!
//! This module provides the `HarvestConfig` struct and its type-safe builder
//! with validation and defaults taken from `utils::constants`.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{HarvestConfigBuilder, WithDateWindow, default_date_window, normalize_proxy};
pub use types::HarvestConfig;
