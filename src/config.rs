//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior and helpers to resolve config, data and cache locations.

mod load;
mod schema;

pub use load::{default_cache_dir, default_data_dir, default_state_dir};
pub use schema::*;
