//! Common types, traits, and error definitions for track_planner
//!
//! This module provides the foundational building blocks shared by the
//! map, vehicle and trajectory modules.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
