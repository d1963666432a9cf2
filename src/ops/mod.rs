//! High-level operations.
//!
//! This module contains the implementation of berth commands.

pub mod berth_generate;
pub mod resolve;

pub use berth_generate::{generate, generate_resolved, GenerateResult};
pub use resolve::{resolve_project, Resolution, ResolveOptions};
