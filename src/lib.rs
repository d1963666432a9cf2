//! berth - resolves a CMake project's build configuration
//!
//! This crate reads a project's `CMakeLists.txt`, derives its identity,
//! normalizes platform-conditional options, plans the build/install layout
//! and writes the descriptor files (environment scripts, toolchain file,
//! dependency descriptor) a downstream CMake invocation consumes.

pub mod core;
pub mod generator;
pub mod ops;
pub mod util;

pub use crate::core::{
    layout::BuildLayout, metadata::ProjectMetadata, options::OptionSet, settings::Settings,
};

pub use generator::{GenerateReport, GeneratorDescriptor};
pub use util::context::GlobalContext;
