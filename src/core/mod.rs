//! Core data structures for berth.
//!
//! This module contains the resolution steps that run before any descriptor
//! is written:
//! - Project metadata extraction from the build description
//! - Platform-conditional option normalization
//! - Build/install layout planning
//! - Settings and declared requirements passed through to the descriptors

pub mod layout;
pub mod metadata;
pub mod options;
pub mod requirements;
pub mod settings;

pub use layout::{
    build_dir_for, builds_root, plan_layout, validate_build_type, BuildLayout, LayoutError,
    LayoutPlanner, LogicalPath,
};
pub use metadata::{extract, extract_from_path, ProjectMetadata, DESCRIPTION_FILE};
pub use options::{resolve, OptionSet};
pub use requirements::{Requirement, RequirementKind};
pub use settings::{Os, Settings};
