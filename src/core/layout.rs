//! Build and install layout planning.
//!
//! All paths here are logical: `/`-separated and platform-neutral. They are
//! converted to native paths only when something is written to disk.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::metadata::ProjectMetadata;

/// Config packages installed alongside the project's own CMake config.
pub const DEFAULT_BUNDLED_CONFIG_PACKAGES: &[&str] = &["flecs"];

/// A platform-neutral, `/`-separated path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalPath(String);

impl LogicalPath {
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into().replace('\\', "/");
        let trimmed = if raw.len() > 1 {
            raw.trim_end_matches('/').to_string()
        } else {
            raw
        };
        LogicalPath(trimmed)
    }

    /// Logical form of a native path.
    pub fn from_native(path: &Path) -> Self {
        LogicalPath::new(path.to_string_lossy().into_owned())
    }

    /// Append a segment.
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref().trim_matches('/');
        if self.0.is_empty() {
            LogicalPath(segment.to_string())
        } else if self.0.ends_with('/') {
            LogicalPath(format!("{}{}", self.0, segment))
        } else {
            LogicalPath(format!("{}/{}", self.0, segment))
        }
    }

    /// Append every segment of a relative logical path.
    pub fn join_path(&self, other: &LogicalPath) -> Self {
        other
            .segments()
            .fold(self.clone(), |acc, segment| acc.join(segment))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Whether `self` equals `parent` or lies beneath it.
    pub fn starts_with(&self, parent: &LogicalPath) -> bool {
        self.0 == parent.0
            || (self.0.starts_with(&parent.0)
                && (parent.0.ends_with('/') || self.0[parent.0.len()..].starts_with('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to a native path using the host separator.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(self.0.replace('/', std::path::MAIN_SEPARATOR_STR))
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalPath {
    fn from(s: &str) -> Self {
        LogicalPath::new(s)
    }
}

/// Computed structural paths for one project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    /// `<install_root>/builds/<build_type>`
    pub build_dir: LogicalPath,

    /// Where descriptors are written; always inside `build_dir`
    pub generators_dir: LogicalPath,

    /// CMake config directories relative to the package's install tree
    pub package_config_dirs: Vec<LogicalPath>,

    /// The same config directories under the local install tree
    pub build_config_dirs: Vec<LogicalPath>,

    /// `<install_root>/install/<name>-<version>`
    pub install_dir: LogicalPath,
}

/// Reasons a layout cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("project {field} is missing; cannot compute version-qualified paths")]
    MissingMetadata { field: &'static str },

    #[error("build type cannot be empty")]
    EmptyBuildType,

    #[error("build type `{0}` is not a single directory name")]
    InvalidBuildType(String),
}

/// Computes [`BuildLayout`]s.
#[derive(Debug, Clone)]
pub struct LayoutPlanner {
    bundled_config_packages: Vec<String>,
}

impl Default for LayoutPlanner {
    fn default() -> Self {
        LayoutPlanner {
            bundled_config_packages: DEFAULT_BUNDLED_CONFIG_PACKAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl LayoutPlanner {
    /// Use a custom list of bundled config packages.
    pub fn with_bundled_config_packages(
        mut self,
        packages: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.bundled_config_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Plan the layout. Fails if name or version is absent.
    pub fn plan(
        &self,
        metadata: &ProjectMetadata,
        build_type: &str,
        install_root: &LogicalPath,
    ) -> Result<BuildLayout, LayoutError> {
        let name = metadata
            .name
            .as_deref()
            .ok_or(LayoutError::MissingMetadata { field: "name" })?;
        let version = metadata
            .version
            .as_deref()
            .ok_or(LayoutError::MissingMetadata { field: "version" })?;
        let build_dir = build_dir_for(build_type, install_root)?;
        let generators_dir = build_dir.clone();

        let qualified = format!("{}-{}", name, version);
        let cmake_root = LogicalPath::new("lib").join("cmake");

        let mut package_config_dirs = vec![cmake_root.join(&qualified)];
        package_config_dirs.extend(
            self.bundled_config_packages
                .iter()
                .map(|pkg| cmake_root.join(pkg)),
        );

        let install_dir = install_root.join("install").join(&qualified);
        let build_config_dirs = package_config_dirs
            .iter()
            .map(|dir| install_dir.join_path(dir))
            .collect();

        Ok(BuildLayout {
            build_dir,
            generators_dir,
            package_config_dirs,
            build_config_dirs,
            install_dir,
        })
    }
}

/// Check that a build type names exactly one directory under `builds/`.
///
/// Returns the trimmed name.
pub fn validate_build_type(build_type: &str) -> Result<&str, LayoutError> {
    let name = build_type.trim();
    if name.is_empty() {
        return Err(LayoutError::EmptyBuildType);
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(LayoutError::InvalidBuildType(build_type.to_string()));
    }
    Ok(name)
}

/// `<install_root>/builds/<build_type>`; needs no project metadata.
pub fn build_dir_for(
    build_type: &str,
    install_root: &LogicalPath,
) -> Result<LogicalPath, LayoutError> {
    let name = validate_build_type(build_type)?;
    Ok(builds_root(install_root).join(name))
}

/// `<install_root>/builds`, the parent of every build directory.
pub fn builds_root(install_root: &LogicalPath) -> LogicalPath {
    install_root.join("builds")
}

/// Plan a layout with the default bundled config packages.
pub fn plan_layout(
    metadata: &ProjectMetadata,
    build_type: &str,
    install_root: &LogicalPath,
) -> Result<BuildLayout, LayoutError> {
    LayoutPlanner::default().plan(metadata, build_type, install_root)
}
