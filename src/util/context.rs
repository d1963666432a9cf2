//! Global context for berth operations.
//!
//! Provides centralized access to the working directory, the global config
//! location and project discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::metadata::{extract_from_path, DESCRIPTION_FILE};
use crate::util::config::{global_config_dir, PROJECT_CONFIG_FILE};

/// Global context containing paths and environment.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global berth data (~/.berth/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".berth"));
        GlobalContext { cwd, home }
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Find the project root, starting from cwd and searching upward.
    ///
    /// The root is the nearest directory holding a `berth.toml`, or a
    /// `CMakeLists.txt` that declares the project. Subdirectory
    /// `CMakeLists.txt` files without a declaration are skipped; if no
    /// declaration is found the outermost `CMakeLists.txt` wins. Falls back
    /// to cwd when there is none at all.
    pub fn project_root(&self) -> PathBuf {
        let mut outermost_description = None;

        for dir in self.cwd.ancestors() {
            if dir.join(PROJECT_CONFIG_FILE).is_file() {
                return dir.to_path_buf();
            }

            let description = dir.join(DESCRIPTION_FILE);
            if description.is_file() {
                if extract_from_path(&description).is_complete() {
                    return dir.to_path_buf();
                }
                outermost_description = Some(dir);
            }
        }

        outermost_description
            .unwrap_or(self.cwd.as_path())
            .to_path_buf()
    }

    /// Path of the build description in the project root.
    pub fn description_path(&self) -> PathBuf {
        self.project_root().join(DESCRIPTION_FILE)
    }

    /// Path of the project recipe in the project root.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_root().join(PROJECT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_project_root_searches_upward() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(DESCRIPTION_FILE), "project(a VERSION 1.0)").unwrap();
        let nested = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested);
        assert_eq!(ctx.project_root(), tmp.path());
        assert_eq!(ctx.description_path(), tmp.path().join(DESCRIPTION_FILE));
    }

    #[test]
    fn test_project_root_skips_nested_descriptions() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(DESCRIPTION_FILE),
            "project(octo VERSION 2.1.0)\nadd_subdirectory(src)\n",
        )
        .unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join(DESCRIPTION_FILE), "add_library(octo octo.cpp)\n").unwrap();

        let ctx = GlobalContext::with_cwd(src);
        assert_eq!(ctx.project_root(), tmp.path());
    }

    #[test]
    fn test_project_root_outermost_description_without_declaration() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(DESCRIPTION_FILE), "project(octo)\n").unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join(DESCRIPTION_FILE), "add_library(octo octo.cpp)\n").unwrap();

        let ctx = GlobalContext::with_cwd(src);
        assert_eq!(ctx.project_root(), tmp.path());
    }

    #[test]
    fn test_project_root_prefers_nearest_recipe() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(DESCRIPTION_FILE), "project(outer VERSION 1.0)").unwrap();
        let inner = tmp.path().join("inner");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(inner.join(PROJECT_CONFIG_FILE), "").unwrap();

        let ctx = GlobalContext::with_cwd(inner.clone());
        assert_eq!(ctx.project_root(), inner);
    }

    #[test]
    fn test_project_root_recipe_only() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PROJECT_CONFIG_FILE), "").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(ctx.project_config_path(), tmp.path().join(PROJECT_CONFIG_FILE));
    }
}
