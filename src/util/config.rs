//! Configuration file support for berth.
//!
//! berth reads two configuration files:
//! - Global: `~/.berth/config.toml` - User-wide defaults (settings profile)
//! - Project: `berth.toml` next to `CMakeLists.txt` - the project recipe
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::requirements::{parse_requirements, Requirement, RequirementParseError};
use crate::core::{LayoutPlanner, OptionSet, Os, ProjectMetadata};

/// File name of the project recipe.
pub const PROJECT_CONFIG_FILE: &str = "berth.toml";

/// berth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform and build settings
    pub settings: SettingsConfig,

    /// Declared option defaults
    pub options: OptionsConfig,

    /// Layout settings
    pub layout: LayoutConfig,

    /// Fallback project identity and package information
    pub package: PackageConfig,

    /// External requirements
    pub requirements: RequirementsConfig,

    /// Toolchain file settings
    pub toolchain: ToolchainConfig,
}

/// `[settings]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Target operating system (Windows, Linux, Macos, ...)
    pub os: Option<Os>,

    /// Target architecture
    pub arch: Option<String>,

    /// Compiler family
    pub compiler: Option<String>,

    /// Compiler version
    pub compiler_version: Option<String>,

    /// Build type (Release, Debug, ...)
    pub build_type: Option<String>,
}

/// `[options]` section. Unset entries keep the declared defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub shared: Option<bool>,

    #[serde(rename = "fPIC", alias = "fpic")]
    pub fpic: Option<bool>,
}

impl OptionsConfig {
    /// Declared defaults with configured overrides applied.
    pub fn declared(&self) -> OptionSet {
        let defaults = OptionSet::default();
        OptionSet {
            shared: self.shared.unwrap_or(defaults.shared),
            fpic: self.fpic.or(defaults.fpic),
        }
    }
}

/// `[layout]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Root under which `builds/` and `install/` live (default: project root)
    pub install_root: Option<PathBuf>,

    /// Config packages installed next to the project's own config
    pub bundled_config_packages: Option<Vec<String>>,
}

impl LayoutConfig {
    /// Planner configured from this section.
    pub fn planner(&self) -> LayoutPlanner {
        match &self.bundled_config_packages {
            Some(packages) => {
                LayoutPlanner::default().with_bundled_config_packages(packages.iter().cloned())
            }
            None => LayoutPlanner::default(),
        }
    }
}

/// `[package]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Used when the build description declares no name
    pub name: Option<String>,

    /// Used when the build description declares no version
    pub version: Option<String>,

    pub license: Option<String>,

    pub url: Option<String>,

    pub description: Option<String>,
}

impl PackageConfig {
    /// Fallback identity for absent metadata.
    pub fn fallback(&self) -> ProjectMetadata {
        ProjectMetadata {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

/// `[requirements]` section, as `name/version` references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsConfig {
    pub requires: Vec<String>,

    pub test_requires: Vec<String>,

    pub tool_requires: Vec<String>,
}

impl RequirementsConfig {
    pub fn parse(&self) -> Result<Vec<Requirement>, RequirementParseError> {
        parse_requirements(&self.requires, &self.test_requires, &self.tool_requires)
    }

    fn is_empty(&self) -> bool {
        self.requires.is_empty() && self.test_requires.is_empty() && self.tool_requires.is_empty()
    }
}

/// `[toolchain]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Extra CMake cache variables written to the toolchain file
    pub variables: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Settings
        if other.settings.os.is_some() {
            self.settings.os = other.settings.os;
        }
        if other.settings.arch.is_some() {
            self.settings.arch = other.settings.arch;
        }
        if other.settings.compiler.is_some() {
            self.settings.compiler = other.settings.compiler;
        }
        if other.settings.compiler_version.is_some() {
            self.settings.compiler_version = other.settings.compiler_version;
        }
        if other.settings.build_type.is_some() {
            self.settings.build_type = other.settings.build_type;
        }

        // Options
        if other.options.shared.is_some() {
            self.options.shared = other.options.shared;
        }
        if other.options.fpic.is_some() {
            self.options.fpic = other.options.fpic;
        }

        // Layout
        if other.layout.install_root.is_some() {
            self.layout.install_root = other.layout.install_root;
        }
        if other.layout.bundled_config_packages.is_some() {
            self.layout.bundled_config_packages = other.layout.bundled_config_packages;
        }

        // Package
        if other.package.name.is_some() {
            self.package.name = other.package.name;
        }
        if other.package.version.is_some() {
            self.package.version = other.package.version;
        }
        if other.package.license.is_some() {
            self.package.license = other.package.license;
        }
        if other.package.url.is_some() {
            self.package.url = other.package.url;
        }
        if other.package.description.is_some() {
            self.package.description = other.package.description;
        }

        // Requirements are replaced as a whole, never mixed
        if !other.requirements.is_empty() {
            self.requirements = other.requirements;
        }

        // Toolchain variables merge key by key
        self.toolchain.variables.extend(other.toolchain.variables);
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (berth.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global berth config directory (~/.berth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".berth"))
}
