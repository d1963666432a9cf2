//! Platform and build settings supplied by the invoking environment.
//!
//! These values are passed through to the generated descriptors untouched.
//! The only one interpreted here is the operating system, and only to decide
//! whether position-independent code is a meaningful option.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default build type when none is configured.
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Target operating system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    FreeBsd,
    Android,
    Ios,
    /// Any other OS name, kept verbatim.
    Other(String),
}

impl Os {
    /// Detect the host operating system.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            "macos" => Os::Macos,
            "freebsd" => Os::FreeBsd,
            "android" => Os::Android,
            "ios" => Os::Ios,
            other => Os::Other(other.to_string()),
        }
    }

    /// Whether this platform belongs to the class where `fPIC` has no meaning.
    pub fn pic_is_meaningless(&self) -> bool {
        matches!(self, Os::Windows)
    }

    /// Whether environment scripts for this platform are batch files.
    pub fn uses_batch_scripts(&self) -> bool {
        matches!(self, Os::Windows)
    }

    /// Name of the dynamic loader search path variable, if the platform has one
    /// distinct from `PATH`.
    pub fn library_path_var(&self) -> Option<&'static str> {
        match self {
            Os::Windows => None,
            Os::Macos | Os::Ios => Some("DYLD_LIBRARY_PATH"),
            _ => Some("LD_LIBRARY_PATH"),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Os::Windows => "Windows",
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::FreeBsd => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
            Os::Other(name) => name.as_str(),
        }
    }
}

impl Default for Os {
    fn default() -> Self {
        Os::host()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an OS name is empty.
#[derive(Debug, Clone, Error)]
#[error("operating system name cannot be empty")]
pub struct OsParseError;

impl FromStr for Os {
    type Err = OsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OsParseError);
        }

        Ok(match trimmed.to_lowercase().as_str() {
            "windows" | "win32" | "win64" => Os::Windows,
            "linux" => Os::Linux,
            "macos" | "darwin" | "osx" => Os::Macos,
            "freebsd" => Os::FreeBsd,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Other(trimmed.to_string()),
        })
    }
}

impl Serialize for Os {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Os {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Settings describing the configuration being generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Target operating system
    pub os: Os,

    /// Target architecture (x86_64, armv8, ...)
    pub arch: String,

    /// Compiler family (gcc, clang, msvc, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Compiler version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_version: Option<String>,

    /// Build configuration name (Release, Debug, ...)
    pub build_type: String,
}

impl Settings {
    /// Settings for the host machine with the default build type.
    pub fn host() -> Self {
        Settings {
            os: Os::host(),
            arch: std::env::consts::ARCH.to_string(),
            compiler: None,
            compiler_version: None,
            build_type: DEFAULT_BUILD_TYPE.to_string(),
        }
    }

    /// Compiler identity as `family-version`, or just the family.
    pub fn compiler_identity(&self) -> Option<String> {
        match (&self.compiler, &self.compiler_version) {
            (Some(c), Some(v)) => Some(format!("{}-{}", c, v)),
            (Some(c), None) => Some(c.clone()),
            _ => None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::host()
    }
}
