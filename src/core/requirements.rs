//! Declared external requirements.
//!
//! Requirements are recorded and handed to the external package manager
//! through the dependency descriptor. Nothing here resolves or fetches them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The context a requirement is needed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Linked into the project
    Host,
    /// Only needed to build and run tests
    Test,
    /// A tool executed during the build
    Tool,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::Host => "host",
            RequirementKind::Test => "test",
            RequirementKind::Tool => "tool",
        }
    }
}

/// A `name/version` reference to an external package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub version: String,
    pub kind: RequirementKind,
}

impl Requirement {
    /// Parse a `name/version` reference with the given kind.
    pub fn parse(reference: &str, kind: RequirementKind) -> Result<Self, RequirementParseError> {
        let reference = reference.trim();
        let (name, version) = reference
            .split_once('/')
            .ok_or_else(|| RequirementParseError::MissingVersion(reference.to_string()))?;

        let name = name.trim();
        let version = version.trim();

        if name.is_empty() {
            return Err(RequirementParseError::MissingName(reference.to_string()));
        }
        if version.is_empty() {
            return Err(RequirementParseError::MissingVersion(reference.to_string()));
        }
        if version.contains('/') {
            return Err(RequirementParseError::Malformed(reference.to_string()));
        }

        Ok(Requirement {
            name: name.to_string(),
            version: version.to_string(),
            kind,
        })
    }

    /// The reference form, `name/version`.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.name, self.version, self.kind.as_str())
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s, RequirementKind::Host)
    }
}

/// Error parsing a requirement reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementParseError {
    #[error("requirement `{0}` has no package name")]
    MissingName(String),

    #[error("requirement `{0}` has no version; expected `name/version`")]
    MissingVersion(String),

    #[error("malformed requirement `{0}`; expected `name/version`")]
    Malformed(String),
}

/// Parse lists of references into requirements, in host, test, tool order.
pub fn parse_requirements(
    requires: &[String],
    test_requires: &[String],
    tool_requires: &[String],
) -> Result<Vec<Requirement>, RequirementParseError> {
    let groups = [
        (requires, RequirementKind::Host),
        (test_requires, RequirementKind::Test),
        (tool_requires, RequirementKind::Tool),
    ];

    groups
        .iter()
        .flat_map(|(refs, kind)| refs.iter().map(move |r| Requirement::parse(r, *kind)))
        .collect()
}
