//! Project identity extracted from the build description.
//!
//! The build description is the project's `CMakeLists.txt`. Identity comes
//! from the first `project(<name> VERSION <x.y.z>)` declaration. A document
//! without a recognizable declaration is not an error: the identity is simply
//! absent, and consumers that need it decide what to do.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// File name of the build description in the project root.
pub const DESCRIPTION_FILE: &str = "CMakeLists.txt";

/// Matches `project(<name> VERSION <dotted numeric>)`, across line breaks.
static PROJECT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"project\s*\(\s*(\w+)\s*\bVERSION\s*(\d+(\.\d+)*)")
        .expect("project declaration pattern is valid")
});

/// Name and version of a project. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        ProjectMetadata {
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }

    /// Metadata with neither field known.
    pub fn absent() -> Self {
        ProjectMetadata::default()
    }

    /// Whether both name and version are present.
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.version.is_some()
    }

    /// Fill absent fields from `fallback`. Present fields are never replaced.
    pub fn or_fallback(self, fallback: &ProjectMetadata) -> Self {
        ProjectMetadata {
            name: self.name.or_else(|| fallback.name.clone()),
            version: self.version.or_else(|| fallback.version.clone()),
        }
    }

    /// `<name>-<version>`, when both are present.
    pub fn qualified_name(&self) -> Option<String> {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => Some(format!("{}-{}", name, version)),
            _ => None,
        }
    }
}

/// Extract project metadata from build description text.
///
/// Never fails; any mismatch yields [`ProjectMetadata::absent`].
pub fn extract(document: &str) -> ProjectMetadata {
    let Some(caps) = PROJECT_DECLARATION.captures(document) else {
        tracing::debug!("no project declaration found in build description");
        return ProjectMetadata::absent();
    };

    match (caps.get(1), caps.get(2)) {
        (Some(name), Some(version)) => {
            ProjectMetadata::new(name.as_str().trim(), version.as_str().trim())
        }
        _ => ProjectMetadata::absent(),
    }
}

/// Read and extract metadata from a build description file.
///
/// Unreadable or non-UTF-8 files degrade to absent metadata.
pub fn extract_from_path(path: &Path) -> ProjectMetadata {
    match std::fs::read_to_string(path) {
        Ok(contents) => extract(&contents),
        Err(e) => {
            tracing::debug!(
                "build description {} is unreadable: {}",
                path.display(),
                e
            );
            ProjectMetadata::absent()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_simple_declaration() {
        let meta = extract("cmake_minimum_required(VERSION 3.16)\nproject(octo VERSION 2.1.0)\n");
        assert_eq!(meta, ProjectMetadata::new("octo", "2.1.0"));
    }

    #[test]
    fn test_declaration_pattern_is_shared() {
        let first: *const Regex = &*PROJECT_DECLARATION;
        assert_eq!(extract("project(a VERSION 1)"), ProjectMetadata::new("a", "1"));
        assert_eq!(extract("project(b VERSION 2)"), ProjectMetadata::new("b", "2"));
        assert!(std::ptr::eq(first, &*PROJECT_DECLARATION));
    }

    #[test]
    fn test_extract_across_lines() {
        let doc = r#"
cmake_minimum_required(VERSION 3.20)
project(
    octopus
    VERSION 1.4
    LANGUAGES CXX
)
"#;
        let meta = extract(doc);
        assert_eq!(meta.name.as_deref(), Some("octopus"));
        assert_eq!(meta.version.as_deref(), Some("1.4"));
    }

    #[test]
    fn test_extract_first_declaration_wins() {
        let doc = "project(first VERSION 1.0.0)\nproject(second VERSION 2.0.0)\n";
        assert_eq!(extract(doc), ProjectMetadata::new("first", "1.0.0"));
    }

    #[test]
    fn test_extract_single_component_version() {
        assert_eq!(
            extract("project(tool VERSION 7)"),
            ProjectMetadata::new("tool", "7")
        );
    }

    #[test]
    fn test_extract_missing_version_is_absent() {
        assert_eq!(extract("project(octo LANGUAGES CXX)"), ProjectMetadata::absent());
    }

    #[test]
    fn test_extract_malformed_is_absent() {
        assert_eq!(extract(""), ProjectMetadata::absent());
        assert_eq!(extract("project("), ProjectMetadata::absent());
        assert_eq!(extract("project(octo VERSION x.y)"), ProjectMetadata::absent());
        assert_eq!(extract("\u{0}\u{1}binary"), ProjectMetadata::absent());
    }

    #[test]
    fn test_extract_from_missing_file_is_absent() {
        let tmp = TempDir::new().unwrap();
        let meta = extract_from_path(&tmp.path().join(DESCRIPTION_FILE));
        assert_eq!(meta, ProjectMetadata::absent());
    }

    #[test]
    fn test_extract_from_non_utf8_file_is_absent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DESCRIPTION_FILE);
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert_eq!(extract_from_path(&path), ProjectMetadata::absent());
    }

    #[test]
    fn test_extract_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DESCRIPTION_FILE);
        std::fs::write(&path, "project(octo VERSION 2.1.0)").unwrap();
        assert_eq!(extract_from_path(&path), ProjectMetadata::new("octo", "2.1.0"));
    }

    #[test]
    fn test_or_fallback_only_fills_absent_fields() {
        let fallback = ProjectMetadata::new("fallback", "0.0.1");

        let partial = ProjectMetadata {
            name: Some("octo".into()),
            version: None,
        };
        assert_eq!(
            partial.or_fallback(&fallback),
            ProjectMetadata::new("octo", "0.0.1")
        );

        let full = ProjectMetadata::new("octo", "2.1.0");
        assert_eq!(full.clone().or_fallback(&fallback), full);
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(
            ProjectMetadata::new("octo", "2.1.0").qualified_name().as_deref(),
            Some("octo-2.1.0")
        );
        assert_eq!(ProjectMetadata::absent().qualified_name(), None);
    }
}
