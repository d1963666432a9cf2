//! Dependency descriptor.
//!
//! One JSON document describing every declared external requirement together
//! with the settings and options they must be resolved for. The external
//! package manager reads it; berth never resolves anything itself.

use serde::Serialize;

use crate::core::layout::LogicalPath;
use crate::core::{OptionSet, ProjectMetadata, Requirement, Settings};
use crate::generator::GenerateContext;

/// File name of the dependency descriptor.
pub const DEPS_FILE: &str = "berth_deps.json";

/// Bumped whenever the document layout changes incompatibly.
pub const DEPS_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    pub format_version: u32,
    pub project: ProjectMetadata,
    pub settings: Settings,
    pub options: OptionSet,
    pub requires: Vec<Requirement>,
    /// Where consumers of this package find its CMake config
    pub package_config_dirs: Vec<LogicalPath>,
    /// How consumers locate this package; config files only, no find modules
    pub cmake_find_mode: &'static str,
}

impl DependencyManifest {
    pub fn new(ctx: &GenerateContext<'_>) -> Self {
        DependencyManifest {
            format_version: DEPS_FORMAT_VERSION,
            project: ctx.metadata.clone(),
            settings: ctx.settings.clone(),
            options: *ctx.options,
            requires: ctx.requirements.to_vec(),
            package_config_dirs: ctx.layout.package_config_dirs.clone(),
            cmake_find_mode: "none",
        }
    }

    pub fn render(&self) -> String {
        match serde_json::to_string_pretty(self) {
            Ok(mut json) => {
                json.push('\n');
                json
            }
            // Every field serializes infallibly; keep the file well-formed regardless.
            Err(e) => {
                tracing::warn!("failed to serialize dependency descriptor: {}", e);
                "{}\n".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Os;
    use crate::generator::tests::Fixture;

    #[test]
    fn test_deps_lists_every_requirement() {
        let fixture = Fixture::new("/r", Os::Linux);
        let text = DependencyManifest::new(&fixture.ctx()).render();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        let requires = json["requires"].as_array().unwrap();
        assert_eq!(requires.len(), 3);
        assert_eq!(requires[0]["name"], "boost");
        assert_eq!(requires[0]["version"], "1.83.0");
        assert_eq!(requires[0]["kind"], "host");
        assert_eq!(requires[1]["kind"], "test");
        assert_eq!(requires[2]["kind"], "tool");

        assert_eq!(json["project"]["name"], "octo");
        assert_eq!(json["options"]["fPIC"], true);
        assert_eq!(json["settings"]["os"], "Linux");
        assert_eq!(json["package_config_dirs"][0], "lib/cmake/octo-2.1.0");
        assert_eq!(json["cmake_find_mode"], "none");
    }

    #[test]
    fn test_deps_windows_omits_fpic() {
        let fixture = Fixture::new("C:/r", Os::Windows);
        let text = DependencyManifest::new(&fixture.ctx()).render();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert!(json["options"].get("fPIC").is_none());
        assert_eq!(json["options"]["shared"], false);
    }
}
