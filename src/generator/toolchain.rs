//! CMake toolchain file.

use std::collections::BTreeMap;

use crate::core::layout::LogicalPath;
use crate::generator::GenerateContext;

/// File name of the generated toolchain.
pub const TOOLCHAIN_FILE: &str = "berth_toolchain.cmake";

/// Always enabled so IDEs and linters get a compilation database.
const EXPORT_COMPILE_COMMANDS: &str = "CMAKE_EXPORT_COMPILE_COMMANDS";

/// A CMake toolchain file passed with `-DCMAKE_TOOLCHAIN_FILE=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainFile {
    project: Option<String>,
    target: String,
    compiler: Option<String>,
    build_type: String,
    shared: bool,
    fpic: Option<bool>,
    prefix_paths: Vec<LogicalPath>,
    module_paths: Vec<LogicalPath>,
    variables: BTreeMap<String, String>,
}

impl ToolchainFile {
    pub fn new(ctx: &GenerateContext<'_>) -> Self {
        let layout = ctx.layout;

        let mut prefix_paths = vec![layout.generators_dir.clone()];
        prefix_paths.extend(layout.build_config_dirs.iter().cloned());

        let mut variables = ctx.variables.clone();
        if variables.remove(EXPORT_COMPILE_COMMANDS).is_some() {
            tracing::warn!("ignoring user value for {}; it is always ON", EXPORT_COMPILE_COMMANDS);
        }

        ToolchainFile {
            project: ctx.metadata.qualified_name(),
            target: format!("{} {}", ctx.settings.os, ctx.settings.arch),
            compiler: ctx.settings.compiler_identity(),
            build_type: ctx.settings.build_type.clone(),
            shared: ctx.options.shared,
            fpic: ctx.options.fpic,
            prefix_paths,
            module_paths: vec![layout.generators_dir.clone()],
            variables,
        }
    }

    /// User variables set by this toolchain, excluding built-in ones.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# Generated by berth. Do not edit.\n");
        if let Some(project) = &self.project {
            out.push_str(&format!("# Project: {}\n", project));
        }
        out.push_str(&format!("# Target: {}\n", self.target));
        if let Some(compiler) = &self.compiler {
            out.push_str(&format!("# Compiler: {}\n", compiler));
        }
        out.push('\n');

        out.push_str("include_guard()\n\n");

        out.push_str(&format!(
            "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"Build type\" FORCE)\n",
            cmake_escape(&self.build_type)
        ));
        out.push_str(&format!(
            "set({} ON CACHE BOOL \"Export compile_commands.json\" FORCE)\n",
            EXPORT_COMPILE_COMMANDS
        ));
        out.push_str(&format!(
            "set(BUILD_SHARED_LIBS {} CACHE BOOL \"Build shared libraries\")\n",
            on_off(self.shared)
        ));
        if let Some(fpic) = self.fpic {
            out.push_str(&format!(
                "set(CMAKE_POSITION_INDEPENDENT_CODE {} CACHE BOOL \"Position independent code\")\n",
                on_off(fpic)
            ));
        }

        if !self.variables.is_empty() {
            out.push('\n');
            for (name, value) in &self.variables {
                out.push_str(&format!(
                    "set({} \"{}\" CACHE STRING \"Variable {} defined by berth\" FORCE)\n",
                    name,
                    cmake_escape(value),
                    name
                ));
            }
        }

        out.push('\n');
        out.push_str(&list_prepend("CMAKE_PREFIX_PATH", &self.prefix_paths));
        out.push_str(&list_prepend("CMAKE_MODULE_PATH", &self.module_paths));

        out
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

fn list_prepend(var: &str, paths: &[LogicalPath]) -> String {
    let quoted: Vec<String> = paths
        .iter()
        .map(|p| format!("\"{}\"", cmake_escape(p.as_str())))
        .collect();
    format!("list(PREPEND {} {})\n", var, quoted.join(" "))
}

/// Escape a value for a quoted CMake argument.
fn cmake_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Os;
    use crate::generator::tests::Fixture;

    #[test]
    fn test_toolchain_exports_compile_commands() {
        let fixture = Fixture::new("/r", Os::Linux);
        let text = ToolchainFile::new(&fixture.ctx()).render();

        assert!(text.contains("set(CMAKE_EXPORT_COMPILE_COMMANDS ON CACHE BOOL"));
        assert!(text.contains("set(CMAKE_BUILD_TYPE \"Release\""));
        assert!(text.contains("set(BUILD_SHARED_LIBS OFF"));
        assert!(text.contains("set(CMAKE_POSITION_INDEPENDENT_CODE ON"));
        assert!(text.contains("# Project: octo-2.1.0\n"));
        assert!(text.contains("# Compiler: gcc-13\n"));
    }

    #[test]
    fn test_toolchain_windows_has_no_pic() {
        let fixture = Fixture::new("C:/r", Os::Windows);
        let text = ToolchainFile::new(&fixture.ctx()).render();

        assert!(!text.contains("CMAKE_POSITION_INDEPENDENT_CODE"));
        assert!(text.contains("CMAKE_EXPORT_COMPILE_COMMANDS ON"));
    }

    #[test]
    fn test_toolchain_prefix_path_includes_generators_and_config_dirs() {
        let fixture = Fixture::new("/r", Os::Linux);
        let text = ToolchainFile::new(&fixture.ctx()).render();

        assert!(text.contains(
            "list(PREPEND CMAKE_PREFIX_PATH \"/r/builds/Release\" \
             \"/r/install/octo-2.1.0/lib/cmake/octo-2.1.0\" \
             \"/r/install/octo-2.1.0/lib/cmake/flecs\")\n"
        ));
        assert!(text.contains("list(PREPEND CMAKE_MODULE_PATH \"/r/builds/Release\")\n"));
    }

    #[test]
    fn test_toolchain_user_variables_sorted_and_escaped() {
        let mut fixture = Fixture::new("/r", Os::Linux);
        fixture.variables.insert("ZETA".into(), "on".into());
        fixture.variables.insert("ALPHA".into(), "say \"hi\"".into());
        fixture.variables.insert(EXPORT_COMPILE_COMMANDS.into(), "OFF".into());

        let toolchain = ToolchainFile::new(&fixture.ctx());
        assert!(!toolchain.variables().contains_key(EXPORT_COMPILE_COMMANDS));

        let text = toolchain.render();
        let alpha = text.find("set(ALPHA \"say \\\"hi\\\"\"").unwrap();
        let zeta = text.find("set(ZETA \"on\"").unwrap();
        assert!(alpha < zeta);
        assert!(!text.contains("COMPILE_COMMANDS \"OFF\""));
    }

    #[test]
    fn test_cmake_escape() {
        assert_eq!(cmake_escape(r"a\b"), r"a\\b");
        assert_eq!(cmake_escape("${X}"), "\\${X}");
    }
}
