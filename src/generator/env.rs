//! Build-time and run-time environment scripts.
//!
//! The build environment points CMake at the locally installed config
//! packages. The run environment makes the installed binaries and shared
//! libraries discoverable. Both are sourced by the user or the build tool
//! before invoking CMake or the built programs.

use crate::core::layout::LogicalPath;
use crate::generator::GenerateContext;

const BUILD_ENV_STEM: &str = "berthbuildenv";
const RUN_ENV_STEM: &str = "berthrunenv";

/// Script dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScriptFlavor {
    /// POSIX shell, sourced with `.`
    Sh,
    /// Windows batch, run with `call`
    Bat,
}

impl EnvScriptFlavor {
    fn extension(&self) -> &'static str {
        match self {
            EnvScriptFlavor::Sh => "sh",
            EnvScriptFlavor::Bat => "bat",
        }
    }

    fn path_separator(&self) -> &'static str {
        match self {
            EnvScriptFlavor::Sh => ":",
            EnvScriptFlavor::Bat => ";",
        }
    }

    fn native_path(&self, path: &LogicalPath) -> String {
        match self {
            EnvScriptFlavor::Sh => path.to_string(),
            EnvScriptFlavor::Bat => path.as_str().replace('/', "\\"),
        }
    }
}

/// How a variable is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// Replace the variable
    Define(String),
    /// Prepend paths to a path-list variable, keeping the existing value
    PrependPaths(Vec<LogicalPath>),
}

/// One environment variable assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: EnvValue,
}

impl EnvVar {
    pub fn define(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvVar {
            name: name.into(),
            value: EnvValue::Define(value.into()),
        }
    }

    pub fn prepend(name: impl Into<String>, paths: Vec<LogicalPath>) -> Self {
        EnvVar {
            name: name.into(),
            value: EnvValue::PrependPaths(paths),
        }
    }
}

/// An environment script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvScript {
    file_name: String,
    flavor: EnvScriptFlavor,
    vars: Vec<EnvVar>,
}

impl EnvScript {
    fn new(stem: &str, ctx: &GenerateContext<'_>, vars: Vec<EnvVar>) -> Self {
        let flavor = if ctx.settings.os.uses_batch_scripts() {
            EnvScriptFlavor::Bat
        } else {
            EnvScriptFlavor::Sh
        };
        EnvScript {
            file_name: format!("{}.{}", stem, flavor.extension()),
            flavor,
            vars,
        }
    }

    /// Environment used while configuring and building.
    pub fn build(ctx: &GenerateContext<'_>) -> Self {
        let layout = ctx.layout;
        let vars = vec![
            EnvVar::define("BERTH_BUILD_TYPE", ctx.settings.build_type.clone()),
            EnvVar::define(
                "BERTH_GENERATORS_FOLDER",
                layout.generators_dir.to_string(),
            ),
            EnvVar::prepend("CMAKE_PREFIX_PATH", layout.build_config_dirs.clone()),
        ];
        EnvScript::new(BUILD_ENV_STEM, ctx, vars)
    }

    /// Environment used to run what was built.
    pub fn run(ctx: &GenerateContext<'_>) -> Self {
        let install = &ctx.layout.install_dir;
        let bin = install.join("bin");
        let lib = install.join("lib");

        let vars = match ctx.settings.os.library_path_var() {
            Some(var) => vec![
                EnvVar::prepend("PATH", vec![bin]),
                EnvVar::prepend(var, vec![lib]),
            ],
            // Windows finds DLLs through PATH.
            None => vec![EnvVar::prepend("PATH", vec![bin, lib])],
        };
        EnvScript::new(RUN_ENV_STEM, ctx, vars)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn flavor(&self) -> EnvScriptFlavor {
        self.flavor
    }

    pub fn vars(&self) -> &[EnvVar] {
        &self.vars
    }

    pub fn render(&self) -> String {
        match self.flavor {
            EnvScriptFlavor::Sh => self.render_sh(),
            EnvScriptFlavor::Bat => self.render_bat(),
        }
    }

    fn joined(&self, paths: &[LogicalPath]) -> String {
        paths
            .iter()
            .map(|p| self.flavor.native_path(p))
            .collect::<Vec<_>>()
            .join(self.flavor.path_separator())
    }

    fn render_sh(&self) -> String {
        let mut out = String::from("# Generated by berth. Do not edit.\n");
        for var in &self.vars {
            match &var.value {
                EnvValue::Define(value) => {
                    out.push_str(&format!("export {}=\"{}\"\n", var.name, sh_escape(value)));
                }
                EnvValue::PrependPaths(paths) => {
                    out.push_str(&format!(
                        "export {name}=\"{paths}${{{name}:+:${name}}}\"\n",
                        name = var.name,
                        paths = sh_escape(&self.joined(paths)),
                    ));
                }
            }
        }
        out
    }

    fn render_bat(&self) -> String {
        let mut out = String::from("@echo off\r\nrem Generated by berth. Do not edit.\r\n");
        for var in &self.vars {
            match &var.value {
                EnvValue::Define(value) => {
                    out.push_str(&format!("set \"{}={}\"\r\n", var.name, bat_escape(value)));
                }
                EnvValue::PrependPaths(paths) => {
                    out.push_str(&format!(
                        "set \"{name}={paths};%{name}%\"\r\n",
                        name = var.name,
                        paths = bat_escape(&self.joined(paths)),
                    ));
                }
            }
        }
        out
    }
}

/// Escape a value for a double-quoted POSIX shell string.
fn sh_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn bat_escape(value: &str) -> String {
    value.replace('%', "%%")
}
