//! Project resolution: everything that happens before descriptors are written.
//!
//! Reads the build description and configuration once, then derives metadata,
//! settings, options and layout. Nothing here touches the filesystem beyond
//! reading those inputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{
    extract_from_path, options, BuildLayout, LayoutError, LogicalPath, OptionSet, Os,
    ProjectMetadata, Requirement, Settings,
};
use crate::util::config::{load_config, Config, PackageConfig};
use crate::util::GlobalContext;

/// Caller overrides; each one beats the configuration files.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub build_type: Option<String>,
    pub os: Option<Os>,
    pub arch: Option<String>,
    pub compiler: Option<String>,
    pub compiler_version: Option<String>,

    /// Root for `builds/` and `install/`; relative paths are taken from the project root
    pub install_root: Option<PathBuf>,

    /// Fallback identity when the build description declares none
    pub fallback: ProjectMetadata,

    pub shared: Option<bool>,
    pub fpic: Option<bool>,
}

/// Fully resolved inputs for descriptor generation.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub project_root: PathBuf,
    pub metadata: ProjectMetadata,
    pub settings: Settings,
    pub options: OptionSet,
    pub layout: BuildLayout,
    pub requirements: Vec<Requirement>,
    pub package: PackageConfig,
    pub variables: BTreeMap<String, String>,
}

/// Load configuration for the project containing the context's cwd.
pub fn load_project_config(ctx: &GlobalContext) -> Config {
    load_config(&ctx.config_path(), &ctx.project_config_path())
}

/// Settings from host defaults, then config, then caller overrides.
pub fn resolve_settings(config: &Config, opts: &ResolveOptions) -> Settings {
    let mut settings = Settings::host();
    let cfg = &config.settings;

    if let Some(os) = opts.os.clone().or_else(|| cfg.os.clone()) {
        settings.os = os;
    }
    if let Some(arch) = opts.arch.clone().or_else(|| cfg.arch.clone()) {
        settings.arch = arch;
    }
    settings.compiler = opts.compiler.clone().or_else(|| cfg.compiler.clone());
    settings.compiler_version = opts
        .compiler_version
        .clone()
        .or_else(|| cfg.compiler_version.clone());
    if let Some(build_type) = opts.build_type.clone().or_else(|| cfg.build_type.clone()) {
        settings.build_type = build_type;
    }

    settings
}

/// The install root as a logical path.
pub fn resolve_install_root(
    project_root: &Path,
    config: &Config,
    opts: &ResolveOptions,
) -> LogicalPath {
    let root = match opts
        .install_root
        .as_ref()
        .or(config.layout.install_root.as_ref())
    {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => project_root.join(dir),
        None => project_root.to_path_buf(),
    };
    LogicalPath::from_native(&root)
}

/// Resolve metadata, settings, options and layout for the current project.
pub fn resolve_project(ctx: &GlobalContext, opts: &ResolveOptions) -> Result<Resolution> {
    let config = load_project_config(ctx);
    resolve_with_config(ctx, &config, opts)
}

/// Same as [`resolve_project`] with an already loaded configuration.
pub fn resolve_with_config(
    ctx: &GlobalContext,
    config: &Config,
    opts: &ResolveOptions,
) -> Result<Resolution> {
    let project_root = ctx.project_root();
    let description = ctx.description_path();

    let extracted = extract_from_path(&description);
    if !extracted.is_complete() {
        tracing::info!(
            "no complete project declaration in {}",
            description.display()
        );
    }
    let metadata = extracted
        .or_fallback(&opts.fallback)
        .or_fallback(&config.package.fallback());

    let settings = resolve_settings(config, opts);

    let mut declared = config.options.declared();
    if let Some(shared) = opts.shared {
        declared.shared = shared;
    }
    if let Some(fpic) = opts.fpic {
        declared.fpic = Some(fpic);
    }
    let options = options::resolve(declared, &settings.os);

    let install_root = resolve_install_root(&project_root, config, opts);
    let layout = config
        .layout
        .planner()
        .plan(&metadata, &settings.build_type, &install_root)
        .map_err(|e| {
            let hint = match e {
                LayoutError::MissingMetadata { .. } => format!(
                    "\nhelp: declare `project(<name> VERSION <x.y.z>)` in {}, \
                     set [package] name/version in berth.toml, or pass --name/--project-version",
                    description.display()
                ),
                _ => String::new(),
            };
            anyhow::Error::new(e).context(format!(
                "cannot plan the build layout for {}{}",
                project_root.display(),
                hint
            ))
        })?;

    let requirements = config
        .requirements
        .parse()
        .context("invalid [requirements] in configuration")?;

    tracing::debug!(
        "resolved {} for {} {} ({})",
        metadata.qualified_name().unwrap_or_default(),
        settings.os,
        settings.arch,
        settings.build_type
    );

    Ok(Resolution {
        project_root,
        metadata,
        settings,
        options,
        layout,
        requirements,
        package: config.package.clone(),
        variables: config.toolchain.variables.clone(),
    })
}
