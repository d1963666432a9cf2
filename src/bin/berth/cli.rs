//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use berth::core::{Os, ProjectMetadata};
use berth::ops::ResolveOptions;

/// berth - resolve a CMake project's build configuration and emit descriptors
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write environment scripts, toolchain file and dependency descriptor
    Generate(GenerateArgs),

    /// Show the resolved metadata, options and layout without writing anything
    Inspect(InspectArgs),

    /// Remove generated build directories
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Settings and overrides shared by commands that resolve the project.
#[derive(Args, Clone)]
pub struct SelectionArgs {
    /// Build type (Release, Debug, RelWithDebInfo, MinSizeRel)
    #[arg(short = 't', long)]
    pub build_type: Option<String>,

    /// Target operating system (defaults to the host)
    #[arg(long)]
    pub os: Option<Os>,

    /// Target architecture (defaults to the host)
    #[arg(long)]
    pub arch: Option<String>,

    /// Compiler family
    #[arg(long)]
    pub compiler: Option<String>,

    /// Compiler version
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// Root directory for builds/ and install/ (defaults to the project root)
    #[arg(long, env = "BERTH_INSTALL_ROOT")]
    pub install_root: Option<PathBuf>,

    /// Project name to use when CMakeLists.txt declares none
    #[arg(long)]
    pub name: Option<String>,

    /// Project version to use when CMakeLists.txt declares none
    #[arg(long = "project-version")]
    pub project_version: Option<String>,

    /// Build shared libraries
    #[arg(long, conflicts_with = "static_libs")]
    pub shared: bool,

    /// Build static libraries
    #[arg(long = "static")]
    pub static_libs: bool,

    /// Disable position-independent code
    #[arg(long)]
    pub no_fpic: bool,
}

impl SelectionArgs {
    pub fn to_resolve_options(&self) -> ResolveOptions {
        let shared = if self.shared {
            Some(true)
        } else if self.static_libs {
            Some(false)
        } else {
            None
        };

        ResolveOptions {
            build_type: self.build_type.clone(),
            os: self.os.clone(),
            arch: self.arch.clone(),
            compiler: self.compiler.clone(),
            compiler_version: self.compiler_version.clone(),
            install_root: self.install_root.clone(),
            fallback: ProjectMetadata {
                name: self.name.clone(),
                version: self.project_version.clone(),
            },
            shared,
            fpic: self.no_fpic.then_some(false),
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Remove every build type, not just the selected one
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
