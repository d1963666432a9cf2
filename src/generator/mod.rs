//! Descriptor generation.
//!
//! Turns resolved metadata, options and layout into the files a downstream
//! CMake invocation consumes: environment scripts, a toolchain file and a
//! dependency descriptor. Descriptors are independent of each other, so they
//! are rendered separately and written in parallel, each one atomically.

pub mod deps;
pub mod env;
pub mod toolchain;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;

use crate::core::{BuildLayout, OptionSet, ProjectMetadata, Requirement, Settings};
use crate::util::fs::{ensure_dir, write_atomic, WriteStatus};

pub use deps::DependencyManifest;
pub use env::{EnvScript, EnvScriptFlavor};
pub use toolchain::ToolchainFile;

/// Everything a descriptor may draw from.
#[derive(Debug, Clone, Copy)]
pub struct GenerateContext<'a> {
    pub metadata: &'a ProjectMetadata,
    pub options: &'a OptionSet,
    pub layout: &'a BuildLayout,
    pub settings: &'a Settings,
    pub requirements: &'a [Requirement],
    /// Extra CMake cache variables for the toolchain file
    pub variables: &'a BTreeMap<String, String>,
}

/// The kinds of descriptor produced, in conventional emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    BuildEnvironment,
    RunEnvironment,
    Toolchain,
    Dependencies,
}

impl DescriptorKind {
    pub const ALL: [DescriptorKind; 4] = [
        DescriptorKind::BuildEnvironment,
        DescriptorKind::RunEnvironment,
        DescriptorKind::Toolchain,
        DescriptorKind::Dependencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::BuildEnvironment => "build environment",
            DescriptorKind::RunEnvironment => "run environment",
            DescriptorKind::Toolchain => "toolchain",
            DescriptorKind::Dependencies => "dependencies",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A descriptor artifact ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorDescriptor {
    BuildEnvironment(EnvScript),
    RunEnvironment(EnvScript),
    Toolchain(ToolchainFile),
    Dependencies(DependencyManifest),
}

impl GeneratorDescriptor {
    /// Build the descriptor of the given kind.
    pub fn for_kind(kind: DescriptorKind, ctx: &GenerateContext<'_>) -> Self {
        match kind {
            DescriptorKind::BuildEnvironment => {
                GeneratorDescriptor::BuildEnvironment(EnvScript::build(ctx))
            }
            DescriptorKind::RunEnvironment => {
                GeneratorDescriptor::RunEnvironment(EnvScript::run(ctx))
            }
            DescriptorKind::Toolchain => GeneratorDescriptor::Toolchain(ToolchainFile::new(ctx)),
            DescriptorKind::Dependencies => {
                GeneratorDescriptor::Dependencies(DependencyManifest::new(ctx))
            }
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            GeneratorDescriptor::BuildEnvironment(_) => DescriptorKind::BuildEnvironment,
            GeneratorDescriptor::RunEnvironment(_) => DescriptorKind::RunEnvironment,
            GeneratorDescriptor::Toolchain(_) => DescriptorKind::Toolchain,
            GeneratorDescriptor::Dependencies(_) => DescriptorKind::Dependencies,
        }
    }

    /// File name inside the generators directory.
    pub fn file_name(&self) -> &str {
        match self {
            GeneratorDescriptor::BuildEnvironment(script)
            | GeneratorDescriptor::RunEnvironment(script) => script.file_name(),
            GeneratorDescriptor::Toolchain(_) => toolchain::TOOLCHAIN_FILE,
            GeneratorDescriptor::Dependencies(_) => deps::DEPS_FILE,
        }
    }

    /// Render the file contents.
    pub fn render(&self) -> String {
        match self {
            GeneratorDescriptor::BuildEnvironment(script)
            | GeneratorDescriptor::RunEnvironment(script) => script.render(),
            GeneratorDescriptor::Toolchain(file) => file.render(),
            GeneratorDescriptor::Dependencies(manifest) => manifest.render(),
        }
    }
}

/// Build every descriptor in conventional order.
pub fn descriptors(ctx: &GenerateContext<'_>) -> Vec<GeneratorDescriptor> {
    DescriptorKind::ALL
        .iter()
        .map(|kind| GeneratorDescriptor::for_kind(*kind, ctx))
        .collect()
}

/// A descriptor that could not be written.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error("failed to write {descriptor} descriptor to {}: {reason}", path.display())]
    UnwritableOutput {
        descriptor: DescriptorKind,
        path: PathBuf,
        reason: String,
    },
}

/// What happened to one descriptor.
#[derive(Debug)]
pub struct DescriptorOutcome {
    pub kind: DescriptorKind,
    pub path: PathBuf,
    pub result: Result<WriteStatus, GenerateError>,
}

impl DescriptorOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-descriptor results of a generation run, in emission order.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub outcomes: Vec<DescriptorOutcome>,
}

impl GenerateReport {
    /// Whether every descriptor is on disk with current content.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DescriptorOutcome::is_ok)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &DescriptorOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &GenerateError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }
}

/// Render and write every descriptor into the layout's generators directory.
///
/// A failure writing one descriptor is recorded in the report and does not
/// affect the others.
pub fn generate(ctx: &GenerateContext<'_>) -> GenerateReport {
    let out_dir = ctx.layout.generators_dir.to_native();
    let descriptors = descriptors(ctx);

    if let Err(e) = ensure_dir(&out_dir) {
        tracing::warn!("{:#}", e);
        let reason = format!("{:#}", e);
        let outcomes = descriptors
            .iter()
            .map(|d| {
                let path = out_dir.join(d.file_name());
                DescriptorOutcome {
                    kind: d.kind(),
                    result: Err(GenerateError::UnwritableOutput {
                        descriptor: d.kind(),
                        path: path.clone(),
                        reason: reason.clone(),
                    }),
                    path,
                }
            })
            .collect();
        return GenerateReport { outcomes };
    }

    let outcomes = descriptors
        .par_iter()
        .map(|descriptor| {
            let path = out_dir.join(descriptor.file_name());
            let result = write_atomic(&path, descriptor.render().as_bytes()).map_err(|e| {
                GenerateError::UnwritableOutput {
                    descriptor: descriptor.kind(),
                    path: path.clone(),
                    reason: format!("{:#}", e),
                }
            });

            match &result {
                Ok(status) => tracing::debug!(
                    "{} descriptor {:?}: {}",
                    descriptor.kind(),
                    status,
                    path.display()
                ),
                Err(e) => tracing::warn!("{}", e),
            }

            DescriptorOutcome {
                kind: descriptor.kind(),
                path,
                result,
            }
        })
        .collect();

    GenerateReport { outcomes }
}
