//! Implementation of `berth generate`.

use anyhow::Result;

use crate::generator::{self, GenerateContext, GenerateReport};
use crate::ops::resolve::{resolve_project, Resolution, ResolveOptions};
use crate::util::GlobalContext;

/// Outcome of a generation run.
#[derive(Debug)]
pub struct GenerateResult {
    /// The inputs descriptors were generated from
    pub resolution: Resolution,

    /// Per-descriptor results
    pub report: GenerateReport,
}

impl GenerateResult {
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}

/// Resolve the project and write every descriptor.
///
/// Returns an error only when resolution fails. Descriptor write failures
/// are reported per descriptor in the result.
pub fn generate(ctx: &GlobalContext, opts: &ResolveOptions) -> Result<GenerateResult> {
    let resolution = resolve_project(ctx, opts)?;
    let report = generate_resolved(&resolution);
    Ok(GenerateResult { resolution, report })
}

/// Write every descriptor for an already resolved project.
pub fn generate_resolved(resolution: &Resolution) -> GenerateReport {
    let gen_ctx = GenerateContext {
        metadata: &resolution.metadata,
        options: &resolution.options,
        layout: &resolution.layout,
        settings: &resolution.settings,
        requirements: &resolution.requirements,
        variables: &resolution.variables,
    };

    tracing::info!(
        "Generating descriptors in {}",
        resolution.layout.generators_dir
    );
    generator::generate(&gen_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Os, DESCRIPTION_FILE};
    use crate::generator::DescriptorKind;
    use tempfile::TempDir;

    #[test]
    fn test_generate_end_to_end() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(DESCRIPTION_FILE), "project(octo VERSION 2.1.0)").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_home(tmp.path().join(".home"));
        let opts = ResolveOptions {
            os: Some(Os::Linux),
            build_type: Some("Release".into()),
            ..Default::default()
        };

        let result = generate(&ctx, &opts).unwrap();
        assert!(result.is_success());

        let gen_dir = tmp.path().join("builds").join("Release");
        let kinds: Vec<_> = result.report.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, DescriptorKind::ALL.to_vec());
        for outcome in &result.report.outcomes {
            assert!(outcome.path.starts_with(&gen_dir));
            assert!(outcome.path.is_file());
        }

        let toolchain =
            std::fs::read_to_string(gen_dir.join("berth_toolchain.cmake")).unwrap();
        assert!(toolchain.contains("CMAKE_EXPORT_COMPILE_COMMANDS ON"));
    }

    #[test]
    fn test_generate_without_metadata_fails_before_writing() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(DESCRIPTION_FILE), "# empty").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_home(tmp.path().join(".home"));

        assert!(generate(&ctx, &ResolveOptions::default()).is_err());
        assert!(!tmp.path().join("builds").exists());
    }
}
