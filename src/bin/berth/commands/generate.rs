//! `berth generate` command

use anyhow::{bail, Result};

use crate::cli::GenerateArgs;
use berth::ops::generate;
use berth::util::fs::WriteStatus;
use berth::util::GlobalContext;

pub fn execute(args: GenerateArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let opts = args.selection.to_resolve_options();
    let result = generate(&ctx, &opts)?;

    let res = &result.resolution;
    eprintln!(
        "{:>12} {} ({}, {} {})",
        "Resolved",
        res.metadata.qualified_name().unwrap_or_default(),
        res.settings.build_type,
        res.settings.os,
        res.settings.arch
    );

    for outcome in &result.report.outcomes {
        match &outcome.result {
            Ok(WriteStatus::Written) => {
                eprintln!("{:>12} {}", "Generated", outcome.path.display())
            }
            Ok(WriteStatus::Unchanged) => {
                eprintln!("{:>12} {}", "Fresh", outcome.path.display())
            }
            Err(e) => eprintln!("{:>12} {}", "Failed", e),
        }
    }

    let failed = result.report.failed().count();
    if failed > 0 {
        bail!(
            "{} of {} descriptors could not be written",
            failed,
            result.report.outcomes.len()
        );
    }

    eprintln!(
        "{:>12} descriptors in {}",
        "Finished",
        res.layout.generators_dir.to_native().display()
    );

    Ok(())
}
