//! `berth clean` command

use anyhow::{Context, Result};

use crate::cli::CleanArgs;
use berth::core::{build_dir_for, builds_root};
use berth::ops::resolve::{load_project_config, resolve_install_root, resolve_settings};
use berth::util::fs::remove_dir_all_if_exists;
use berth::util::GlobalContext;

pub fn execute(args: CleanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = load_project_config(&ctx);
    let opts = args.selection.to_resolve_options();

    // Cleaning needs no project identity, only the install root and build type.
    let install_root = resolve_install_root(&ctx.project_root(), &config, &opts);

    let target = if args.all {
        builds_root(&install_root)
    } else {
        let settings = resolve_settings(&config, &opts);
        build_dir_for(&settings.build_type, &install_root)
            .context("cannot select a build directory to clean")?
    };

    let path = target.to_native();
    remove_dir_all_if_exists(&path)?;
    eprintln!("{:>12} {}", "Removed", path.display());

    Ok(())
}
