//! `berth inspect` command

use anyhow::{Context, Result};

use crate::cli::InspectArgs;
use berth::ops::resolve_project;
use berth::util::GlobalContext;

pub fn execute(args: InspectArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let res = resolve_project(&ctx, &args.selection.to_resolve_options())?;

    if args.json {
        let json = serde_json::to_string_pretty(&res).context("failed to serialize resolution")?;
        println!("{}", json);
        return Ok(());
    }

    println!("project:        {}", res.metadata.qualified_name().unwrap_or_default());
    println!("root:           {}", res.project_root.display());
    println!(
        "settings:       os={} arch={} build_type={}",
        res.settings.os, res.settings.arch, res.settings.build_type
    );
    if let Some(compiler) = res.settings.compiler_identity() {
        println!("compiler:       {}", compiler);
    }

    let options: Vec<String> = res
        .options
        .entries()
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    println!("options:        {}", options.join(" "));

    println!("build dir:      {}", res.layout.build_dir);
    println!("generators dir: {}", res.layout.generators_dir);
    println!("package config:");
    for dir in &res.layout.package_config_dirs {
        println!("  {}", dir);
    }
    println!("build config:");
    for dir in &res.layout.build_config_dirs {
        println!("  {}", dir);
    }

    if !res.requirements.is_empty() {
        println!("requirements:");
        for req in &res.requirements {
            println!("  {}", req);
        }
    }

    Ok(())
}
