//! The `build` command.

use bask::Manifest;
use owo_colors::OwoColorize;

use crate::cli::BuildArgs;

pub fn build(args: BuildArgs) -> bask::Result<()> {
    let manifest = super::orchestrator_from(&args.common)?.build()?;
    print_summary(&manifest);
    Ok(())
}

fn print_summary(manifest: &Manifest) {
    println!(
        "{} {} build {} ({} entries)",
        "done".green().bold(),
        manifest.mode,
        manifest.version.to_string().cyan(),
        manifest.entries.len()
    );
    for (name, outputs) in &manifest.entries {
        println!("  {}  {}", name.bold(), outputs.script);
        if let Some(stylesheet) = &outputs.stylesheet {
            println!("  {}  {}", " ".repeat(name.len()), stylesheet);
        }
    }
    for (module, global) in &manifest.externals {
        println!("  {} {module} resolves to host global {global}", "external".yellow());
    }
    if !manifest.assets.is_empty() {
        println!("  {} binary assets", manifest.assets.len());
    }
}
