//! The `plan` command: a dry run. Nothing under the output root is touched.

use bask::{BuildPlan, Error};
use owo_colors::OwoColorize;

use crate::cli::PlanArgs;

pub fn plan(args: PlanArgs) -> bask::Result<()> {
    let plan = super::orchestrator_from(&args.common)?.plan()?;

    if args.json {
        let json = serde_json::to_string_pretty(&plan)
            .map_err(|e| Error::InvalidConfig(format!("plan serialization failed: {e}")))?;
        println!("{json}");
        return Ok(());
    }
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &BuildPlan) {
    println!("{} build, version {}", plan.mode, plan.version.to_string().cyan());
    for entry in &plan.job.entries {
        println!("{} {}", "entry".bold(), entry.name);
        if let Some(script) = plan.scripts.get(&entry.name) {
            println!("  emits {script}");
        }
        for source in &entry.sources {
            match source.category {
                Some(category) => {
                    let chain = if source.transforms.is_empty() {
                        "no transforms".to_string()
                    } else {
                        source
                            .transforms
                            .iter()
                            .map(|t| t.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    println!("  {} [{category}] {chain}", source.path.display());
                }
                None => {
                    println!("  {} unmatched, engine default handling", source.path.display());
                }
            }
        }
    }
    for (module, global) in plan.job.externals.iter() {
        println!("{} {module} resolves to host global {global}", "external".yellow());
    }
    for warning in &plan.warnings {
        println!("{} {warning}", "warning".yellow().bold());
    }
}
