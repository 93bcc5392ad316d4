use anyhow::{Context, Result};
use pkgsplit::application::BuildResult;

use super::project::Project;
use crate::cli::ProjectArgs;

pub fn cmd_build(args: &ProjectArgs, dry_run: bool, no_ignore_list: bool, json: bool) -> Result<()> {
    let project = Project::load(args)?;

    let mut options = project.options().with_dry_run(dry_run);
    if no_ignore_list {
        options = options.without_ignore_list();
    }

    let result = project
        .use_case()
        .execute(&options)
        .with_context(|| format!("splitting {}", project.root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_summary(&result));
    }
    Ok(())
}

fn render_summary(result: &BuildResult) -> String {
    let mut out = String::new();
    let verb = if result.is_dry_run() {
        "Would create"
    } else {
        "Created"
    };
    out.push_str(&format!("{verb} {} package(s):\n", result.packages.len()));
    for package in &result.packages {
        out.push_str(&format!(
            "  {} ({} artifact(s)) -> {}\n",
            package.name,
            package.artifacts,
            package.directory.display()
        ));
    }
    if !result.unassigned.is_empty() {
        out.push_str(&format!(
            "{} artifact(s) outside every module were left in place\n",
            result.unassigned.len()
        ));
    }
    if let Some(path) = &result.ignore_file {
        out.push_str(&format!("Updated {}\n", path.display()));
    }
    out
}
