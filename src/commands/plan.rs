use anyhow::{Context, Result};

use super::project::Project;
use crate::cli::ProjectArgs;

pub fn cmd_plan(args: &ProjectArgs) -> Result<()> {
    let project = Project::load(args)?;
    let options = project.options().with_dry_run(true);

    let result = project
        .use_case()
        .execute(&options)
        .with_context(|| format!("planning {}", project.root.display()))?;

    println!("{}", serde_json::to_string_pretty(&result.changes)?);
    Ok(())
}
