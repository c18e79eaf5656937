//! Template export command

use anyhow::{Context, Result};
use planner_lib::{generator_for, ExportFormat, Planner};
use std::path::Path;

use super::plan::PlanArgs;
use crate::output::{print_diagnostics, print_error, print_success};

/// Plan and render an infrastructure template; returns whether the plan was valid
///
/// The template goes to `output` when given, otherwise to stdout. Invalid
/// plans are not rendered.
pub fn export_template(
    planner: &Planner,
    args: &PlanArgs,
    template: ExportFormat,
    output: Option<&Path>,
) -> Result<bool> {
    let plan = args.build_plan(planner)?;

    if !plan.validation.is_valid {
        print_diagnostics(&plan.validation);
        print_error("Plan failed validation, template not generated");
        return Ok(false);
    }

    let rendered = generator_for(template)
        .render(&plan)
        .with_context(|| format!("Failed to render {} template", template))?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write template to {}", path.display()))?;
            print_success(&format!(
                "{} template written to {}",
                template,
                path.display()
            ));
        }
        None => print!("{}", rendered),
    }

    Ok(true)
}
