//! Run command - apply a sequence of cleaning steps and export the result.

use std::path::PathBuf;

use colored::Colorize;
use prepper::{PrepperConfig, Workspace};

use super::open_workspace;
use crate::cli::Step;

pub fn run(
    file: PathBuf,
    config: PrepperConfig,
    steps: Vec<Step>,
    output: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workspace = open_workspace(&file, config)?;

    for (index, step) in steps.iter().enumerate() {
        let label = format!("[{}/{}]", index + 1, steps.len());
        run_step(&mut workspace, step)
            .map_err(|e| format!("Step {} failed: {}", index + 1, e))?;

        if !json_output {
            eprintln!(
                "{} {} {}",
                label.dimmed(),
                describe(step).white(),
                format!("(undo depth {})", workspace.undo_depth()).dimmed()
            );
        }
    }

    match output {
        Some(path) => {
            workspace.export_to(&path)?;
            if !json_output {
                eprintln!(
                    "{} {}",
                    "Saved preview to".green().bold(),
                    path.display().to_string().white()
                );
            }
        }
        None if !json_output => print!("{}", workspace.export()),
        None => {}
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&workspace.status())?);
    } else if verbose {
        for record in workspace.history() {
            eprintln!(
                "  {} {}",
                record.applied_at.format("%H:%M:%S").to_string().dimmed(),
                record.transformation.describe()
            );
        }
    }

    Ok(())
}

fn run_step(workspace: &mut Workspace, step: &Step) -> prepper::Result<()> {
    match step {
        Step::Transform(request) => {
            workspace.apply(request.clone())?;
        }
        Step::Undo => {
            workspace.undo()?;
        }
        Step::Fix(column) => {
            let visible = workspace.visible_recommendations();
            let Some(rec) = visible
                .iter()
                .find(|r| &r.column == column && r.kind.is_actionable())
            else {
                eprintln!(
                    "{} No actionable recommendation for '{}'",
                    "Skipped:".yellow(),
                    column
                );
                return Ok(());
            };
            workspace.apply_recommendation(&rec.column, &rec.text)?;
        }
        Step::Dismiss(column) => {
            for rec in workspace.visible_recommendations() {
                if &rec.column == column {
                    workspace.dismiss(&rec.column, &rec.text);
                }
            }
        }
    }
    Ok(())
}

fn describe(step: &Step) -> String {
    match step {
        Step::Transform(request) => request.to_string(),
        Step::Undo => "undo".to_string(),
        Step::Fix(column) => format!("fix {}", column),
        Step::Dismiss(column) => format!("dismiss recommendations for {}", column),
    }
}
