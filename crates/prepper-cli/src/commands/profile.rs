//! Profile command - column stats, quality heatmap and recommendations.

use std::path::PathBuf;

use colored::{ColoredString, Colorize};
use prepper::stats::{DisplayKind, IssueLevel};
use prepper::{PrepperConfig, RecommendationKind};

use super::open_workspace;

pub fn run(
    file: PathBuf,
    mut config: PrepperConfig,
    json_output: bool,
    top: Option<usize>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(top) = top {
        config.display_columns = top;
    }
    let workspace = open_workspace(&file, config)?;
    let stats = workspace.column_stats();

    if json_output {
        let report = serde_json::json!({
            "status": workspace.status(),
            "stats": stats,
            "heatmap": workspace.heatmap(),
            "recommendations": workspace.visible_recommendations(),
            "healthiest_columns": workspace.display_columns(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Profiling".cyan().bold(),
        file.display().to_string().white()
    );
    println!(
        "{} columns, {} preview rows, {} service",
        workspace.preview().column_count().to_string().white().bold(),
        workspace.preview().row_count(),
        workspace.status().backend
    );
    println!();

    println!("{}", "Columns:".yellow().bold());
    println!(
        "  {:20} {:12} {:>8} {:>9} {:>8}",
        "name", "kind", "count", "missing", "unique"
    );
    for (name, stat) in stats {
        let kind = match stat.display_kind() {
            DisplayKind::Numeric => "numeric",
            DisplayKind::Categorical => "categorical",
            DisplayKind::Unknown => "unknown",
        };
        let missing = format!("{:.1}%", stat.missing_pct);
        let missing = if stat.has_missing_warning() {
            missing.red()
        } else {
            missing.normal()
        };
        println!(
            "  {:20} {:12} {:>8} {:>9} {:>8}",
            name, kind, stat.count, missing, stat.unique
        );

        if verbose {
            if let Some(numeric) = stat.numeric() {
                println!(
                    "  {:20} mean={} median={} std={} min={} max={}",
                    "",
                    fmt_opt(numeric.mean),
                    fmt_opt(numeric.median),
                    fmt_opt(numeric.std),
                    fmt_opt(numeric.min),
                    fmt_opt(numeric.max)
                );
            } else if let Some(categorical) = stat.categorical() {
                println!(
                    "  {:20} top={} freq={}",
                    "",
                    categorical.top.as_deref().unwrap_or("-"),
                    categorical.freq
                );
            }
        }
    }
    println!();

    let heatmap = workspace.heatmap();
    if !heatmap.is_empty() {
        println!("{}", "Quality heatmap:".yellow().bold());
        print!("  {:18}", "");
        for column in &heatmap.columns {
            print!(" {:>12}", truncate(column, 12));
        }
        println!();
        for row in &heatmap.rows {
            print!("  {:18}", row.issue.label());
            for cell in &row.cells {
                print!(" {:>12}", level_colored(cell.level, &cell.label));
            }
            println!();
        }
        println!();
    }

    let recommendations = workspace.visible_recommendations();
    println!("{}", "Recommendations:".yellow().bold());
    if recommendations.is_empty() {
        println!("  {}", "None - data looks clean!".green());
    }
    for rec in &recommendations {
        let tag = match rec.kind {
            RecommendationKind::DropSuggested => "drop".red(),
            RecommendationKind::ImputeSuggested => "impute".yellow(),
            RecommendationKind::EncodeSuggested => "encode".blue(),
            RecommendationKind::ScaleSuggested => "scale".magenta(),
            RecommendationKind::Unmapped => "note".normal(),
        };
        println!("  [{}] {}: {}", tag, rec.column.white().bold(), rec.text);
    }
    println!();

    println!(
        "Healthiest columns: {}",
        workspace.display_columns().join(", ").green()
    );
    if recommendations.iter().any(|r| r.kind.is_actionable()) {
        println!(
            "Run {} to apply a fix",
            format!("prepper run {} --step fix:COLUMN", file.display())
                .cyan()
                .bold()
        );
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width - 1).collect();
        format!("{}~", head)
    }
}

fn level_colored(level: IssueLevel, label: &str) -> ColoredString {
    match level {
        IssueLevel::High => label.red(),
        IssueLevel::Medium => label.yellow(),
        IssueLevel::Low => label.green(),
        IssueLevel::NotApplicable => label.dimmed(),
    }
}
