use alertreport_core::config::ReportConfig;
use alertreport_core::runner::FeatureOutcome;
use colored::*;

/// Print the start-of-run header.
pub fn print_banner(config: &ReportConfig) {
    println!();
    println!(
        "{}",
        format!(
            " alertreport v{} — {} report for {}",
            env!("CARGO_PKG_VERSION"),
            config.scope,
            config.scope_name
        )
        .bold()
    );
    let features: Vec<&str> = config.features.iter().map(|f| f.as_str()).collect();
    println!(" {} Features: {}", "|-".dimmed(), features.join(", ").cyan());
    println!(" {} API: {}", "|-".dimmed(), config.api_url.as_str());
    println!(
        " {} Output: {}",
        "|-".dimmed(),
        config.output_dir.display()
    );
    if !config.include_properties {
        println!(" {} Custom properties: {}", "|-".dimmed(), "off".yellow());
    }
    println!();
}

/// Print one line per finished feature.
pub fn print_outcome(outcome: &FeatureOutcome) {
    match outcome {
        FeatureOutcome::Written {
            feature,
            path,
            alerts,
        } => {
            println!(
                " {} {}: {} -> {}",
                "OK".green().bold(),
                feature.label(),
                plural(*alerts, "alert"),
                path.display()
            );
        }
        FeatureOutcome::Skipped { feature, reason } => {
            println!(
                " {} Skipping {} as it is not enabled.",
                "SKIP".yellow().bold(),
                feature.label()
            );
            println!("      {}", reason.to_string().dimmed());
        }
    }
}

pub fn print_summary(outcomes: &[FeatureOutcome]) {
    let written = outcomes
        .iter()
        .filter(|o| matches!(o, FeatureOutcome::Written { .. }))
        .count();
    let skipped = outcomes.len() - written;

    println!();
    println!(" {}", "=".repeat(60).dimmed());
    println!(
        " {} {} written, {} skipped",
        "Done.".bold(),
        plural(written, "report"),
        skipped
    );
    println!();
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
