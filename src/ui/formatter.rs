//! Pure formatting functions for console output.
//!
//! The library reports structured values (warnings, plans, results); this is
//! the only place that decides how they look on a terminal.

use console::style;

use crate::boundary::ReconcileWarning;
use crate::cli::RunOutcome;
use crate::domain::ActionPlan;
use crate::executor::ReconciliationResult;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &ReconcileWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One-line summary of a plan, e.g. "same: 1.0.0+1 -> 1.0.1+2 (write manifest, commit, tag)"
pub fn format_plan(plan: &ActionPlan) -> String {
    let mut actions = Vec::new();
    if plan.must_write_manifest {
        actions.push("write manifest");
    }
    if plan.must_commit {
        actions.push("commit");
    }
    if plan.must_create_marker {
        actions.push("tag");
    }

    let previous = plan
        .previous
        .as_ref()
        .map(|p| p.raw().to_string())
        .unwrap_or_else(|| "(no tag)".to_string());

    format!(
        "{}: {} -> {} ({})",
        plan.scenario,
        previous,
        plan.final_identifier,
        actions.join(", ")
    )
}

/// Show the decision for a run.
pub fn display_plan(outcome: &RunOutcome) {
    println!("\n{}", style("Version reconciliation").bold());
    println!("  Declared: {}", style(outcome.declared.raw()).cyan());
    match &outcome.latest_tag {
        Some(tag) => println!("  Latest tag: {}", style(tag).cyan()),
        None => println!("  Latest tag: {}", style("none").dim()),
    }
    println!("  Plan: {}", format_plan(&outcome.plan));
}

/// Show what the executor did.
pub fn display_result(result: &ReconciliationResult) {
    for step in &result.steps {
        display_success(&step.to_string());
    }

    if result.updated {
        println!(
            "\n{} Bumped version to {}\n",
            style("✓").green(),
            style(&result.current_version).green().bold()
        );
    } else {
        println!(
            "\n{} Published version {}\n",
            style("✓").green(),
            style(&result.current_version).green().bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{decide, VersionIdentifier};

    fn v(s: &str) -> VersionIdentifier {
        VersionIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_format_plan_bump() {
        let plan = decide(&v("1.0.0+1"), Some(&v("1.0.0+1")));
        assert_eq!(
            format_plan(&plan),
            "same: 1.0.0+1 -> 1.0.1+2 (write manifest, commit, tag)"
        );
    }

    #[test]
    fn test_format_plan_bootstrap() {
        let plan = decide(&v("1.0.0+1"), None);
        assert_eq!(format_plan(&plan), "bootstrap: (no tag) -> 1.0.0+1 (tag)");
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        display_status("test status");
        display_success("test success");
        display_error("test error");
        display_warning(&ReconcileWarning::UnparsableTag {
            tag: "nightly".to_string(),
        });
    }
}
