//! Output formatting.
//!
//! Human output is one line per issue plus a summary; JSON output is the
//! serialized report. Colors respect NO_COLOR and TTY detection.

use nu_ansi_term::Color;
use solstice_engine::{Issue, Report, Severity};
use std::io::IsTerminal;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Should colors be used? Respects NO_COLOR and falls back to TTY
/// detection.
pub fn use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Render a report to stdout.
pub fn print_report(report: &Report, format: OutputFormat, colors: bool) {
    match format {
        OutputFormat::Json => {
            match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("failed to serialize report: {}", e),
            }
        }
        OutputFormat::Human => print_human(report, colors),
    }
}

fn print_human(report: &Report, colors: bool) {
    for issue in &report.issues {
        println!("{}", format_issue(issue, colors));
    }

    let counts = report.counts();
    if counts.total() == 0 {
        println!("no issues found");
    } else {
        println!(
            "{} issues ({} errors, {} warnings, {} infos)",
            counts.total(),
            counts.errors,
            counts.warnings,
            counts.infos
        );
    }
    if report.partial {
        println!("analysis was canceled; results are partial");
    }
}

fn format_issue(issue: &Issue, colors: bool) -> String {
    let severity = severity_label(issue.severity, colors);
    let mut line = format!(
        "{}:{}:{}: {}: {} [{}]",
        issue.file.display(),
        issue.span.start.line,
        issue.span.start.column,
        severity,
        issue.message,
        issue.rule_id
    );
    if let Some(suggestion) = &issue.suggestion {
        line.push_str(&format!("\n    suggestion: {}", suggestion));
    }
    line
}

fn severity_label(severity: Severity, colors: bool) -> String {
    let label = severity.to_string();
    if !colors {
        return label;
    }
    let color = match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
        Severity::Off => return label,
    };
    color.bold().paint(label).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solstice_ast::{Position, Span};
    use solstice_engine::Category;
    use std::path::PathBuf;

    fn sample_issue() -> Issue {
        Issue {
            rule_id: "security/tx-origin".to_string(),
            category: Category::Security,
            severity: Severity::Warning,
            message: "avoid `tx.origin`".to_string(),
            file: PathBuf::from("contracts/Auth.sol"),
            span: Span::new(Position::new(7, 9, 120), Position::new(7, 18, 129)),
            suggestion: None,
            data: None,
        }
    }

    #[test]
    fn plain_issue_line() {
        let line = format_issue(&sample_issue(), false);
        assert_eq!(
            line,
            "contracts/Auth.sol:7:9: warning: avoid `tx.origin` [security/tx-origin]"
        );
    }

    #[test]
    fn suggestion_is_appended() {
        let mut issue = sample_issue();
        issue.suggestion = Some("use msg.sender".to_string());
        let line = format_issue(&issue, false);
        assert!(line.contains("suggestion: use msg.sender"));
    }
}
