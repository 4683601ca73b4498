//! Command-line interface.

use crate::output::{self, OutputFormat};
use crate::runner::{self, DebugFlags, RunOptions};
use clap::{Args, Parser, Subcommand};
use solstice_engine::{CancelToken, RunLimits, Severity};
use solstice_rules::builtin_registry;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "solstice")]
#[command(about = "Solidity static analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze Solidity sources
    Check(CheckArgs),

    /// List registered rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Files or directories to analyze (defaults to the current directory)
    paths: Vec<PathBuf>,

    /// Config file (default: discover .solstice.toml / solstice.toml /
    /// .solsticerc.json in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Exit non-zero when issues at or above this severity exist
    #[arg(long, default_value = "error", value_name = "SEVERITY")]
    fail_on: String,

    /// Maximum warnings tolerated before a non-zero exit
    #[arg(long, value_name = "N")]
    max_warnings: Option<usize>,

    /// Run a single rule by id
    #[arg(long, value_name = "RULE_ID")]
    rule: Option<String>,

    /// Per-file analysis budget in milliseconds
    #[arg(long, value_name = "MS")]
    file_timeout_ms: Option<u64>,

    /// Debug output categories (timing, all)
    #[arg(long, value_name = "CATEGORY")]
    debug: Vec<String>,
}

/// Parse arguments, dispatch, and return the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => check(args),
        Commands::Rules { json } => list_rules(json),
    }
}

fn check(args: CheckArgs) -> i32 {
    let fail_on: Severity = match args.fail_on.parse() {
        Ok(severity) => severity,
        Err(reason) => {
            eprintln!("error: --fail-on: {}", reason);
            return 2;
        }
    };

    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let paths = if args.paths.is_empty() {
        vec![root.clone()]
    } else {
        args.paths.clone()
    };

    let options = RunOptions {
        config_path: args.config.clone(),
        rule_filter: args.rule.clone(),
        limits: RunLimits {
            cancel: CancelToken::new(),
            file_budget: args.file_timeout_ms.map(Duration::from_millis),
        },
        debug: DebugFlags::from_args(&args.debug),
    };

    let outcome = match runner::run_check(&paths, &root, &options) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {}", e);
            return 2;
        }
    };

    let colors = args.format == OutputFormat::Human && output::use_colors();
    output::print_report(&outcome.report, args.format, colors);
    for (file, reason) in &outcome.failed_files {
        eprintln!("error: {}: {}", file.display(), reason);
    }

    let report = &outcome.report;
    let over_threshold = report.issues_at_least(fail_on).next().is_some();
    let over_warning_budget = args
        .max_warnings
        .is_some_and(|max| report.counts().warnings > max);
    if over_threshold || over_warning_budget || !outcome.failed_files.is_empty() {
        1
    } else {
        0
    }
}

fn list_rules(json: bool) -> i32 {
    let registry = match builtin_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {}", e);
            return 2;
        }
    };

    if json {
        let rules: Vec<serde_json::Value> = registry
            .iter()
            .map(|rule| {
                let meta = rule.metadata();
                serde_json::json!({
                    "id": meta.id,
                    "category": meta.category.prefix(),
                    "defaultSeverity": meta.default_severity.to_string(),
                    "title": meta.title,
                    "description": meta.description,
                    "recommendation": meta.recommendation,
                    "tags": meta.tags,
                    "options": meta.options.iter().map(|o| {
                        serde_json::json!({ "key": o.key, "kind": o.kind.name(), "doc": o.doc })
                    }).collect::<Vec<_>>(),
                })
            })
            .collect();
        match serde_json::to_string_pretty(&rules) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("failed to serialize rules: {}", e);
                return 2;
            }
        }
    } else {
        for rule in registry.iter() {
            let meta = rule.metadata();
            println!("{:<40} {:<8} {}", meta.id, meta.default_severity, meta.title);
        }
    }
    0
}
