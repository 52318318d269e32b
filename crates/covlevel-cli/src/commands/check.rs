//! Implementation of the `covlevel check` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use covlevel::{RuleSource, StaticSupplementalData, SupplementalData};
use miette::{IntoDiagnostic, Result, miette};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use super::{load_data, load_rules};

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Rule files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Supplemental data file (JSON), used to expand `Org:level` locales
    #[arg(long, env = "COVLEVEL_DATA")]
    pub data: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one checked file.
#[derive(Debug, Serialize)]
struct CheckJson {
    file: String,
    ok: bool,
    coverage_rules: usize,
    approval_rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

const MISSING_CATCH_ALL: &str =
    "approval rules do not end with a catch-all; unmatched lookups will fail";

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let data = load_data(args.data.as_ref())?;
    let mut results = Vec::new();

    for file in &args.files {
        let result = match load_rules(file).and_then(|source| validate(file, source, &data)) {
            Ok(checked) => {
                if !args.json {
                    println!(
                        "{} {}: {} coverage rules, {} approval rules",
                        "ok".if_supports_color(Stream::Stdout, |t| t.green()),
                        file.display(),
                        checked.coverage_rules,
                        checked.approval_rules,
                    );
                    if let Some(warning) = &checked.warning {
                        println!(
                            "{} {}: {}",
                            "warning".if_supports_color(Stream::Stdout, |t| t.yellow()),
                            file.display(),
                            warning
                        );
                    }
                }
                checked
            }
            Err(report) => {
                if !args.json {
                    eprintln!("{report:?}");
                }
                CheckJson {
                    file: file.display().to_string(),
                    ok: false,
                    coverage_rules: 0,
                    approval_rules: 0,
                    warning: None,
                    error: Some(report.to_string()),
                }
            }
        };
        results.push(result);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
    }

    if results.iter().all(|r| r.ok) {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::DATAERR)
    }
}

/// Compile the approval rules of an already-parsed file.
fn validate(
    file: &Path,
    source: RuleSource,
    data: &Arc<StaticSupplementalData>,
) -> Result<CheckJson> {
    let coverage_rules = source.coverage().len();
    let approval_rules = source.approval_rules().len();
    let data: Arc<dyn SupplementalData> = data.clone();
    let approvals = source.approvals(data);
    approvals
        .validate()
        .map_err(|e| miette!("{}: {}", file.display(), e))?;
    let warning = (approval_rules > 0 && !approvals.has_catch_all())
        .then(|| MISSING_CATCH_ALL.to_string());
    Ok(CheckJson {
        file: file.display().to_string(),
        ok: true,
        coverage_rules,
        approval_rules,
        warning,
        error: None,
    })
}
