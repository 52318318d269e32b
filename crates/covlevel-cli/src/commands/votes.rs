//! Implementation of the `covlevel votes` command.

use std::path::PathBuf;

use covlevel::ApprovalError;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use super::{load_data, load_rules};

/// Arguments for the votes command.
#[derive(Debug, clap::Args)]
pub struct VotesArgs {
    /// Rule file
    #[arg(long, env = "COVLEVEL_RULES")]
    pub rules: PathBuf,

    /// Supplemental data file (JSON)
    #[arg(long, env = "COVLEVEL_DATA")]
    pub data: Option<PathBuf>,

    /// Locale the vote is cast in
    #[arg(long)]
    pub locale: String,

    /// Path being voted on; rules with a paths restriction never match
    /// when omitted
    #[arg(long)]
    pub path: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for a vote lookup.
#[derive(Debug, Serialize)]
struct VotesJson<'a> {
    locale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    votes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the votes command.
pub fn run_votes(args: VotesArgs) -> Result<i32> {
    let source = load_rules(&args.rules)?;
    let data = load_data(args.data.as_ref())?;
    let approvals = source.approvals(data);

    let result = approvals.required_votes(&args.locale, args.path.as_deref());
    let code = match &result {
        Ok(_) => exitcode::OK,
        Err(ApprovalError::NoMatchingRequirement { .. }) => exitcode::CONFIG,
        Err(ApprovalError::InvalidPaths { .. }) => exitcode::DATAERR,
    };

    if args.json {
        let output = VotesJson {
            locale: &args.locale,
            path: args.path.as_deref(),
            votes: result.as_ref().ok().copied(),
            error: result.as_ref().err().map(ToString::to_string),
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        match result {
            Ok(votes) => println!("{votes}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(code)
}
