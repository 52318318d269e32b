//! Implementation of the `covlevel level` command.

use std::io::stdin;
use std::path::PathBuf;
use std::sync::Arc;

use covlevel::{CoverageEvaluator, CoverageLevel, RejectReason, Rejection};
use miette::{IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use super::{load_data, load_rules, read_paths};

/// Arguments for the level command.
#[derive(Debug, clap::Args)]
pub struct LevelArgs {
    /// Rule file
    #[arg(long, env = "COVLEVEL_RULES")]
    pub rules: PathBuf,

    /// Supplemental data file (JSON)
    #[arg(long, env = "COVLEVEL_DATA")]
    pub data: Option<PathBuf>,

    /// Locale to evaluate for (e.g., de, sr_Latn)
    #[arg(long)]
    pub locale: String,

    /// Show the deciding rule and every rule skipped before it
    #[arg(long)]
    pub explain: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Paths to evaluate; read from stdin when omitted
    pub paths: Vec<String>,
}

/// JSON output for one path.
#[derive(Debug, Serialize)]
struct LevelJson {
    path: String,
    level: CoverageLevel,
    value: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<RuleJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rejected: Vec<RejectedJson>,
}

#[derive(Debug, Serialize)]
struct RuleJson {
    index: usize,
    pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    captured: Option<String>,
}

#[derive(Debug, Serialize)]
struct RejectedJson {
    index: usize,
    reason: String,
}

/// Run the level command.
pub fn run_level(args: LevelArgs) -> Result<i32> {
    let source = load_rules(&args.rules)?;
    let data = load_data(args.data.as_ref())?;
    let evaluator =
        CoverageEvaluator::for_locale(Arc::clone(source.coverage()), data.as_ref(), &args.locale);

    let paths = if args.paths.is_empty() {
        read_paths(stdin().lock()).into_diagnostic()?
    } else {
        args.paths.clone()
    };

    let results: Vec<LevelJson> = paths
        .iter()
        .map(|path| evaluate(&evaluator, path, args.explain))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
        return Ok(exitcode::OK);
    }

    for result in &results {
        let level = format!("{:<13}", result.level.name());
        println!(
            "{} {}",
            level.if_supports_color(Stream::Stdout, |t| t.bold()),
            result.path
        );
        if !args.explain {
            continue;
        }
        for rejected in &result.rejected {
            println!(
                "    {} #{}: {}",
                "skipped".if_supports_color(Stream::Stdout, |t| t.dimmed()),
                rejected.index,
                rejected.reason
            );
        }
        match &result.rule {
            Some(rule) => {
                print!("    matched #{}: {}", rule.index, rule.pattern);
                match &rule.captured {
                    Some(captured) => println!(" (captured \"{captured}\")"),
                    None => println!(),
                }
            }
            None => println!("    no rule matched; using the fallback level"),
        }
    }

    Ok(exitcode::OK)
}

fn evaluate(evaluator: &CoverageEvaluator, path: &str, explain: bool) -> LevelJson {
    if !explain {
        let level = evaluator.level(path);
        return LevelJson {
            path: path.to_string(),
            level,
            value: level.value(),
            rule: None,
            rejected: Vec::new(),
        };
    }

    let trace = evaluator.trace(path);
    let level = trace.level();
    LevelJson {
        path: path.to_string(),
        level,
        value: level.value(),
        rule: trace.matched.map(|found| RuleJson {
            index: found.index,
            pattern: found.rule.raw_pattern().to_string(),
            captured: found.captured.map(str::to_string),
        }),
        rejected: trace
            .rejections
            .into_iter()
            .map(|Rejection { index, reason }| RejectedJson {
                index,
                reason: describe(&reason),
            })
            .collect(),
    }
}

fn describe(reason: &RejectReason) -> String {
    match reason {
        RejectReason::ContextPredicate => "language/script/territory restriction".to_string(),
        RejectReason::NoMatch => "pattern did not match".to_string(),
        RejectReason::VariableNotInContext { kind, value } => match value {
            Some(value) => format!("\"{value}\" is not in the locale's {kind} set"),
            None => format!("{kind} did not capture a value"),
        },
    }
}
