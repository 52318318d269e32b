//! CLI command implementations.

mod check;
mod level;
mod summary;
mod votes;

use std::fs::read_to_string;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use covlevel::{LoadError, RuleSource, StaticSupplementalData};
use miette::{IntoDiagnostic, Result, miette};
use tracing::debug;

use crate::output::RuleDiagnostic;

pub use check::{CheckArgs, run_check};
pub use level::{LevelArgs, run_level};
pub use summary::{SummaryArgs, run_summary};
pub use votes::{VotesArgs, run_votes};

/// Read and compile a rule file, turning parse errors into source-annotated
/// diagnostics.
fn load_rules(path: &Path) -> Result<RuleSource> {
    debug!(path = %path.display(), "loading rule file");
    let content = read_to_string(path)
        .into_diagnostic()
        .map_err(|e| miette!("Failed to read rule file {}: {}", path.display(), e))?;
    compile_rules(path, &content)
}

fn compile_rules(path: &Path, content: &str) -> Result<RuleSource> {
    match RuleSource::parse(content) {
        Ok(source) => Ok(source),
        Err(LoadError::Parse { source, .. }) => {
            Err(RuleDiagnostic::from_parse_error(path, content, &source).into())
        }
        Err(e) => Err(miette!("{}: {}", path.display(), e)),
    }
}

/// Load supplemental data from a JSON file, or use empty data when no file
/// is given (plural categories still come from ICU).
fn load_data(path: Option<&PathBuf>) -> Result<Arc<StaticSupplementalData>> {
    let Some(path) = path else {
        return Ok(Arc::new(StaticSupplementalData::new()));
    };
    debug!(path = %path.display(), "loading supplemental data");
    let content = read_to_string(path)
        .into_diagnostic()
        .map_err(|e| miette!("Failed to read data file {}: {}", path.display(), e))?;
    let data: StaticSupplementalData = serde_json::from_str(&content)
        .into_diagnostic()
        .map_err(|e| miette!("Invalid data file {}: {}", path.display(), e))?;
    Ok(Arc::new(data))
}

/// Non-empty, non-comment lines from `reader`, trimmed.
fn read_paths(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            paths.push(trimmed.to_string());
        }
    }
    Ok(paths)
}
