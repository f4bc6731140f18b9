//! Step outputs for the invoking workflow (`key=value` lines).

use std::fs::OpenOptions;
use std::io::{self, Write};

use crate::error::Result;
use crate::executor::ReconciliationResult;

/// Written for `previous_version` when no tag existed before the run
pub const NO_PREVIOUS_VERSION: &str = "none";

/// Env var naming the file GitHub Actions collects step outputs from
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Values reported back to the invoking workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutputs {
    pub previous_version: String,
    pub current_version: String,
    pub updated: bool,
    pub new_version: String,
}

impl From<&ReconciliationResult> for ActionOutputs {
    fn from(result: &ReconciliationResult) -> Self {
        ActionOutputs {
            previous_version: result
                .previous_version
                .clone()
                .unwrap_or_else(|| NO_PREVIOUS_VERSION.to_string()),
            current_version: result.current_version.clone(),
            updated: result.updated,
            new_version: result.new_version().to_string(),
        }
    }
}

impl ActionOutputs {
    pub fn pairs(&self) -> [(&'static str, String); 4] {
        [
            ("previous_version", self.previous_version.clone()),
            ("current_version", self.current_version.clone()),
            ("updated", self.updated.to_string()),
            ("new_version", self.new_version.clone()),
        ]
    }

    /// Write one `key=value` line per output
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (key, value) in self.pairs() {
            writeln!(writer, "{}={}", key, value)?;
        }
        Ok(())
    }

    /// Append to the `GITHUB_OUTPUT` file when running under Actions,
    /// otherwise print to stdout.
    pub fn emit(&self) -> io::Result<()> {
        match std::env::var_os(GITHUB_OUTPUT_ENV).filter(|p| !p.is_empty()) {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                self.write_to(file)
            }
            None => self.write_to(io::stdout().lock()),
        }
    }
}

/// Report a run's outputs to the invoking workflow
pub fn write_outputs(result: &ReconciliationResult) -> Result<()> {
    ActionOutputs::from(result).emit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scenario;

    fn result(previous: Option<&str>, current: &str, updated: bool) -> ReconciliationResult {
        ReconciliationResult {
            scenario: Scenario::Same,
            previous_version: previous.map(str::to_string),
            current_version: current.to_string(),
            updated,
            steps: Vec::new(),
        }
    }

    #[test]
    fn test_outputs_from_bump() {
        let outputs = ActionOutputs::from(&result(Some("1.0.0+1"), "1.0.1+2", true));
        let mut buf = Vec::new();
        outputs.write_to(&mut buf).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "previous_version=1.0.0+1\ncurrent_version=1.0.1+2\nupdated=true\nnew_version=1.0.1+2\n"
        );
    }

    #[test]
    fn test_outputs_bootstrap_sentinel() {
        let outputs = ActionOutputs::from(&result(None, "1.0.0+1", false));
        assert_eq!(outputs.previous_version, NO_PREVIOUS_VERSION);
        assert_eq!(outputs.new_version, "");
        assert!(!outputs.updated);
    }
}
