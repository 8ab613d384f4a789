//! Data validation utilities.
//!
//! Every `.ron` file in a directory must parse as either a
//! [`BattleScenario`] or a [`BattleConfig`], and scenarios must build a
//! valid engine request.

use std::path::{Path, PathBuf};

use battle_core::config::BattleConfig;
use battle_core::data::BattleScenario;
use battle_core::BattleError;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::scenario::read_text;

/// Kind of data file that was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// A full battle scenario.
    Scenario,
    /// A standalone battle config.
    Config,
}

/// Outcome of validating a directory.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Files that passed, with what they were recognized as.
    pub passed: Vec<(PathBuf, DataKind)>,
    /// Files that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// Whether every file passed.
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of files checked.
    pub fn files_checked(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// Validate all RON data files in a directory (non-recursive).
///
/// Per-file problems are collected in the report; only directory-level
/// I/O failures are returned as errors.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport, ToolError> {
    if !path.is_dir() {
        return Err(ToolError::FileNotFound(path.display().to_string()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut report = ValidationReport::default();
    for file in files {
        match validate_file(&file) {
            Ok(kind) => {
                debug!(path = %file.display(), ?kind, "Data file valid");
                report.passed.push((file, kind));
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Data file invalid");
                report.failed.push((file, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Validate a single data file.
pub fn validate_file(path: &Path) -> Result<DataKind, ToolError> {
    let text = read_text(path)?;
    let source = path.display().to_string();

    match BattleScenario::from_ron_str(&source, &text) {
        Ok(scenario) => {
            let config = scenario.effective_config(&BattleConfig::default());
            let request = scenario.to_request(&config)?;
            for unit in request.attackers.iter().chain(&request.defenders) {
                unit.validate()?;
            }
            Ok(DataKind::Scenario)
        }
        // Not shaped like a scenario; it may still be a config
        Err(BattleError::DataParseError { .. }) => {
            BattleConfig::from_ron_str(&source, &text)?;
            Ok(DataKind::Config)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_validates_mixed_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a_scenario.ron",
            r#"(attackers: [(id: 1, name: "a", attack: 5, defense: 5, hp: 50)], defenders: [])"#,
        );
        write(dir.path(), "b_config.ron", "(max_rounds: 8)");
        write(dir.path(), "c_broken.ron", "(attackers: [");
        write(
            dir.path(),
            "d_dupes.ron",
            r#"(
                attackers: [(id: 1, name: "a", attack: 5, defense: 5, hp: 50)],
                defenders: [(id: 1, name: "b", attack: 5, defense: 5, hp: 50)],
            )"#,
        );
        write(dir.path(), "notes.txt", "ignored");

        let report = validate_data_directory(dir.path()).unwrap();

        assert_eq!(report.files_checked(), 4);
        assert_eq!(report.passed.len(), 2);
        assert_eq!(report.passed[0].1, DataKind::Scenario);
        assert_eq!(report.passed[1].1, DataKind::Config);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[1].1.contains("duplicate unit id"));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_out_of_range_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "cfg.ron", r#"(damage_variance: "1.5")"#);
        let report = validate_data_directory(dir.path()).unwrap();
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            validate_data_directory(Path::new("/no/such/dir")),
            Err(ToolError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_empty_directory_ok() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_data_directory(dir.path()).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.files_checked(), 0);
    }
}
