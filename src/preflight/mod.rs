//! Preflight checks for the capsule generator bootstrap.
//!
//! Validates the host BEFORE any install step runs, and reports what is
//! already provisioned so re-runs can skip finished work.
//!
//! # Checks Performed
//!
//! - **Privilege**: not running as root
//! - **Host tools**: the Python runtime and the optional toolchain binaries
//! - **Network**: the package index is reachable
//! - **Provision status**: venv, manifest, `.env`, activation scripts
//!
//! # Usage
//!
//! ```rust,ignore
//! use capgen_setup::preflight::PreflightChecker;
//!
//! let checker = PreflightChecker::new(base_dir);
//! let report = checker.run_all().await;
//!
//! if !report.is_ok() {
//!     for error in report.errors() {
//!         eprintln!("  - {}: {}", error.name, error.message);
//!     }
//!     std::process::exit(1);
//! }
//! ```

mod host_tools;
mod network;
mod privilege;

pub use host_tools::check_host_tools;
pub use network::check_network;
pub use privilege::check_privilege;

use crate::config::{ACTIVATE_FISH, ACTIVATE_SH, ENV_FILE, REQUIREMENTS_FILE};
use crate::venv::VirtualEnv;
use std::path::{Path, PathBuf};

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a warning check result (passes but with a note).
    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }
}

/// Comprehensive preflight report.
#[derive(Debug, Default)]
pub struct PreflightReport {
    /// All check results
    pub checks: Vec<CheckResult>,
    /// What is already provisioned in the project directory
    pub provision: ProvisionStatus,
}

impl PreflightReport {
    /// Check if all preflight checks passed.
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Get all failing checks.
    pub fn errors(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Get count of passing checks.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Get total check count.
    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Print a summary of the preflight checks.
    pub fn print_summary(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status = if check.passed { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", status, check.name, check.message);
            if let Some(suggestion) = &check.suggestion {
                println!("     Suggestion: {}", suggestion);
            }
        }

        println!();
        println!("=== Provision Status ===\n");
        self.provision.print();

        println!();
        if self.is_ok() {
            println!(
                "All preflight checks passed ({}/{})",
                self.passed_count(),
                self.total_count()
            );
        } else {
            println!(
                "Preflight checks failed: {} of {} passed",
                self.passed_count(),
                self.total_count()
            );
        }
    }
}

/// What the bootstrap has already materialized in the project directory.
#[derive(Debug, Default)]
pub struct ProvisionStatus {
    /// Virtual environment exists with a usable interpreter
    pub has_venv: bool,
    /// Dependency manifest is present
    pub has_requirements: bool,
    /// Credential file is present
    pub has_env_file: bool,
    /// POSIX activation script is present
    pub has_activate_sh: bool,
    /// fish activation script is present
    pub has_activate_fish: bool,
}

impl ProvisionStatus {
    /// Recompute from the filesystem.
    pub fn scan(base_dir: &Path) -> Self {
        Self {
            has_venv: VirtualEnv::new(base_dir).is_ready(),
            has_requirements: base_dir.join(REQUIREMENTS_FILE).exists(),
            has_env_file: base_dir.join(ENV_FILE).exists(),
            has_activate_sh: base_dir.join(ACTIVATE_SH).exists(),
            has_activate_fish: base_dir.join(ACTIVATE_FISH).exists(),
        }
    }

    /// Print provision status.
    pub fn print(&self) {
        let status = |b: bool| if b { "[present]" } else { "[missing]" };

        println!("{}  Virtual environment ({})", status(self.has_venv), crate::config::VENV_DIR);
        println!("{}  Dependency manifest ({})", status(self.has_requirements), REQUIREMENTS_FILE);
        println!("{}  Credential file ({})", status(self.has_env_file), ENV_FILE);
        println!("{}  Activation script ({})", status(self.has_activate_sh), ACTIVATE_SH);
        println!("{}  Activation script ({})", status(self.has_activate_fish), ACTIVATE_FISH);
    }
}

/// Preflight checker for the bootstrap prerequisites.
pub struct PreflightChecker {
    base_dir: PathBuf,
}

impl PreflightChecker {
    /// Create a new preflight checker.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Run all preflight checks and return a comprehensive report.
    pub async fn run_all(&self) -> PreflightReport {
        let mut report = PreflightReport::default();

        // Privilege first: nothing else matters when run as root
        report.checks.push(check_privilege());

        // Host tools
        report.checks.extend(check_host_tools());

        // Network (async)
        report.checks.push(check_network().await);

        // Provision status
        report.provision = ProvisionStatus::scan(&self.base_dir);

        report
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_check_result_pass() {
        let result = CheckResult::pass("test", "passed");
        assert!(result.passed);
        assert!(result.suggestion.is_none());
    }

    #[test]
    fn test_check_result_fail() {
        let result = CheckResult::fail("test", "failed", "fix it");
        assert!(!result.passed);
        assert!(result.suggestion.is_some());
    }

    #[test]
    fn test_preflight_report_is_ok() {
        let mut report = PreflightReport::default();
        assert!(report.is_ok()); // Empty is OK

        report.checks.push(CheckResult::pass("test1", "ok"));
        assert!(report.is_ok());

        report.checks.push(CheckResult::fail("test2", "bad", "fix"));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_provision_status_empty_dir() {
        let dir = tempdir().unwrap();
        let status = ProvisionStatus::scan(dir.path());
        assert!(!status.has_venv);
        assert!(!status.has_requirements);
        assert!(!status.has_env_file);
    }

    #[test]
    fn test_provision_status_sees_manifest() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(REQUIREMENTS_FILE), "pandas\n").unwrap();
        let status = ProvisionStatus::scan(dir.path());
        assert!(status.has_requirements);
    }
}
