//! Privilege check for the bootstrap.
//!
//! The bootstrap provisions a per-user environment: the venv, the `.env`
//! file, and the activation scripts must belong to the operator. Running
//! the whole pipeline as root would leave root-owned files the generator
//! later cannot touch, so root is rejected up front. Individual package
//! installs still escalate through sudo where needed.

use super::CheckResult;
use crate::process::Cmd;

/// Check that the bootstrap is not running as a system-level account.
pub fn check_privilege() -> CheckResult {
    match effective_uid() {
        Some(0) => CheckResult::fail(
            "Privilege",
            "Running as root",
            "Re-run as your normal user; sudo is requested only where needed",
        ),
        Some(uid) => CheckResult::pass("Privilege", format!("Running as uid {}", uid)),
        None => CheckResult::warn("Privilege", "Could not determine effective uid"),
    }
}

/// Whether the current process runs as root.
pub fn is_root() -> bool {
    effective_uid() == Some(0)
}

/// Effective uid via `id -u`.
fn effective_uid() -> Option<u32> {
    Cmd::new("id")
        .arg("-u")
        .allow_fail()
        .run()
        .ok()
        .filter(|r| r.success())
        .and_then(|r| r.stdout.trim().parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_uid_resolves() {
        assert!(effective_uid().is_some());
    }

    #[test]
    fn test_check_privilege_has_name() {
        let result = check_privilege();
        assert_eq!(result.name, "Privilege");
    }
}
