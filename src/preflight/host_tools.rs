//! Host tool validation for the capsule generator environment.
//!
//! Checks that the runtime and the optional toolchain binaries are
//! installed and executable. Only the runtime is required here; missing
//! toolchains show up as warnings because the generator degrades
//! feature-wise without them.

use super::CheckResult;
use crate::process::which;
use crate::toolchain::OPTIONAL_TOOLCHAINS;

/// Check the Python runtime and every optional toolchain binary.
pub fn check_host_tools() -> Vec<CheckResult> {
    let mut results = vec![check_python()];
    results.extend(
        OPTIONAL_TOOLCHAINS
            .iter()
            .map(|tc| check_optional(tc.binary, tc.name, tc.purpose)),
    );
    results
}

fn check_python() -> CheckResult {
    for candidate in ["python3", "python"] {
        if let Some(path) = which(candidate) {
            return CheckResult::pass(
                "Python runtime",
                format!("Found {} at {}", candidate, path.display()),
            );
        }
    }
    CheckResult::fail(
        "Python runtime",
        "Neither python3 nor python found in PATH",
        format!("Install Python or see {}", crate::config::PYTHON_DOWNLOAD_URL),
    )
}

fn check_optional(binary: &str, name: &str, purpose: &str) -> CheckResult {
    match which(binary) {
        Some(path) => CheckResult::pass(
            format!("{} tool", name),
            format!("Found {} at {} ({})", binary, path.display(), purpose),
        ),
        None => CheckResult::warn(
            format!("{} tool", name),
            format!("{} not found (optional, needed for: {})", binary, purpose),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_host_tools_covers_all_toolchains() {
        let results = check_host_tools();
        // one runtime check plus one per optional toolchain
        assert_eq!(results.len(), 1 + OPTIONAL_TOOLCHAINS.len());
    }

    #[test]
    fn test_optional_missing_is_warning_not_failure() {
        let result = check_optional("definitely_not_a_real_command_12345", "Ghost", "nothing");
        assert!(result.passed);
        assert!(result.message.contains("not found"));
    }
}
