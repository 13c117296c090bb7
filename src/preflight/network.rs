//! Network connectivity check for the bootstrap.
//!
//! Verifies that the package index is reachable before dependency
//! installation. Unreachable is reported as a warning, not a failure:
//! a fully cached environment re-runs fine offline, and pip produces
//! its own diagnostic when it actually needs the network.

use super::CheckResult;
use crate::config::PYPI_INDEX_URL;

/// Check network connectivity to the package index.
///
/// Performs a HEAD request to verify the index is reachable.
pub async fn check_network() -> CheckResult {
    // A HEAD request via curl keeps the dependency surface small
    let result = tokio::process::Command::new("curl")
        .args([
            "--head",           // HEAD request only
            "--silent",         // No progress output
            "--fail",           // Fail on HTTP errors
            "--max-time", "10", // 10 second timeout
            "--output", "/dev/null",
            PYPI_INDEX_URL,
        ])
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => CheckResult::pass(
            "Network",
            format!("Package index reachable ({})", index_host()),
        ),
        Ok(_) => CheckResult::warn(
            "Network",
            format!(
                "Package index unreachable ({}); installs may fail",
                index_host()
            ),
        ),
        Err(e) => CheckResult::warn(
            "Network",
            format!("Failed to check network: {} (is curl installed?)", e),
        ),
    }
}

/// Extract just the host from the index URL for display.
fn index_host() -> &'static str {
    "pypi.org"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_host() {
        assert!(!index_host().is_empty());
    }
}
