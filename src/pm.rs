//! Package manager detection and install strategy.
//!
//! Installs go through whatever package managers the host actually has,
//! tried in preference order. Each attempt returns a structured
//! [`InstallOutcome`] so callers can fall through to the next candidate
//! instead of unwinding on the first failure.
//!
//! When no package manager is present at all, the bootstrap can offer to
//! install Homebrew (the one manager that self-installs on both Linux and
//! macOS); on decline or failure the pipeline degrades to manual-install
//! mode rather than aborting.

use crate::config::HOMEBREW_INSTALL_URL;
use crate::process::{exists, Cmd};
use crate::prompt::Consent;
use anyhow::Result;
use std::fmt;

/// A package manager the bootstrap knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Brew,
}

/// Result of a single install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The installer ran and reported success.
    Installed,
    /// The target was already present; no installer was invoked.
    AlreadyPresent,
    /// The installer ran and failed, or could not be invoked.
    Failed(String),
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Brew => "brew",
        })
    }
}

impl PackageManager {
    /// All supported managers, in preference order.
    pub const ALL: [PackageManager; 4] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Pacman,
        PackageManager::Brew,
    ];

    /// Binary probed to detect this manager.
    fn probe_binary(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Brew => "brew",
        }
    }

    /// Whether this manager is present on the host.
    pub fn is_available(&self) -> bool {
        exists(self.probe_binary())
    }

    /// Detect every available manager, in preference order.
    pub fn detect_all() -> Vec<PackageManager> {
        Self::ALL.into_iter().filter(|pm| pm.is_available()).collect()
    }

    /// Install packages through this manager.
    ///
    /// System managers run under sudo; the operator gets the password
    /// prompt on their terminal. Output streams through so the operator
    /// can watch what the installer is doing.
    pub fn install(&self, packages: &[&str]) -> InstallOutcome {
        let result = match self {
            PackageManager::Apt => Cmd::new("sudo")
                .args(["apt-get", "install", "-y"])
                .args(packages.iter().copied())
                .allow_fail()
                .run_interactive(),
            PackageManager::Dnf => Cmd::new("sudo")
                .args(["dnf", "install", "-y"])
                .args(packages.iter().copied())
                .allow_fail()
                .run_interactive(),
            PackageManager::Pacman => Cmd::new("sudo")
                .args(["pacman", "-S", "--noconfirm", "--needed"])
                .args(packages.iter().copied())
                .allow_fail()
                .run_interactive(),
            PackageManager::Brew => Cmd::new("brew")
                .arg("install")
                .args(packages.iter().copied())
                .allow_fail()
                .run_interactive(),
        };

        match result {
            Ok(r) if r.success() => InstallOutcome::Installed,
            Ok(r) => InstallOutcome::Failed(format!(
                "{} exited with code {}",
                self,
                r.code().map_or_else(|| "?".to_string(), |c| c.to_string())
            )),
            Err(e) => InstallOutcome::Failed(format!("{:#}", e)),
        }
    }
}

/// Try each manager in order until one succeeds.
///
/// `packages_for` maps a manager to the package names it should install;
/// `None` means the manager has no package for this target and is skipped.
/// Returns `Failed` only after every candidate was attempted.
pub fn install_with_fallback(
    managers: &[PackageManager],
    packages_for: impl Fn(PackageManager) -> Option<&'static [&'static str]>,
) -> InstallOutcome {
    let mut last_failure = String::from("no package manager available");

    for &pm in managers {
        let Some(packages) = packages_for(pm) else {
            continue;
        };
        println!("  Trying {} install: {}", pm, packages.join(" "));
        match pm.install(packages) {
            InstallOutcome::Installed => return InstallOutcome::Installed,
            InstallOutcome::AlreadyPresent => return InstallOutcome::AlreadyPresent,
            InstallOutcome::Failed(reason) => {
                println!("  [WARN] {} install failed: {}", pm, reason);
                last_failure = reason;
            }
        }
    }

    InstallOutcome::Failed(last_failure)
}

/// Offer to bootstrap Homebrew when no package manager is present.
///
/// Returns true if Homebrew ended up available. Never fatal: a decline or
/// a failed install just leaves the pipeline in manual-install mode.
pub fn bootstrap_helper_manager(consent: &mut dyn Consent) -> Result<bool> {
    if PackageManager::Brew.is_available() {
        return Ok(true);
    }

    let wanted = consent.confirm(
        "No package manager found. Install Homebrew to enable automatic installs?",
    )?;
    if !wanted {
        println!("  Skipping Homebrew. Optional tools will need manual installation.");
        return Ok(false);
    }

    println!("  Installing Homebrew...");
    let result = Cmd::new("bash")
        .arg("-c")
        .arg(format!("curl -fsSL {} | bash", HOMEBREW_INSTALL_URL))
        .allow_fail()
        .run_interactive()?;

    if !result.success() {
        println!(
            "  [WARN] Homebrew install failed. Continuing in manual-install mode.\n\
             \x20        See https://brew.sh/ for instructions."
        );
        return Ok(false);
    }

    Ok(PackageManager::Brew.is_available())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_all_subset_of_all() {
        let detected = PackageManager::detect_all();
        for pm in &detected {
            assert!(PackageManager::ALL.contains(pm));
        }
    }

    #[test]
    fn test_fallback_empty_managers_fails() {
        let outcome = install_with_fallback(&[], |_| Some(&["anything"][..]));
        assert!(matches!(outcome, InstallOutcome::Failed(_)));
    }

    #[test]
    fn test_fallback_skips_managers_without_package() {
        // Every manager maps to None, so nothing is attempted.
        let outcome = install_with_fallback(&PackageManager::ALL, |_| None);
        assert!(matches!(outcome, InstallOutcome::Failed(_)));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PackageManager::Apt.to_string(), "apt");
        assert_eq!(PackageManager::Brew.to_string(), "brew");
    }
}
