//! Python runtime detection and installation.
//!
//! This module implements a 3-tier resolution pattern for the interpreter:
//!
//! 1. **Environment variable**: override path via `CAPGEN_PYTHON`
//! 2. **PATH probe**: `python3`, then the alternate launcher `python`
//! 3. **Install**: via the detected package managers, in order
//!
//! Python is the one required external dependency. When no tier yields a
//! usable interpreter the bootstrap aborts with the manual-install URL.

use crate::config::{PYTHON_DOWNLOAD_URL, PYTHON_MIN_VERSION, PYTHON_PATH_ENV};
use crate::pm::{install_with_fallback, InstallOutcome, PackageManager};
use crate::process::{which, Cmd};
use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};

/// A resolved Python interpreter.
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    /// Full path to the interpreter.
    pub path: PathBuf,
    /// Version reported by `--version`.
    pub version: (u32, u32, u32),
}

impl PythonRuntime {
    /// Version as a display string.
    pub fn version_string(&self) -> String {
        let (major, minor, patch) = self.version;
        format!("{}.{}.{}", major, minor, patch)
    }

    /// Whether this interpreter meets the minimum supported version.
    pub fn is_supported(&self) -> bool {
        (self.version.0, self.version.1) >= PYTHON_MIN_VERSION
    }
}

/// Find a Python interpreter without installing anything.
pub fn find_python() -> Option<PythonRuntime> {
    // Tier 1: environment variable
    if let Ok(path) = env::var(PYTHON_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            if let Some(version) = probe_version(&path) {
                return Some(PythonRuntime { path, version });
            }
        }
    }

    // Tier 2: PATH, preferring python3 over the bare launcher
    for candidate in ["python3", "python"] {
        if let Some(path) = which(candidate) {
            if let Some(version) = probe_version(&path) {
                return Some(PythonRuntime { path, version });
            }
        }
    }

    None
}

/// Resolve a supported Python interpreter, installing one if necessary.
pub fn ensure_python(managers: &[PackageManager]) -> Result<PythonRuntime> {
    if let Some(python) = find_python() {
        if python.is_supported() {
            println!(
                "[SKIP] Python {} already installed at {}",
                python.version_string(),
                python.path.display()
            );
            return Ok(python);
        }
        bail!(
            "Python {} at {} is too old (need {}.{}+).\n\
             Upgrade it through your package manager, or point {} at a newer interpreter.",
            python.version_string(),
            python.path.display(),
            PYTHON_MIN_VERSION.0,
            PYTHON_MIN_VERSION.1,
            PYTHON_PATH_ENV
        );
    }

    println!("Python not found, attempting install...");
    match install_with_fallback(managers, python_packages) {
        InstallOutcome::Installed | InstallOutcome::AlreadyPresent => {}
        InstallOutcome::Failed(reason) => bail!(
            "Could not install Python ({}).\n\
             Install it manually: {}\n\
             Then re-run 'capgen-setup setup'.",
            reason,
            PYTHON_DOWNLOAD_URL
        ),
    }

    // Re-probe: the install step must never be trusted blindly
    match find_python() {
        Some(python) if python.is_supported() => {
            println!(
                "Python {} installed at {}",
                python.version_string(),
                python.path.display()
            );
            Ok(python)
        }
        Some(python) => bail!(
            "Installed Python {} is below the supported minimum {}.{}.\n\
             Install a newer version manually: {}",
            python.version_string(),
            PYTHON_MIN_VERSION.0,
            PYTHON_MIN_VERSION.1,
            PYTHON_DOWNLOAD_URL
        ),
        None => bail!(
            "Python still not found after install.\n\
             Install it manually: {}",
            PYTHON_DOWNLOAD_URL
        ),
    }
}

/// Packages that provide Python per manager. Debian-family systems split
/// the venv module out of the interpreter package.
fn python_packages(pm: PackageManager) -> Option<&'static [&'static str]> {
    match pm {
        PackageManager::Apt => Some(&["python3", "python3-venv", "python3-pip"]),
        PackageManager::Dnf => Some(&["python3", "python3-pip"]),
        PackageManager::Pacman => Some(&["python"]),
        PackageManager::Brew => Some(&["python"]),
    }
}

/// Get version of an interpreter by running `<python> --version`.
fn probe_version(path: &Path) -> Option<(u32, u32, u32)> {
    let result = Cmd::new(path.to_path_buf())
        .arg("--version")
        .allow_fail()
        .run()
        .ok()?;
    if !result.success() {
        return None;
    }

    // Python 2 printed the version to stderr; tolerate both streams
    let output = if result.stdout.trim().is_empty() {
        result.stderr
    } else {
        result.stdout
    };
    extract_version(&output)
}

/// Extract a version triple from `--version` output.
///
/// Handles "Python 3.11.4" as well as pre-release suffixes like
/// "Python 3.13.0rc1" (the suffix is ignored).
fn extract_version(output: &str) -> Option<(u32, u32, u32)> {
    let re = regex::Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").ok()?;
    let caps = re.captures(output)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version("Python 3.11.4"), Some((3, 11, 4)));
        assert_eq!(extract_version("Python 3.9"), Some((3, 9, 0)));
        assert_eq!(extract_version("Python 3.13.0rc1"), Some((3, 13, 0)));
        assert_eq!(extract_version("no digits here"), None);
    }

    #[test]
    fn test_supported_boundary() {
        let old = PythonRuntime {
            path: PathBuf::from("/usr/bin/python"),
            version: (3, 8, 18),
        };
        assert!(!old.is_supported());

        let minimum = PythonRuntime {
            path: PathBuf::from("/usr/bin/python3"),
            version: (3, 9, 0),
        };
        assert!(minimum.is_supported());
    }

    #[test]
    fn test_version_string() {
        let rt = PythonRuntime {
            path: PathBuf::from("/usr/bin/python3"),
            version: (3, 12, 1),
        };
        assert_eq!(rt.version_string(), "3.12.1");
    }
}
