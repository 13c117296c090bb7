//! Dependency installation from the manifest.
//!
//! The manifest (`requirements.txt`) is required: its absence is a fatal
//! error raised before pip is ever invoked. pip itself is upgraded first,
//! then the manifest is installed, both through the venv interpreter so
//! nothing leaks into the system site-packages.

use crate::config::REQUIREMENTS_FILE;
use crate::process::Cmd;
use crate::venv::VirtualEnv;
use anyhow::{bail, Result};
use std::path::Path;

/// Install the generator's dependencies into the virtual environment.
pub fn install(base_dir: &Path, venv: &VirtualEnv) -> Result<()> {
    let manifest = base_dir.join(REQUIREMENTS_FILE);
    if !manifest.exists() {
        bail!(
            "Dependency manifest not found at {}.\n\
             The generator ships a {} listing its libraries; run the setup\n\
             from the generator's project directory.",
            manifest.display(),
            REQUIREMENTS_FILE
        );
    }

    println!("Upgrading pip...");
    Cmd::new(venv.python())
        .args(["-m", "pip", "install", "--upgrade", "pip"])
        .error_msg("pip self-upgrade failed")
        .run_interactive()?;

    println!("Installing dependencies from {}...", REQUIREMENTS_FILE);
    Cmd::new(venv.python())
        .args(["-m", "pip", "install", "-r"])
        .arg_path(&manifest)
        .error_msg(format!(
            "Dependency installation failed.\n\
             Check {} for typos and your network connection, then re-run\n\
             'capgen-setup setup'.",
            REQUIREMENTS_FILE
        ))
        .run_interactive()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn venv_with_interpreter(base: &Path, body: &str) -> VirtualEnv {
        let venv = VirtualEnv::new(base);
        fs::create_dir_all(venv.root().join("bin")).unwrap();
        fs::write(venv.python(), format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(venv.python(), fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(venv.activate_entry(), "").unwrap();
        venv
    }

    #[test]
    fn test_missing_manifest_is_fatal_before_pip_runs() {
        let dir = tempdir().unwrap();
        // interpreter records an invocation marker so we can prove pip never ran
        let marker = dir.path().join("pip-ran");
        let venv = venv_with_interpreter(
            dir.path(),
            &format!("touch {}", marker.display()),
        );

        let err = install(dir.path(), &venv).unwrap_err();
        assert!(err.to_string().contains(REQUIREMENTS_FILE));
        assert!(!marker.exists(), "pip must not run without a manifest");
    }

    #[test]
    fn test_install_succeeds_with_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(REQUIREMENTS_FILE), "pandas\n").unwrap();
        let venv = venv_with_interpreter(dir.path(), "exit 0");

        assert!(install(dir.path(), &venv).is_ok());
    }

    #[test]
    fn test_installer_failure_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(REQUIREMENTS_FILE), "pandas\n").unwrap();
        let venv = venv_with_interpreter(dir.path(), "exit 1");

        assert!(install(dir.path(), &venv).is_err());
    }
}
