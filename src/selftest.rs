//! Post-install self-test.
//!
//! Import-probes every library the generator needs through the venv
//! interpreter and re-probes the optional toolchain binaries. Individual
//! failures are reported, never fatal; the operator decides whether the
//! missing capability matters for their run.

use crate::config::REQUIRED_IMPORTS;
use crate::process::{which, Cmd};
use crate::toolchain::OPTIONAL_TOOLCHAINS;
use crate::venv::VirtualEnv;
use anyhow::{bail, Result};

/// Result of one import probe.
#[derive(Debug)]
pub struct ImportCheck {
    /// Python module name.
    pub module: &'static str,
    /// Capability the module provides.
    pub purpose: &'static str,
    /// Whether the import succeeded.
    pub ok: bool,
    /// First line of the import error, when it failed.
    pub detail: Option<String>,
}

/// Full self-test report.
#[derive(Debug)]
pub struct SelfTestReport {
    /// One entry per required library.
    pub imports: Vec<ImportCheck>,
    /// (name, binary, found) per optional toolchain.
    pub toolchains: Vec<(&'static str, &'static str, bool)>,
}

impl SelfTestReport {
    /// Whether every required library imported cleanly.
    pub fn imports_ok(&self) -> bool {
        self.imports.iter().all(|c| c.ok)
    }

    /// Print the report.
    pub fn print(&self) {
        println!("Library imports:");
        for check in &self.imports {
            let status = if check.ok { "[OK]" } else { "[FAIL]" };
            println!("  {} {} ({})", status, check.module, check.purpose);
            if let Some(detail) = &check.detail {
                println!("       {}", detail);
            }
        }

        println!();
        println!("Optional toolchains:");
        for (name, binary, found) in &self.toolchains {
            let status = if *found { "[available]" } else { "[missing]" };
            println!("  {}  {} ({})", status, name, binary);
        }

        println!();
        if self.imports_ok() {
            println!("All required libraries import cleanly.");
        } else {
            let failed = self.imports.iter().filter(|c| !c.ok).count();
            println!(
                "{} of {} required libraries failed to import. Re-run \
                 'capgen-setup setup' after fixing the cause above.",
                failed,
                self.imports.len()
            );
        }
    }
}

/// Run the self-test against a provisioned environment.
pub fn run(venv: &VirtualEnv) -> Result<SelfTestReport> {
    if !venv.is_ready() {
        bail!(
            "Virtual environment not found at {}.\n\
             Run 'capgen-setup setup' first.",
            venv.root().display()
        );
    }

    let mut imports = Vec::new();
    for &(module, purpose) in REQUIRED_IMPORTS {
        imports.push(probe_import(venv, module, purpose)?);
    }

    let toolchains = OPTIONAL_TOOLCHAINS
        .iter()
        .map(|tc| (tc.name, tc.binary, which(tc.binary).is_some()))
        .collect();

    Ok(SelfTestReport {
        imports,
        toolchains,
    })
}

fn probe_import(venv: &VirtualEnv, module: &'static str, purpose: &'static str) -> Result<ImportCheck> {
    let result = Cmd::new(venv.python())
        .arg("-c")
        .arg(format!("import {}", module))
        .allow_fail()
        .run()?;

    let ok = result.success();
    let detail = if ok {
        None
    } else {
        result
            .stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
    };

    Ok(ImportCheck {
        module,
        purpose,
        ok,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
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
    fn test_missing_venv_is_error() {
        let dir = tempdir().unwrap();
        let venv = VirtualEnv::new(dir.path());
        assert!(run(&venv).is_err());
    }

    #[test]
    fn test_all_imports_pass_with_working_interpreter() {
        let dir = tempdir().unwrap();
        let venv = venv_with_interpreter(dir.path(), "exit 0");

        let report = run(&venv).unwrap();
        assert_eq!(report.imports.len(), REQUIRED_IMPORTS.len());
        assert!(report.imports_ok());
    }

    #[test]
    fn test_import_failures_are_reported_not_fatal() {
        let dir = tempdir().unwrap();
        let venv = venv_with_interpreter(
            dir.path(),
            "echo \"ModuleNotFoundError: No module named 'pandas'\" >&2; exit 1",
        );

        let report = run(&venv).unwrap();
        assert!(!report.imports_ok());
        let first = &report.imports[0];
        assert!(!first.ok);
        assert!(first.detail.as_deref().unwrap_or("").contains("ModuleNotFoundError"));
    }

    #[test]
    fn test_toolchains_probed() {
        let dir = tempdir().unwrap();
        let venv = venv_with_interpreter(dir.path(), "exit 0");
        let report = run(&venv).unwrap();
        assert_eq!(report.toolchains.len(), OPTIONAL_TOOLCHAINS.len());
    }
}
