//! Virtual environment lifecycle.
//!
//! The venv is a directory; existence is the only tracked state. An
//! existing environment is reused as-is on re-runs, `--force` deletes and
//! recreates it, and a fresh run creates it from scratch. The activation
//! entry point is validated separately so a half-created environment is
//! caught before anything tries to use it.

use crate::config::VENV_DIR;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::process::Cmd;

/// What `ensure` did to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenvOutcome {
    /// No environment existed; a fresh one was created.
    Created,
    /// An environment existed and was left untouched.
    Reused,
    /// An environment existed and was deleted and recreated (`--force`).
    Recreated,
}

/// Handle to the project's virtual environment directory.
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    /// Environment handle for a project directory.
    pub fn new(base_dir: &Path) -> Self {
        Self {
            root: base_dir.join(VENV_DIR),
        }
    }

    /// The environment directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the environment directory exists.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// The environment's interpreter.
    pub fn python(&self) -> PathBuf {
        self.root.join("bin").join("python")
    }

    /// The POSIX activation entry point.
    pub fn activate_entry(&self) -> PathBuf {
        self.root.join("bin").join("activate")
    }

    /// Whether the environment is usable: interpreter and activation
    /// entry point both present.
    pub fn is_ready(&self) -> bool {
        self.python().exists() && self.activate_entry().exists()
    }

    /// Delete the environment directory and everything in it.
    pub fn remove(&self) -> Result<()> {
        fs::remove_dir_all(&self.root)
            .with_context(|| format!("failed to remove {}", self.root.display()))
    }

    /// Create the environment with the given interpreter.
    pub fn create(&self, interpreter: &Path) -> Result<()> {
        Cmd::new(interpreter.to_path_buf())
            .args(["-m", "venv"])
            .arg_path(&self.root)
            .error_msg(format!(
                "Virtual environment creation failed.\n\
                 On Debian/Ubuntu the venv module is separate: sudo apt-get install python3-venv\n\
                 Then re-run 'capgen-setup setup --force'. Target was {}",
                self.root.display()
            ))
            .run_interactive()?;
        Ok(())
    }

    /// Create, reuse, or recreate the environment.
    ///
    /// Reuse is the no-op path that makes re-runs idempotent; only
    /// `force` ever deletes an existing environment.
    pub fn ensure(&self, interpreter: &Path, force: bool) -> Result<VenvOutcome> {
        if self.exists() {
            if !force {
                return Ok(VenvOutcome::Reused);
            }
            println!("Removing existing environment at {}...", self.root.display());
            self.remove()?;
            self.create(interpreter)?;
            return Ok(VenvOutcome::Recreated);
        }

        self.create(interpreter)?;
        Ok(VenvOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    /// A stand-in interpreter: `fake -m venv <dir>` lays out bin/python
    /// and bin/activate like the real module does.
    fn fake_python(dir: &Path) -> PathBuf {
        let script = dir.join("fake-python");
        fs::write(
            &script,
            "#!/bin/sh\n\
             dir=\"$3\"\n\
             mkdir -p \"$dir/bin\"\n\
             touch \"$dir/bin/activate\"\n\
             touch \"$dir/bin/activate.fish\"\n\
             cp \"$0\" \"$dir/bin/python\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    fn test_reuse_does_not_touch_existing() {
        let dir = tempdir().unwrap();
        let venv = VirtualEnv::new(dir.path());
        fs::create_dir_all(venv.root()).unwrap();
        let marker = venv.root().join("marker");
        fs::write(&marker, "keep me").unwrap();

        // interpreter path is irrelevant: reuse must not invoke it
        let outcome = venv
            .ensure(Path::new("/nonexistent/python"), false)
            .unwrap();
        assert_eq!(outcome, VenvOutcome::Reused);
        assert_eq!(fs::read_to_string(&marker).unwrap(), "keep me");
    }

    #[test]
    fn test_force_recreates_fresh() {
        let dir = tempdir().unwrap();
        let venv = VirtualEnv::new(dir.path());
        fs::create_dir_all(venv.root()).unwrap();
        let marker = venv.root().join("stale");
        fs::write(&marker, "old").unwrap();

        let python = fake_python(dir.path());
        let outcome = venv.ensure(&python, true).unwrap();
        assert_eq!(outcome, VenvOutcome::Recreated);
        assert!(!marker.exists(), "old contents must be gone");
        assert!(venv.is_ready());
    }

    #[test]
    fn test_create_when_absent() {
        let dir = tempdir().unwrap();
        let venv = VirtualEnv::new(dir.path());
        assert!(!venv.exists());

        let python = fake_python(dir.path());
        let outcome = venv.ensure(&python, false).unwrap();
        assert_eq!(outcome, VenvOutcome::Created);
        assert!(venv.is_ready());
    }

    #[test]
    fn test_not_ready_without_activation_entry() {
        let dir = tempdir().unwrap();
        let venv = VirtualEnv::new(dir.path());
        fs::create_dir_all(venv.root().join("bin")).unwrap();
        fs::write(venv.python(), "").unwrap();
        // activate missing
        assert!(!venv.is_ready());
    }
}
