//! Generated activation scripts.
//!
//! Two entry points are written into the project directory on every run,
//! overwritten unconditionally: `activate.sh` for POSIX shells and
//! `activate.fish` for fish. Each enables the virtual environment and
//! loads `.env` into the shell session, skipping comments and blank
//! lines exactly like [`crate::envfile::EnvFile::parse`] does.

use crate::config::{ACTIVATE_FISH, ACTIVATE_SH, ENV_FILE, GENERATOR_ENTRY, VENV_DIR};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write both activation scripts, returning the paths written.
pub fn write_scripts(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let sh = base_dir.join(ACTIVATE_SH);
    fs::write(&sh, sh_script()).with_context(|| format!("failed to write {}", sh.display()))?;
    make_executable(&sh)?;

    let fish = base_dir.join(ACTIVATE_FISH);
    fs::write(&fish, fish_script())
        .with_context(|| format!("failed to write {}", fish.display()))?;
    make_executable(&fish)?;

    Ok(vec![sh, fish])
}

fn sh_script() -> String {
    format!(
        "#!/bin/sh\n\
         # Generated by capgen-setup; overwritten on every setup run. Do not edit.\n\
         \n\
         echo \"=== Capsule generator environment ===\"\n\
         \n\
         if [ ! -f \"{venv}/bin/activate\" ]; then\n\
         \x20   echo \"error: virtual environment missing; run 'capgen-setup setup' first\" >&2\n\
         \x20   return 1 2>/dev/null || exit 1\n\
         fi\n\
         \n\
         . \"{venv}/bin/activate\"\n\
         \n\
         if [ -f \"{env}\" ]; then\n\
         \x20   while IFS= read -r line || [ -n \"$line\" ]; do\n\
         \x20       case \"$line\" in\n\
         \x20           ''|\\#*) continue ;;\n\
         \x20       esac\n\
         \x20       export \"$line\"\n\
         \x20   done < \"{env}\"\n\
         fi\n\
         \n\
         echo \"Environment ready.\"\n\
         echo \"Next: python {entry} <workbook.xlsx>\"\n",
        venv = VENV_DIR,
        env = ENV_FILE,
        entry = GENERATOR_ENTRY,
    )
}

fn fish_script() -> String {
    format!(
        "#!/usr/bin/env fish\n\
         # Generated by capgen-setup; overwritten on every setup run. Do not edit.\n\
         \n\
         echo \"=== Capsule generator environment ===\"\n\
         \n\
         if not test -f \"{venv}/bin/activate.fish\"\n\
         \x20   echo \"error: virtual environment missing; run 'capgen-setup setup' first\" >&2\n\
         \x20   exit 1\n\
         end\n\
         \n\
         source \"{venv}/bin/activate.fish\"\n\
         \n\
         if test -f \"{env}\"\n\
         \x20   for line in (cat \"{env}\")\n\
         \x20       set -l trimmed (string trim -- $line)\n\
         \x20       if test -z \"$trimmed\"\n\
         \x20           continue\n\
         \x20       end\n\
         \x20       if string match -q '#*' -- $trimmed\n\
         \x20           continue\n\
         \x20       end\n\
         \x20       set -l pair (string split -m 1 '=' -- $trimmed)\n\
         \x20       if test (count $pair) -eq 2\n\
         \x20           set -gx $pair[1] $pair[2]\n\
         \x20       end\n\
         \x20   end\n\
         end\n\
         \n\
         echo \"Environment ready.\"\n\
         echo \"Next: python {entry} <workbook.xlsx>\"\n",
        venv = VENV_DIR,
        env = ENV_FILE,
        entry = GENERATOR_ENTRY,
    )
}

/// Make a file executable.
fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
