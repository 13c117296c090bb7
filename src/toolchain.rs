//! Optional toolchain installation.
//!
//! The generator degrades feature-wise without these: no LaTeX means no
//! PDF rendering, no FFmpeg means no audio post-processing, no gcloud
//! means Application Default Credentials cannot be refreshed locally.
//! Nothing here is ever fatal; every failed path ends in printed
//! manual-install instructions.

use crate::pm::{install_with_fallback, InstallOutcome, PackageManager};
use crate::process::which;
use crate::prompt::Consent;
use anyhow::Result;

/// An optional external program the generator can take advantage of.
pub struct Toolchain {
    /// Display name.
    pub name: &'static str,
    /// Binary probed to detect an existing install.
    pub binary: &'static str,
    /// What the generator uses it for.
    pub purpose: &'static str,
    /// Manual-install instructions, printed whenever automation gives up.
    pub manual_hint: &'static str,
    /// Package names per manager; `None` means this manager cannot
    /// provide the toolchain and is skipped.
    pub packages: fn(PackageManager) -> Option<&'static [&'static str]>,
}

/// What happened to a toolchain during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainStatus {
    /// The binary was already on the host.
    AlreadyPresent,
    /// An installer ran and the binary is now available.
    Installed,
    /// The operator passed the skip flag; never probed or prompted.
    Skipped,
    /// The operator declined the install prompt.
    Declined,
    /// Every install path failed; manual instructions were printed.
    Unavailable,
}

impl ToolchainStatus {
    /// Short label for the summary report.
    pub fn label(&self) -> &'static str {
        match self {
            ToolchainStatus::AlreadyPresent => "already installed",
            ToolchainStatus::Installed => "installed",
            ToolchainStatus::Skipped => "skipped",
            ToolchainStatus::Declined => "declined",
            ToolchainStatus::Unavailable => "unavailable (manual install needed)",
        }
    }

    /// Whether the toolchain ended up usable.
    pub fn is_available(&self) -> bool {
        matches!(
            self,
            ToolchainStatus::AlreadyPresent | ToolchainStatus::Installed
        )
    }
}

/// LaTeX distribution providing `pdflatex`.
pub const LATEX: Toolchain = Toolchain {
    name: "LaTeX",
    binary: "pdflatex",
    purpose: "render capsule PDFs",
    manual_hint: "Install TeX Live: https://www.tug.org/texlive/",
    packages: latex_packages,
};

/// FFmpeg for audio transcoding.
pub const FFMPEG: Toolchain = Toolchain {
    name: "FFmpeg",
    binary: "ffmpeg",
    purpose: "transcode narration audio",
    manual_hint: "Install FFmpeg: https://ffmpeg.org/download.html",
    packages: ffmpeg_packages,
};

/// Google Cloud CLI for Application Default Credentials.
pub const GCLOUD: Toolchain = Toolchain {
    name: "Google Cloud CLI",
    binary: "gcloud",
    purpose: "authenticate against GCP (Text-to-Speech)",
    manual_hint: "Install the Google Cloud CLI: https://cloud.google.com/sdk/docs/install",
    packages: gcloud_packages,
};

/// Every optional toolchain, in setup order.
pub const OPTIONAL_TOOLCHAINS: &[Toolchain] = &[LATEX, FFMPEG, GCLOUD];

fn latex_packages(pm: PackageManager) -> Option<&'static [&'static str]> {
    match pm {
        PackageManager::Apt => Some(&["texlive-latex-extra"]),
        PackageManager::Dnf => Some(&["texlive-latex"]),
        PackageManager::Pacman => Some(&["texlive-basic", "texlive-latexextra"]),
        PackageManager::Brew => Some(&["--cask", "mactex-no-gui"]),
    }
}

fn ffmpeg_packages(_pm: PackageManager) -> Option<&'static [&'static str]> {
    // every supported manager ships it under the same name
    Some(&["ffmpeg"])
}

fn gcloud_packages(pm: PackageManager) -> Option<&'static [&'static str]> {
    match pm {
        // apt/dnf need Google's own repository first; that is a manual step
        PackageManager::Apt | PackageManager::Dnf | PackageManager::Pacman => None,
        PackageManager::Brew => Some(&["--cask", "google-cloud-sdk"]),
    }
}

/// Detect, prompt, and install one optional toolchain.
///
/// Order of decisions: skip flag, existing binary, operator consent
/// (default decline), then each package manager in order. Soft-fails
/// only; the pipeline continues whatever happens here.
pub fn ensure(
    tc: &Toolchain,
    skip: bool,
    managers: &[PackageManager],
    consent: &mut dyn Consent,
) -> Result<ToolchainStatus> {
    if skip {
        println!("[SKIP] {} (skip flag set)", tc.name);
        return Ok(ToolchainStatus::Skipped);
    }

    if let Some(path) = which(tc.binary) {
        println!("[SKIP] {} already installed ({})", tc.name, path.display());
        return Ok(ToolchainStatus::AlreadyPresent);
    }

    let question = format!(
        "{} ({}) is not installed; the generator uses it to {}. Install it now?",
        tc.name, tc.binary, tc.purpose
    );
    if !consent.confirm(&question)? {
        println!("  Skipping {}. {}", tc.name, tc.manual_hint);
        return Ok(ToolchainStatus::Declined);
    }

    match install_with_fallback(managers, tc.packages) {
        InstallOutcome::Installed | InstallOutcome::AlreadyPresent => {
            // Trust the probe, not the installer's exit code
            if which(tc.binary).is_some() {
                println!("  {} installed.", tc.name);
                Ok(ToolchainStatus::Installed)
            } else {
                println!(
                    "  [WARN] Installer reported success but {} is still not in PATH.\n\
                     \x20        {}",
                    tc.binary, tc.manual_hint
                );
                Ok(ToolchainStatus::Unavailable)
            }
        }
        InstallOutcome::Failed(reason) => {
            println!(
                "  [WARN] Could not install {} ({}).\n\
                 \x20        {}",
                tc.name, reason, tc.manual_hint
            );
            Ok(ToolchainStatus::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedConsent;

    /// Consent source that fails the test if it is ever consulted.
    struct NeverAsked;

    impl Consent for NeverAsked {
        fn confirm(&mut self, question: &str) -> Result<bool> {
            panic!("consent must not be requested, got: {}", question);
        }
    }

    fn ghost_toolchain() -> Toolchain {
        Toolchain {
            name: "Ghost",
            binary: "definitely_not_a_real_command_12345",
            purpose: "nothing",
            manual_hint: "no hint",
            packages: |_| None,
        }
    }

    #[test]
    fn test_skip_flag_short_circuits() {
        let tc = ghost_toolchain();
        let status = ensure(&tc, true, &[], &mut NeverAsked).unwrap();
        assert_eq!(status, ToolchainStatus::Skipped);
    }

    #[test]
    fn test_existing_binary_short_circuits() {
        let tc = Toolchain {
            name: "Shell",
            binary: "sh",
            purpose: "exist",
            manual_hint: "no hint",
            packages: |_| None,
        };
        let status = ensure(&tc, false, &[], &mut NeverAsked).unwrap();
        assert_eq!(status, ToolchainStatus::AlreadyPresent);
    }

    #[test]
    fn test_decline_runs_no_installer() {
        let tc = ghost_toolchain();
        let mut consent = ScriptedConsent::new(vec![false]);
        let status = ensure(&tc, false, &PackageManager::ALL, &mut consent).unwrap();
        assert_eq!(status, ToolchainStatus::Declined);
    }

    #[test]
    fn test_accept_without_candidates_is_unavailable() {
        let tc = ghost_toolchain();
        let mut consent = ScriptedConsent::new(vec![true]);
        let status = ensure(&tc, false, &[], &mut consent).unwrap();
        assert_eq!(status, ToolchainStatus::Unavailable);
    }

    #[test]
    fn test_every_toolchain_has_some_package_source() {
        // each toolchain must be installable through at least one manager
        for tc in OPTIONAL_TOOLCHAINS {
            let any = PackageManager::ALL
                .iter()
                .any(|&pm| (tc.packages)(pm).is_some());
            assert!(any, "{} has no install candidates at all", tc.name);
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ToolchainStatus::Skipped.label(), "skipped");
        assert!(ToolchainStatus::Installed.is_available());
        assert!(!ToolchainStatus::Declined.is_available());
    }
}
