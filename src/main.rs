//! Capsule generator environment bootstrap CLI.
//!
//! Provisions everything the capsule generator needs on a developer
//! machine: the Python runtime, a virtual environment with the manifest
//! installed, optional LaTeX/FFmpeg/gcloud toolchains, the `.env`
//! credential file, and shell activation scripts.
//!
//! # Usage
//!
//! ```bash
//! # Provision the full environment
//! capgen-setup setup
//!
//! # Recreate the virtual environment from scratch
//! capgen-setup setup --force
//!
//! # Provision without the optional toolchains
//! capgen-setup setup --skip-latex --skip-ffmpeg
//!
//! # Show what is provisioned and what to run next
//! capgen-setup status
//!
//! # Import-check the installed libraries
//! capgen-setup check
//!
//! # Launch the generator inside the provisioned environment
//! capgen-setup run workbook.xlsx
//! ```
//!
//! Every step re-probes before acting; re-running after a failure is the
//! intended retry mechanism.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use capgen_setup::activate;
use capgen_setup::config::{ENV_FILE, GENERATOR_ENTRY, REQUIREMENTS_FILE, VENV_DIR};
use capgen_setup::deps;
use capgen_setup::envfile::{self, EnvFile};
use capgen_setup::pm::{self, PackageManager};
use capgen_setup::preflight::{check_network, check_privilege, PreflightChecker};
use capgen_setup::process::Cmd;
use capgen_setup::prompt::{AssumeYes, Consent, TerminalConsent};
use capgen_setup::runtime;
use capgen_setup::selftest::{self, SelfTestReport};
use capgen_setup::toolchain::{self, ToolchainStatus, FFMPEG, GCLOUD, LATEX};
use capgen_setup::venv::{VenvOutcome, VirtualEnv};

#[derive(Parser)]
#[command(name = "capgen-setup")]
#[command(author, version, about = "Capsule generator environment bootstrap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the environment (venv, dependencies, toolchains, config)
    Setup {
        /// Skip the LaTeX document toolchain
        #[arg(long)]
        skip_latex: bool,

        /// Skip the FFmpeg audio toolchain
        #[arg(long)]
        skip_ffmpeg: bool,

        /// Delete and recreate the virtual environment
        #[arg(long)]
        force: bool,

        /// Answer yes to every install prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show provision status and next steps
    Status,

    /// Import-check installed libraries and re-probe toolchains
    Check,

    /// Run the generator inside the provisioned environment
    Run {
        /// Arguments passed through to the generator (e.g. the workbook)
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Setup {
            skip_latex,
            skip_ffmpeg,
            force,
            yes,
        } => cmd_setup(skip_latex, skip_ffmpeg, force, yes).await,
        Commands::Status => cmd_status().await,
        Commands::Check => cmd_check(),
        Commands::Run { args } => cmd_run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Accumulated record of what setup did, for the final summary.
#[derive(Default)]
struct SetupSummary {
    created: Vec<String>,
    warnings: Vec<String>,
    toolchains: Vec<(&'static str, ToolchainStatus)>,
    env_created: bool,
}

impl SetupSummary {
    fn print(&self, selftest: &SelfTestReport) {
        println!("\n=== Setup Complete ===\n");

        if !self.created.is_empty() {
            println!("Created:");
            for file in &self.created {
                println!("  {}", file);
            }
            println!();
        }

        if !self.toolchains.is_empty() {
            println!("Optional toolchains:");
            for (name, status) in &self.toolchains {
                println!("  {:<18} {}", name, status.label());
            }
            println!();
        }

        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        if !self.warnings.is_empty() {
            println!();
        }

        println!("Manual steps remaining:");
        if self.env_created {
            println!("  1. Edit {} with your real Gemini key and GCP credentials", ENV_FILE);
        } else {
            println!("  1. Verify {} still holds valid credentials", ENV_FILE);
        }
        if !selftest.imports_ok() {
            println!("  2. Resolve the failed imports listed above, then 'capgen-setup check'");
        }
        println!();

        println!("Next:");
        println!("  . ./activate.sh");
        println!("  python {} <workbook.xlsx>", GENERATOR_ENTRY);
        println!("\nOr without activating a shell:");
        println!("  capgen-setup run <workbook.xlsx>");
    }
}

/// The bootstrap sequencer: a linear pipeline of idempotent steps.
///
/// Required-step failures abort with exit 1; optional-step failures are
/// reported and the pipeline keeps going.
async fn cmd_setup(skip_latex: bool, skip_ffmpeg: bool, force: bool, yes: bool) -> Result<()> {
    let base_dir = std::env::current_dir().context("failed to determine working directory")?;
    let mut consent: Box<dyn Consent> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConsent)
    };
    let mut summary = SetupSummary::default();

    println!("=== Capsule Generator Environment Setup ===\n");

    // 1. Privilege check - nothing below may run as root
    let privilege = check_privilege();
    if !privilege.passed {
        bail!(
            "{}.\n{}",
            privilege.message,
            privilege.suggestion.unwrap_or_default()
        );
    }

    let network = check_network().await;
    println!("{}: {}", network.name, network.message);

    // 2. Package manager probe, with optional Homebrew bootstrap
    let mut managers = PackageManager::detect_all();
    if managers.is_empty() {
        if pm::bootstrap_helper_manager(consent.as_mut())? {
            managers = PackageManager::detect_all();
        }
        if managers.is_empty() {
            summary
                .warnings
                .push("no package manager available; skipped installs need manual handling".into());
        }
    } else {
        let names: Vec<String> = managers.iter().map(|m| m.to_string()).collect();
        println!("Package managers: {}", names.join(", "));
    }

    // 3. Python runtime - the one required external dependency
    println!("\n--- Python runtime ---");
    let python = runtime::ensure_python(&managers)?;

    // 4. Virtual environment
    println!("\n--- Virtual environment ---");
    let venv = VirtualEnv::new(&base_dir);
    match venv.ensure(&python.path, force)? {
        VenvOutcome::Created => {
            println!("Created virtual environment at {}", venv.root().display());
            summary.created.push(format!("{}/", VENV_DIR));
        }
        VenvOutcome::Recreated => {
            println!("Recreated virtual environment at {}", venv.root().display());
            summary.created.push(format!("{}/", VENV_DIR));
        }
        VenvOutcome::Reused => {
            println!("[SKIP] Virtual environment already exists (use --force to recreate)");
        }
    }

    // 5. Activation entry point must exist before anything uses the venv
    if !venv.is_ready() {
        bail!(
            "Virtual environment at {} is missing its activation entry point.\n\
             The previous creation did not complete. Re-run with --force.",
            venv.root().display()
        );
    }

    // 6. Dependencies from the manifest
    println!("\n--- Dependencies ---");
    deps::install(&base_dir, &venv)?;

    // 7. Optional toolchains - soft failures only
    println!("\n--- Optional toolchains ---");
    let latex = toolchain::ensure(&LATEX, skip_latex, &managers, consent.as_mut())?;
    let ffmpeg = toolchain::ensure(&FFMPEG, skip_ffmpeg, &managers, consent.as_mut())?;
    let gcloud = toolchain::ensure(&GCLOUD, false, &managers, consent.as_mut())?;
    summary.toolchains = vec![
        (LATEX.name, latex),
        (FFMPEG.name, ffmpeg),
        (GCLOUD.name, gcloud),
    ];

    // 8. Configuration materialization
    println!("\n--- Configuration ---");
    if envfile::materialize(&base_dir)? {
        println!("Created {} (edit it with your real credentials)", ENV_FILE);
        summary.created.push(ENV_FILE.to_string());
        summary.env_created = true;
    } else {
        println!("[SKIP] {} already exists (left untouched)", ENV_FILE);
    }

    for script in activate::write_scripts(&base_dir)? {
        let name = script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| script.display().to_string());
        println!("Generated {}", name);
        summary.created.push(name);
    }

    // 9. Self-test - reported, never fatal
    println!("\n--- Self-test ---");
    let report = selftest::run(&venv)?;
    report.print();

    // 10. Summary
    summary.print(&report);

    Ok(())
}

async fn cmd_status() -> Result<()> {
    let base_dir = std::env::current_dir().context("failed to determine working directory")?;

    println!("Capsule Generator Setup Status");
    println!("==============================");
    println!();

    let checker = PreflightChecker::new(&base_dir);
    let report = checker.run_all().await;
    report.print_summary();
    println!();

    let p = &report.provision;
    println!("Next steps:");
    if !report.is_ok() {
        println!("  1. Resolve the failed checks above, then re-run 'capgen-setup status'");
    } else if !p.has_requirements {
        println!(
            "  1. Run from the generator's project directory ({} missing here)",
            REQUIREMENTS_FILE
        );
    } else if !p.has_venv {
        println!("  1. Run 'capgen-setup setup' to create the virtual environment");
    } else if !p.has_env_file {
        println!("  1. Run 'capgen-setup setup' to materialize {}", ENV_FILE);
    } else if !p.has_activate_sh || !p.has_activate_fish {
        println!("  1. Run 'capgen-setup setup' to regenerate the activation scripts");
    } else {
        println!("  Environment ready. Activate with '. ./activate.sh',");
        println!("  or launch directly: capgen-setup run <workbook.xlsx>");
    }

    Ok(())
}

fn cmd_check() -> Result<()> {
    let base_dir = std::env::current_dir().context("failed to determine working directory")?;
    let venv = VirtualEnv::new(&base_dir);

    println!("=== Self-Test ===\n");
    let report = selftest::run(&venv)?;
    report.print();

    Ok(())
}

/// Launch the generator with the venv interpreter and the parsed `.env`
/// handed to the child as an explicit environment map.
fn cmd_run(args: Vec<String>) -> Result<()> {
    let base_dir = std::env::current_dir().context("failed to determine working directory")?;
    let venv = VirtualEnv::new(&base_dir);

    if !venv.is_ready() {
        bail!(
            "Virtual environment not found at {}.\n\
             Run 'capgen-setup setup' first.",
            venv.root().display()
        );
    }

    let entry = base_dir.join(GENERATOR_ENTRY);
    if !entry.exists() {
        bail!(
            "Generator entry point {} not found in {}.\n\
             Run from the generator's project directory.",
            GENERATOR_ENTRY,
            base_dir.display()
        );
    }

    let config = load_env_map(&base_dir)?;

    let mut cmd = Cmd::new(venv.python()).arg_path(&entry).args(args).allow_fail();
    for (key, value) in config.iter() {
        cmd = cmd.env(key, value);
    }

    let result = cmd.run_interactive()?;
    if !result.success() {
        std::process::exit(result.code().unwrap_or(1));
    }
    Ok(())
}

/// Read `.env` if present; a missing file just means an empty map.
fn load_env_map(base_dir: &Path) -> Result<EnvFile> {
    let path: PathBuf = base_dir.join(ENV_FILE);
    if path.exists() {
        EnvFile::load(&path)
    } else {
        Ok(EnvFile::default())
    }
}
