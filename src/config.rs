//! Project-wide constants for the capsule generator environment.
//!
//! Everything the bootstrap provisions is named here: directory and file
//! layout, the minimum runtime version, download URLs for manual installs,
//! and the Python import set the self-test exercises.

/// Directory holding the Python virtual environment, relative to the
/// project root.
pub const VENV_DIR: &str = ".venv";

/// Credential file consumed by the generator, relative to the project root.
pub const ENV_FILE: &str = ".env";

/// Dependency manifest consumed by pip.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Generated POSIX shell activation script.
pub const ACTIVATE_SH: &str = "activate.sh";

/// Generated fish shell activation script.
pub const ACTIVATE_FISH: &str = "activate.fish";

/// Entry point of the generator itself.
pub const GENERATOR_ENTRY: &str = "main.py";

/// Minimum supported Python version (major, minor).
pub const PYTHON_MIN_VERSION: (u32, u32) = (3, 9);

/// Environment variable overriding the Python interpreter path.
pub const PYTHON_PATH_ENV: &str = "CAPGEN_PYTHON";

/// Manual install URL printed when no package manager can provide Python.
pub const PYTHON_DOWNLOAD_URL: &str = "https://www.python.org/downloads/";

/// Package index probed by the network preflight check.
pub const PYPI_INDEX_URL: &str = "https://pypi.org/simple/";

/// Homebrew bootstrap script, offered when no package manager is present.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Python modules the generator imports at startup, with the capability
/// each one provides. The self-test import-probes every entry.
pub const REQUIRED_IMPORTS: &[(&str, &str)] = &[
    ("pandas", "Excel row processing"),
    ("openpyxl", "Excel workbook parsing"),
    ("requests", "Source URL fetching"),
    ("bs4", "HTML content extraction"),
    ("dotenv", "Credential file loading"),
    ("google.generativeai", "Gemini content generation"),
    ("google.cloud.texttospeech", "Audio narration synthesis"),
];

/// Template written to `.env` when the file does not exist yet.
///
/// Never written over an existing file; the operator's edits are preserved
/// byte-for-byte across re-runs.
pub const ENV_TEMPLATE: &str = "\
# Capsule generator configuration

# Gemini API key (required)
GOOGLE_API_KEY=your_gemini_api_key_here

# Path to the GCP service account key (optional if gcloud is configured)
GOOGLE_APPLICATION_CREDENTIALS=/path/to/your/service-account-key.json

# Logging configuration (optional)
LOG_LEVEL=INFO
";
