//! The `.env` credential file.
//!
//! Materialized from a template only when absent; an existing file is
//! never touched, so operator edits survive every re-run byte-for-byte.
//! Parsing yields an explicit ordered map that gets handed to child
//! processes; this crate never mutates its own process environment.

use crate::config::{ENV_FILE, ENV_TEMPLATE};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parsed `.env` contents: an ordered key=value map.
#[derive(Debug, Default)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Parse `.env`-style content.
    ///
    /// Blank lines and lines whose first non-whitespace character is `#`
    /// are skipped; everything else must be `KEY=VALUE`. Lines without a
    /// `=` are ignored rather than rejected, matching how the generated
    /// activation scripts behave.
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                entries.push((key.to_string(), value.trim().to_string()));
            }
        }
        Self { entries }
    }

    /// Load and parse an existing file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Look up a value by key. Later duplicates win, like a shell export.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the file defined any variables at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write the `.env` template if and only if the file does not exist.
///
/// Returns true when the file was created this run.
pub fn materialize(base_dir: &Path) -> Result<bool> {
    let path = base_dir.join(ENV_FILE);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, ENV_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let env = EnvFile::parse("# a comment\n\nLOG_LEVEL=DEBUG\n");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("LOG_LEVEL"), Some("DEBUG"));
    }

    #[test]
    fn test_parse_ignores_lines_without_equals() {
        let env = EnvFile::parse("not a pair\nKEY=value\n");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("KEY"), Some("value"));
    }

    #[test]
    fn test_parse_keeps_equals_in_value() {
        let env = EnvFile::parse("TOKEN=abc=def\n");
        assert_eq!(env.get("TOKEN"), Some("abc=def"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let env = EnvFile::parse("K=one\nK=two\n");
        assert_eq!(env.get("K"), Some("two"));
    }

    #[test]
    fn test_materialize_creates_once() {
        let dir = tempdir().unwrap();
        assert!(materialize(dir.path()).unwrap());
        assert!(!materialize(dir.path()).unwrap());
    }

    #[test]
    fn test_materialize_never_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(ENV_FILE);
        let custom = "GOOGLE_API_KEY=real-key\nLOG_LEVEL=DEBUG\n";
        fs::write(&path, custom).unwrap();

        assert!(!materialize(dir.path()).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), custom);
    }

    #[test]
    fn test_template_round_trips() {
        let dir = tempdir().unwrap();
        materialize(dir.path()).unwrap();
        let env = EnvFile::load(&dir.path().join(ENV_FILE)).unwrap();
        assert!(env.get("GOOGLE_API_KEY").is_some());
        assert!(env.get("GOOGLE_APPLICATION_CREDENTIALS").is_some());
        assert_eq!(env.get("LOG_LEVEL"), Some("INFO"));
    }
}
