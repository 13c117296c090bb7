//! Operator confirmation prompts.
//!
//! Optional installs ask before touching the system. The pipeline talks to
//! a [`Consent`] trait so it can run against a real terminal, a blanket
//! `--yes`, or a pre-recorded answer source in tests.

use anyhow::Result;
use dialoguer::Confirm;

/// Answer source for yes/no questions.
pub trait Consent {
    /// Ask a yes/no question. Implementations decide how the answer is
    /// obtained; decline is always the safe default.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interactive terminal prompts. Default answer is decline.
pub struct TerminalConsent;

impl Consent for TerminalConsent {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Answers every question affirmatively (`--yes`).
pub struct AssumeYes;

impl Consent for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Pre-recorded answers, consumed in order. Once exhausted, every further
/// question is declined.
pub struct ScriptedConsent {
    answers: Vec<bool>,
    next: usize,
}

impl ScriptedConsent {
    pub fn new(answers: Vec<bool>) -> Self {
        Self { answers, next: 0 }
    }
}

impl Consent for ScriptedConsent {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        let answer = self.answers.get(self.next).copied().unwrap_or(false);
        self.next += 1;
        Ok(answer)
    }
}
