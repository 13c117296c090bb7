//! Environment bootstrap library for the capsule generator.
//!
//! The capsule generator is a Python pipeline (Excel ingestion, Gemini
//! prompting, Text-to-Speech synthesis, PDF rendering) that expects a
//! provisioned environment: a Python runtime, a virtual environment with
//! the manifest installed, optional LaTeX/FFmpeg/gcloud toolchains, and a
//! `.env` credential file. This crate detects, installs, and records all
//! of that.
//!
//! Every install step re-probes before acting, so the whole sequence is
//! safe to re-run; re-invocation is the retry mechanism.

pub mod activate;
pub mod config;
pub mod deps;
pub mod envfile;
pub mod pm;
pub mod preflight;
pub mod process;
pub mod prompt;
pub mod runtime;
pub mod selftest;
pub mod toolchain;
pub mod venv;
