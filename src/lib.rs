//! # Kit Statusline
//!
//! Renders a single-line status summary for an interactive coding-assistant session
//! from the JSON payload the host writes to stdin.
//!
//! ## Overview
//!
//! The line is built from, in order:
//! - Git branch with a `*` dirty marker
//! - Shortened working directory
//! - Active model name
//! - Session cost and elapsed time
//! - Context window usage bar
//!
//! Every failure (unreadable stdin, malformed JSON, missing git) drops the affected
//! segment instead of aborting, so the binary always prints a line and exits 0.
//!
//! ## Features
//!
//! - `gix`: Enables the in-process git backend via gix

/// Command-line flags and environment configuration
pub mod cli;

/// Segment styling and line assembly
pub mod display;

/// Git repository inspection
pub mod git;

/// Hook payload and extracted fields
pub mod models;

/// Path, duration, currency and progress-bar formatting
pub mod utils;
