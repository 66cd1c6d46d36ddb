use std::time::Duration;

use clap::error::ErrorKind;

use crate::utils::{DEFAULT_BAR_WIDTH, MAX_BAR_WIDTH};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitBackendArg {
    /// Run the `git` executable (default)
    Command,
    /// Read the repository in-process with gix
    #[cfg(feature = "gix")]
    Gix,
}

#[derive(clap::Parser, Debug)]
#[command(version, about = "Single-line status summary for a coding-assistant session")]
pub struct Args {
    /// Emit plain text without ANSI styling (also honored via NO_COLOR)
    #[arg(long)]
    pub no_color: bool,

    /// Number of cells in the context usage bar (0-200)
    #[arg(
        long,
        env = "STATUSLINE_BAR_WIDTH",
        default_value_t = DEFAULT_BAR_WIDTH,
        value_parser = clap::value_parser!(u16).range(0..=MAX_BAR_WIDTH as i64)
    )]
    pub bar_width: u16,

    /// Git inspector implementation
    #[arg(long, env = "STATUSLINE_GIT_BACKEND", value_enum, default_value_t = GitBackendArg::Command)]
    pub git_backend: GitBackendArg,

    /// Per-process wait limit for git queries in milliseconds (0 waits indefinitely)
    #[arg(long, env = "STATUSLINE_GIT_TIMEOUT_MS", default_value_t = 2000)]
    pub git_timeout_ms: u64,

    /// Emit JSON instead of the colored line
    #[arg(long)]
    pub json: bool,

    /// Debug mode: log recovered failures and git timings to stderr
    #[arg(long, env = "STATUSLINE_DEBUG")]
    pub debug: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            no_color: false,
            bar_width: DEFAULT_BAR_WIDTH,
            git_backend: GitBackendArg::Command,
            git_timeout_ms: 2000,
            json: false,
            debug: false,
        }
    }
}

impl Args {
    /// Parse process arguments without ever failing the run.
    ///
    /// `--help` and `--version` print and exit; any other argument error falls back to
    /// defaults so the status line is still drawn.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match <Args as clap::Parser>::try_parse_from(args) {
            Ok(args) => args,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            }
            Err(_) => Self::default(),
        }
    }

    pub fn bar_width(&self) -> usize {
        usize::from(self.bar_width)
    }

    pub fn git_timeout(&self) -> Option<Duration> {
        (self.git_timeout_ms > 0).then(|| Duration::from_millis(self.git_timeout_ms))
    }

    /// Color is off with `--no-color` or when `NO_COLOR` is set to anything non-empty.
    pub fn color_enabled(&self) -> bool {
        if self.no_color {
            return false;
        }
        !std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
    }
}
