use std::io::Write;

use owo_colors::{OwoColorize, Style};

use crate::models::{GitStatus, StatusInput};
use crate::utils::{format_currency, format_duration, format_path, progress_bar};

pub const SEPARATOR: &str = " • ";

/// Read-only styles for each segment. Every styled span ends with its own reset.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub git: Style,
    pub path: Style,
    pub model: Style,
    pub separator: Style,
    pub ok: Style,
    pub warn: Style,
    pub alert: Style,
}

impl Theme {
    pub fn ansi() -> Self {
        Self {
            git: Style::new().cyan(),
            path: Style::new().dimmed(),
            model: Style::new().bold(),
            separator: Style::new().dimmed(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            alert: Style::new().red(),
        }
    }

    pub fn plain() -> Self {
        Self {
            git: Style::new(),
            path: Style::new(),
            model: Style::new(),
            separator: Style::new(),
            ok: Style::new(),
            warn: Style::new(),
            alert: Style::new(),
        }
    }

    pub fn new(color: bool) -> Self {
        if color { Self::ansi() } else { Self::plain() }
    }

    pub fn context_style(&self, pct: i64) -> Style {
        match ContextLevel::from_percent(pct) {
            ContextLevel::Alert => self.alert,
            ContextLevel::Warning => self.warn,
            ContextLevel::Nominal => self.ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLevel {
    Nominal,
    Warning,
    Alert,
}

impl ContextLevel {
    pub fn from_percent(pct: i64) -> Self {
        if pct >= 80 {
            ContextLevel::Alert
        } else if pct >= 50 {
            ContextLevel::Warning
        } else {
            ContextLevel::Nominal
        }
    }
}

pub fn git_segment(status: &GitStatus, theme: &Theme) -> String {
    let marker = if status.dirty { "*" } else { "" };
    format!("{}{}", status.branch, marker)
        .style(theme.git)
        .to_string()
}

pub fn path_segment(cwd: &str, home: &str, theme: &Theme) -> String {
    let path = format_path(cwd, home);
    if path.is_empty() {
        return path;
    }
    path.style(theme.path).to_string()
}

pub fn model_segment(model: &str, theme: &Theme) -> String {
    if model.is_empty() {
        return String::new();
    }
    model.style(theme.model).to_string()
}

/// `$0.05` or `$0.05 (3m)` when a duration is known.
pub fn session_segment(cost_usd: f64, duration_ms: u64) -> String {
    let cost = format_currency(cost_usd);
    let duration = format_duration(duration_ms);
    if duration.is_empty() {
        cost
    } else {
        format!("{cost} ({duration})")
    }
}

pub fn context_segment(pct: i64, bar_width: usize, theme: &Theme) -> String {
    format!("{} {}%", progress_bar(pct, bar_width), pct)
        .style(theme.context_style(pct))
        .to_string()
}

/// Assemble the full line: git, path, model, session, then the context bar last.
pub fn render_line(
    input: &StatusInput,
    git: Option<&GitStatus>,
    home: &str,
    theme: &Theme,
    bar_width: usize,
) -> String {
    let parts = [
        git.map(|g| git_segment(g, theme)).unwrap_or_default(),
        path_segment(&input.cwd, home, theme),
        model_segment(&input.model, theme),
        session_segment(input.cost_usd, input.duration_ms),
    ];
    let separator = SEPARATOR.style(theme.separator).to_string();
    let mut segments: Vec<String> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    segments.push(context_segment(input.context_pct, bar_width, theme));
    segments.join(&separator)
}

pub fn build_json_output(
    input: &StatusInput,
    git: Option<&GitStatus>,
    home: &str,
    bar_width: usize,
) -> serde_json::Value {
    serde_json::json!({
        "model": input.model,
        "cwd": input.cwd,
        "cost_usd": input.cost_usd,
        "duration_ms": input.duration_ms,
        "context_pct": input.context_pct,
        "git": git,
        "line": render_line(input, git, home, &Theme::plain(), bar_width),
    })
}

pub fn print_text_output(line: &str) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

pub fn print_json_output(value: &serde_json::Value) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
