use std::env;
use std::io::Read;

/// Placeholder glyph for collapsed leading path segments.
pub const ELLIPSIS: &str = "…";
pub const BAR_FILLED: char = '█';
pub const BAR_EMPTY: char = '░';
pub const DEFAULT_BAR_WIDTH: u16 = 10;
/// Widest bar accepted from the command line.
pub const MAX_BAR_WIDTH: u16 = 200;

/// Paths with more segments than this collapse to their last two.
const MAX_PATH_SEGMENTS: usize = 3;

pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read the whole payload, substituting `{}` when stdin is unreadable or empty.
pub fn read_payload() -> Vec<u8> {
    match read_stdin() {
        Ok(buf) if !buf.is_empty() => buf,
        Ok(_) => b"{}".to_vec(),
        Err(err) => {
            tracing::debug!(error = %err, "stdin unreadable, using empty payload");
            b"{}".to_vec()
        }
    }
}

/// Home directory used for `~` substitution. Unset or non-UTF-8 `HOME` disables it.
pub fn home_dir() -> Option<String> {
    env::var("HOME").ok()
}

/// Shorten a directory for display: `~` for home, `…/<last>/<two>` past three segments.
///
/// Home substitution is a plain prefix match, so `/home/user2` also matches a home of
/// `/home/user`. An empty `home` disables substitution.
pub fn format_path(dir: &str, home: &str) -> String {
    if dir.is_empty() {
        return String::new();
    }
    let display = match dir.strip_prefix(home) {
        Some(rest) if !home.is_empty() => format!("~{rest}"),
        _ => dir.to_owned(),
    };
    let segments: Vec<&str> = display.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > MAX_PATH_SEGMENTS {
        let tail = &segments[segments.len() - 2..];
        return format!("{ELLIPSIS}/{}", tail.join("/"));
    }
    display
}

/// Humanize an elapsed session time. Seconds and minutes are truncated, never rounded.
pub fn format_duration(ms: u64) -> String {
    let s = ms / 1000;
    if s == 0 {
        String::new()
    } else if s < 60 {
        format!("{s}s")
    } else if s < 3600 {
        format!("{}m", s / 60)
    } else {
        format!("{}h{}m", s / 3600, (s % 3600) / 60)
    }
}

/// Dollars with exactly two decimals, exact ties rounded away from zero.
pub fn format_currency(v: f64) -> String {
    // Only odd multiples of 1/8 sit exactly halfway between two cents, and `{:.2}`
    // would send those to the even neighbour.
    let eighths = v * 8.0;
    let v = if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (v * 100.0 + 0.5f64.copysign(v)).trunc() / 100.0
    } else {
        v
    };
    format!("${v:.2}")
}

/// Number of filled cells for `pct` in a bar of `width`, rounding halves up.
///
/// The percentage itself is not clamped; the cell count is kept within `0..=width`.
pub fn filled_cells(pct: i64, width: usize) -> usize {
    let exact = pct as f64 * width as f64 / 100.0;
    let rounded = (exact + 0.5).floor();
    if rounded <= 0.0 {
        0
    } else {
        (rounded as usize).min(width)
    }
}

pub fn progress_bar(pct: i64, width: usize) -> String {
    let filled = filled_cells(pct, width);
    let mut bar = String::with_capacity(width * BAR_FILLED.len_utf8());
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "");
        assert_eq!(format_duration(999), "");
        assert_eq!(format_duration(45_000), "45s");
        assert_eq!(format_duration(59_999), "59s");
        assert_eq!(format_duration(60_000), "1m");
        assert_eq!(format_duration(125_000), "2m");
        assert_eq!(format_duration(3_599_000), "59m");
        assert_eq!(format_duration(3_600_000), "1h0m");
        assert_eq!(format_duration(3_725_000), "1h2m");
        assert_eq!(format_duration(90_000_000), "25h0m");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(0.049), "$0.05");
        assert_eq!(format_currency(0.05), "$0.05");
        assert_eq!(format_currency(12.3), "$12.30");
    }

    #[test]
    fn test_format_currency_ties_round_up() {
        assert_eq!(format_currency(0.125), "$0.13");
        assert_eq!(format_currency(0.375), "$0.38");
        assert_eq!(format_currency(1.125), "$1.13");
        assert_eq!(format_currency(2.625), "$2.63");
        assert_eq!(format_currency(0.25), "$0.25");
        // Not a tie: the stored value is just below 1.005.
        assert_eq!(format_currency(1.005), "$1.00");
    }

    #[test]
    fn test_format_path_home_substitution() {
        assert_eq!(format_path("/home/u/projects/app", "/home/u"), "~/projects/app");
        assert_eq!(format_path("/home/u", "/home/u"), "~");
        assert_eq!(format_path("/srv/app", "/home/u"), "/srv/app");
    }

    #[test]
    fn test_format_path_truncation() {
        assert_eq!(format_path("/home/u/a/b/c/d", "/home/u"), "…/c/d");
        assert_eq!(format_path("/var/lib/docker/volumes", ""), "…/docker/volumes");
        assert_eq!(format_path("/var/lib/docker", ""), "/var/lib/docker");
    }

    #[test]
    fn test_format_path_ignores_empty_segments() {
        assert_eq!(format_path("//a//b/", ""), "//a//b/");
        assert_eq!(format_path("/a//b//c/d/", ""), "…/c/d");
    }

    #[test]
    fn test_format_path_empty() {
        assert_eq!(format_path("", "/home/u"), "");
    }

    #[test]
    fn test_format_path_prefix_is_not_path_aware() {
        assert_eq!(format_path("/home/user2/x", "/home/user"), "~2/x");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 10), "░░░░░░░░░░");
        assert_eq!(progress_bar(42, 10), "████░░░░░░");
        assert_eq!(progress_bar(45, 10), "█████░░░░░");
        assert_eq!(progress_bar(100, 10), "██████████");
        assert_eq!(progress_bar(50, 4), "██░░");
    }

    #[test]
    fn test_progress_bar_out_of_range() {
        assert_eq!(filled_cells(-20, 10), 0);
        assert_eq!(filled_cells(150, 10), 10);
        assert_eq!(progress_bar(-5, 10), "░░░░░░░░░░");
        assert_eq!(progress_bar(250, 10), "██████████");
        assert_eq!(progress_bar(50, 0), "");
    }

    #[test]
    #[serial]
    fn test_home_dir_reads_env() {
        let saved = env::var("HOME").ok();
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::set_var("HOME", "/tmp/statusline-home") };
        assert_eq!(home_dir().as_deref(), Some("/tmp/statusline-home"));
        match saved {
            Some(v) => unsafe { env::set_var("HOME", v) },
            None => unsafe { env::remove_var("HOME") },
        }
    }

    #[test]
    #[serial]
    fn test_home_dir_unset_disables_substitution() {
        let saved = env::var("HOME").ok();
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::remove_var("HOME") };
        let home = home_dir();
        if let Some(v) = saved {
            unsafe { env::set_var("HOME", v) };
        }
        assert_eq!(home, None);
        let home = home.unwrap_or_default();
        assert_eq!(format_path("/home/u/projects/app", &home), "/home/u/projects/app");
    }
}
