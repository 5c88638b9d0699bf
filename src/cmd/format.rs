//! Styling helpers for human-readable output.
//!
//! Deliberately std-only: color and emoji are on by default and degrade
//! via NO_COLOR / NO_EMOJI; width comes from COLUMNS, best effort. JSON
//! output paths must not use these helpers.

/// Detected presentation options for the current terminal.
#[derive(Debug, Clone)]
pub struct Style {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Style {
    pub fn detect() -> Self {
        Style {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: std::env::var("COLUMNS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|w| w.clamp(40, 220))
                .unwrap_or(100),
        }
    }
}

/// Semantic color roles, mapped to ANSI codes when color is enabled.
#[derive(Copy, Clone, Debug)]
pub enum Role {
    Accent,
    Dim,
    Success,
    Error,
}

impl Role {
    fn code(self) -> &'static str {
        match self {
            Role::Accent => "\x1b[36m",
            Role::Dim => "\x1b[2m",
            Role::Success => "\x1b[32m",
            Role::Error => "\x1b[31m",
        }
    }
}

pub fn paint(role: Role, text: impl AsRef<str>, style: &Style) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    format!("{}{}\x1b[0m", role.code(), text.as_ref())
}

pub fn icon(tag: &str, style: &Style) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "ok" => "✅ ",
        "error" => "❌ ",
        "phone" => "📱 ",
        _ => "",
    }
}

/// Left-aligned column layout. Cells wider than the remaining terminal
/// width are truncated with an ellipsis.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &Style) -> String {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line = render_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &widths,
        style.term_width,
    );
    out.push_str(&paint(Role::Accent, &header_line, style));
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row, &widths, style.term_width));
        out.push('\n');
    }
    out
}

fn render_row(cells: &[String], widths: &[usize], max_width: usize) -> String {
    let mut line = String::new();
    for (i, &width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i + 1 == widths.len() {
            line.push_str(cell);
        } else {
            line.push_str(&format!("{cell:<width$}  "));
        }
    }
    truncate_ellipsis(line.trim_end(), max_width)
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Style {
        Style {
            use_color: false,
            use_emoji: false,
            term_width: 80,
        }
    }

    #[test]
    fn table_aligns_columns() {
        let rows = vec![
            vec!["emulator-5554".to_string(), "device".to_string()],
            vec!["x".to_string(), "offline".to_string()],
        ];
        let t = table(&["ID", "STATUS"], &rows, &plain());
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("emulator-5554  device"));
        assert!(lines[2].starts_with("x              offline"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_ellipsis("short", 10), "short");
        assert_eq!(truncate_ellipsis("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn paint_noop_without_color() {
        assert_eq!(paint(Role::Error, "x", &plain()), "x");
    }
}
