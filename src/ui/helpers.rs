use std::ops::Range;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Pick the slice of transcript lines that fits in `height` rows when the view
/// is scrolled `scroll` lines up from the bottom.
pub(crate) fn visible_range(len: usize, height: usize, scroll: usize) -> Range<usize> {
    if height == 0 || len == 0 {
        return 0..0;
    }
    let max_scroll = len.saturating_sub(height);
    let scroll = scroll.min(max_scroll);
    let end = len - scroll;
    let start = end.saturating_sub(height);
    start..end
}

/// Render `[key] label` pairs the way the footer shows them.
pub(crate) fn key_hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, label) in hints {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        spans.push(Span::raw(format!(" {label}   ")));
    }
    Line::from(spans)
}
