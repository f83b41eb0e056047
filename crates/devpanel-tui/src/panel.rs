use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use devpanel_core::DevConsole;
use devpanel_types::{LogEntry, LogKind};

use crate::state::PanelState;
use crate::theme::Theme;

/// The in-app console overlay
pub struct DevPanelOverlay;

impl DevPanelOverlay {
    /// Render the overlay over the host frame; no-op while hidden
    pub fn render(frame: &mut Frame, state: &mut PanelState, console: &DevConsole, theme: &Theme) {
        if !state.visible {
            return;
        }

        let area = frame.area();
        let popup_width = area.width.saturating_sub(8).max(40).min(area.width);
        let popup_height = area.height.saturating_sub(4).max(10).min(area.height);
        let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let mut constraints = vec![Constraint::Length(3)];
        if state.search_active || !state.filter.query().is_empty() {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Min(1));
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(popup_area);

        let mut idx = 0;
        Self::render_header(frame, chunks[idx], state, console, theme);
        idx += 1;

        if state.search_active || !state.filter.query().is_empty() {
            Self::render_search_bar(frame, chunks[idx], state, theme);
            idx += 1;
        }

        Self::render_logs(frame, chunks[idx], state, console, theme);
        idx += 1;

        Self::render_hints(frame, chunks[idx], state, theme);
    }

    fn render_header(
        frame: &mut Frame,
        area: Rect,
        state: &PanelState,
        console: &DevConsole,
        theme: &Theme,
    ) {
        let counts = console.kind_counts();

        let mut spans = vec![
            Span::styled("devpanel", theme.title()),
            Span::styled(" │ ", theme.text_dim()),
        ];

        for (kind, count) in [
            (LogKind::Log, counts.log),
            (LogKind::Info, counts.info),
            (LogKind::Warn, counts.warn),
            (LogKind::Error, counts.error),
        ] {
            let selected =
                state.filter.kinds().is_empty() || state.filter.kinds().contains(&kind);
            let style = if selected {
                ratatui::style::Style::default().fg(kind.color())
            } else {
                theme.text_dim()
            };
            spans.push(Span::styled(
                format!("{} {} ", kind.as_str().trim_end(), count),
                style,
            ));
        }

        if !state.filter.tags().is_empty() {
            spans.push(Span::styled(" │ ", theme.text_dim()));
            for tag in state.filter.tags() {
                spans.push(Span::styled(format!("#{tag} "), theme.text_highlight()));
            }
        }

        spans.push(Span::styled(" │ ", theme.text_dim()));
        spans.push(Span::styled(
            format!("{} entries", console.len()),
            theme.text(),
        ));

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_focused())
                .title(Span::styled(" Console ", theme.title())),
        );
        frame.render_widget(header, area);
    }

    fn render_search_bar(frame: &mut Frame, area: Rect, state: &PanelState, theme: &Theme) {
        let mut spans = vec![];
        if state.search_active {
            spans.push(Span::styled(" /", theme.text_highlight()));
            spans.push(Span::styled(state.search_input.clone(), theme.text()));
            spans.push(Span::styled("█", theme.text_highlight()));
            spans.push(Span::styled("  [Enter] Apply  [Esc] Cancel", theme.text_dim()));
        } else {
            spans.push(Span::styled(" Filter: ", theme.text_dim()));
            spans.push(Span::styled(state.filter.query().to_string(), theme.text_highlight()));
            spans.push(Span::styled("  [n] Clear  [/] Edit", theme.text_dim()));
        }

        let bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if state.search_active {
                    theme.border_focused()
                } else {
                    theme.border()
                })
                .title(Span::styled(" Search ", theme.title())),
        );
        frame.render_widget(bar, area);
    }

    fn render_logs(
        frame: &mut Frame,
        area: Rect,
        state: &mut PanelState,
        console: &DevConsole,
        theme: &Theme,
    ) {
        let entries = console.filter(&state.filter);
        let height = area.height.saturating_sub(2) as usize;

        let max_scroll = entries.len().saturating_sub(height);
        if state.follow {
            state.scroll = max_scroll;
        } else if state.scroll > max_scroll {
            state.scroll = max_scroll;
        }

        let lines: Vec<Line> = entries
            .iter()
            .skip(state.scroll)
            .take(height)
            .map(|entry| Self::entry_line(entry, state, theme, area.width))
            .collect();

        let title = if entries.len() == console.len() {
            format!(" Logs ({}) ", entries.len())
        } else {
            format!(" Logs ({}/{}) ", entries.len(), console.len())
        };

        let logs = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border())
                .title(Span::styled(title, theme.title())),
        );
        frame.render_widget(logs, area);
    }

    fn entry_line<'a>(
        entry: &'a LogEntry,
        state: &PanelState,
        theme: &Theme,
        width: u16,
    ) -> Line<'a> {
        let mut spans = Vec::new();

        if state.show_timestamp {
            spans.push(Span::styled(
                entry.timestamp.format("%H:%M:%S%.3f ").to_string(),
                theme.text_dim(),
            ));
        }

        if state.show_log_level {
            spans.push(Span::styled(
                format!("{} ", entry.kind.as_str()),
                ratatui::style::Style::default().fg(entry.kind.color()),
            ));
        }

        let message = entry.message();
        let budget = (width as usize).saturating_sub(
            spans.iter().map(|s| s.content.width()).sum::<usize>() + 2,
        );
        let message = truncate_to_width(&message, budget);
        spans.extend(highlight_spans(message, state, theme));

        for tag in &entry.tags {
            spans.push(Span::styled(format!(" #{tag}"), theme.text_highlight()));
        }

        Line::from(spans)
    }

    fn render_hints(frame: &mut Frame, area: Rect, state: &PanelState, theme: &Theme) {
        let hints: &[(&str, &str)] = if state.search_active {
            &[("Enter", "Apply"), ("Esc", "Cancel")]
        } else {
            &[
                ("j/k", "Scroll"),
                ("f", "Follow"),
                ("/", "Search"),
                ("1-4", "Kinds"),
                ("t", "Time"),
                ("c", "Clear"),
                ("Esc", "Hide"),
            ]
        };

        let mut spans = Vec::new();
        for (i, (key, desc)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", theme.status_bar()));
            }
            spans.push(Span::styled(format!("[{key}]"), theme.status_bar_key()));
            spans.push(Span::styled(format!(" {desc}"), theme.status_bar()));
        }

        let bar = Paragraph::new(Line::from(spans)).style(theme.status_bar());
        frame.render_widget(bar, area);
    }
}

/// Split a message into spans, highlighting search hits
fn highlight_spans(message: String, state: &PanelState, theme: &Theme) -> Vec<Span<'static>> {
    let matches = state.filter.find_matches(&message);
    if matches.is_empty() {
        return vec![Span::styled(message, theme.text())];
    }

    let mut spans = Vec::new();
    let mut cursor = 0;
    for (start, end) in matches {
        if start > cursor {
            spans.push(Span::styled(message[cursor..start].to_string(), theme.text()));
        }
        spans.push(Span::styled(message[start..end].to_string(), theme.search_hit()));
        cursor = end;
    }
    if cursor < message.len() {
        spans.push(Span::styled(message[cursor..].to_string(), theme.text()));
    }
    spans
}

/// Truncate a string to a display width, respecting char boundaries
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
