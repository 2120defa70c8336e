use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::tui::app::PendingAction;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Confirmation modal for destructive actions. `selection` picks between
/// Confirm (0) and Cancel (1).
pub fn render_confirm_modal(
    f: &mut Frame,
    area: Rect,
    action: &PendingAction,
    selection: usize,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let popup_area = popup_area(area, 50, 35);
    // Clear first so underlying content does not show through.
    f.render_widget(Clear, popup_area);

    let (question, detail, confirm_label) = match action {
        PendingAction::DeleteHabit { title, .. } => (
            "Delete this habit and its history?",
            title.clone(),
            "Delete",
        ),
        PendingAction::ResetAll => (
            "Erase every habit, completion and profile stat?",
            "This cannot be undone".to_string(),
            "Reset",
        ),
    };

    let mut lines = vec![
        Line::from(Span::styled(question, Style::default().fg(fg_color).bg(bg_color))),
        Line::default(),
        Line::from(Span::styled(detail, Style::default().fg(fg_color).bg(bg_color))),
        Line::default(),
    ];

    for (index, option) in [confirm_label, "Cancel"].iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            Style::default().fg(fg_color).bg(bg_color)
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, option),
            style,
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Use ↑↓ to navigate, Enter to confirm, Esc to cancel",
        Style::default().fg(fg_color).bg(bg_color),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Action")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}

/// Centered rect covering the given percentage of the available area,
/// following the ratatui popup example.
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
