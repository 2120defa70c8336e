use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::models::Stats;
use crate::tui::widgets::color::parse_color;

/// Dashboard row: points, level, day streak and today's completion count in
/// four equal boxes.
pub fn render_stat_cards(f: &mut Frame, area: Rect, stats: &Stats, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let cards: [(&str, String, &str); 4] = [
        ("Points", stats.total_points.to_string(), "lightyellow"),
        ("Level", stats.level.to_string(), "lightblue"),
        ("Streak", format!("{}d", stats.current_streak), "lightred"),
        (
            "Today",
            format!("{}/{}", stats.completed_today, stats.active_habits),
            "lightgreen",
        ),
    ];

    for (i, (label, value, accent)) in cards.iter().enumerate() {
        let accent_color = parse_color(accent);
        let lines = vec![
            Line::from(Span::styled(
                value.clone(),
                Style::default()
                    .fg(accent_color)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(*label, Style::default().fg(fg_color))),
        ];
        let card = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(fg_color).bg(bg_color)),
            );
        f.render_widget(card, columns[i]);
    }
}
