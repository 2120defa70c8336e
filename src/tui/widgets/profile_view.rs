use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::models::{Stats, User};
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display;

pub fn render_profile(f: &mut Frame, area: Rect, user: &User, stats: &Stats, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let accent = parse_color(&active_theme.highlight_bg);

    // 100 points per level, so the remainder is progress into the current one.
    let into_level = user.total_points % 100;
    let level_bar = progress_bar(into_level as usize, 100, 20);

    let mut lines = vec![
        Line::from(Span::styled(
            user.name.clone(),
            Style::default().fg(fg_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            user.email.clone().unwrap_or_else(|| "no email set".to_string()),
            Style::default().fg(parse_color("darkgray")),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(format!("Level {}  ", user.level), Style::default().fg(accent)),
            Span::styled(level_bar, Style::default().fg(accent)),
            Span::styled(
                format!("  {}/100", into_level),
                Style::default().fg(fg_color),
            ),
        ]),
        Line::from(Span::styled(
            format!("Total points: {}", user.total_points),
            Style::default().fg(fg_color),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!(
                "Day streak: {} (best {})",
                user.current_streak, user.longest_streak
            ),
            Style::default().fg(fg_color),
        )),
        Line::from(Span::styled(
            format!(
                "Habits: {} total, {} active",
                stats.total_habits, stats.active_habits
            ),
            Style::default().fg(fg_color),
        )),
        Line::from(Span::styled(
            format!("Member since {}", user.joined_at.format("%B %e, %Y")),
            Style::default().fg(fg_color),
        )),
    ];

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!(
            "{}: Reset all data",
            format_key_binding_for_display(&config.key_bindings.reset)
        ),
        Style::default().fg(parse_color("darkgray")),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Profile")
            .style(Style::default().fg(fg_color).bg(bg_color)),
    );
    f.render_widget(paragraph, area);
}

fn progress_bar(value: usize, max: usize, width: usize) -> String {
    let filled = if max == 0 { 0 } else { value * width / max };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
