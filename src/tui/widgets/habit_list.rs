use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::Config;
use crate::models::Habit;
use crate::progress::HabitProgress;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// One line per habit: category icon, title, today's count against the
/// target and the running streak. `progress` is positionally matched to
/// `habits`.
pub fn render_habit_list(
    f: &mut Frame,
    area: Rect,
    habits: &[Habit],
    progress: &[HabitProgress],
    list_state: &mut ListState,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Habits ({})", habits.len()))
        .style(Style::default().fg(fg_color).bg(bg_color));

    if habits.is_empty() {
        let empty = List::new(vec![ListItem::new("No habits yet. Press 'n' to add one.")])
            .block(block)
            .style(Style::default().fg(fg_color).bg(bg_color));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = habits
        .iter()
        .zip(progress.iter())
        .map(|(habit, progress)| {
            let icon_color = parse_color(habit.category.color());
            let mut spans = vec![
                Span::styled(habit.category.icon(), Style::default().fg(icon_color)),
                Span::raw(" "),
                Span::styled(habit.title.clone(), Style::default().fg(fg_color)),
                Span::styled(
                    format!("  {}/{}", progress.completed, progress.target),
                    Style::default().fg(fg_color),
                ),
            ];
            if habit.current_streak > 0 {
                spans.push(Span::styled(
                    format!("  ⚡{}", habit.current_streak),
                    Style::default().fg(parse_color("yellow")),
                ));
            }
            if !habit.active {
                spans.push(Span::styled(
                    "  [paused]",
                    Style::default().fg(parse_color("darkgray")),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}
