use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{BarChart, Block, Borders};

use crate::Config;
use crate::progress::{self, DayProgress};
use crate::tui::widgets::color::parse_color;

/// Sunday-first bar chart of this week's day percentages. Bars are clamped at
/// 100 for display only; the underlying percentages are unbounded.
pub fn render_weekly_chart(
    f: &mut Frame,
    area: Rect,
    week: &[DayProgress; 7],
    aggregate: u32,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    let data: Vec<(&str, u64)> = week
        .iter()
        .map(|day| {
            let value = day.percentage.round().min(100.0).max(0.0) as u64;
            (progress::day_label(day.day), value)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("This Week ({}% avg)", aggregate))
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .data(&data[..])
        .bar_width(4)
        .bar_gap(1)
        .max(100)
        .bar_style(Style::default().fg(highlight_bg))
        .value_style(Style::default().fg(fg_color).bg(highlight_bg))
        .label_style(Style::default().fg(fg_color));

    f.render_widget(chart, area);
}
