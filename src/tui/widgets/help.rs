use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    // Clear first so underlying content does not show through.
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

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

fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let key = format_key_binding_for_display;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {}: Switch tabs\n",
        key(&kb.tab_left),
        key(&kb.tab_right)
    ));
    text.push_str(&format!(
        "  {} / {} / {}: Jump to tab\n",
        key(&kb.tab_1),
        key(&kb.tab_2),
        key(&kb.tab_3)
    ));
    text.push_str(&format!(
        "  {} / {}: Move through the habit list\n",
        key(&kb.list_up),
        key(&kb.list_down)
    ));
    text.push('\n');

    text.push_str("Habits:\n");
    text.push_str(&format!("  {}: New habit\n", key(&kb.new)));
    text.push_str(&format!("  {}: Record a completion\n", key(&kb.complete)));
    text.push_str(&format!("  {}: Pause / resume habit\n", key(&kb.toggle_active)));
    text.push_str(&format!("  {}: Delete habit\n", key(&kb.delete)));
    text.push('\n');

    text.push_str("Forms:\n");
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("Other:\n");
    text.push_str(&format!("  {}: Reset all data\n", key(&kb.reset)));
    text.push_str(&format!("  {}: Toggle this help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}
