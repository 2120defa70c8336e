use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;

use crate::Config;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&String>,
    key_hints: &[String],
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);

    let (content, style) = if let Some(msg) = message {
        // Status messages get a highlighted background for visibility.
        let msg_fg = get_contrast_text_color(highlight_bg);
        (
            msg.clone(),
            Style::default()
                .fg(msg_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            fit_hints(key_hints, area.width as usize),
            Style::default().fg(fg_color).bg(bg_color),
        )
    };

    let paragraph = Paragraph::new(content).style(style);
    f.render_widget(paragraph, area);
}

/// Join hints with bullet separators, dropping trailing hints that would not
/// fit and marking the cut with an ellipsis.
fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let separator = " • ";
    let mut text = String::new();

    for (i, hint) in key_hints.iter().enumerate() {
        let current_len = text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + separator.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            if !text.is_empty() && current_len + 3 <= max_width {
                text.push_str("...");
            }
            break;
        }

        if i > 0 {
            text.push_str(separator);
        }
        text.push_str(hint);
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hints_join_with_bullets_when_they_fit() {
        let text = fit_hints(&hints(&["q: Quit", "n: New"]), 80);
        assert_eq!(text, "q: Quit • n: New");
    }

    #[test]
    fn overlong_hints_are_cut_with_ellipsis() {
        let text = fit_hints(&hints(&["q: Quit", "n: New", "d: Delete"]), 20);
        assert_eq!(text, "q: Quit • n: New...");
    }
}
