use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::app::{FormField, HabitForm};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::input::Input;
use crate::utils::format_key_binding_for_display;

pub fn render_habit_form(f: &mut Frame, area: Rect, form: &HabitForm, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight = parse_color(&active_theme.highlight_bg);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title("New Habit")
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Description
            Constraint::Length(3), // Category
            Constraint::Length(3), // Difficulty
            Constraint::Length(3), // Frequency
            Constraint::Length(3), // Target
            Constraint::Min(0),    // Hint line
        ])
        .split(inner);

    let field_style = |field: FormField| {
        if form.current_field == field {
            Style::default().fg(highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(fg_color)
        }
    };

    render_text_field(f, rows[0], "Title", &form.title, field_style(FormField::Title));
    render_text_field(
        f,
        rows[1],
        "Description",
        &form.description,
        field_style(FormField::Description),
    );
    render_cycle_field(
        f,
        rows[2],
        "Category",
        &format!("{} {}", form.category().icon(), form.category()),
        field_style(FormField::Category),
    );
    render_cycle_field(
        f,
        rows[3],
        "Difficulty",
        &format!("{} ({} pts)", form.difficulty(), form.difficulty().points()),
        field_style(FormField::Difficulty),
    );
    render_cycle_field(
        f,
        rows[4],
        "Frequency",
        form.frequency().as_str(),
        field_style(FormField::Frequency),
    );
    render_text_field(
        f,
        rows[5],
        "Target per day",
        &form.target,
        field_style(FormField::Target),
    );

    if rows[6].height > 0 {
        let hint = format!(
            "Tab: next field  {}: save  Esc: cancel",
            format_key_binding_for_display(&config.key_bindings.save)
        );
        let paragraph =
            Paragraph::new(hint).style(Style::default().fg(parse_color("darkgray")).bg(bg_color));
        f.render_widget(paragraph, rows[6]);
    }

    // Place the cursor inside the focused text field.
    if let Some(input) = focused_input(form) {
        let row = match form.current_field {
            FormField::Title => rows[0],
            FormField::Description => rows[1],
            _ => rows[5],
        };
        let x = row.x + 1 + input.cursor() as u16;
        let y = row.y + 1;
        if x < row.right() {
            f.set_cursor_position(Position::new(x, y));
        }
    }
}

fn focused_input(form: &HabitForm) -> Option<&Input> {
    match form.current_field {
        FormField::Title => Some(&form.title),
        FormField::Description => Some(&form.description),
        FormField::Target => Some(&form.target),
        _ => None,
    }
}

fn render_text_field(f: &mut Frame, area: Rect, label: &str, input: &Input, style: Style) {
    let paragraph = Paragraph::new(input.value().to_string()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(label)
            .style(style),
    );
    f.render_widget(paragraph, area);
}

fn render_cycle_field(f: &mut Frame, area: Rect, label: &str, value: &str, style: Style) {
    let paragraph = Paragraph::new(format!("< {} >", value)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(label)
            .style(style),
    );
    f.render_widget(paragraph, area);
}
