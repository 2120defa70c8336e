use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatLayout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::progress::{self, HabitProgress};
use crate::tui::app::{Mode, Tab};
use crate::tui::widgets::{
    color::parse_color,
    confirm_delete::render_confirm_modal,
    form::render_habit_form,
    habit_list::render_habit_list,
    help::render_help,
    profile_view::render_profile,
    stat_cards::render_stat_cards,
    status_bar::render_status_bar,
    tabs::render_tabs,
    weekly_chart::render_weekly_chart,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("HabitFlow")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.current_tab, &app.config);

    if app.mode == Mode::Create {
        if let Some(form) = app.form.as_ref() {
            render_habit_form(f, layout.main_area, form, &app.config);
        }
    } else {
        match app.current_tab {
            Tab::Habits => render_habits_tab(f, app, layout),
            Tab::Analytics => render_analytics_tab(f, app, layout),
            Tab::Profile => {
                let stats = app.tracker.stats();
                render_profile(f, layout.main_area, app.tracker.user(), &stats, &app.config);
            }
        }
    }

    // Overlays go on top of whatever the tab rendered.
    if app.mode == Mode::Help {
        render_help(f, layout.inner_area, &app.config);
    }
    if let Some(action) = app.pending_action.as_ref() {
        render_confirm_modal(
            f,
            layout.inner_area,
            action,
            app.modal_selection,
            &app.config,
        );
    }

    let hints = key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status_message.as_ref(),
        &hints,
        &app.config,
    );
}

fn render_habits_tab(f: &mut Frame, app: &mut App, layout: &Layout) {
    let rows = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(layout.main_area);

    let stats = app.tracker.stats();
    render_stat_cards(f, rows[0], &stats, &app.config);

    let todays: Vec<HabitProgress> = app
        .tracker
        .habits()
        .iter()
        .map(|habit| match habit.id {
            Some(id) => app.tracker.habit_progress(id),
            None => HabitProgress::ZERO,
        })
        .collect();
    render_habit_list(
        f,
        rows[1],
        app.tracker.habits(),
        &todays,
        &mut app.list_state,
        &app.config,
    );
}

fn render_analytics_tab(f: &mut Frame, app: &App, layout: &Layout) {
    let today = Local::now().date_naive();
    let week = app.tracker.weekly(today);
    let aggregate = progress::weekly_aggregate(&week);
    render_weekly_chart(f, layout.main_area, &week, aggregate, &app.config);
}

fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    let key = format_key_binding_for_display;

    if app.pending_action.is_some() {
        return vec!["Enter: confirm".to_string(), "Esc: cancel".to_string()];
    }
    match app.mode {
        Mode::Create => vec![
            "Tab: next field".to_string(),
            format!("{}: save", key(&kb.save)),
            "Esc: cancel".to_string(),
        ],
        Mode::Help => vec!["Esc: close".to_string()],
        Mode::View => match app.current_tab {
            Tab::Habits => vec![
                format!("{}: new", key(&kb.new)),
                format!("{}: complete", key(&kb.complete)),
                format!("{}: pause", key(&kb.toggle_active)),
                format!("{}: delete", key(&kb.delete)),
                format!("{}: help", key(&kb.help)),
                format!("{}: quit", key(&kb.quit)),
            ],
            Tab::Analytics => vec![
                format!("{} / {}: tabs", key(&kb.tab_left), key(&kb.tab_right)),
                format!("{}: help", key(&kb.help)),
                format!("{}: quit", key(&kb.quit)),
            ],
            Tab::Profile => vec![
                format!("{}: reset data", key(&kb.reset)),
                format!("{}: help", key(&kb.help)),
                format!("{}: quit", key(&kb.quit)),
            ],
        },
    }
}
