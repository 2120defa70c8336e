use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;

use crate::tui::app::{FormField, Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::{App, Layout};
use crate::utils::{has_primary_modifier, parse_key_binding};

/// Guard that ensures terminal state is restored even on panic.
/// If the terminal is left in raw mode or the alternate screen, the user's
/// shell becomes unusable until a manual reset.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore terminal state on normal exit; the guard then does nothing on
    /// drop.
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Cleanup path, errors are ignored.
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering the alternate screen so the error
    // message lands in the normal terminal.
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(std::time::Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key_event) => {
                    // Only handle Press; Release would double-fire on Windows.
                    if key_event.kind == KeyEventKind::Press {
                        handle_key_event(&mut app, key_event)?;
                        if app.should_quit {
                            break;
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // Next draw picks up the new size.
                }
                _ => {}
            }
        }
    }

    guard.restore()?;
    Ok(())
}

/// True when the key event matches the configured binding string. Unparseable
/// bindings simply never match.
fn binding_matches(binding: &str, key_event: &KeyEvent) -> bool {
    match parse_key_binding(binding) {
        Ok(parsed) => {
            key_event.code == parsed.key_code
                && parsed.requires_ctrl == has_primary_modifier(key_event.modifiers)
        }
        Err(_) => false,
    }
}

fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<(), TuiError> {
    if app.pending_action.is_some() {
        handle_confirm_modal(app, key_event);
        return Ok(());
    }
    match app.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Create => handle_create_mode(app, key_event),
        Mode::View => handle_view_mode(app, key_event),
    }
    Ok(())
}

fn handle_confirm_modal(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down => {
            // Two options, so any vertical movement flips the selection.
            app.modal_selection = 1 - app.modal_selection;
        }
        KeyCode::Enter => {
            if app.modal_selection == 0 {
                app.confirm_pending_action();
            } else {
                app.cancel_pending_action();
            }
        }
        KeyCode::Esc => {
            app.cancel_pending_action();
        }
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) {
    if key_event.code == KeyCode::Esc || binding_matches(&app.config.key_bindings.help, &key_event)
    {
        app.mode = Mode::View;
    }
}

fn handle_create_mode(app: &mut App, key_event: KeyEvent) {
    if binding_matches(&app.config.key_bindings.save, &key_event) {
        app.submit_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };

    match key_event.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Tab | KeyCode::Down => {
            form.current_field = form.current_field.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.current_field = form.current_field.previous();
        }
        KeyCode::Enter => {
            // Enter advances; on the last field it saves.
            if form.current_field.is_last() {
                app.submit_form();
            } else {
                form.current_field = form.current_field.next();
            }
        }
        KeyCode::Left => {
            if let Some(input) = form.current_input_mut() {
                input.move_left();
            } else {
                form.cycle_current_backward();
            }
        }
        KeyCode::Right => {
            if let Some(input) = form.current_input_mut() {
                input.move_right();
            } else {
                form.cycle_current_forward();
            }
        }
        KeyCode::Home => {
            if let Some(input) = form.current_input_mut() {
                input.move_home();
            }
        }
        KeyCode::End => {
            if let Some(input) = form.current_input_mut() {
                input.move_end();
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = form.current_input_mut() {
                input.backspace();
            }
        }
        KeyCode::Delete => {
            if let Some(input) = form.current_input_mut() {
                input.delete();
            }
        }
        KeyCode::Char(' ') if matches!(
            form.current_field,
            FormField::Category | FormField::Difficulty | FormField::Frequency
        ) =>
        {
            form.cycle_current_forward();
        }
        KeyCode::Char(c) => {
            if let Some(input) = form.current_input_mut() {
                input.insert(c);
            }
        }
        _ => {}
    }
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) {
    let kb = app.config.key_bindings.clone();

    if binding_matches(&kb.quit, &key_event) {
        app.should_quit = true;
    } else if binding_matches(&kb.help, &key_event) {
        app.mode = Mode::Help;
    } else if binding_matches(&kb.tab_left, &key_event) {
        app.previous_tab();
    } else if binding_matches(&kb.tab_right, &key_event) {
        app.next_tab();
    } else if binding_matches(&kb.tab_1, &key_event) {
        app.set_tab(Tab::Habits);
    } else if binding_matches(&kb.tab_2, &key_event) {
        app.set_tab(Tab::Analytics);
    } else if binding_matches(&kb.tab_3, &key_event) {
        app.set_tab(Tab::Profile);
    } else if binding_matches(&kb.reset, &key_event) {
        app.request_reset();
    } else if app.current_tab == Tab::Habits {
        if binding_matches(&kb.new, &key_event) {
            app.open_create_form();
        } else if binding_matches(&kb.complete, &key_event)
            || binding_matches(&kb.select, &key_event)
        {
            app.complete_selected();
        } else if binding_matches(&kb.toggle_active, &key_event) {
            app.toggle_selected_active();
        } else if binding_matches(&kb.delete, &key_event) {
            app.request_delete_selected();
        } else if binding_matches(&kb.list_up, &key_event) || key_event.code == KeyCode::Up {
            app.list_up();
        } else if binding_matches(&kb.list_down, &key_event) || key_event.code == KeyCode::Down {
            app.list_down();
        }
    }
}
