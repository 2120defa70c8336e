use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

use crate::Config;
use crate::models::{Category, Difficulty, Frequency};
use crate::tracker::{HabitDraft, Tracker, TrackerError};
use crate::tui::widgets::input::Input;

/// How long a status message stays visible before auto-clearing.
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Habits,
    Analytics,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Habits, Tab::Analytics, Tab::Profile];

    pub fn index(&self) -> usize {
        match self {
            Tab::Habits => 0,
            Tab::Analytics => 1,
            Tab::Profile => 2,
        }
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Create,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Category,
    Difficulty,
    Frequency,
    Target,
}

impl FormField {
    const ORDER: [FormField; 6] = [
        FormField::Title,
        FormField::Description,
        FormField::Category,
        FormField::Difficulty,
        FormField::Frequency,
        FormField::Target,
    ];

    pub fn next(&self) -> FormField {
        let at = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(at + 1) % Self::ORDER.len()]
    }

    pub fn previous(&self) -> FormField {
        let at = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(at + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_last(&self) -> bool {
        *self == FormField::Target
    }
}

/// State of the habit creation form. Text fields hold raw editor state;
/// the enum fields are cycled indexes into the closed sets.
#[derive(Debug, Clone)]
pub struct HabitForm {
    pub current_field: FormField,
    pub title: Input,
    pub description: Input,
    pub target: Input,
    pub category_index: usize,
    pub difficulty_index: usize,
    pub frequency_index: usize,
}

impl HabitForm {
    pub fn new() -> Self {
        Self {
            current_field: FormField::Title,
            title: Input::new(),
            description: Input::new(),
            target: Input::with_value("1"),
            category_index: 0,
            difficulty_index: 0,
            frequency_index: 0,
        }
    }

    pub fn category(&self) -> Category {
        Category::ALL[self.category_index % Category::ALL.len()]
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::ALL[self.difficulty_index % Difficulty::ALL.len()]
    }

    pub fn frequency(&self) -> Frequency {
        Frequency::ALL[self.frequency_index % Frequency::ALL.len()]
    }

    pub fn cycle_current_forward(&mut self) {
        match self.current_field {
            FormField::Category => {
                self.category_index = (self.category_index + 1) % Category::ALL.len();
            }
            FormField::Difficulty => {
                self.difficulty_index = (self.difficulty_index + 1) % Difficulty::ALL.len();
            }
            FormField::Frequency => {
                self.frequency_index = (self.frequency_index + 1) % Frequency::ALL.len();
            }
            _ => {}
        }
    }

    pub fn cycle_current_backward(&mut self) {
        match self.current_field {
            FormField::Category => {
                self.category_index =
                    (self.category_index + Category::ALL.len() - 1) % Category::ALL.len();
            }
            FormField::Difficulty => {
                self.difficulty_index =
                    (self.difficulty_index + Difficulty::ALL.len() - 1) % Difficulty::ALL.len();
            }
            FormField::Frequency => {
                self.frequency_index =
                    (self.frequency_index + Frequency::ALL.len() - 1) % Frequency::ALL.len();
            }
            _ => {}
        }
    }

    /// The editor behind the focused field, if it is a text field.
    pub fn current_input_mut(&mut self) -> Option<&mut Input> {
        match self.current_field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Target => Some(&mut self.target),
            _ => None,
        }
    }

    /// Turn the form into a draft the tracker can validate. Target parsing
    /// fails here; everything else is left to the tracker's validation.
    pub fn to_draft(&self) -> Result<HabitDraft, String> {
        let target_raw = self.target.value().trim();
        let target_count = if target_raw.is_empty() {
            1
        } else {
            target_raw
                .parse::<i64>()
                .map_err(|_| format!("Target must be a number, got '{}'", target_raw))?
        };

        Ok(HabitDraft {
            title: self.title.value().to_string(),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.value().to_string())
            },
            category: self.category(),
            frequency: self.frequency(),
            target_count,
            difficulty: self.difficulty(),
        })
    }
}

/// A destructive action waiting behind the confirmation modal.
#[derive(Debug, Clone)]
pub enum PendingAction {
    DeleteHabit { id: i64, title: String },
    ResetAll,
}

pub struct App {
    pub config: Config,
    pub tracker: Tracker,

    pub current_tab: Tab,
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,

    pub form: Option<HabitForm>,
    pub pending_action: Option<PendingAction>,
    pub modal_selection: usize,

    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, tracker: Tracker) -> Self {
        let mut list_state = ListState::default();
        if !tracker.habits().is_empty() {
            list_state.select(Some(0));
        }
        Self {
            config,
            tracker,
            current_tab: Tab::Habits,
            mode: Mode::View,
            selected_index: 0,
            list_state,
            form: None,
            pending_action: None,
            modal_selection: 0,
            status_message: None,
            status_message_time: None,
            should_quit: false,
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn next_tab(&mut self) {
        self.current_tab = self.current_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = self.current_tab.previous();
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
    }

    /// Clamp the selection after any change to the habit list and mirror it
    /// into the ListState the list widget scrolls with.
    pub fn adjust_selected_index(&mut self) {
        let len = self.tracker.habits().len();
        if len == 0 {
            self.selected_index = 0;
            self.list_state.select(None);
        } else {
            if self.selected_index >= len {
                self.selected_index = len - 1;
            }
            self.list_state.select(Some(self.selected_index));
        }
    }

    pub fn list_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
        self.adjust_selected_index();
    }

    pub fn list_down(&mut self) {
        let len = self.tracker.habits().len();
        if len > 0 && self.selected_index + 1 < len {
            self.selected_index += 1;
        }
        self.adjust_selected_index();
    }

    pub fn selected_habit_id(&self) -> Option<i64> {
        self.tracker.habits().get(self.selected_index)?.id
    }

    pub fn open_create_form(&mut self) {
        self.form = Some(HabitForm::new());
        self.mode = Mode::Create;
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.mode = Mode::View;
    }

    /// Validate and persist the form. Validation failures keep the form open
    /// so the user can fix the input.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                self.set_status_message(message);
                return;
            }
        };
        match self.tracker.add_habit(draft) {
            Ok(habit) => {
                let message = format!("Habit '{}' created", habit.title);
                self.form = None;
                self.mode = Mode::View;
                self.selected_index = self.tracker.habits().len().saturating_sub(1);
                self.adjust_selected_index();
                self.set_status_message(message);
            }
            Err(TrackerError::Validation(message)) => {
                self.set_status_message(message);
            }
            Err(e) => {
                self.set_status_message(format!("Failed to create habit: {}", e));
            }
        }
    }

    pub fn complete_selected(&mut self) {
        let Some(id) = self.selected_habit_id() else {
            self.set_status_message("No habit selected".to_string());
            return;
        };
        match self.tracker.complete_habit(id, 1, None) {
            Ok(earned) => {
                self.set_status_message(format!("Completed! +{} points", earned));
            }
            Err(e) => {
                self.set_status_message(format!("Failed to record completion: {}", e));
            }
        }
    }

    pub fn toggle_selected_active(&mut self) {
        let Some(id) = self.selected_habit_id() else {
            self.set_status_message("No habit selected".to_string());
            return;
        };
        match self.tracker.toggle_active(id) {
            Ok(true) => self.set_status_message("Habit resumed".to_string()),
            Ok(false) => self.set_status_message("Habit paused".to_string()),
            Err(e) => self.set_status_message(format!("Failed to update habit: {}", e)),
        }
    }

    pub fn request_delete_selected(&mut self) {
        let Some(habit) = self.tracker.habits().get(self.selected_index) else {
            self.set_status_message("No habit selected".to_string());
            return;
        };
        let Some(id) = habit.id else {
            return;
        };
        self.pending_action = Some(PendingAction::DeleteHabit {
            id,
            title: habit.title.clone(),
        });
        self.modal_selection = 0;
    }

    pub fn request_reset(&mut self) {
        self.pending_action = Some(PendingAction::ResetAll);
        self.modal_selection = 0;
    }

    pub fn cancel_pending_action(&mut self) {
        self.pending_action = None;
        self.modal_selection = 0;
    }

    /// Execute the confirmed modal action. No-op when the cancel option is
    /// selected.
    pub fn confirm_pending_action(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };
        self.modal_selection = 0;
        match action {
            PendingAction::DeleteHabit { id, title } => match self.tracker.delete_habit(id) {
                Ok(()) => {
                    self.adjust_selected_index();
                    self.set_status_message(format!("Habit '{}' deleted", title));
                }
                Err(e) => {
                    self.set_status_message(format!("Failed to delete habit: {}", e));
                }
            },
            PendingAction::ResetAll => match self.tracker.reset_all() {
                Ok(()) => {
                    self.adjust_selected_index();
                    self.set_status_message("All data reset".to_string());
                }
                Err(e) => {
                    self.set_status_message(format!("Failed to reset data: {}", e));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use tempfile::{TempDir, tempdir};

    fn setup_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        let tracker = Tracker::load(db).unwrap();
        (App::new(Config::default(), tracker), dir)
    }

    fn filled_form(title: &str) -> HabitForm {
        let mut form = HabitForm::new();
        form.title = Input::with_value(title);
        form
    }

    #[test]
    fn tabs_cycle_in_both_directions() {
        assert_eq!(Tab::Habits.next(), Tab::Analytics);
        assert_eq!(Tab::Profile.next(), Tab::Habits);
        assert_eq!(Tab::Habits.previous(), Tab::Profile);
    }

    #[test]
    fn form_fields_cycle_and_wrap() {
        let mut field = FormField::Title;
        for _ in 0..6 {
            field = field.next();
        }
        assert_eq!(field, FormField::Title);
        assert_eq!(FormField::Title.previous(), FormField::Target);
        assert!(FormField::Target.is_last());
    }

    #[test]
    fn form_cycles_closed_sets() {
        let mut form = HabitForm::new();
        form.current_field = FormField::Difficulty;
        assert_eq!(form.difficulty(), Difficulty::Easy);
        form.cycle_current_forward();
        assert_eq!(form.difficulty(), Difficulty::Medium);
        form.cycle_current_backward();
        form.cycle_current_backward();
        assert_eq!(form.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn form_rejects_non_numeric_target() {
        let mut form = filled_form("Run");
        form.target = Input::with_value("lots");
        assert!(form.to_draft().is_err());

        form.target = Input::with_value("");
        assert_eq!(form.to_draft().unwrap().target_count, 1);
    }

    #[test]
    fn submit_creates_habit_and_selects_it() {
        let (mut app, _dir) = setup_app();
        app.open_create_form();
        app.form = Some(filled_form("Meditate"));
        app.submit_form();

        assert_eq!(app.mode, Mode::View);
        assert!(app.form.is_none());
        assert_eq!(app.tracker.habits().len(), 1);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn submit_with_empty_title_keeps_form_open() {
        let (mut app, _dir) = setup_app();
        app.open_create_form();
        app.submit_form();

        assert_eq!(app.mode, Mode::Create);
        assert!(app.form.is_some());
        assert!(app.tracker.habits().is_empty());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn complete_selected_awards_points_and_reports() {
        let (mut app, _dir) = setup_app();
        app.form = Some(filled_form("Run"));
        app.mode = Mode::Create;
        app.submit_form();

        app.complete_selected();
        assert_eq!(app.tracker.user().total_points, 10);
        assert_eq!(app.status_message.as_deref(), Some("Completed! +10 points"));
    }

    #[test]
    fn confirmed_delete_removes_habit_and_clamps_selection() {
        let (mut app, _dir) = setup_app();
        for title in ["One", "Two"] {
            app.form = Some(filled_form(title));
            app.mode = Mode::Create;
            app.submit_form();
        }
        app.selected_index = 1;
        app.adjust_selected_index();

        app.request_delete_selected();
        assert!(matches!(
            app.pending_action,
            Some(PendingAction::DeleteHabit { .. })
        ));
        app.confirm_pending_action();

        assert_eq!(app.tracker.habits().len(), 1);
        assert_eq!(app.selected_index, 0);
        assert!(app.pending_action.is_none());
    }

    #[test]
    fn cancelled_action_leaves_state_untouched() {
        let (mut app, _dir) = setup_app();
        app.form = Some(filled_form("Keep me"));
        app.mode = Mode::Create;
        app.submit_form();

        app.request_delete_selected();
        app.cancel_pending_action();
        assert!(app.pending_action.is_none());
        assert_eq!(app.tracker.habits().len(), 1);
    }

    #[test]
    fn list_navigation_stays_in_bounds() {
        let (mut app, _dir) = setup_app();
        app.list_up();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.list_state.selected(), None);

        for title in ["A", "B", "C"] {
            app.form = Some(filled_form(title));
            app.mode = Mode::Create;
            app.submit_form();
        }
        app.selected_index = 0;
        app.adjust_selected_index();
        app.list_down();
        app.list_down();
        app.list_down();
        assert_eq!(app.selected_index, 2);
        app.list_up();
        assert_eq!(app.selected_index, 1);
    }

    #[test]
    fn confirmed_reset_clears_everything() {
        let (mut app, _dir) = setup_app();
        app.form = Some(filled_form("Run"));
        app.mode = Mode::Create;
        app.submit_form();
        app.complete_selected();

        app.request_reset();
        app.confirm_pending_action();
        assert!(app.tracker.habits().is_empty());
        assert_eq!(app.tracker.user().total_points, 0);
        assert_eq!(app.list_state.selected(), None);
    }
}
