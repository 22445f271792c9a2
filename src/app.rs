use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, info};

use crate::dataset::{Dataset, Field, Record};
use crate::filter::{self, Selection};
use crate::report::Dashboard;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Dashboard,
    Table,
    Help,
}

impl From<MenuItem> for usize {
    fn from(input: MenuItem) -> usize {
        match input {
            MenuItem::Dashboard => 0,
            MenuItem::Table => 1,
            MenuItem::Help => 2,
        }
    }
}

/// One dashboard session. Owns its dataset; nothing is shared across sessions.
pub struct App {
    dataset: Dataset,
    selection: Selection,
    dashboard: Dashboard,
    pub active_menu_item: MenuItem,
    focus: usize,
    cursors: [usize; 4],
    table_row: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(dataset: Dataset) -> App {
        let selection = Selection::all(&dataset);
        let dashboard = Dashboard::compute(&dataset, &selection);
        App {
            dataset,
            selection,
            dashboard,
            active_menu_item: MenuItem::Dashboard,
            focus: 0,
            cursors: [0; 4],
            table_row: 0,
            should_quit: false,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn focused_field(&self) -> Field {
        Field::FILTERS[self.focus]
    }

    pub fn cursor(&self, field: Field) -> usize {
        Field::FILTERS
            .iter()
            .position(|f| *f == field)
            .map_or(0, |i| self.cursors[i])
    }

    /// Records passing the current selection, in source order.
    pub fn filtered(&self) -> Vec<&Record> {
        filter::apply(self.dataset.records(), &self.selection)
    }

    /// Highlighted row of the record table.
    pub fn table_row(&self) -> usize {
        self.table_row
    }

    fn refresh(&mut self) {
        self.dashboard = Dashboard::compute(&self.dataset, &self.selection);
        let rows = self.dashboard.total as usize;
        self.table_row = self.table_row.min(rows.saturating_sub(1));
        debug!("filtered view now holds {} records", self.dashboard.total);
    }

    fn focused_options(&self) -> &[String] {
        self.dataset.options(self.focused_field())
    }

    pub fn next_focus(&mut self) {
        self.focus = (self.focus + 1) % Field::FILTERS.len();
    }

    pub fn prev_focus(&mut self) {
        self.focus = (self.focus + Field::FILTERS.len() - 1) % Field::FILTERS.len();
    }

    pub fn move_down(&mut self) {
        let len = self.focused_options().len();
        if len > 0 {
            self.cursors[self.focus] = (self.cursors[self.focus] + 1) % len;
        }
    }

    pub fn move_up(&mut self) {
        let len = self.focused_options().len();
        if len > 0 {
            self.cursors[self.focus] = (self.cursors[self.focus] + len - 1) % len;
        }
    }

    pub fn scroll_down(&mut self) {
        let rows = self.dashboard.total as usize;
        if self.table_row + 1 < rows {
            self.table_row += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.table_row = self.table_row.saturating_sub(1);
    }

    pub fn toggle_current(&mut self) {
        let field = self.focused_field();
        let value = match self.focused_options().get(self.cursors[self.focus]) {
            Some(value) => value.clone(),
            None => return,
        };
        let selected = self.selection.toggle(field, &value);
        info!("{} {} {}", field, if selected { "+" } else { "-" }, value);
        self.refresh();
    }

    pub fn select_all(&mut self) {
        let field = self.focused_field();
        let options = self.dataset.options(field).to_vec();
        self.selection.select(field, &options);
        self.refresh();
    }

    pub fn clear_current(&mut self) {
        self.selection.clear(self.focused_field());
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.selection = Selection::all(&self.dataset);
        self.refresh();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('d') => self.active_menu_item = MenuItem::Dashboard,
            KeyCode::Char('t') => self.active_menu_item = MenuItem::Table,
            KeyCode::Char('h') | KeyCode::Char('?') => self.active_menu_item = MenuItem::Help,
            KeyCode::Tab => self.next_focus(),
            KeyCode::BackTab => self.prev_focus(),
            KeyCode::Down | KeyCode::Char('j') if self.active_menu_item == MenuItem::Table => {
                self.scroll_down()
            }
            KeyCode::Up | KeyCode::Char('k') if self.active_menu_item == MenuItem::Table => {
                self.scroll_up()
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current(),
            KeyCode::Char('a') => self.select_all(),
            KeyCode::Char('n') => self.clear_current(),
            KeyCode::Char('r') => self.reset(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{record, Sex};
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        App::new(Dataset::from_records(vec![
            record("2019-04-01", 34, Sex::Male, "Basic"),
            record("2020-05-01", 41, Sex::Female, "Premium"),
            record("2021-06-01", 38, Sex::Female, "Basic"),
        ]))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn starts_with_everything_selected() {
        let app = app();
        assert_eq!(app.dashboard().total, 3);
        assert_eq!(app.focused_field(), Field::Sex);
        assert_eq!(app.active_menu_item, MenuItem::Dashboard);
    }

    #[test]
    fn toggling_recomputes_the_dashboard() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.selection().contains(Field::Sex, "男性"));
        assert_eq!(app.dashboard().total, 2);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.dashboard().total, 3);
    }

    #[test]
    fn cursor_wraps_within_the_focused_list() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_field(), Field::Product);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor(Field::Product), 1);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor(Field::Product), 0);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor(Field::Product), 1);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.selection().contains(Field::Product, "Premium"));
        assert_eq!(app.dashboard().total, 2);
    }

    #[test]
    fn clear_select_all_and_reset() {
        let mut app = app();
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_field(), Field::Year);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.dashboard().total, 0);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.dashboard().total, 3);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.dashboard().total, 3);
    }

    #[test]
    fn menu_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.active_menu_item, MenuItem::Help);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.active_menu_item, MenuItem::Dashboard);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn table_screen_scrolls_the_filtered_rows() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.active_menu_item, MenuItem::Table);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.table_row(), 2);
        assert_eq!(app.cursor(Field::Sex), 0);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.table_row(), 1);

        // Dropping 女性 leaves a single row; the highlight follows it.
        app.move_down();
        app.toggle_current();
        assert_eq!(app.filtered().len(), 1);
        assert_eq!(app.table_row(), 0);
    }

    #[test]
    fn empty_dataset_is_navigable() {
        let mut app = App::new(Dataset::from_records(Vec::new()));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.dashboard().total, 0);
    }
}
