//! Keyboard event handling.
//!
//! Keys are interpreted according to the focused field:
//! - `Tab` / `Shift+Tab`: move focus between form fields and the table
//! - `Ctrl+S`: submit the form from anywhere
//! - `Ctrl+C`: quit
//! - Sequence editor: typed or pasted characters, `Enter` for a new line, `Backspace`
//! - Selectors: `h`/`l` or arrows cycle the options
//! - Results table:
//!   - `j`/`k`: move the row cursor
//!   - `Space`: toggle the row, `a`: toggle all rows, `v`: toggle the page
//!   - `n`/`p` (or arrows): next/previous page
//!   - `s`: cycle rows per page
//! - `:`: enter command mode (outside the editor)
//!   - `:q` or `:quit`: quit the application
//!   - `:h` or `:help`: show help
//!   - `:load <file>`, `:size <n>`, `:page <n>`, `:clear`
//! - `Esc`: dismiss the error banner

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::model::{AppMode, AppState, FormField, PredictionRequest};

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Quit the application
    Quit,
    /// Resize event (ratatui redraws at the new size on the next frame)
    Resize(u16, u16),
    /// Focus the next field
    FocusNext,
    /// Focus the previous field
    FocusPrevious,
    /// Next option of the focused selector
    OptionNext,
    /// Previous option of the focused selector
    OptionPrevious,
    /// Type a character in the sequence editor
    InsertChar(char),
    /// New line in the sequence editor
    InsertNewline,
    /// Delete the last character of the sequence editor
    Backspace,
    /// Bracketed paste into the sequence editor
    Paste(String),
    /// Submit the form
    Submit,
    /// Move the table cursor up
    RowUp,
    /// Move the table cursor down
    RowDown,
    /// Toggle selection of the row under the cursor
    ToggleRow,
    /// Toggle selection of every loaded row
    ToggleAll,
    /// Toggle selection of the rows on the current page
    TogglePage,
    /// Next page of results
    NextPage,
    /// Previous page of results
    PreviousPage,
    /// Cycle rows per page
    CyclePageSize,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Dismiss the error banner
    DismissBanner,
    /// Show the help overlay
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
}

/// Polls for terminal events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode and focus.
pub fn handle_event(event: Event, mode: &AppMode, focus: FormField, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, mode, focus, show_help)
        }
        Event::Paste(text) if focus == FormField::Sequences && *mode == AppMode::Normal && !show_help => {
            Action::Paste(text)
        }
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current application mode.
fn handle_key_event(key: KeyEvent, mode: &AppMode, focus: FormField, show_help: bool) -> Action {
    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    // Ctrl+C quits from every mode
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key, focus),
        AppMode::Command(_) => handle_command_mode(key),
    }
}

/// Handles key events in normal mode.
fn handle_normal_mode(key: KeyEvent, focus: FormField) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') => Action::Submit,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Tab => return Action::FocusNext,
        KeyCode::BackTab => return Action::FocusPrevious,
        KeyCode::Esc => return Action::DismissBanner,
        _ => {}
    }

    match focus {
        FormField::Sequences => handle_editor(key),
        FormField::InputFormat | FormField::Allele => handle_selector(key),
        FormField::Submit => handle_submit_button(key),
        FormField::Results => handle_results(key),
    }
}

/// Keys shared by every field except the editor.
fn handle_common(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char(':') => Action::EnterCommandMode,
        KeyCode::Char('?') => Action::ShowHelp,
        _ => Action::None,
    }
}

fn handle_editor(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char(c) => Action::InsertChar(c),
        KeyCode::Enter => Action::InsertNewline,
        KeyCode::Backspace => Action::Backspace,
        _ => Action::None,
    }
}

fn handle_selector(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::OptionPrevious,
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(' ') => Action::OptionNext,
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Enter => Action::FocusNext,
        KeyCode::Char('k') | KeyCode::Up => Action::FocusPrevious,
        _ => handle_common(key),
    }
}

fn handle_submit_button(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Action::Submit,
        KeyCode::Char('j') | KeyCode::Down => Action::FocusNext,
        KeyCode::Char('k') | KeyCode::Up => Action::FocusPrevious,
        _ => handle_common(key),
    }
}

fn handle_results(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::RowDown,
        KeyCode::Char('k') | KeyCode::Up => Action::RowUp,
        KeyCode::Char(' ') => Action::ToggleRow,
        KeyCode::Char('a') => Action::ToggleAll,
        KeyCode::Char('v') => Action::TogglePage,
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => Action::NextPage,
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => Action::PreviousPage,
        KeyCode::Char('s') => Action::CyclePageSize,
        _ => handle_common(key),
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns the request to send to the prediction source when the action
/// submitted a valid form.
pub fn apply_action(state: &mut AppState, action: Action) -> Option<PredictionRequest> {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::Resize(_, _) => {}
        Action::FocusNext => {
            state.form.focus_next();
        }
        Action::FocusPrevious => {
            state.form.focus_previous();
        }
        Action::OptionNext => {
            state.form.option_next();
        }
        Action::OptionPrevious => {
            state.form.option_previous();
        }
        Action::InsertChar(c) => {
            state.form.insert_char(c);
        }
        Action::InsertNewline => {
            state.form.insert_newline();
        }
        Action::Backspace => {
            state.form.backspace();
        }
        Action::Paste(text) => {
            state.form.paste(&text);
        }
        Action::Submit => {
            return state.submit();
        }
        Action::RowUp => {
            state.table.cursor_up();
        }
        Action::RowDown => {
            state.table.cursor_down();
        }
        Action::ToggleRow => {
            state.table.toggle_current();
        }
        Action::ToggleAll => {
            state.table.toggle_all();
        }
        Action::TogglePage => {
            state.table.toggle_page();
        }
        Action::NextPage => {
            state.table.next_page();
        }
        Action::PreviousPage => {
            state.table.previous_page();
        }
        Action::CyclePageSize => {
            state.table.cycle_page_size();
        }
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::DismissBanner => {
            state.dismiss_banner();
        }
        Action::ShowHelp => {
            state.show_help = true;
        }
        Action::DismissHelp => {
            state.dismiss_help();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Allele, PredictionRecord};
    use crate::table::PageSize;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_editor_keys() {
        let mode = AppMode::Normal;
        let focus = FormField::Sequences;

        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &mode, focus, false), Action::InsertChar('q'));
        assert_eq!(handle_key_event(key(KeyCode::Char(':')), &mode, focus, false), Action::InsertChar(':'));
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, focus, false), Action::InsertNewline);
        assert_eq!(handle_key_event(key(KeyCode::Backspace), &mode, focus, false), Action::Backspace);
        assert_eq!(handle_key_event(key(KeyCode::Tab), &mode, focus, false), Action::FocusNext);
    }

    #[test]
    fn test_global_keys() {
        let mode = AppMode::Normal;
        for focus in [FormField::Sequences, FormField::Allele, FormField::Results] {
            assert_eq!(handle_key_event(ctrl('s'), &mode, focus, false), Action::Submit);
            assert_eq!(handle_key_event(ctrl('c'), &mode, focus, false), Action::Quit);
            assert_eq!(handle_key_event(key(KeyCode::BackTab), &mode, focus, false), Action::FocusPrevious);
            assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, focus, false), Action::DismissBanner);
        }
    }

    #[test]
    fn test_selector_keys() {
        let mode = AppMode::Normal;
        let focus = FormField::Allele;
        assert_eq!(handle_key_event(key(KeyCode::Char('l')), &mode, focus, false), Action::OptionNext);
        assert_eq!(handle_key_event(key(KeyCode::Left), &mode, focus, false), Action::OptionPrevious);
        assert_eq!(handle_key_event(key(KeyCode::Char(':')), &mode, focus, false), Action::EnterCommandMode);
        assert_eq!(handle_key_event(key(KeyCode::Char('?')), &mode, focus, false), Action::ShowHelp);
    }

    #[test]
    fn test_submit_button_keys() {
        let mode = AppMode::Normal;
        let focus = FormField::Submit;
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, focus, false), Action::Submit);
        assert_eq!(handle_key_event(key(KeyCode::Char(' ')), &mode, focus, false), Action::Submit);
    }

    #[test]
    fn test_results_keys() {
        let mode = AppMode::Normal;
        let focus = FormField::Results;
        assert_eq!(handle_key_event(key(KeyCode::Char('j')), &mode, focus, false), Action::RowDown);
        assert_eq!(handle_key_event(key(KeyCode::Char('k')), &mode, focus, false), Action::RowUp);
        assert_eq!(handle_key_event(key(KeyCode::Char(' ')), &mode, focus, false), Action::ToggleRow);
        assert_eq!(handle_key_event(key(KeyCode::Char('a')), &mode, focus, false), Action::ToggleAll);
        assert_eq!(handle_key_event(key(KeyCode::Char('v')), &mode, focus, false), Action::TogglePage);
        assert_eq!(handle_key_event(key(KeyCode::Char('n')), &mode, focus, false), Action::NextPage);
        assert_eq!(handle_key_event(key(KeyCode::Left), &mode, focus, false), Action::PreviousPage);
        assert_eq!(handle_key_event(key(KeyCode::Char('s')), &mode, focus, false), Action::CyclePageSize);
    }

    #[test]
    fn test_command_mode_input() {
        let mode = AppMode::Command(String::new());
        let focus = FormField::Results;
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &mode, focus, false), Action::CommandChar('q'));
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, focus, false), Action::ExecuteCommand);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, focus, false), Action::CancelCommand);
        assert_eq!(handle_key_event(key(KeyCode::Backspace), &mode, focus, false), Action::CommandBackspace);
    }

    #[test]
    fn test_dismiss_help() {
        let mode = AppMode::Normal;
        // Any key when help is shown should dismiss help
        assert_eq!(handle_key_event(key(KeyCode::Char('x')), &mode, FormField::Results, true), Action::DismissHelp);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, FormField::Sequences, true), Action::DismissHelp);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(
            handle_event(Event::Key(release), &AppMode::Normal, FormField::Sequences, false),
            Action::None
        );
    }

    #[test]
    fn test_paste_into_editor() {
        let paste = Event::Paste("AB\r\nC".to_string());
        let action = handle_event(paste.clone(), &AppMode::Normal, FormField::Sequences, false);
        assert_eq!(action, Action::Paste("AB\r\nC".to_string()));
        assert_eq!(handle_event(paste, &AppMode::Normal, FormField::Results, false), Action::None);

        let mut state = AppState::new(PageSize::Ten, false);
        apply_action(&mut state, action);
        assert_eq!(state.form.sequences, "AB\nC");
    }

    #[test]
    fn test_typing_and_submitting() {
        let mut state = AppState::new(PageSize::Ten, false);
        for c in "SIINFEKL".chars() {
            assert!(apply_action(&mut state, Action::InsertChar(c)).is_none());
        }
        apply_action(&mut state, Action::InsertNewline);
        apply_action(&mut state, Action::InsertNewline);
        for c in "GILGFVFTL".chars() {
            apply_action(&mut state, Action::InsertChar(c));
        }
        apply_action(&mut state, Action::FocusNext);
        apply_action(&mut state, Action::OptionNext);

        let request = apply_action(&mut state, Action::Submit).expect("request");
        assert_eq!(request.sequences, vec!["SIINFEKL", "GILGFVFTL"]);
        assert_eq!(request.allele, Allele::A0201);

        // Blocked while in flight
        assert!(apply_action(&mut state, Action::Submit).is_none());
    }

    #[test]
    fn test_table_actions() {
        let mut state = AppState::new(PageSize::Ten, false);
        let records = (0..23)
            .map(|i| PredictionRecord {
                id: format!("r{}", i),
                allele: Allele::A0101,
                mhc_sequence: String::new(),
                peptide: format!("P{}", i),
                label: 0,
                score: 0.0,
            })
            .collect();
        state.receive(Ok(records));

        apply_action(&mut state, Action::NextPage);
        apply_action(&mut state, Action::RowDown);
        apply_action(&mut state, Action::ToggleRow);
        assert!(state.table.is_selected("r11"));

        apply_action(&mut state, Action::CyclePageSize);
        assert_eq!(state.table.page(), 1);
        assert_eq!(state.table.page_size(), PageSize::TwentyFive);

        apply_action(&mut state, Action::ToggleAll);
        assert_eq!(state.table.selected_count(), 23);
    }

    #[test]
    fn test_command_flow() {
        let mut state = AppState::new(PageSize::Ten, false);
        apply_action(&mut state, Action::EnterCommandMode);
        apply_action(&mut state, Action::CommandChar('h'));
        apply_action(&mut state, Action::ExecuteCommand);
        assert!(state.show_help);
        assert_eq!(state.mode, AppMode::Normal);

        apply_action(&mut state, Action::DismissHelp);
        apply_action(&mut state, Action::EnterCommandMode);
        apply_action(&mut state, Action::CommandChar('q'));
        apply_action(&mut state, Action::CommandBackspace);
        assert_eq!(state.mode, AppMode::Normal);
        assert!(!state.should_quit);
    }
}
