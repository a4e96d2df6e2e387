//! Application controller.
//!
//! This module orchestrates the main application loop:
//! - Terminal initialization and cleanup
//! - Event polling and handling
//! - Forwarding submissions to the prediction worker and collecting replies
//! - State updates and rendering

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::event::{apply_action, handle_event, poll_event};
use crate::model::AppState;
use crate::predictor::{PredictionSource, PredictionWorker};
use crate::ui::render;

/// The main application controller.
pub struct App {
    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    state: AppState,
    /// Background prediction thread
    worker: PredictionWorker,
    /// Event poll timeout
    tick_rate: Duration,
}

impl App {
    /// Creates a new application with the given state and prediction source.
    pub fn new(state: AppState, source: Box<dyn PredictionSource>) -> Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            worker: PredictionWorker::spawn(source),
            tick_rate: Duration::from_millis(50),
        })
    }

    /// Runs the main application loop.
    pub fn run(&mut self) -> Result<()> {
        loop {
            // Render
            self.terminal.draw(|frame| {
                render(frame, &self.state);
            })?;

            // Collect a finished prediction
            if self.state.in_flight {
                if let Some(reply) = self.worker.try_recv() {
                    self.state.receive(reply);
                }
            }

            // Handle events
            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(
                    event,
                    &self.state.mode,
                    self.state.form.focus,
                    self.state.show_help,
                );

                if let Some(request) = apply_action(&mut self.state, action) {
                    if let Err(e) = self.worker.submit(request) {
                        self.state.receive(Err(e));
                    }
                }

                if self.state.should_quit {
                    break;
                }
            }
        }

        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Convenience function to run the application with a prediction source.
pub fn run_app(state: AppState, source: Box<dyn PredictionSource>) -> Result<()> {
    let mut app = App::new(state, source)?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::MockPredictor;
    use crate::table::PageSize;

    #[test]
    fn test_app_state_creation() {
        let state = AppState::new(PageSize::TwentyFive, true);
        assert!(state.table.is_empty());
        assert_eq!(state.table.page_size(), PageSize::TwentyFive);
        assert!(!state.should_quit);
        assert!(!state.in_flight);
    }

    #[test]
    fn test_submission_through_worker() {
        // Same flow as the event loop, without a terminal
        let mut state = AppState::new(PageSize::Ten, false);
        let worker = PredictionWorker::spawn(Box::new(MockPredictor::with_seed(11)));
        state.form.sequences = "AAA\n\n  \nBBB".to_string();

        let request = state.submit().expect("valid form");
        worker.submit(request).unwrap();
        assert!(state.in_flight);

        let reply = worker.recv_timeout(Duration::from_secs(5)).expect("reply");
        state.receive(reply);

        assert!(!state.in_flight);
        let peptides: Vec<&str> = state.table.records().iter().map(|r| r.peptide.as_str()).collect();
        assert_eq!(peptides, vec!["AAA", "BBB"]);
        assert_eq!(state.table.page(), 1);
    }
}
