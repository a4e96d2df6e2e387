//! Data model for the prediction viewer.
//!
//! This module contains all data structures for representing:
//! - HLA alleles and input formats
//! - Prediction requests and records
//! - Submission form state
//! - Application state
//!
//! The result table itself lives in [`crate::table`]; `AppState` owns one.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::formats::{load_sequences, LoadError, SequenceFileFormat};
use crate::normalize::{build_request, ValidationError};
use crate::predictor::PredictionResult;
use crate::table::{PageSize, ResultTable};
use crate::ui::glyphs::{self, Glyphs};

/// HLA class I alleles offered by the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Allele {
    #[default]
    A0101,
    A0201,
    B0702,
    B0801,
}

impl Allele {
    /// All selectable alleles, in display order.
    pub const ALL: [Allele; 4] = [Allele::A0101, Allele::A0201, Allele::B0702, Allele::B0801];

    /// Returns the standard nomenclature string (e.g. `HLA-A*02:01`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Allele::A0101 => "HLA-A*01:01",
            Allele::A0201 => "HLA-A*02:01",
            Allele::B0702 => "HLA-B*07:02",
            Allele::B0801 => "HLA-B*08:01",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    /// Next allele in the list, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous allele in the list, wrapping around.
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Allele {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::InvalidAllele(wanted.to_string()))
    }
}

/// How the free-text sequence input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// One peptide per line
    #[default]
    Peptide,
    /// FASTA records; headers are stripped, sequence lines joined
    Fasta,
}

impl InputFormat {
    /// Toggles between the two formats.
    pub fn next(self) -> Self {
        match self {
            InputFormat::Peptide => InputFormat::Fasta,
            InputFormat::Fasta => InputFormat::Peptide,
        }
    }

    /// Hint shown in an empty sequence editor.
    pub fn placeholder(&self) -> &'static str {
        match self {
            InputFormat::Peptide => "Enter peptide sequences",
            InputFormat::Fasta => ">seq1\nPeptideSequence",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Peptide => write!(f, "Peptide"),
            InputFormat::Fasta => write!(f, "FASTA"),
        }
    }
}

/// A validated submission, created per submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Trimmed, non-empty sequences in input order
    pub sequences: Vec<String>,
    /// Format the sequences were parsed from
    pub input_format: InputFormat,
    /// Target allele
    pub allele: Allele,
}

impl PredictionRequest {
    /// Returns the number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if there are no sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// One prediction: a peptide/allele pair with a binary label and a score.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    /// Opaque identifier, unique within one result list
    pub id: String,
    pub allele: Allele,
    /// MHC pseudo-sequence of the allele
    pub mhc_sequence: String,
    pub peptide: String,
    /// Binder (1) or non-binder (0)
    pub label: u8,
    /// Score in [0, 1)
    pub score: f64,
}

impl PredictionRecord {
    /// True when the peptide contains a leucine; used for highlighting only.
    pub fn has_leucine(&self) -> bool {
        self.peptide.contains('L')
    }
}

/// Focusable elements of the screen, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    InputFormat,
    #[default]
    Sequences,
    Allele,
    Submit,
    Results,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::InputFormat,
        FormField::Sequences,
        FormField::Allele,
        FormField::Submit,
        FormField::Results,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// State of the submission form.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub input_format: InputFormat,
    /// Raw multi-line sequence text
    pub sequences: String,
    pub allele: Allele,
    pub focus: FormField,
    /// Inline error shown under the form, cleared on edit
    pub validation_error: Option<ValidationError>,
}

impl FormState {
    pub fn insert_char(&mut self, c: char) {
        self.sequences.push(c);
        self.validation_error = None;
    }

    pub fn insert_newline(&mut self) {
        self.sequences.push('\n');
        self.validation_error = None;
    }

    /// Appends pasted text, dropping carriage returns.
    pub fn paste(&mut self, text: &str) {
        self.sequences.extend(text.chars().filter(|c| *c != '\r'));
        self.validation_error = None;
    }

    pub fn backspace(&mut self) {
        self.sequences.pop();
        self.validation_error = None;
    }

    pub fn clear_sequences(&mut self) {
        self.sequences.clear();
        self.validation_error = None;
    }

    /// Number of lines in the editor (an empty editor has one line).
    pub fn line_count(&self) -> usize {
        self.sequences.split('\n').count()
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Cycles the focused selector forward. Returns false if the focus is not a selector.
    pub fn option_next(&mut self) -> bool {
        match self.focus {
            FormField::InputFormat => self.input_format = self.input_format.next(),
            FormField::Allele => self.allele = self.allele.next(),
            _ => return false,
        }
        self.validation_error = None;
        true
    }

    /// Cycles the focused selector backward. Returns false if the focus is not a selector.
    pub fn option_previous(&mut self) -> bool {
        match self.focus {
            // Two options only, so previous == next
            FormField::InputFormat => self.input_format = self.input_format.next(),
            FormField::Allele => self.allele = self.allele.previous(),
            _ => return false,
        }
        self.validation_error = None;
        true
    }
}

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal form/table interaction
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
}

/// The complete application state.
#[derive(Debug)]
pub struct AppState {
    pub form: FormState,
    pub table: ResultTable,
    pub mode: AppMode,
    /// A prediction request has been sent and not answered yet
    pub in_flight: bool,
    /// Dismissible prediction failure message
    pub banner: Option<String>,
    /// Status message to display
    pub status_message: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    /// Format forced on the command line for `:load`
    pub forced_file_format: Option<SequenceFileFormat>,
    pub glyphs: Glyphs,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(page_size: PageSize, fancy_glyphs: bool) -> Self {
        Self {
            form: FormState::default(),
            table: ResultTable::new(page_size),
            mode: AppMode::Normal,
            in_flight: false,
            banner: None,
            status_message: None,
            show_help: false,
            should_quit: false,
            forced_file_format: None,
            glyphs: glyphs::select(fancy_glyphs),
        }
    }

    /// Validates the form and, if it is valid, marks a request in flight.
    ///
    /// Returns the request to hand to the prediction source, or `None` when
    /// the submission is blocked (invalid input or a request already running).
    pub fn submit(&mut self) -> Option<PredictionRequest> {
        if self.in_flight {
            self.status_message = Some("A prediction is already running".to_string());
            return None;
        }

        match build_request(&self.form.sequences, self.form.input_format, self.form.allele) {
            Ok(request) => {
                log::info!(
                    "Submitting {} sequences ({}) for {}",
                    request.len(),
                    request.input_format,
                    request.allele
                );
                self.form.validation_error = None;
                self.in_flight = true;
                self.status_message = Some(format!(
                    "Predicting {} sequences for {}...",
                    request.len(),
                    request.allele
                ));
                Some(request)
            }
            Err(e) => {
                log::warn!("Submission rejected: {}", e);
                self.form.validation_error = Some(e);
                None
            }
        }
    }

    /// Applies the outcome of a prediction request.
    ///
    /// Success replaces the table contents; failure raises the banner and
    /// leaves the previous results in place.
    pub fn receive(&mut self, result: PredictionResult<Vec<PredictionRecord>>) {
        self.in_flight = false;
        match result {
            Ok(records) => {
                log::info!("Received {} predictions", records.len());
                self.status_message = Some(format!("{} predictions", records.len()));
                self.banner = None;
                self.table.replace(records);
                if !self.table.is_empty() {
                    self.form.focus = FormField::Results;
                }
            }
            Err(e) => {
                log::error!("Prediction failed: {}", e);
                self.status_message = None;
                self.banner = Some(e.to_string());
            }
        }
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    /// Loads a sequence file into the editor.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, LoadError> {
        let loaded = load_sequences(path, self.forced_file_format)?;
        log::info!(
            "Loaded {} sequences from {} as {}",
            loaded.count,
            path.display(),
            loaded.format
        );
        self.form.sequences = loaded.text;
        self.form.input_format = loaded.input_format;
        self.form.validation_error = None;
        self.form.focus = FormField::Sequences;
        self.status_message = Some(format!(
            "Loaded {} sequences from {}",
            loaded.count,
            path.display()
        ));
        Ok(loaded.count)
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Executes the current command.
    pub fn execute_command(&mut self) {
        let AppMode::Command(cmd) = std::mem::take(&mut self.mode) else {
            return;
        };
        let cmd = cmd.trim();
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match name {
            "" => {}
            "q" | "quit" => self.should_quit = true,
            "h" | "help" => self.show_help = true,
            "clear" => self.form.clear_sequences(),
            "load" | "e" => {
                if arg.is_empty() {
                    self.status_message = Some("Usage: :load <file>".to_string());
                } else if let Err(e) = self.load_file(Path::new(arg)) {
                    log::warn!("Could not load {}: {}", arg, e);
                    self.status_message = Some(format!("Could not load {}: {}", arg, e));
                }
            }
            "size" => match arg.parse::<usize>().ok().and_then(PageSize::from_rows) {
                Some(size) => self.table.set_page_size(size),
                None => {
                    self.status_message = Some(format!("Invalid page size: {}", arg));
                }
            },
            "page" => match arg.parse::<usize>() {
                Ok(page) if page > 0 => self.table.set_page(page),
                _ => self.status_message = Some(format!("Invalid page: {}", arg)),
            },
            _ => self.status_message = Some(format!("Unknown command: {}", cmd)),
        }
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }
}
