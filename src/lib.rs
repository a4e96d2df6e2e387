//! # pmhctui - p-MHC Binding Prediction Viewer
//!
//! A terminal UI for submitting peptide/HLA pairs and browsing binding
//! predictions, built on ratatui.
//!
//! ## Architecture
//!
//! Input flows one way: form text → `normalize` → `predictor` → `AppState`
//! → `ui`. Modules:
//! - `model`: Alleles, requests, records, form and application state
//! - `normalize`: Free text to validated prediction requests
//! - `predictor`: Prediction source trait, mock source, background worker
//! - `table`: Paginated, selectable result table
//! - `formats`: TXT/CSV/FASTA file ingestion and TSV output
//! - `event`: Keyboard event handling
//! - `ui`: TUI rendering with ratatui
//! - `controller`: Terminal setup and the main loop

pub mod controller;
pub mod event;
pub mod formats;
pub mod model;
pub mod normalize;
pub mod predictor;
pub mod table;
pub mod ui;
