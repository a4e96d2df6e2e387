//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - Submission form (input format, sequence editor, allele, submit)
//! - Dismissible error banner
//! - Paginated prediction table with selection checkboxes
//! - Status bar with mode and page info
//! - Help overlay

pub mod glyphs;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::model::{AppMode, AppState, FormField};
use crate::table::Column;

/// Height of the title line.
const TITLE_HEIGHT: u16 = 1;
/// Height of the selector row (one line plus borders).
const SELECTOR_HEIGHT: u16 = 3;
/// Height of the sequence editor (including borders).
const EDITOR_HEIGHT: u16 = 8;
/// Height of the validation/hint line under the form.
const HINT_HEIGHT: u16 = 1;
/// Height of the error banner when shown.
const BANNER_HEIGHT: u16 = 4;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;

const HELP_TEXT: &[&str] = &[
    "Tab / Shift+Tab   move between fields",
    "Ctrl+S            submit from anywhere",
    "Ctrl+C            quit",
    "",
    "Selectors         h/l or Left/Right to change",
    "Submit            Enter or Space",
    "",
    "Results table",
    "  j/k             move the row cursor",
    "  Space           select the row",
    "  a               select / clear all rows",
    "  v               select / clear rows on this page",
    "  n/p             next / previous page",
    "  s               cycle rows per page (10, 25, 50)",
    "",
    "Commands",
    "  :load <file>    load a TXT, CSV or FASTA file",
    "  :size <n>       rows per page",
    "  :page <n>       go to page",
    "  :clear          empty the sequence editor",
    "  :q              quit",
    "",
    "Esc dismisses error banners. Press any key to close this help.",
];

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let banner_height = if state.banner.is_some() { BANNER_HEIGHT } else { 0 };

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(SELECTOR_HEIGHT + EDITOR_HEIGHT + HINT_HEIGHT),
            Constraint::Length(banner_height),
            Constraint::Min(5),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    render_title(frame, state, main_layout[0]);
    render_form(frame, state, main_layout[1]);
    if let Some(message) = &state.banner {
        render_banner(frame, message, main_layout[2]);
    }
    render_results(frame, state, main_layout[3]);
    render_status_bar(frame, state, main_layout[4]);

    if state.show_help {
        render_help(frame, area);
    }
}

fn field_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default().borders(Borders::ALL).border_style(style).title(title)
}

fn render_title(frame: &mut Frame, state: &AppState, area: Rect) {
    let right = format!("{} ", state.form.allele);
    let left = " p-MHC Binding Prediction";
    let padding = (area.width as usize).saturating_sub(left.len() + right.len());
    let line = Line::from(vec![
        Span::styled(left, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_form(frame: &mut Frame, state: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SELECTOR_HEIGHT),
            Constraint::Length(EDITOR_HEIGHT),
            Constraint::Length(HINT_HEIGHT),
        ])
        .split(area);

    let selectors = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    let g = &state.glyphs;
    let focus = state.form.focus;

    let format = Paragraph::new(format!("{} {} {}", g.arrow_left, state.form.input_format, g.arrow_right))
        .alignment(Alignment::Center)
        .block(field_block("Input type".to_string(), focus == FormField::InputFormat));
    frame.render_widget(format, selectors[0]);

    let allele = Paragraph::new(format!("{} {} {}", g.arrow_left, state.form.allele, g.arrow_right))
        .alignment(Alignment::Center)
        .block(field_block("HLA allele *".to_string(), focus == FormField::Allele));
    frame.render_widget(allele, selectors[1]);

    let (label, mut style) = if state.in_flight {
        (format!("SUBMITTING{}", g.spinner), Style::default().fg(Color::DarkGray))
    } else {
        ("SUBMIT".to_string(), Style::default().fg(Color::Blue))
    };
    style = style.add_modifier(Modifier::BOLD);
    if focus == FormField::Submit {
        style = style.add_modifier(Modifier::REVERSED);
    }
    let submit = Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(field_block(String::new(), focus == FormField::Submit));
    frame.render_widget(submit, selectors[2]);

    render_editor(frame, state, rows[1]);

    let hint = match &state.form.validation_error {
        Some(err) => Line::from(Span::styled(
            format!(" {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            " Tab: next field | Ctrl+S: submit | :h help",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(hint), rows[2]);
}

/// Renders the sequence editor, scrolled so the last lines stay visible.
fn render_editor(frame: &mut Frame, state: &AppState, area: Rect) {
    let focused = state.form.focus == FormField::Sequences;
    let title = format!(
        "Paste sequences in {} format ({} lines)",
        state.form.input_format,
        state.form.line_count()
    );
    let block = field_block(title, focused);
    let inner_height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = if state.form.sequences.is_empty() && !focused {
        state
            .form
            .input_format
            .placeholder()
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::DarkGray))))
            .collect()
    } else {
        let all: Vec<&str> = state.form.sequences.split('\n').collect();
        let skip = all.len().saturating_sub(inner_height);
        let last = all.len() - 1;
        all.iter()
            .enumerate()
            .skip(skip)
            .map(|(idx, text)| {
                let mut spans = vec![Span::raw(text.to_string())];
                if focused && idx == last {
                    spans.push(Span::styled(
                        state.glyphs.cursor,
                        Style::default().fg(Color::Yellow),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_banner(frame: &mut Frame, message: &str, area: Rect) {
    let width = area.width.saturating_sub(2).max(1) as usize;
    let lines: Vec<Line> = textwrap::wrap(message, width)
        .into_iter()
        .map(|l| Line::from(Span::styled(l.into_owned(), Style::default().fg(Color::Red))))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title("Prediction failed (Esc to dismiss)");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_results(frame: &mut Frame, state: &AppState, area: Rect) {
    let table = &state.table;
    let focused = state.form.focus == FormField::Results;
    let title = if table.selected_count() > 0 {
        format!("Predictions ({} selected)", table.selected_count())
    } else {
        "Predictions".to_string()
    };
    let block = field_block(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if table.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "No predictions yet. Fill in the form and press Ctrl+S.",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(hint, inner);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let g = &state.glyphs;
    let checkbox = |on: bool| if on { g.checked } else { g.unchecked };

    let mut header_cells = vec![Cell::from(checkbox(table.is_all_selected()))];
    header_cells.extend(Column::ALL.iter().map(|c| Cell::from(c.header())));
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    );

    let rows: Vec<Row> = table
        .visible()
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let mut cells = vec![Cell::from(checkbox(table.is_selected(&record.id)))];
            for column in Column::ALL {
                let text = column.cell(record);
                let cell = if column == Column::Peptide && record.has_leucine() {
                    Cell::from(Span::styled(text, Style::default().fg(Color::Red)))
                } else {
                    Cell::from(text)
                };
                cells.push(cell);
            }
            let row = Row::new(cells);
            if focused && idx == table.cursor() {
                row.style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(11),
        Constraint::Length(33),
        Constraint::Min(9),
        Constraint::Length(10),
        Constraint::Length(14),
    ];
    frame.render_widget(Table::new(rows, widths).header(header), parts[0]);

    let enabled = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);
    let footer = Line::from(vec![
        Span::raw(format!(" Rows per page: {}   {}   ", table.page_size(), table.range_label())),
        Span::styled(
            g.arrow_left,
            if table.has_previous() { enabled } else { disabled },
        ),
        Span::raw(" "),
        Span::styled(
            g.arrow_right,
            if table.has_next() { enabled } else { disabled },
        ),
    ]);
    frame.render_widget(Paragraph::new(footer).alignment(Alignment::Right), parts[1]);
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let position_info = format!(
        "{} selected | Page {}/{} ",
        state.table.selected_count(),
        state.table.page(),
        state.table.page_count()
    );

    let message = state.status_message.as_deref().unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(
            left_content,
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + position_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 80, area);
    let lines: Vec<Line> = HELP_TEXT.iter().map(|l| Line::from(*l)).collect();
    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title("Help"),
        );
    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
