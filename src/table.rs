//! Result table state: pagination, row selection and column formatting.
//!
//! Rows are kept in insertion order; there is no sorting. Pagination is
//! 1-indexed. Selection is a set of record ids and never survives a
//! [`ResultTable::replace`].

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use crate::model::PredictionRecord;

/// Allowed rows-per-page values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::TwentyFive, PageSize::Fifty];

    /// Number of rows on a page.
    pub fn rows(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
        }
    }

    pub fn from_rows(rows: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.rows() == rows)
    }

    /// Next size, wrapping from 50 back to 10.
    pub fn next(self) -> Self {
        match self {
            PageSize::Ten => PageSize::TwentyFive,
            PageSize::TwentyFive => PageSize::Fifty,
            PageSize::Fifty => PageSize::Ten,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rows())
    }
}

/// Columns of the result table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Allele,
    Mhc,
    Peptide,
    Label,
    Score,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Allele,
        Column::Mhc,
        Column::Peptide,
        Column::Label,
        Column::Score,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Allele => "HLA",
            Column::Mhc => "MHC",
            Column::Peptide => "Peptide",
            Column::Label => "Prediction",
            Column::Score => "Score",
        }
    }

    /// Cell text for a record.
    pub fn cell(&self, record: &PredictionRecord) -> String {
        match self {
            Column::Allele => record.allele.to_string(),
            Column::Mhc => record.mhc_sequence.clone(),
            Column::Peptide => record.peptide.clone(),
            Column::Label => record.label.to_string(),
            Column::Score => format_score(record.score),
        }
    }
}

/// Formats a score with 12 decimals.
pub fn format_score(score: f64) -> String {
    format!("{:.12}", score)
}

/// Paginated, selectable view over the current predictions.
#[derive(Debug, Clone)]
pub struct ResultTable {
    records: Vec<PredictionRecord>,
    /// Current page, 1-indexed
    page: usize,
    page_size: PageSize,
    selected: HashSet<String>,
    /// Highlighted row, relative to the current page
    cursor: usize,
}

impl ResultTable {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            records: Vec::new(),
            page: 1,
            page_size,
            selected: HashSet::new(),
            cursor: 0,
        }
    }

    /// Replaces all records, going back to page 1 with nothing selected.
    pub fn replace(&mut self, records: Vec<PredictionRecord>) {
        self.records = records;
        self.page = 1;
        self.cursor = 0;
        self.selected.clear();
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Number of pages; an empty table still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(self.page_size.rows()).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page * self.page_size.rows() < self.records.len()
    }

    /// Goes to the next page. No-op on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        self.clamp_cursor();
        true
    }

    /// Goes to the previous page. No-op on the first page.
    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        self.clamp_cursor();
        true
    }

    /// Jumps to a page, clamped to `1..=page_count()`.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
        self.clamp_cursor();
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 1;
        self.cursor = 0;
    }

    pub fn cycle_page_size(&mut self) {
        self.set_page_size(self.page_size.next());
    }

    /// Index range of the rows on the current page.
    pub fn page_range(&self) -> Range<usize> {
        let size = self.page_size.rows();
        let start = ((self.page - 1) * size).min(self.records.len());
        let end = (self.page * size).min(self.records.len());
        start..end
    }

    /// Records on the current page.
    pub fn visible(&self) -> &[PredictionRecord] {
        &self.records[self.page_range()]
    }

    /// Footer label such as `11-20 of 23`.
    pub fn range_label(&self) -> String {
        let range = self.page_range();
        if range.is_empty() {
            format!("0-0 of {}", self.records.len())
        } else {
            format!("{}-{} of {}", range.start + 1, range.end, self.records.len())
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.visible().len() {
            self.cursor += 1;
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.visible().len().saturating_sub(1));
    }

    /// Record under the cursor.
    pub fn current_record(&self) -> Option<&PredictionRecord> {
        self.visible().get(self.cursor)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Toggles one row. Returns the new selection state of that row.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Toggles the row under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(id) = self.current_record().map(|r| r.id.clone()) {
            self.toggle(&id);
        }
    }

    /// True when every loaded row is selected (false for an empty table).
    pub fn is_all_selected(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| self.selected.contains(&r.id))
    }

    /// True when every row on the current page is selected.
    pub fn is_page_selected(&self) -> bool {
        let visible = self.visible();
        !visible.is_empty() && visible.iter().all(|r| self.selected.contains(&r.id))
    }

    /// Header checkbox: selects all loaded rows, or clears the selection if
    /// they already are all selected.
    pub fn toggle_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.records.iter().map(|r| r.id.clone()).collect();
        }
    }

    /// Same as [`toggle_all`](Self::toggle_all) restricted to the current page.
    pub fn toggle_page(&mut self) {
        let range = self.page_range();
        if self.is_page_selected() {
            for r in &self.records[range] {
                self.selected.remove(&r.id);
            }
        } else {
            for r in &self.records[range] {
                self.selected.insert(r.id.clone());
            }
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected records in table order.
    pub fn selected_records(&self) -> Vec<&PredictionRecord> {
        self.records
            .iter()
            .filter(|r| self.selected.contains(&r.id))
            .collect()
    }
}
