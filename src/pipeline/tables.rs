//! Table detection from positioned words (stream mode).
//!
//! pdfium exposes characters with positions but no notion of tables, so the
//! pdfium page source infers simple tables from text alignment alone:
//!
//! 1. words are grouped into lines by vertical position;
//! 2. each line is split into cells wherever the horizontal gap between two
//!    neighbouring words exceeds `min_column_gap`;
//! 3. a run of consecutive multi-cell lines whose cells line up with the
//!    columns of the run's first line is a table.
//!
//! Ruled tables, spanning cells and multi-line cells are out of reach for
//! this approach; rows are reported exactly as found, ragged or not.

use tracing::debug;

/// A word with its box in top-left-origin page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            right,
            bottom,
        }
    }

    fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows (header included) to call a region a table.
    pub min_rows: usize,
    /// Minimum number of cells on the first row of a table.
    pub min_columns: usize,
    /// Horizontal gap (points) that separates two cells on one line.
    pub min_column_gap: f32,
    /// Slack (points) when matching a cell against a column span.
    pub column_tolerance: f32,
    /// Largest vertical gap between rows, as a multiple of line height.
    pub max_row_gap_factor: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            min_column_gap: 12.0,
            column_tolerance: 4.0,
            max_row_gap_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    left: f32,
    right: f32,
}

#[derive(Debug)]
struct Line {
    top: f32,
    bottom: f32,
    cells: Vec<Cell>,
}

impl Line {
    fn height(&self) -> f32 {
        (self.bottom - self.top).max(1.0)
    }
}

/// Detect tables among `words`, top to bottom.
///
/// Each table is a list of rows, each row a list of cell strings.
pub fn detect_tables(words: &[Word], config: &TableDetectorConfig) -> Vec<Vec<Vec<String>>> {
    let lines = group_into_lines(words, config.min_column_gap);
    let mut tables = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let header = &lines[i];
        if header.cells.len() < config.min_columns.max(2) {
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end < lines.len() {
            let prev = &lines[end - 1];
            let line = &lines[end];
            let gap = line.top - prev.bottom;
            if line.cells.len() < 2
                || gap > prev.height().max(line.height()) * config.max_row_gap_factor
                || !aligned(line, header, config.column_tolerance)
            {
                break;
            }
            end += 1;
        }

        if end - i >= config.min_rows {
            debug!(
                "TableDetector: {} rows × {} columns at y={:.1}",
                end - i,
                header.cells.len(),
                header.top
            );
            tables.push(
                lines[i..end]
                    .iter()
                    .map(|l| l.cells.iter().map(|c| c.text.clone()).collect())
                    .collect(),
            );
            i = end;
        } else {
            i += 1;
        }
    }

    tables
}

/// True when most of `line`'s cells fall under a column of `header`.
fn aligned(line: &Line, header: &Line, tolerance: f32) -> bool {
    let hits = line
        .cells
        .iter()
        .filter(|cell| {
            header
                .cells
                .iter()
                .any(|col| cell.left <= col.right + tolerance && cell.right >= col.left - tolerance)
        })
        .count();
    hits >= 2 && hits * 2 >= line.cells.len()
}

fn group_into_lines(words: &[Word], min_column_gap: f32) -> Vec<Line> {
    let mut sorted: Vec<&Word> = words.iter().filter(|w| !w.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut rows: Vec<Vec<&Word>> = Vec::new();
    for word in sorted {
        let joins = rows.last().is_some_and(|row| {
            let (top, bottom) = span(row);
            let center = (top + bottom) / 2.0;
            let tolerance = (bottom - top).max(word.height()) * 0.5;
            (word.center_y() - center).abs() <= tolerance
        });
        match rows.last_mut() {
            Some(row) if joins => row.push(word),
            _ => rows.push(vec![word]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| a.left.total_cmp(&b.left));
            let (top, bottom) = span(&row);
            Line {
                top,
                bottom,
                cells: split_cells(&row, min_column_gap),
            }
        })
        .collect()
}

fn span(row: &[&Word]) -> (f32, f32) {
    let top = row.iter().map(|w| w.top).fold(f32::INFINITY, f32::min);
    let bottom = row.iter().map(|w| w.bottom).fold(f32::NEG_INFINITY, f32::max);
    (top, bottom)
}

fn split_cells(row: &[&Word], min_column_gap: f32) -> Vec<Cell> {
    let mut cells: Vec<Cell> = Vec::new();
    for word in row {
        match cells.last_mut() {
            Some(cell) if word.left - cell.right <= min_column_gap => {
                cell.text.push(' ');
                cell.text.push_str(&word.text);
                cell.right = cell.right.max(word.right);
            }
            _ => cells.push(Cell {
                text: word.text.clone(),
                left: word.left,
                right: word.right,
            }),
        }
    }
    cells
}
