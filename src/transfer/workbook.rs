//! Spreadsheet plumbing: reading sheets with calamine and writing them with
//! umya-spreadsheet. Both sides use the same header-plus-rows [`Sheet`] shape.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl Cell {
    /// Text form of the cell, `None` when blank.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) if n.fract() == 0.0 => Some(format!("{n:.0}")),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// One worksheet: a header row and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Column widths in characters, applied when writing.
    pub widths: Vec<f64>,
}

impl Sheet {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            widths: Vec::new(),
        }
    }

    pub fn with_widths(mut self, widths: &[f64]) -> Self {
        self.widths = widths.to_vec();
        self
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn column(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(header))
    }

    /// Data rows as header-addressed records. The spreadsheet row number
    /// (1-based, header is row 1) comes along for error messages.
    pub fn records(&self) -> impl Iterator<Item = (usize, Record<'_>)> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, cells)| (idx + 2, Record { sheet: self, cells }))
    }
}

/// A data row addressed by header label.
pub struct Record<'a> {
    sheet: &'a Sheet,
    cells: &'a [Cell],
}

impl Record<'_> {
    pub fn cell(&self, header: &str) -> &Cell {
        self.sheet
            .column(header)
            .and_then(|idx| self.cells.get(idx))
            .unwrap_or(&Cell::Empty)
    }

    pub fn text(&self, header: &str) -> Option<String> {
        self.cell(header).text()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.text().is_none())
    }

    /// Whole-number value; decimals are rounded. Text goes through
    /// [`parse_amount`].
    pub fn integer(&self, header: &str) -> std::result::Result<Option<i64>, String> {
        match self.cell(header) {
            Cell::Number(n) => Ok(Some(n.round() as i64)),
            other => match other.text() {
                None => Ok(None),
                Some(s) => parse_amount(&s)
                    .map(Some)
                    .ok_or_else(|| format!("{header} '{s}' is not a number")),
            },
        }
    }

    /// Date value; text accepts `YYYY-MM-DD` and `DD/MM/YYYY`.
    pub fn date(&self, header: &str) -> std::result::Result<Option<NaiveDate>, String> {
        match self.cell(header) {
            Cell::Date(d) => Ok(Some(*d)),
            other => match other.text() {
                None => Ok(None),
                Some(s) => parse_date(&s)
                    .map(Some)
                    .ok_or_else(|| format!("{header} '{s}' is not a valid date")),
            },
        }
    }
}

/// Whole amount from text such as `1.500.000`, `150,000.50` or `250000.00`.
///
/// A last `.` or `,` followed by one or two digits is the decimal point, and
/// the value is rounded half away from zero. Any other separator must group
/// digits in threes and all of them must be the same character. Text that
/// fits neither reading is rejected.
pub fn parse_amount(value: &str) -> Option<i64> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let (negative, body) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.as_str()),
    };

    let mut whole = body;
    let mut decimal = None;
    if let Some(at) = body.rfind(['.', ',']) {
        let tail = &body[at + 1..];
        if matches!(tail.len(), 1 | 2) {
            decimal = Some((&body[at..=at], tail));
            whole = &body[..at];
        }
    }

    let digits = ungroup(whole, decimal.map(|(sep, _)| sep))?;
    let mut amount: i64 = digits.parse().ok()?;
    if let Some((_, tail)) = decimal {
        if !is_digits(tail) {
            return None;
        }
        let scale = if tail.len() == 1 { 10 } else { 100 };
        let fraction: i64 = tail.parse().ok()?;
        if fraction * 2 >= scale {
            amount = amount.checked_add(1)?;
        }
    }
    Some(if negative { -amount } else { amount })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Digits of `whole` with thousands separators removed, or `None` when the
/// grouping is not a clean run of threes.
fn ungroup(whole: &str, decimal: Option<&str>) -> Option<String> {
    let Some(at) = whole.find(['.', ',']) else {
        return is_digits(whole).then(|| whole.to_string());
    };
    let sep = &whole[at..=at];
    if decimal == Some(sep) {
        return None;
    }

    let mut groups = whole.split(sep);
    let head = groups.next()?;
    if head.len() > 3 || !is_digits(head) {
        return None;
    }
    let mut digits = head.to_string();
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::Date(value.date()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_date(s).map(Cell::Date).unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#ERROR:{e:?}")),
    }
}

/// Read the named sheets that exist in the workbook at `path`. Sheets not in
/// `wanted` are ignored; missing ones are simply absent from the result.
pub fn read_sheets(path: &Path, wanted: &[&str]) -> Result<Vec<Sheet>> {
    let read_err = |message: String| AppError::SpreadsheetRead {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;
    let names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::new();
    for name in wanted {
        let Some(actual) = names.iter().find(|n| n.eq_ignore_ascii_case(name)) else {
            continue;
        };
        let range = workbook
            .worksheet_range(actual)
            .map_err(|e| read_err(format!("sheet '{actual}': {e}")))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|r| r.iter().map(|d| cell_from_data(d).text().unwrap_or_default()).collect())
            .unwrap_or_default();

        sheets.push(Sheet {
            name: name.to_string(),
            headers,
            rows: rows.map(|r| r.iter().map(cell_from_data).collect()).collect(),
            widths: Vec::new(),
        });
    }

    tracing::debug!(path = %path.display(), sheets = sheets.len(), "read workbook");
    Ok(sheets)
}

/// Column letter for a 1-based index (1 -> A, 27 -> AA).
fn column_letter(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Write `sheets` to a new .xlsx file at `path`.
pub fn write_sheets(path: &Path, sheets: &[Sheet]) -> Result<()> {
    let write_err = |message: String| AppError::SpreadsheetWrite {
        path: path.to_path_buf(),
        message,
    };

    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for sheet in sheets {
        let ws = book
            .new_sheet(sheet.name.as_str())
            .map_err(|e| write_err(e.to_string()))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            let cell = ws.get_cell_mut((col as u32 + 1, 1));
            cell.set_value(header.as_str());
            cell.get_style_mut().get_font_mut().set_bold(true);
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_no = row_idx as u32 + 2;
            for (col, value) in row.iter().enumerate() {
                let coordinate = (col as u32 + 1, row_no);
                match value {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        ws.get_cell_mut(coordinate).set_value(s.as_str());
                    }
                    Cell::Number(n) => {
                        ws.get_cell_mut(coordinate).set_value_number(*n);
                    }
                    Cell::Date(d) => {
                        ws.get_cell_mut(coordinate)
                            .set_value(d.format("%Y-%m-%d").to_string());
                    }
                }
            }
        }

        for (col, width) in sheet.widths.iter().enumerate() {
            ws.get_column_dimension_mut(&column_letter(col as u32 + 1))
                .set_width(*width);
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(|e| write_err(e.to_string()))?;
    tracing::debug!(path = %path.display(), "wrote workbook");
    Ok(())
}
