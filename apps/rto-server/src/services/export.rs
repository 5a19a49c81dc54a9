//! Spreadsheet export of RTO status snapshots.
//!
//! Each entry becomes one report: a title, the pending actions summary, the
//! overall status counts and the aged request details. XLSX output puts each
//! report on its own worksheet; CSV output concatenates them.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use entities::{PendingBreakdown, RtoStatusEntry, StatusCategory, SummaryKey, TimeBucket};
use rust_xlsxwriter::{Workbook, XlsxError};

/// Excel limit on worksheet name length.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Base name of the downloaded file.
pub const REPORT_FILE_STEM: &str = "RTO_Status_Report";

/// Errors raised while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("XLSX rendering failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel workbook, one worksheet per entry.
    #[default]
    Xlsx,
    /// Comma-separated values, reports separated by a blank line.
    Csv,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    /// `Content-Disposition` value for a download in this format.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{REPORT_FILE_STEM}.{}\"",
            self.extension()
        )
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unsupported export format '{other}'. Use xlsx or csv.")),
        }
    }
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(u64),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn as_csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// The rendered content of one entry. Empty rows are blank separators.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    /// Worksheet name, unique within the workbook.
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// Derives a worksheet name from the ISO upload time.
fn base_sheet_name(entry: &RtoStatusEntry) -> String {
    entry
        .uploaded_at_iso()
        .replace([':', '.'], "-")
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}

/// Appends ` (n)` until `name` is unused, truncating to keep the limit.
fn unique_sheet_name(base: String, used: &mut HashSet<String>) -> String {
    let mut name = base.clone();
    let mut n = 2;
    while used.contains(&name.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME_LEN - suffix.len();
        name = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    used.insert(name.to_lowercase());
    name
}

fn aging_cells(label: &str, row: &entities::AgingRow) -> Vec<Cell> {
    std::iter::once(Cell::text(label))
        .chain(TimeBucket::ALL.iter().map(|b| Cell::Number(row.get(*b))))
        .collect()
}

/// Lays out the report rows for one entry.
fn report_rows(entry: &RtoStatusEntry) -> Vec<Vec<Cell>> {
    let counts = &entry.summary_counts;
    let pending = PendingBreakdown::from_counts(counts);
    let mut rows = Vec::new();

    rows.push(vec![Cell::text(format!(
        "RTO Status Report - {}",
        entry.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")
    ))]);
    rows.push(vec![]);

    rows.push(vec![Cell::text("Pending Actions Summary")]);
    rows.push(vec![Cell::text("Status"), Cell::text("Count"), Cell::text("Percentage")]);
    rows.push(vec![
        Cell::text("Pending actions from Business"),
        Cell::Number(pending.business),
        Cell::text(format!("{}%", pending.business_percentage)),
    ]);
    rows.push(vec![
        Cell::text("Pending action from IT"),
        Cell::Number(pending.it),
        Cell::text(format!("{}%", pending.it_percentage)),
    ]);
    rows.push(vec![]);

    rows.push(vec![Cell::text("Overall Status Counts")]);
    rows.push(vec![Cell::text("Status"), Cell::text("Count")]);
    rows.extend(
        SummaryKey::DISPLAY_ORDER
            .iter()
            .map(|key| vec![Cell::text(key.label()), Cell::Number(counts.get(*key))]),
    );
    rows.push(vec![]);

    rows.push(vec![Cell::text("Aged Request Details")]);
    rows.push(
        std::iter::once(Cell::text("Row Labels"))
            .chain(TimeBucket::ALL.iter().map(|b| Cell::text(b.label())))
            .collect(),
    );
    for category in StatusCategory::DISPLAY_ORDER {
        if let Some(row) = entry.aging_matrix.statuses.get(&category) {
            rows.push(aging_cells(category.label(), row));
        }
    }
    rows.push(aging_cells("Grand Total", &entry.aging_matrix.totals));

    rows
}

/// Builds one report sheet per entry, in the given order.
pub fn build_sheets(entries: &[RtoStatusEntry]) -> Vec<ReportSheet> {
    let mut used = HashSet::new();
    entries
        .iter()
        .map(|entry| ReportSheet {
            name: unique_sheet_name(base_sheet_name(entry), &mut used),
            rows: report_rows(entry),
        })
        .collect()
}

fn render_xlsx(sheets: &[ReportSheet]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        worksheet.set_column_width(0, 50.0)?;

        for (r, row) in sheet.rows.iter().enumerate() {
            let r = r as u32;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => worksheet.write_string(r, c, s)?,
                    Cell::Number(n) => worksheet.write_number(r, c, *n as f64)?,
                };
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Renders sheets one after another, separated by a blank line.
fn render_csv(sheets: &[ReportSheet]) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();

    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        for row in &sheet.rows {
            // csv writes a lone empty field as `""`.
            if row.is_empty() {
                out.push(b'\n');
                continue;
            }
            let mut writer = csv::Writer::from_writer(&mut out);
            writer.write_record(row.iter().map(Cell::as_csv_field))?;
            writer.flush()?;
        }
    }

    Ok(out)
}

/// Renders entries in the requested format.
pub fn render(format: ExportFormat, entries: &[RtoStatusEntry]) -> Result<Vec<u8>, ExportError> {
    let sheets = build_sheets(entries);
    match format {
        ExportFormat::Xlsx => render_xlsx(&sheets),
        ExportFormat::Csv => render_csv(&sheets),
    }
}

/// Parses a range bound given as `YYYY-MM-DD` or RFC 3339.
fn parse_date_input(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses the start of an export range.
pub fn parse_range_start(input: &str) -> Option<DateTime<Utc>> {
    parse_date_input(input)
}

/// Parses the end of an export range, extended to the last millisecond of
/// its UTC day.
pub fn parse_range_end(input: &str) -> Option<DateTime<Utc>> {
    let day = parse_date_input(input)?.date_naive();
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    Some(day.and_time(end_of_day).and_utc())
}
