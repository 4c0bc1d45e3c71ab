// Spreadsheet export: one Index sheet plus one sheet per page

use crate::aggregate::SummaryTable;
use crate::config::{ExportConfig, SheetNaming};
use crate::error::{PlanError, Result};
use keyplan_client::KeywordTable;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const INDEX_SHEET: &str = "Index";
pub const MAX_SHEET_NAME_LEN: usize = 31;
pub const INDEX_HEADERS: [&str; 4] = [
    "Page type",
    "Search volume",
    "Potential traffic (10%)",
    "Est signups (4%)",
];

const RESERVED_SHEET: &str = "History";
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Sheet name for a page: forbidden characters replaced by `_`, cut to the
/// format's limit.
pub fn sheet_name_for(page: &str) -> String {
    let cleaned: String = page
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();
    // Trimming after the cut keeps a name from ending in an apostrophe.
    let truncated = truncated.trim_end_matches('\'');

    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else if same_sheet(truncated, RESERVED_SHEET) {
        format!("{}_", truncated)
    } else {
        truncated.to_string()
    }
}

fn same_sheet(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn with_suffix(base: &str, n: usize) -> String {
    let suffix = format!(" ({})", n);
    let room = MAX_SHEET_NAME_LEN - suffix.chars().count();
    let head: String = base.chars().take(room).collect();
    format!("{}{}", head, suffix)
}

/// Decide which sheet each page table lands on, in workbook order.
pub fn plan_sheets<'a>(
    pages: &'a [(String, KeywordTable)],
    naming: SheetNaming,
) -> Vec<(String, &'a KeywordTable)> {
    let mut sheets: Vec<(String, &KeywordTable)> = Vec::with_capacity(pages.len());

    for (page, table) in pages {
        let name = sheet_name_for(page);
        let taken = |candidate: &str, sheets: &[(String, &KeywordTable)]| {
            same_sheet(candidate, INDEX_SHEET) || sheets.iter().any(|(s, _)| same_sheet(s, candidate))
        };

        match naming {
            SheetNaming::Truncate => {
                if same_sheet(&name, INDEX_SHEET) {
                    warn!("Page '{}' collides with the {} sheet and is not exported", page, INDEX_SHEET);
                    continue;
                }
                if let Some(pos) = sheets.iter().position(|(s, _)| same_sheet(s, &name)) {
                    warn!("Page '{}' replaces sheet '{}'", page, sheets[pos].0);
                    sheets[pos].1 = table;
                } else {
                    sheets.push((name, table));
                }
            }
            SheetNaming::Disambiguate => {
                let mut candidate = name.clone();
                let mut n = 2;
                while taken(&candidate, &sheets) {
                    candidate = with_suffix(&name, n);
                    n += 1;
                }
                sheets.push((candidate, table));
            }
        }
    }

    sheets
}

fn write_index(sheet: &mut Worksheet, summary: &SummaryTable) -> std::result::Result<(), XlsxError> {
    sheet.set_name(INDEX_SHEET)?;
    for (col, header) in INDEX_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in summary.iter_with_totals().enumerate() {
        let r = (idx + 1) as u32;
        sheet.write_string(r, 0, &row.page_type)?;
        sheet.write_number(r, 1, row.search_volume as f64)?;
        sheet.write_number(r, 2, row.potential_traffic as f64)?;
        sheet.write_number(r, 3, row.est_signups as f64)?;
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> std::result::Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                sheet.write_number(row, col, f)?;
            }
            None => {
                sheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        nested => {
            sheet.write_string(row, col, nested.to_string())?;
        }
    }
    Ok(())
}

fn write_table(sheet: &mut Worksheet, name: &str, table: &KeywordTable) -> std::result::Result<(), XlsxError> {
    sheet.set_name(name)?;
    for (c, column) in table.columns.iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(0, col, column)?;
        for (r, row) in table.rows.iter().enumerate() {
            let r = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            if let Some(value) = row.get(column) {
                write_cell(sheet, r, col, value)?;
            }
        }
    }
    Ok(())
}

/// Build the workbook in memory.
pub fn build_workbook(
    summary: &SummaryTable,
    pages: &[(String, KeywordTable)],
    naming: SheetNaming,
) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    write_index(workbook.add_worksheet(), summary)?;
    for (name, table) in plan_sheets(pages, naming) {
        write_table(workbook.add_worksheet(), &name, table)?;
    }
    Ok(workbook)
}

/// Write the summary and every page table to `config.path`.
///
/// The file is written next to its destination under a temporary name and
/// renamed into place, so a failed export leaves no partial file behind.
pub fn export_workbook(
    summary: &SummaryTable,
    pages: &[(String, KeywordTable)],
    config: &ExportConfig,
) -> Result<PathBuf> {
    let path = config.path.as_path();
    let fail = |message: String| PlanError::Export {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = build_workbook(summary, pages, config.sheet_naming).map_err(|e| fail(e.to_string()))?;
    let bytes = workbook.save_to_buffer().map_err(|e| fail(e.to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".keyplan-")
        .suffix(".xlsx.tmp")
        .tempfile_in(dir)
        .map_err(|e| fail(e.to_string()))?;
    staged.write_all(&bytes).map_err(|e| fail(e.to_string()))?;
    staged.as_file().sync_all().map_err(|e| fail(e.to_string()))?;
    staged.persist(path).map_err(|e| fail(e.error.to_string()))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path.to_path_buf())
}
