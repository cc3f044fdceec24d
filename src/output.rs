use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::error::{ReportError, Result};
use crate::reports::{ClientListing, WeeklySummary, WindowDetail};
use crate::types::{DetailRow, SummaryRow};

pub const SUMMARY_SHEET: &str = "Summary";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn print_summary(summary: &WeeklySummary) {
    println!("\n=== Weekly OE Summary ===\n");
    println!("{}\n", render_table(&summary.rows));
}

pub fn print_listing(listing: &ClientListing) {
    let week = listing.window.range_label();
    println!(
        "\n=== CLIENTS GOING LIVE {} ({} unique) ===\n",
        week,
        listing.going_live.len()
    );
    println!("{}", render_table(&listing.going_live));
    println!(
        "\n=== CLIENTS ACTIVE {} ({} unique) ===\n",
        week,
        listing.active.len()
    );
    println!("{}\n", render_table(&listing.active));
}

/// Write the summary to `path`, choosing the format from its extension.
pub fn export(path: &Path, summary: &WeeklySummary, detail: bool) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("xlsx") => write_xlsx(path, summary, detail),
        Some("csv") => write_csv(path, &summary.rows),
        Some("json") => write_json(path, summary),
        _ => Err(ReportError::UnsupportedExport(path.to_path_buf())),
    }
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime> {
    Ok(ExcelDateTime::from_ymd(
        date.year() as u16,
        date.month() as u8,
        date.day() as u8,
    )?)
}

fn write_header(ws: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<()> {
    for (col, name) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *name, bold)?;
    }
    Ok(())
}

fn write_summary_sheet(ws: &mut Worksheet, rows: &[SummaryRow], bold: &Format) -> Result<()> {
    ws.set_name(SUMMARY_SHEET)?;
    write_header(ws, &SummaryRow::HEADERS, bold)?;
    for (idx, r) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        ws.write_string(row, 0, &r.week)?;
        ws.write_number(row, 1, r.clients_going_live as f64)?;
        ws.write_number(row, 2, r.clients_active as f64)?;
        ws.write_number(row, 3, r.clients_completed as f64)?;
        ws.write_number(row, 4, r.lives_active as f64)?;
        ws.write_number(row, 5, r.lives_confirmed as f64)?;
    }
    ws.autofit();
    Ok(())
}

fn write_detail_sheet(
    ws: &mut Worksheet,
    name: &str,
    rows: &[DetailRow],
    bold: &Format,
    date_format: &Format,
) -> Result<()> {
    ws.set_name(name)?;
    write_header(ws, &DetailRow::HEADERS, bold)?;
    for (idx, r) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        ws.write_string(row, 0, &r.client_id)?;
        ws.write_string(row, 1, &r.population_type)?;
        ws.write_number(row, 2, r.population_size)?;
        ws.write_number(row, 3, r.total_oe_count)?;
        ws.write_number(row, 4, r.confirmed_oe_count)?;
        ws.write_datetime_with_format(row, 5, &excel_date(r.start_date)?, date_format)?;
        ws.write_datetime_with_format(row, 6, &excel_date(r.end_date)?, date_format)?;
    }
    ws.autofit();
    Ok(())
}

/// `Next Week - Going Live` etc.; always within Excel's 31 character limit.
pub fn detail_sheet_name(detail: &WindowDetail, category: &str) -> String {
    format!("{} - {}", detail.window.slot.name(), category)
}

pub fn write_xlsx(path: &Path, summary: &WeeklySummary, detail: bool) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    write_summary_sheet(workbook.add_worksheet(), &summary.rows, &bold)?;

    if detail {
        for window in &summary.details {
            let sheets: [(&str, &[DetailRow]); 3] = [
                ("Going Live", &window.going_live),
                ("Active", &window.active),
                ("Completed", &window.completed),
            ];
            for (category, rows) in sheets {
                write_detail_sheet(
                    workbook.add_worksheet(),
                    &detail_sheet_name(window, category),
                    rows,
                    &bold,
                    &date_format,
                )?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
