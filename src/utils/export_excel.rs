//! Spreadsheet export of the attendee list.
//!
//! Rows are computed by plain functions ([`export_rows`], [`summarize`]) so
//! the workbook encoder only has to lay them out.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendee::Attendee;
use crate::model::school::{class_display, school_export_label};
use crate::utils::countdown::format_date_time;

pub const DATA_SHEET: &str = "Data RSVP";
pub const SUMMARY_SHEET: &str = "Ringkasan";

const HEADERS: [(&str, f64); 8] = [
    ("No", 5.0),
    ("Nama", 25.0),
    ("Sekolah", 35.0),
    ("Kelas", 15.0),
    ("Status", 12.0),
    ("Alasan", 30.0),
    ("Tanggal Daftar", 20.0),
    ("Terakhir Update", 20.0),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub no: usize,
    pub name: String,
    pub school: String,
    pub class: String,
    pub status: &'static str,
    pub reason: String,
    pub registered_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExportSummary {
    pub total: usize,
    pub attending: usize,
    pub not_attending: usize,
}

pub fn attendance_label(is_attending: bool) -> &'static str {
    if is_attending { "Hadir" } else { "Tidak Hadir" }
}

pub fn export_rows(attendees: &[Attendee]) -> Vec<ExportRow> {
    attendees
        .iter()
        .enumerate()
        .map(|(index, a)| ExportRow {
            no: index + 1,
            name: a.name.clone(),
            school: school_export_label(&a.school, a.school_other.as_deref()),
            class: class_display(&a.class, a.class_other.as_deref()),
            status: attendance_label(a.is_attending),
            reason: a
                .reason
                .clone()
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "-".to_string()),
            registered_at: format_date_time(&a.created_at),
            updated_at: format_date_time(&a.updated_at),
        })
        .collect()
}

pub fn summarize(attendees: &[Attendee]) -> ExportSummary {
    let attending = attendees.iter().filter(|a| a.is_attending).count();
    ExportSummary {
        total: attendees.len(),
        attending,
        not_attending: attendees.len() - attending,
    }
}

/// `rsvp-natal-YYYY-MM-DD.xlsx`
pub fn default_filename(now: DateTime<Utc>) -> String {
    format!("rsvp-natal-{}.xlsx", now.format("%Y-%m-%d"))
}

fn data_sheet(rows: &[ExportRow], header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(DATA_SHEET)?;

    for (col, (title, width)) in HEADERS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, header)?;
        sheet.set_column_width(col, *width)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, row.no as f64)?;
        sheet.write_string(r, 1, &row.name)?;
        sheet.write_string(r, 2, &row.school)?;
        sheet.write_string(r, 3, &row.class)?;
        sheet.write_string(r, 4, row.status)?;
        sheet.write_string(r, 5, &row.reason)?;
        sheet.write_string(r, 6, &row.registered_at)?;
        sheet.write_string(r, 7, &row.updated_at)?;
    }

    Ok(sheet)
}

#[derive(Debug, PartialEq)]
enum SummaryValue {
    Count(usize),
    Text(String),
}

/// Rows below the "Statistik / Jumlah" header. `None` is a blank row.
fn summary_rows(
    summary: &ExportSummary,
    exported_at: DateTime<Utc>,
) -> Vec<Option<(&'static str, SummaryValue)>> {
    vec![
        Some(("Total RSVP", SummaryValue::Count(summary.total))),
        Some(("Hadir", SummaryValue::Count(summary.attending))),
        Some(("Tidak Hadir", SummaryValue::Count(summary.not_attending))),
        None,
        Some((
            "Exported At",
            SummaryValue::Text(format_date_time(&exported_at)),
        )),
    ]
}

fn summary_sheet(
    summary: &ExportSummary,
    exported_at: DateTime<Utc>,
    header: &Format,
) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(SUMMARY_SHEET)?;
    sheet.set_column_width(0, 15)?;
    sheet.set_column_width(1, 25)?;

    sheet.write_string_with_format(0, 0, "Statistik", header)?;
    sheet.write_string_with_format(0, 1, "Jumlah", header)?;

    for (i, row) in summary_rows(summary, exported_at).iter().enumerate() {
        let Some((label, value)) = row else {
            continue;
        };
        let r = i as u32 + 1;
        sheet.write_string(r, 0, *label)?;
        match value {
            SummaryValue::Count(n) => sheet.write_number(r, 1, *n as f64)?,
            SummaryValue::Text(text) => sheet.write_string(r, 1, text)?,
        };
    }

    Ok(sheet)
}

/// Encodes the two-sheet workbook into `.xlsx` bytes.
pub fn build_workbook(attendees: &[Attendee], exported_at: DateTime<Utc>) -> Result<Vec<u8>, XlsxError> {
    let header = Format::new().set_bold();
    let rows = export_rows(attendees);
    let summary = summarize(attendees);

    let mut workbook = Workbook::new();
    workbook.push_worksheet(data_sheet(&rows, &header)?);
    workbook.push_worksheet(summary_sheet(&summary, exported_at, &header)?);
    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendee::tests::sample_attendee;
    use chrono::TimeZone;

    fn attendees() -> Vec<Attendee> {
        let mut other = sample_attendee("Budi", true);
        other.school = "other".to_string();
        other.school_other = Some("MAN 2".to_string());
        other.class = "Lainnya".to_string();
        other.class_other = Some("Alumni".to_string());

        vec![
            sample_attendee("Maria", true),
            sample_attendee("Yohanes", false),
            other,
        ]
    }

    #[test]
    fn test_summary_counts() {
        let summary = summarize(&attendees());
        assert_eq!(
            summary,
            ExportSummary {
                total: 3,
                attending: 2,
                not_attending: 1,
            }
        );
        assert_eq!(summarize(&[]).total, 0);
    }

    #[test]
    fn test_export_rows_resolve_labels() {
        let rows = export_rows(&attendees());

        assert_eq!(rows[0].no, 1);
        assert_eq!(rows[0].school, "SMK Plus Pelita Nusantara (Penus)");
        assert_eq!(rows[0].status, "Hadir");
        assert_eq!(rows[0].reason, "-");
        assert_eq!(rows[0].registered_at, "01/12/2025, 15.00");

        assert_eq!(rows[1].status, "Tidak Hadir");
        assert_eq!(rows[1].reason, "sakit");

        assert_eq!(rows[2].no, 3);
        assert_eq!(rows[2].school, "MAN 2");
        assert_eq!(rows[2].class, "Alumni");
    }

    #[test]
    fn test_default_filename() {
        let now = Utc.with_ymd_and_hms(2025, 12, 24, 10, 0, 0).unwrap();
        assert_eq!(default_filename(now), "rsvp-natal-2025-12-24.xlsx");
    }

    #[test]
    fn test_summary_sheet_rows() {
        let exported_at = Utc.with_ymd_and_hms(2025, 12, 24, 3, 0, 0).unwrap();
        let rows = summary_rows(&summarize(&attendees()), exported_at);

        assert_eq!(
            rows,
            vec![
                Some(("Total RSVP", SummaryValue::Count(3))),
                Some(("Hadir", SummaryValue::Count(2))),
                Some(("Tidak Hadir", SummaryValue::Count(1))),
                None,
                Some((
                    "Exported At",
                    SummaryValue::Text("24/12/2025, 10.00".to_string())
                )),
            ]
        );
    }

    #[test]
    fn test_build_workbook_produces_xlsx_archive() {
        let bytes = build_workbook(&attendees(), Utc::now()).unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..2], b"PK");

        let empty = build_workbook(&[], Utc::now()).unwrap();
        assert_eq!(&empty[..2], b"PK");
    }
}
