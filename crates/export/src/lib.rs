//! Spreadsheet Export
//!
//! Writes the current inventory as `Item Name` / `Count` rows. The format
//! follows the target file's extension: `.csv` writes CSV, anything else
//! writes an `.xlsx` workbook.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use storage::InventoryItem;
use thiserror::Error;
use tracing::info;

/// Header row written before the items
pub const HEADER: [&str; 2] = ["Item Name", "Count"];

const SHEET_NAME: &str = "Inventory";

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Xlsx,
        }
    }
}

/// What an export wrote
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// Item rows, excluding the header
    pub rows: usize,
    pub format: ExportFormat,
}

/// Default file name for an export made on `date`
pub fn default_export_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("inventory-{}.xlsx", date.format("%Y-%m-%d")))
}

/// Write `items` to `path`, replacing any existing file
pub fn export_items(items: &[InventoryItem], path: &Path) -> Result<ExportSummary, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let format = ExportFormat::from_path(path);
    match format {
        ExportFormat::Xlsx => write_xlsx(items, path)?,
        ExportFormat::Csv => write_csv(items, path)?,
    }

    info!(rows = items.len(), ?format, "Exported inventory to {}", path.display());
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: items.len(),
        format,
    })
}

fn write_xlsx(items: &[InventoryItem], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        worksheet.set_column_width(0, 40)?;

        for (col, title) in HEADER.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }

        for (row, item) in items.iter().enumerate() {
            let row = row as u32 + 1;
            worksheet.write_string(row, 0, item.name.as_str())?;
            worksheet.write_number(row, 1, item.count as f64)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_csv(items: &[InventoryItem], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;

    for item in items {
        writer.write_record([item.name.as_str(), item.count.to_string().as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn items() -> Vec<InventoryItem> {
        vec![
            InventoryItem {
                id: 1,
                name: "HDMI Cable (6ft)".to_string(),
                count: 8,
                deployable: true,
                low_count: None,
                location_id: "helpdesk".to_string(),
                location_name: "Help Desk".to_string(),
            },
            InventoryItem {
                id: 2,
                name: "Dell Monitor 24\", refurbished".to_string(),
                count: 0,
                deployable: false,
                low_count: Some(2),
                location_id: "storage".to_string(),
                location_name: "Storage Room".to_string(),
            },
        ]
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("OUT.CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out.xlsx")), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Xlsx);
    }

    #[test]
    fn test_default_path() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            default_export_path(Path::new("/tmp/exports"), date),
            PathBuf::from("/tmp/exports/inventory-2024-03-09.xlsx")
        );
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.csv");

        let summary = export_items(&items(), &path).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.format, ExportFormat::Csv);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "Item Name,Count");
        assert_eq!(lines[1], "HDMI Cable (6ft),8");
        assert_eq!(lines[2], "\"Dell Monitor 24\"\", refurbished\",0");
    }

    #[test]
    fn test_xlsx_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.xlsx");

        let summary = export_items(&items(), &path).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.format, ExportFormat::Xlsx);

        let file = std::fs::File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();

        let workbook = read_part(&mut archive, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Inventory""#));

        let strings = read_part(&mut archive, "xl/sharedStrings.xml");
        let position = |text: &str| strings.find(&format!("<t>{}</t>", text)).unwrap();
        assert!(position("Item Name") < position("Count"));
        assert!(position("Count") < position("HDMI Cable (6ft)"));

        // Strings are indexed into the shared table in row order
        let sheet = read_part(&mut archive, "xl/worksheets/sheet1.xml");
        assert_eq!(cell(&sheet, "A1"), Some((true, "0")));
        assert_eq!(cell(&sheet, "B1"), Some((true, "1")));
        assert_eq!(cell(&sheet, "A2"), Some((true, "2")));
        assert_eq!(cell(&sheet, "B2"), Some((false, "8")));
        assert_eq!(cell(&sheet, "B3"), Some((false, "0")));
        assert_eq!(cell(&sheet, "A4"), None);
    }

    /// `(is_shared_string, value)` of a worksheet cell
    fn cell<'a>(sheet: &'a str, reference: &str) -> Option<(bool, &'a str)> {
        let start = sheet.find(&format!(r#"<c r="{}""#, reference))?;
        let element = &sheet[start..];
        let element = &element[..element.find("</c>")?];
        let value = &element[element.find("<v>")? + 3..element.find("</v>")?];
        Some((element.contains(r#"t="s""#), value))
    }

    fn read_part(archive: &mut zip::ZipArchive<std::fs::File>, name: &str) -> String {
        let mut xml = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        let summary = export_items(&[], &path).unwrap();
        assert_eq!(summary.rows, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Item Name,Count\n");
    }
}
