use crate::core::{Record, RecordReader, ReportTable, ReportWriter};
use crate::domain::model::value_to_text;
use crate::domain::ports::ReportFormat;
use crate::utils::error::Result;
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Reads the first worksheet of an `.xlsx`/`.xls` file; the first row is the header.
#[derive(Debug, Clone, Default)]
pub struct CalamineReader;

impl RecordReader for CalamineReader {
    fn read_records(&self, path: &Path) -> Result<Vec<Record>> {
        let mut workbook = open_workbook_auto(path)?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => {
                tracing::warn!("Workbook {} has no worksheets", path.display());
                return Ok(Vec::new());
            }
        };

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => unique_headers(
                header
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| match cell {
                        Data::Empty => format!("Unnamed: {}", i),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            None => return Ok(Vec::new()),
        };

        let records: Vec<Record> = rows
            .map(|cells| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let value = cells.get(i).map(cell_to_value).unwrap_or(Value::Null);
                        (header.clone(), value)
                    })
                    .collect::<Record>()
            })
            .filter(|record| !record.is_blank())
            .collect();

        tracing::debug!("Read {} rows from {}", records.len(), path.display());
        Ok(records)
    }
}

/// Repeated header names become `name.1`, `name.2`, ... so no column is lost.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(raw.len());

    for name in raw {
        let mut unique = name.clone();
        if taken.contains(&unique) {
            let n = counters.entry(name.clone()).or_insert(0);
            loop {
                *n += 1;
                unique = format!("{}.{}", name, n);
                if !taken.contains(&unique) {
                    break;
                }
            }
        }
        taken.insert(unique.clone());
        headers.push(unique);
    }
    headers
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        // Excel 把整數存成浮點數
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::from(*f as i64),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct XlsxReportWriter;

impl ReportWriter for XlsxReportWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write_report(&self, path: &Path, table: &ReportTable) -> Result<()> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &bold)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, value) in row.iter().enumerate() {
                let c = c as u16;
                match value {
                    Value::Null => {}
                    Value::String(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Value::Number(n) => {
                        worksheet.write_number(r, c, n.as_f64().unwrap_or_default())?;
                    }
                    Value::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                    other => {
                        worksheet.write_string(r, c, other.to_string())?;
                    }
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvReportWriter;

impl ReportWriter for CsvReportWriter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write_report(&self, path: &Path, table: &ReportTable) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(value_to_text))?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn report_writer(format: ReportFormat) -> Box<dyn ReportWriter> {
    match format {
        ReportFormat::Xlsx => Box::new(XlsxReportWriter),
        ReportFormat::Csv => Box::new(CsvReportWriter),
    }
}
