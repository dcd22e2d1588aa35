use crate::domain::model::{FailureEntry, NotificationEntry, ReportTable};
use chrono::NaiveDate;
use serde_json::Value;

pub const FAILURE_REPORT_PREFIX: &str = "fallos";
pub const NOTIFICATION_REPORT_PREFIX: &str = "notificados";
pub const FAILURE_REASON_COLUMN: &str = "motivo_fallo";
pub const NOTIFICATION_COLUMNS: [&str; 4] =
    ["corporation_name", "emails_enviados", "link", "sender_team"];

/// `fallos_18-10-26.xlsx` style names.
pub fn report_file_name(prefix: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", prefix, date.format("%d-%m-%y"), extension)
}

/// Original columns in first-seen order, then the failure reason.
pub fn failure_table(failures: &[FailureEntry]) -> ReportTable {
    let mut headers: Vec<String> = Vec::new();
    for failure in failures {
        for column in failure.record.columns() {
            if column != FAILURE_REASON_COLUMN && !headers.contains(column) {
                headers.push(column.clone());
            }
        }
    }

    let rows = failures
        .iter()
        .map(|failure| {
            let mut row: Vec<Value> = headers
                .iter()
                .map(|h| failure.record.get(h).cloned().unwrap_or(Value::Null))
                .collect();
            row.push(Value::String(failure.motivo_fallo.clone()));
            row
        })
        .collect();

    headers.push(FAILURE_REASON_COLUMN.to_string());
    ReportTable { headers, rows }
}

pub fn notification_table(notifications: &[NotificationEntry]) -> ReportTable {
    ReportTable {
        headers: NOTIFICATION_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: notifications
            .iter()
            .map(|n| {
                vec![
                    Value::String(n.corporation_name.clone()),
                    Value::String(n.emails_enviados.clone()),
                    Value::String(n.link.clone()),
                    Value::String(n.sender_team.clone()),
                ]
            })
            .collect(),
    }
}
