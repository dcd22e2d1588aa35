use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// One input row: column name to cell value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    /// Text rendering of a column; absent and null cells read as "".
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(value_to_text).unwrap_or_default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn is_blank(&self) -> bool {
        self.data.values().all(|v| value_to_text(v).trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.data.clone()))
    }
}

pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub organization_key: String,
    pub emails: Vec<String>,
    pub source: String,
    pub company_name: String,
    pub corporation_name: String,
}

/// Link and sender team a recognized source maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTarget {
    pub link: &'static str,
    pub sender_team: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
    pub company_name: String,
    pub link: String,
    pub sender_team: String,
}

/// A message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipients: Vec<String>,
    pub template_data: TemplateData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStatus {
    pub status_code: u16,
    pub message_id: Option<String>,
}

/// Organization keys already notified while processing one file.
#[derive(Debug, Clone, Default)]
pub struct DedupSet {
    keys: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoEmails,
    InvalidSource,
    Dispatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureEntry {
    pub record: Record,
    pub kind: FailureKind,
    pub motivo_fallo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEntry {
    pub corporation_name: String,
    pub organization_key: String,
    pub emails_enviados: String,
    pub link: String,
    pub sender_team: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Skipped,
    Failed(FailureEntry),
    Notified(NotificationEntry),
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub failures: Vec<FailureEntry>,
    pub notifications: Vec<NotificationEntry>,
    pub skipped: usize,
}

impl BatchOutcome {
    pub fn rows(&self) -> usize {
        self.failures.len() + self.notifications.len() + self.skipped
    }
}

/// Header plus rows, ready for a report writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_defaults_to_empty() {
        let record: Record = [("corporation_name", json!("Acme")), ("email", Value::Null)]
            .into_iter()
            .collect();

        assert_eq!(record.text("corporation_name"), "Acme");
        assert_eq!(record.text("email"), "");
        assert_eq!(record.text("source"), "");
    }

    #[test]
    fn test_text_renders_numbers() {
        let record: Record = [("company_name", json!(42))].into_iter().collect();
        assert_eq!(record.text("company_name"), "42");
    }

    #[test]
    fn test_columns_keep_insertion_order() {
        let mut record = Record::new();
        record.insert("source", "cobee");
        record.insert("corporation_name", "Acme");
        record.insert("email", "[a@acme.com]");

        let columns: Vec<&String> = record.columns().collect();
        assert_eq!(columns, vec!["source", "corporation_name", "email"]);
    }

    #[test]
    fn test_is_blank() {
        let blank: Record = [("a", Value::Null), ("b", json!("  "))].into_iter().collect();
        assert!(blank.is_blank());

        let filled: Record = [("a", Value::Null), ("b", json!("x"))].into_iter().collect();
        assert!(!filled.is_blank());
    }

    #[test]
    fn test_dedup_set_only_grows() {
        let mut set = DedupSet::new();
        assert!(!set.contains("acme"));
        assert!(set.insert("acme"));
        assert!(!set.insert("acme"));
        assert!(set.contains("acme"));
        assert!(!set.contains("beta"));
    }
}
