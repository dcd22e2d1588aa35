use crate::core::Record;
use crate::domain::model::NormalizedRecord;

pub const CORPORATION_NAME: &str = "corporation_name";
pub const EMAIL: &str = "email";
pub const SOURCE: &str = "source";
pub const COMPANY_NAME: &str = "company_name";

/// Builds the cleaned view of a row. Missing or odd cells degrade to empty values.
pub fn normalize(record: &Record) -> NormalizedRecord {
    let corporation_name = record.text(CORPORATION_NAME);

    NormalizedRecord {
        organization_key: corporation_name.trim().to_lowercase(),
        emails: parse_email_list(&record.text(EMAIL)),
        source: record.text(SOURCE).trim().to_lowercase(),
        company_name: record.text(COMPANY_NAME),
        corporation_name,
    }
}

/// Parses `"[a@x.com, b@x.com]"` into `["a@x.com", "b@x.com"]`.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.trim_matches(&['[', ']', ' '][..])
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
