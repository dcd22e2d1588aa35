// Adapters layer: concrete implementations for external systems (spreadsheets, email, filesystem).

pub mod archive;
pub mod dry_run;
pub mod sendgrid;
pub mod spreadsheet;
