pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;
pub use crate::config::NotifierConfig;

pub use crate::adapters::{
    dry_run::DryRunMailer,
    sendgrid::SendGridMailer,
    spreadsheet::{report_writer, CalamineReader},
};
pub use crate::core::{
    batch::BatchProcessor,
    run::{RunOrchestrator, RunSummary},
};
pub use crate::utils::error::{NotifierError, Result};
