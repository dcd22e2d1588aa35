use crate::config::NotifierConfig;
use crate::domain::ports::{ConflictPolicy, ReportFormat};
use crate::utils::error::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "notifier.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "onboarding-notifier")]
#[command(about = "Sends onboarding emails for spreadsheet batches and reports the outcome")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults to ./notifier.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub processed_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormat>,

    #[arg(long, value_enum)]
    pub on_conflict: Option<ConflictPolicy>,

    /// Log the emails instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,
}

impl CliArgs {
    /// Config file if one is given or found, else environment; CLI flags win.
    pub fn load_config(&self) -> Result<NotifierConfig> {
        let mut config = match &self.config {
            Some(path) => NotifierConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                NotifierConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => NotifierConfig::from_env(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut NotifierConfig) {
        if let Some(dir) = &self.input_dir {
            config.paths.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
        if let Some(dir) = &self.processed_dir {
            config.paths.processed_dir = dir.clone();
        }
        if let Some(format) = self.report_format {
            config.report.format = format;
        }
        if let Some(policy) = self.on_conflict {
            config.archive.on_conflict = policy;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}
