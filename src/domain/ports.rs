use crate::domain::model::{DeliveryStatus, Notification, Record, ReportTable};
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads the rows of one input spreadsheet.
pub trait RecordReader: Send + Sync {
    fn read_records(&self, path: &Path) -> Result<Vec<Record>>;
}

/// Writes one report table to disk.
pub trait ReportWriter: Send + Sync {
    fn extension(&self) -> &'static str;
    fn write_report(&self, path: &Path, table: &ReportTable) -> Result<()>;
}

/// Email transport. A failed send comes back as a value, never a panic.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        notification: &Notification,
    ) -> std::result::Result<DeliveryStatus, DispatchError>;
}

#[async_trait]
impl<M: Mailer + ?Sized> Mailer for Box<M> {
    async fn send(
        &self,
        notification: &Notification,
    ) -> std::result::Result<DeliveryStatus, DispatchError> {
        (**self).send(notification).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    #[default]
    Overwrite,
    Rename,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &Path;
    fn output_dir(&self) -> &Path;
    fn processed_dir(&self) -> &Path;
    fn on_conflict(&self) -> ConflictPolicy;
}

/// Directories and archive policy for a run, detached from where they were loaded from.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub on_conflict: ConflictPolicy,
}

impl ConfigProvider for RunPaths {
    fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    fn on_conflict(&self) -> ConflictPolicy {
        self.on_conflict
    }
}
