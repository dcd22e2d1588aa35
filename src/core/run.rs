use crate::adapters::archive::archive_file;
use crate::core::batch::BatchProcessor;
use crate::core::reports::{
    failure_table, notification_table, report_file_name, FAILURE_REPORT_PREFIX,
    NOTIFICATION_REPORT_PREFIX,
};
use crate::core::{ConfigProvider, Mailer, RecordReader, ReportWriter};
use crate::domain::model::{FailureEntry, NotificationEntry};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub const INPUT_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub failures: usize,
    pub notifications: usize,
    pub skipped: usize,
    pub archived_to: Option<PathBuf>,
}

/// Results accumulated across every file of a run.
#[derive(Debug, Default)]
pub struct RunTotals {
    pub failures: Vec<FailureEntry>,
    pub notifications: Vec<NotificationEntry>,
    pub skipped: usize,
    pub files: Vec<FileSummary>,
    pub unreadable_files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub totals: RunTotals,
    pub failure_report: Option<PathBuf>,
    pub notification_report: Option<PathBuf>,
}

impl RunSummary {
    pub fn files_processed(&self) -> usize {
        self.totals.files.len()
    }

    pub fn unarchived_files(&self) -> Vec<&Path> {
        self.totals
            .files
            .iter()
            .filter(|f| f.archived_to.is_none())
            .map(|f| f.path.as_path())
            .collect()
    }
}

pub struct RunOrchestrator<R: RecordReader, M: Mailer, C: ConfigProvider> {
    reader: R,
    mailer: M,
    writer: Box<dyn ReportWriter>,
    config: C,
    monitor: SystemMonitor,
}

impl<R: RecordReader, M: Mailer, C: ConfigProvider> RunOrchestrator<R, M, C> {
    pub fn new(reader: R, mailer: M, writer: Box<dyn ReportWriter>, config: C) -> Self {
        Self::new_with_monitoring(reader, mailer, writer, config, false)
    }

    pub fn new_with_monitoring(
        reader: R,
        mailer: M,
        writer: Box<dyn ReportWriter>,
        config: C,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            reader,
            mailer,
            writer,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_dated(chrono::Local::now().date_naive()).await
    }

    pub async fn run_dated(&self, date: NaiveDate) -> Result<RunSummary> {
        fs::create_dir_all(self.config.output_dir())?;

        let mut totals = RunTotals::default();
        let processor = BatchProcessor::new(&self.mailer);

        for path in list_input_files(self.config.input_dir())? {
            tracing::info!("Processing file: {}", path.display());

            let records = match self.reader.read_records(&path) {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!("❌ Could not read {}: {}", path.display(), e);
                    totals.unreadable_files.push(path);
                    continue;
                }
            };

            let outcome = processor.process_records(records).await;
            tracing::info!(
                "Finished {}: {} rows, {} notified, {} failed, {} skipped",
                path.display(),
                outcome.rows(),
                outcome.notifications.len(),
                outcome.failures.len(),
                outcome.skipped
            );

            let archived_to = match archive_file(
                &path,
                self.config.processed_dir(),
                self.config.on_conflict(),
            ) {
                Ok(dest) => Some(dest),
                Err(e) => {
                    tracing::error!("❌ Could not archive {}: {}", path.display(), e);
                    None
                }
            };

            totals.files.push(FileSummary {
                path,
                rows: outcome.rows(),
                failures: outcome.failures.len(),
                notifications: outcome.notifications.len(),
                skipped: outcome.skipped,
                archived_to,
            });
            totals.skipped += outcome.skipped;
            totals.failures.extend(outcome.failures);
            totals.notifications.extend(outcome.notifications);

            self.monitor.log_stats("file processed");
        }

        let failure_report = if totals.failures.is_empty() {
            None
        } else {
            let path = self.report_path(FAILURE_REPORT_PREFIX, date);
            self.writer
                .write_report(&path, &failure_table(&totals.failures))?;
            tracing::info!("Failure report saved to {}", path.display());
            Some(path)
        };

        let notification_report = if totals.notifications.is_empty() {
            None
        } else {
            let path = self.report_path(NOTIFICATION_REPORT_PREFIX, date);
            self.writer
                .write_report(&path, &notification_table(&totals.notifications))?;
            tracing::info!("Notification report saved to {}", path.display());
            Some(path)
        };

        tracing::info!(
            "Run completed: {} files, {} notified, {} failed, {} duplicates skipped",
            totals.files.len(),
            totals.notifications.len(),
            totals.failures.len(),
            totals.skipped
        );
        if let Some(path) = &failure_report {
            tracing::warn!("Failures were recorded. Review {}", path.display());
        }
        self.monitor.log_final_stats();

        Ok(RunSummary {
            totals,
            failure_report,
            notification_report,
        })
    }

    fn report_path(&self, prefix: &str, date: NaiveDate) -> PathBuf {
        self.config
            .output_dir()
            .join(report_file_name(prefix, date, self.writer.extension()))
    }
}

/// Spreadsheet files of `dir`, sorted by name.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_spreadsheet(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            INPUT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DeliveryStatus, Notification, Record, ReportTable};
    use crate::domain::ports::{ConflictPolicy, RunPaths};
    use crate::utils::error::{DispatchError, NotifierError};
    use crate::utils::logger::capture::capture_logs;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Serves records keyed by file name; files not in the map fail to read.
    struct MockReader {
        files: HashMap<String, Vec<Record>>,
    }

    impl RecordReader for MockReader {
        fn read_records(&self, path: &Path) -> Result<Vec<Record>> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.files
                .get(&name)
                .cloned()
                .ok_or_else(|| NotifierError::ConfigError {
                    message: format!("unreadable {}", name),
                })
        }
    }

    struct OkMailer;

    #[async_trait]
    impl Mailer for OkMailer {
        async fn send(
            &self,
            _notification: &Notification,
        ) -> std::result::Result<DeliveryStatus, DispatchError> {
            Ok(DeliveryStatus {
                status_code: 202,
                message_id: None,
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryWriter {
        written: Arc<Mutex<HashMap<PathBuf, ReportTable>>>,
    }

    impl ReportWriter for MemoryWriter {
        fn extension(&self) -> &'static str {
            "xlsx"
        }

        fn write_report(&self, path: &Path, table: &ReportTable) -> Result<()> {
            self.written
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), table.clone());
            Ok(())
        }
    }

    fn row(corporation: &str, email: &str, source: &str) -> Record {
        [
            ("corporation_name", json!(corporation)),
            ("email", json!(email)),
            ("source", json!(source)),
            ("company_name", json!(corporation)),
        ]
        .into_iter()
        .collect()
    }

    fn setup(names: &[&str]) -> (TempDir, RunPaths) {
        let temp = TempDir::new().unwrap();
        let paths = RunPaths {
            input_dir: temp.path().join("input"),
            output_dir: temp.path().join("output"),
            processed_dir: temp.path().join("procesados"),
            on_conflict: ConflictPolicy::Overwrite,
        };
        fs::create_dir_all(&paths.input_dir).unwrap();
        for name in names {
            fs::write(paths.input_dir.join(name), b"placeholder").unwrap();
        }
        (temp, paths)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("a.xlsx")));
        assert!(is_spreadsheet(Path::new("a.XLS")));
        assert!(is_spreadsheet(Path::new("dir/a.XlSx")));
        assert!(!is_spreadsheet(Path::new("a.csv")));
        assert!(!is_spreadsheet(Path::new("xlsx")));
    }

    #[test]
    fn test_list_input_files_filters_and_sorts() {
        let (_temp, paths) = setup(&["b.xlsx", "a.XLS", "notes.txt"]);
        fs::create_dir(paths.input_dir.join("nested.xlsx")).unwrap();

        let files = list_input_files(&paths.input_dir).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.XLS", "b.xlsx"]);
    }

    #[tokio::test]
    async fn test_run_aggregates_files_and_archives_them() {
        let (_temp, paths) = setup(&["a.xlsx", "b.xlsx", "readme.txt"]);
        let reader = MockReader {
            files: HashMap::from([
                (
                    "a.xlsx".to_string(),
                    vec![
                        row("Acme", "[a@acme.com]", "cobee"),
                        row("ACME", "[a@acme.com]", "cobee"),
                    ],
                ),
                (
                    "b.xlsx".to_string(),
                    vec![
                        row("Acme", "[a@acme.com]", "pluxee"),
                        row("Beta", "", "cobee"),
                    ],
                ),
            ]),
        };
        let writer = MemoryWriter::default();
        let orchestrator =
            RunOrchestrator::new(reader, OkMailer, Box::new(writer.clone()), paths.clone());

        let summary = orchestrator.run_dated(date()).await.unwrap();

        // 去重只在單一檔案內生效
        assert_eq!(summary.totals.notifications.len(), 2);
        assert_eq!(summary.totals.failures.len(), 1);
        assert_eq!(summary.totals.skipped, 1);
        assert_eq!(summary.files_processed(), 2);

        assert!(paths.processed_dir.join("a.xlsx").exists());
        assert!(paths.processed_dir.join("b.xlsx").exists());
        assert!(!paths.input_dir.join("a.xlsx").exists());
        assert!(paths.input_dir.join("readme.txt").exists());

        let failure_path = paths.output_dir.join("fallos_18-10-26.xlsx");
        let notification_path = paths.output_dir.join("notificados_18-10-26.xlsx");
        assert_eq!(summary.failure_report, Some(failure_path.clone()));
        assert_eq!(summary.notification_report, Some(notification_path.clone()));

        let written = writer.written.lock().unwrap();
        assert_eq!(written[&failure_path].rows.len(), 1);
        assert_eq!(written[&notification_path].rows.len(), 2);
    }

    #[tokio::test]
    async fn test_run_events_are_logged() {
        let (logs, _guard) = capture_logs();
        let (_temp, paths) = setup(&["a.xlsx", "broken.xlsx"]);
        let reader = MockReader {
            files: HashMap::from([(
                "a.xlsx".to_string(),
                vec![row("Acme", "[a@acme.com]", "cobee"), row("Beta", "", "cobee")],
            )]),
        };
        let orchestrator = RunOrchestrator::new(
            reader,
            OkMailer,
            Box::new(MemoryWriter::default()),
            paths.clone(),
        );

        orchestrator.run_dated(date()).await.unwrap();

        let started: Vec<String> = logs
            .lines()
            .into_iter()
            .filter(|line| line.contains("Processing file:"))
            .collect();
        assert_eq!(started.len(), 2);
        assert!(started[0].contains("a.xlsx"));
        assert!(started[1].contains("broken.xlsx"));
        assert!(logs.line_with("Could not read").contains("ERROR"));
        assert!(logs.line_with("Row without emails").contains("WARN"));
        assert!(logs
            .line_with("Finished")
            .contains("2 rows, 1 notified, 1 failed, 0 skipped"));
        let moved = logs.line_with("File moved to");
        assert!(moved.contains("INFO"));
        assert!(moved.contains("procesados"));
        assert!(logs
            .line_with("Run completed:")
            .contains("1 files, 1 notified, 1 failed, 0 duplicates skipped"));
        assert!(logs.line_with("Failures were recorded").contains("WARN"));
    }

    #[tokio::test]
    async fn test_empty_lists_produce_no_reports() {
        let (_temp, paths) = setup(&["a.xlsx"]);
        let reader = MockReader {
            files: HashMap::from([(
                "a.xlsx".to_string(),
                vec![row("Acme", "[a@acme.com]", "cobee")],
            )]),
        };
        let writer = MemoryWriter::default();
        let orchestrator =
            RunOrchestrator::new(reader, OkMailer, Box::new(writer.clone()), paths.clone());

        let summary = orchestrator.run_dated(date()).await.unwrap();

        assert!(summary.failure_report.is_none());
        assert!(summary.notification_report.is_some());
        assert_eq!(writer.written.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_left_in_place() {
        let (_temp, paths) = setup(&["broken.xlsx", "good.xlsx"]);
        let reader = MockReader {
            files: HashMap::from([("good.xlsx".to_string(), vec![row("Acme", "", "cobee")])]),
        };
        let writer = MemoryWriter::default();
        let orchestrator =
            RunOrchestrator::new(reader, OkMailer, Box::new(writer.clone()), paths.clone());

        let summary = orchestrator.run_dated(date()).await.unwrap();

        assert_eq!(
            summary.totals.unreadable_files,
            vec![paths.input_dir.join("broken.xlsx")]
        );
        assert!(paths.input_dir.join("broken.xlsx").exists());
        assert!(paths.processed_dir.join("good.xlsx").exists());
        assert!(summary.notification_report.is_none());
        assert!(summary.failure_report.is_some());
    }

    #[tokio::test]
    async fn test_archive_conflict_keeps_results() {
        let (_temp, mut paths) = setup(&["a.xlsx"]);
        paths.on_conflict = ConflictPolicy::Error;
        fs::create_dir_all(&paths.processed_dir).unwrap();
        fs::write(paths.processed_dir.join("a.xlsx"), b"old").unwrap();

        let reader = MockReader {
            files: HashMap::from([(
                "a.xlsx".to_string(),
                vec![row("Acme", "[a@acme.com]", "cobee")],
            )]),
        };
        let orchestrator = RunOrchestrator::new(
            reader,
            OkMailer,
            Box::new(MemoryWriter::default()),
            paths.clone(),
        );

        let summary = orchestrator.run_dated(date()).await.unwrap();

        assert_eq!(summary.totals.notifications.len(), 1);
        assert_eq!(
            summary.unarchived_files(),
            vec![paths.input_dir.join("a.xlsx").as_path()]
        );
        assert!(paths.input_dir.join("a.xlsx").exists());
    }

    #[tokio::test]
    async fn test_missing_input_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let paths = RunPaths {
            input_dir: temp.path().join("does-not-exist"),
            output_dir: temp.path().join("output"),
            processed_dir: temp.path().join("procesados"),
            on_conflict: ConflictPolicy::Overwrite,
        };
        let orchestrator = RunOrchestrator::new(
            MockReader {
                files: HashMap::new(),
            },
            OkMailer,
            Box::new(MemoryWriter::default()),
            paths,
        );

        let result = orchestrator.run_dated(date()).await;

        assert!(matches!(result, Err(NotifierError::IoError(_))));
    }
}
