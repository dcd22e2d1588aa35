use clap::Parser;
use onboarding_notifier::core::Mailer;
use onboarding_notifier::utils::error::ErrorSeverity;
use onboarding_notifier::utils::{logger, validation::Validate};
use onboarding_notifier::{
    report_writer, CalamineReader, CliArgs, DryRunMailer, RunOrchestrator, SendGridMailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在時忽略
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(args.verbose, config.logging.file.as_deref(), config.logging.json)?;

    tracing::info!("Starting onboarding-notifier");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mailer: Box<dyn Mailer> = if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no email will be sent");
        Box::new(DryRunMailer)
    } else {
        Box::new(SendGridMailer::new(config.sendgrid_settings())?)
    };

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let writer = report_writer(config.report.format);
    let orchestrator =
        RunOrchestrator::new_with_monitoring(CalamineReader, mailer, writer, config, args.monitor);

    match orchestrator.run().await {
        Ok(summary) => {
            println!("✅ Processed {} files", summary.files_processed());
            println!(
                "   {} notified, {} failed, {} duplicates skipped",
                summary.totals.notifications.len(),
                summary.totals.failures.len(),
                summary.totals.skipped
            );
            if let Some(path) = &summary.notification_report {
                println!("📁 Notifications: {}", path.display());
            }
            if let Some(path) = &summary.failure_report {
                println!("⚠️  Failures: {}", path.display());
            }
            for path in &summary.totals.unreadable_files {
                println!("⚠️  Unreadable, left in place: {}", path.display());
            }
            for path in summary.unarchived_files() {
                println!("⚠️  Not archived: {}", path.display());
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
