use crate::core::dispatcher::NotificationDispatcher;
use crate::core::normalizer::normalize;
use crate::core::resolver::resolve_target;
use crate::core::{Mailer, Record};
use crate::domain::model::{
    BatchOutcome, DedupSet, FailureEntry, FailureKind, NotificationEntry, RowOutcome,
};

pub const NO_EMAILS_REASON: &str = "sin_emails";

/// Processes the rows of one input file in order.
///
/// Each row ends up as exactly one of: skipped duplicate, failure entry,
/// notification entry. Row-level problems never abort the batch.
pub struct BatchProcessor<'a, M: Mailer + ?Sized> {
    dispatcher: NotificationDispatcher<'a, M>,
}

impl<'a, M: Mailer + ?Sized> BatchProcessor<'a, M> {
    pub fn new(mailer: &'a M) -> Self {
        Self {
            dispatcher: NotificationDispatcher::new(mailer),
        }
    }

    /// Runs a whole file with a fresh dedup set.
    pub async fn process_records(&self, records: Vec<Record>) -> BatchOutcome {
        let mut sent = DedupSet::new();
        self.process_records_with(records, &mut sent).await
    }

    pub async fn process_records_with(
        &self,
        records: Vec<Record>,
        sent: &mut DedupSet,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for record in records {
            match self.process_row(record, sent).await {
                RowOutcome::Skipped => outcome.skipped += 1,
                RowOutcome::Failed(failure) => outcome.failures.push(failure),
                RowOutcome::Notified(entry) => outcome.notifications.push(entry),
            }
        }

        outcome
    }

    pub async fn process_row(&self, record: Record, sent: &mut DedupSet) -> RowOutcome {
        let row = normalize(&record);

        // 已通知過的公司直接略過，不算失敗
        if !row.organization_key.is_empty() && sent.contains(&row.organization_key) {
            tracing::info!(
                "Skipping duplicate row, corporation already notified: {}",
                row.organization_key
            );
            return RowOutcome::Skipped;
        }

        if row.emails.is_empty() {
            tracing::warn!("Row without emails: {}", record);
            return RowOutcome::Failed(FailureEntry {
                record,
                kind: FailureKind::NoEmails,
                motivo_fallo: NO_EMAILS_REASON.to_string(),
            });
        }

        let target = match resolve_target(&row.source, &record) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!("{}", e);
                return RowOutcome::Failed(FailureEntry {
                    motivo_fallo: e.to_string(),
                    kind: FailureKind::InvalidSource,
                    record,
                });
            }
        };

        match self
            .dispatcher
            .dispatch(&row.emails, target, &row.company_name)
            .await
        {
            Ok(_) => {
                if !row.organization_key.is_empty() {
                    sent.insert(row.organization_key.clone());
                }
                RowOutcome::Notified(NotificationEntry {
                    corporation_name: row.corporation_name,
                    organization_key: row.organization_key,
                    emails_enviados: row.emails.join(", "),
                    link: target.link.to_string(),
                    sender_team: target.sender_team.to_string(),
                })
            }
            Err(e) => RowOutcome::Failed(FailureEntry {
                record,
                kind: FailureKind::Dispatch,
                motivo_fallo: format!("error_envio: {}", e),
            }),
        }
    }
}
