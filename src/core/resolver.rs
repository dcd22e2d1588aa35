use crate::core::Record;
use crate::domain::model::NotificationTarget;
use crate::utils::error::ResolutionError;

pub const PLUXEE: NotificationTarget = NotificationTarget {
    link: "https://enlace-pluxee.com",
    sender_team: "Onboarding Cobee by Pluxee",
};

pub const COBEE: NotificationTarget = NotificationTarget {
    link: "https://enlace-cobee.com",
    sender_team: "New Business Onboarding",
};

/// Maps an already-normalized source tag to its target.
///
/// Matching is exact: callers lowercase and trim first. The record is only
/// carried into the error for reporting.
pub fn resolve_target(
    source: &str,
    record: &Record,
) -> std::result::Result<NotificationTarget, ResolutionError> {
    match source {
        "pluxee" => Ok(PLUXEE),
        "cobee" => Ok(COBEE),
        _ => Err(ResolutionError {
            record: record.clone(),
        }),
    }
}
