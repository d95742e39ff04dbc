use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    mail::{template::render_reminder, Mailer},
};
use super::{
    reminder_models::ReminderCandidate,
    reminder_policy::{is_reminder_due, ReminderOffsets, LOOKAHEAD_DAYS},
    reminder_repository::ReminderStore,
};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("candidate query failed: {0}")]
    Query(#[source] AppError),
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Maximum dispatches in flight at once. Candidates still start in due-date order.
    pub dispatch_concurrency: usize,
    pub dashboard_url: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            dispatch_concurrency: 1,
            dashboard_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateOutcome {
    NotDue,
    RecentlySent,
    Sent,
    Unrecorded,
    Failed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub candidates: usize,
    pub sent: usize,
    pub not_due: usize,
    pub recently_sent: usize,
    pub failed: usize,
    /// Mail went out but the ledger write failed; the next tick may resend.
    pub unrecorded: usize,
}

impl ScanSummary {
    fn tally(mut self, outcome: CandidateOutcome) -> Self {
        match outcome {
            CandidateOutcome::NotDue => self.not_due += 1,
            CandidateOutcome::RecentlySent => self.recently_sent += 1,
            CandidateOutcome::Sent => self.sent += 1,
            CandidateOutcome::Unrecorded => self.unrecorded += 1,
            CandidateOutcome::Failed => self.failed += 1,
        }
        self
    }
}

/// One pass over every active assignment: evaluate, dedup, dispatch, record.
pub struct DeadlineScanJob {
    store: Arc<dyn ReminderStore>,
    mailer: Arc<dyn Mailer>,
    settings: ScanSettings,
}

impl DeadlineScanJob {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        mailer: Arc<dyn Mailer>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            settings,
        }
    }

    pub async fn run(&self) -> Result<ScanSummary, ScanError> {
        self.run_at(Utc::now()).await
    }

    /// Only the candidate query can fail the cycle. Per-assignment failures
    /// are logged and counted, and the remaining candidates still run.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ScanSummary, ScanError> {
        info!("Checking for upcoming deadlines...");

        let horizon = now + Duration::days(LOOKAHEAD_DAYS);
        let candidates = self
            .store
            .find_candidates(now, horizon)
            .await
            .map_err(|e| {
                error!("Error querying reminder candidates: {:?}", e);
                ScanError::Query(e)
            })?;

        info!("Found {} assignment(s) to evaluate for reminders", candidates.len());

        let concurrency = self.settings.dispatch_concurrency.max(1);
        let summary = stream::iter(candidates)
            .map(|candidate| self.process_candidate(candidate, now))
            .buffered(concurrency)
            .fold(ScanSummary::default(), |summary, outcome| async move {
                ScanSummary {
                    candidates: summary.candidates + 1,
                    ..summary
                }
                .tally(outcome)
            })
            .await;

        info!(
            candidates = summary.candidates,
            sent = summary.sent,
            not_due = summary.not_due,
            recently_sent = summary.recently_sent,
            failed = summary.failed,
            unrecorded = summary.unrecorded,
            "Reminder check completed"
        );

        Ok(summary)
    }

    async fn process_candidate(
        &self,
        candidate: ReminderCandidate,
        now: DateTime<Utc>,
    ) -> CandidateOutcome {
        let offsets = ReminderOffsets::from_stored(candidate.default_reminder_days.as_deref());
        let decision = is_reminder_due(candidate.due_date, &offsets, now);
        if !decision.is_due {
            return CandidateOutcome::NotDue;
        }

        // Re-checked right before dispatch so overlapping scans narrow the
        // duplicate window to the mail round-trip.
        match self.store.has_recent_send(candidate.assignment_id, now).await {
            Ok(true) => return CandidateOutcome::RecentlySent,
            Ok(false) => {}
            Err(e) => {
                error!(
                    assignment_id = %candidate.assignment_id,
                    "Failed to check reminder ledger: {:?}", e
                );
                return CandidateOutcome::Failed;
            }
        }

        let email = render_reminder(&candidate, decision.days_until_due, &self.settings.dashboard_url);

        match self.mailer.send(&email).await {
            Ok(message_id) => {
                if let Err(e) = self
                    .store
                    .record_send(candidate.assignment_id, candidate.user_id, now)
                    .await
                {
                    warn!(
                        assignment_id = %candidate.assignment_id,
                        message_id = %message_id,
                        "Reminder sent but not recorded: {:?}", e
                    );
                    return CandidateOutcome::Unrecorded;
                }

                info!(
                    assignment_id = %candidate.assignment_id,
                    message_id = %message_id,
                    "Reminder sent to {} for: {}",
                    candidate.email,
                    candidate.title
                );
                CandidateOutcome::Sent
            }
            Err(e) => {
                error!(
                    assignment_id = %candidate.assignment_id,
                    "Failed to send reminder: {}", e
                );
                CandidateOutcome::Failed
            }
        }
    }
}
