use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info};
use uuid::Uuid;

use super::reminder_job::DeadlineScanJob;

/// 9 AM daily, server local time.
pub const DEFAULT_REMINDER_CRON: &str = "0 9 * * *";

/// Owns the process-wide recurring timer for the deadline scan.
///
/// Manual triggers and scheduled ticks call the same job without any lock
/// between them. Two overlapping scans can both see "no recent send" for an
/// assignment and each dispatch once.
#[derive(Clone)]
pub struct ReminderScheduler {
    scheduler: JobScheduler,
    job: Arc<DeadlineScanJob>,
    job_id: Uuid,
}

impl ReminderScheduler {
    pub async fn start(job: Arc<DeadlineScanJob>, cron: &str) -> Result<Self, JobSchedulerError> {
        let schedule = normalize_cron(cron);
        info!("Initializing reminder scheduler with cron: {}", schedule);

        let scheduler = JobScheduler::new().await?;

        let scheduled_job = job.clone();
        let cron_job = Job::new_async_tz(schedule.as_str(), chrono::Local, move |_uuid, _l| {
            let job = scheduled_job.clone();

            Box::pin(async move {
                info!("Cron job triggered - running reminder check");
                if let Err(e) = job.run().await {
                    error!("Scheduled reminder check failed: {}", e);
                }
            })
        })?;

        let job_id = scheduler.add(cron_job).await?;
        scheduler.start().await?;

        info!("Reminder scheduler started");
        Ok(Self {
            scheduler,
            job,
            job_id,
        })
    }

    /// Runs one scan now. Only success or failure is reported back.
    pub async fn trigger(&self) -> bool {
        info!("Manual reminder check requested");
        match self.job.run().await {
            Ok(_) => true,
            Err(e) => {
                error!("Manual reminder check failed: {}", e);
                false
            }
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.shutdown().await?;
        info!("Reminder scheduler stopped");
        Ok(())
    }
}

/// The scheduler expects a leading seconds field; classic 5-field
/// expressions get `0` prepended.
pub fn normalize_cron(cron: &str) -> String {
    let trimmed = cron.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {}", trimmed)
    } else {
        trimmed.to_string()
    }
}
