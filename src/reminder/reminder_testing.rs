//! In-memory doubles for the reminder store and mail transport.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    assignment::AssignmentStatus,
    error::{AppError, Result},
    mail::{MailError, Mailer, OutgoingEmail},
};
use super::{
    reminder_models::{Reminder, ReminderCandidate, ReminderType},
    reminder_policy::{future_remind_times, within_lookahead, ReminderOffsets},
    reminder_repository::{ReminderStore, RECENT_SEND_WINDOW_HOURS},
};

pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

struct StoredAssignment {
    candidate: ReminderCandidate,
    status: AssignmentStatus,
    email_enabled: bool,
}

#[derive(Default)]
struct State {
    assignments: Vec<StoredAssignment>,
    reminders: Vec<Reminder>,
    fail_queries: bool,
}

#[derive(Default)]
pub struct InMemoryReminderStore {
    state: Mutex<State>,
}

impl InMemoryReminderStore {
    pub fn add_assignment(
        &self,
        title: &str,
        due_date: DateTime<Utc>,
        reminder_days: Option<&str>,
    ) -> Uuid {
        let assignment_id = Uuid::new_v4();
        let candidate = ReminderCandidate {
            assignment_id,
            title: title.to_string(),
            description: None,
            due_date,
            estimated_hours: None,
            weighting_percent: None,
            module_name: Some("Module".to_string()),
            user_id: Uuid::new_v4(),
            email: format!("{}@example.com", assignment_id.simple()),
            user_name: None,
            default_reminder_days: reminder_days.map(str::to_string),
        };

        self.state.lock().unwrap().assignments.push(StoredAssignment {
            candidate,
            status: AssignmentStatus::NotStarted,
            email_enabled: true,
        });
        assignment_id
    }

    pub fn set_status(&self, assignment_id: Uuid, status: AssignmentStatus) {
        self.with_assignment(assignment_id, |a| a.status = status);
    }

    pub fn set_email_enabled(&self, assignment_id: Uuid, enabled: bool) {
        self.with_assignment(assignment_id, |a| a.email_enabled = enabled);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    pub fn owner_of(&self, assignment_id: Uuid) -> Uuid {
        let state = self.state.lock().unwrap();
        state
            .assignments
            .iter()
            .find(|a| a.candidate.assignment_id == assignment_id)
            .map(|a| a.candidate.user_id)
            .unwrap()
    }

    pub fn reminders_for(&self, assignment_id: Uuid) -> Vec<Reminder> {
        let state = self.state.lock().unwrap();
        state
            .reminders
            .iter()
            .filter(|r| r.assignment_id == assignment_id)
            .cloned()
            .collect()
    }

    fn with_assignment(&self, assignment_id: Uuid, f: impl FnOnce(&mut StoredAssignment)) {
        let mut state = self.state.lock().unwrap();
        if let Some(a) = state
            .assignments
            .iter_mut()
            .find(|a| a.candidate.assignment_id == assignment_id)
        {
            f(a);
        }
    }

    fn recently_sent(state: &State, assignment_id: Uuid, now: DateTime<Utc>) -> bool {
        let cutoff = now - Duration::hours(RECENT_SEND_WINDOW_HOURS);
        state.reminders.iter().any(|r| {
            r.assignment_id == assignment_id
                && r.sent
                && r.sent_at.map(|at| at > cutoff).unwrap_or(false)
        })
    }

    fn check(state: &State) -> Result<()> {
        if state.fail_queries {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn find_candidates(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;

        let mut candidates: Vec<ReminderCandidate> = state
            .assignments
            .iter()
            .filter(|a| a.status != AssignmentStatus::Done && a.email_enabled)
            .filter(|a| within_lookahead(a.candidate.due_date, now))
            .filter(|a| a.candidate.due_date <= horizon)
            .filter(|a| !Self::recently_sent(&state, a.candidate.assignment_id, now))
            .map(|a| a.candidate.clone())
            .collect();
        candidates.sort_by_key(|c| c.due_date);

        Ok(candidates)
    }

    async fn has_recent_send(&self, assignment_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;
        Ok(Self::recently_sent(&state, assignment_id, now))
    }

    async fn record_send(
        &self,
        assignment_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Reminder> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;

        let reminder = Reminder {
            id: Uuid::new_v4(),
            assignment_id,
            user_id,
            remind_at: now,
            reminder_type: ReminderType::Email.to_string(),
            sent: true,
            sent_at: Some(now),
            created_at: now,
        };
        state.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn invalidate_unsent(&self, assignment_id: Uuid) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;

        let before = state.reminders.len();
        state
            .reminders
            .retain(|r| r.assignment_id != assignment_id || r.sent);
        Ok((before - state.reminders.len()) as u64)
    }

    async fn schedule_future(
        &self,
        assignment_id: Uuid,
        user_id: Uuid,
        due_date: DateTime<Utc>,
        offsets: &ReminderOffsets,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state)?;

        let created: Vec<Reminder> = future_remind_times(due_date, offsets, now)
            .into_iter()
            .map(|(_, remind_at)| Reminder {
                id: Uuid::new_v4(),
                assignment_id,
                user_id,
                remind_at,
                reminder_type: ReminderType::Email.to_string(),
                sent: false,
                sent_at: None,
                created_at: now,
            })
            .collect();
        state.reminders.extend(created.iter().cloned());
        Ok(created)
    }

    async fn find_by_assignment(&self, assignment_id: Uuid) -> Result<Vec<Reminder>> {
        let state = self.state.lock().unwrap();
        Self::check(&state)?;

        let mut reminders: Vec<Reminder> = state
            .reminders
            .iter()
            .filter(|r| r.assignment_id == assignment_id)
            .cloned()
            .collect();
        reminders.sort_by_key(|r| r.remind_at);
        Ok(reminders)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failures_left: Mutex<usize>,
}

impl RecordingMailer {
    pub fn fail_next(&self, count: usize) {
        *self.failures_left.lock().unwrap() = count;
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> std::result::Result<String, MailError> {
        {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(MailError::Rejected("550 mailbox unavailable".to_string()));
            }
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(format!("<{}@test>", Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_keeps_sent_rows() {
        let now = test_now();
        let store = InMemoryReminderStore::default();
        let id = store.add_assignment("Essay", now + Duration::days(10), None);
        let owner = store.owner_of(id);

        store.record_send(id, owner, now).await.unwrap();
        let scheduled = store
            .schedule_future(id, owner, now + Duration::days(10), &ReminderOffsets::default(), now)
            .await
            .unwrap();
        assert_eq!(scheduled.len(), 3);

        let removed = store.invalidate_unsent(id).await.unwrap();
        assert_eq!(removed, 3);

        let remaining = store.find_by_assignment(id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].sent);
    }

    #[tokio::test]
    async fn test_due_date_change_does_not_recreate_past_offsets() {
        let now = test_now();
        let store = InMemoryReminderStore::default();
        let id = store.add_assignment("Essay", now + Duration::days(10), None);
        let owner = store.owner_of(id);
        let offsets = ReminderOffsets::default();

        store
            .schedule_future(id, owner, now + Duration::days(10), &offsets, now)
            .await
            .unwrap();

        let new_due = now + Duration::days(3);
        store.invalidate_unsent(id).await.unwrap();
        store.schedule_future(id, owner, new_due, &offsets, now).await.unwrap();

        let remind_times: Vec<DateTime<Utc>> = store
            .find_by_assignment(id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.remind_at)
            .collect();
        assert_eq!(
            remind_times,
            vec![new_due - Duration::days(2), new_due - Duration::days(1)]
        );
    }

    #[tokio::test]
    async fn test_recent_send_window_is_24_hours() {
        let now = test_now();
        let store = InMemoryReminderStore::default();
        let id = store.add_assignment("Essay", now + Duration::days(2), None);
        let owner = store.owner_of(id);

        store.record_send(id, owner, now).await.unwrap();
        assert!(store.has_recent_send(id, now + Duration::hours(23)).await.unwrap());
        assert!(!store.has_recent_send(id, now + Duration::hours(24)).await.unwrap());
    }
}
