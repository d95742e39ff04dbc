use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    preference::PreferenceStore,
    reminder::{ReminderOffsets, ReminderStore},
};
use super::{
    assignment_dto::{CreateAssignmentRequest, UpdateAssignmentRequest},
    assignment_models::{Assignment, AssignmentStatus, AssignmentWithModule},
    assignment_repository::{AssignmentChanges, AssignmentFilters, AssignmentStore, NewAssignment},
};

/// Assignment CRUD plus upkeep of the reminder ledger's scheduled rows.
#[derive(Clone)]
pub struct AssignmentService {
    repo: Arc<dyn AssignmentStore>,
    preference_store: Arc<dyn PreferenceStore>,
    reminder_store: Arc<dyn ReminderStore>,
}

impl AssignmentService {
    pub fn new(
        repo: Arc<dyn AssignmentStore>,
        preference_store: Arc<dyn PreferenceStore>,
        reminder_store: Arc<dyn ReminderStore>,
    ) -> Self {
        Self {
            repo,
            preference_store,
            reminder_store,
        }
    }

    pub async fn list_assignments(
        &self,
        user_id: Uuid,
        filters: AssignmentFilters,
    ) -> Result<Vec<AssignmentWithModule>> {
        self.repo.find_all(user_id, filters).await
    }

    pub async fn get_assignment(&self, user_id: Uuid, assignment_id: Uuid) -> Result<AssignmentWithModule> {
        self.repo
            .find_by_id(assignment_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
    }

    pub async fn create_assignment(
        &self,
        user_id: Uuid,
        payload: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        if let Some(module_id) = payload.module_id {
            self.ensure_module_owned(module_id, user_id).await?;
        }

        let assignment = self
            .repo
            .create(
                user_id,
                NewAssignment {
                    module_id: payload.module_id,
                    title: &payload.title,
                    description: payload.description.as_deref(),
                    due_date: payload.due_date,
                    weighting_percent: payload.weighting_percent,
                    estimated_hours: payload.estimated_hours,
                },
            )
            .await?;

        self.schedule_reminders(&assignment).await;
        Ok(assignment)
    }

    pub async fn update_assignment(
        &self,
        user_id: Uuid,
        assignment_id: Uuid,
        payload: UpdateAssignmentRequest,
    ) -> Result<Assignment> {
        let current = self.get_assignment(user_id, assignment_id).await?;

        if let Some(module_id) = payload.module_id {
            self.ensure_module_owned(module_id, user_id).await?;
        }

        let updated = self
            .repo
            .update(
                assignment_id,
                user_id,
                AssignmentChanges {
                    module_id: payload.module_id,
                    title: payload.title.as_deref(),
                    description: payload.description.as_deref(),
                    due_date: payload.due_date,
                    weighting_percent: payload.weighting_percent,
                    estimated_hours: payload.estimated_hours,
                    status: payload.status,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".into()))?;

        if due_date_changed(current.assignment.due_date, payload.due_date) {
            if let Err(e) = self.reminder_store.invalidate_unsent(updated.id).await {
                tracing::warn!(assignment_id = %updated.id, "Failed to clear unsent reminders: {:?}", e);
            }
            self.schedule_reminders(&updated).await;
        }

        Ok(updated)
    }

    pub async fn update_status(
        &self,
        user_id: Uuid,
        assignment_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Assignment> {
        self.repo
            .update_status(assignment_id, user_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".into()))
    }

    pub async fn delete_assignment(&self, user_id: Uuid, assignment_id: Uuid) -> Result<u64> {
        self.repo.delete(assignment_id, user_id).await
    }

    async fn ensure_module_owned(&self, module_id: Uuid, user_id: Uuid) -> Result<()> {
        if self.repo.module_belongs_to_user(module_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Module not found".into()))
        }
    }

    /// Ledger rows are informational; the scan derives due-ness on its own,
    /// so a failure here is logged rather than failing the request.
    async fn schedule_reminders(&self, assignment: &Assignment) {
        let offsets = match self.preference_store.find_by_user(assignment.user_id).await {
            Ok(Some(preference)) => preference.reminder_offsets(),
            Ok(None) => ReminderOffsets::default(),
            Err(e) => {
                tracing::warn!(user_id = %assignment.user_id, "Failed to load reminder preferences: {:?}", e);
                ReminderOffsets::default()
            }
        };

        match self
            .reminder_store
            .schedule_future(
                assignment.id,
                assignment.user_id,
                assignment.due_date,
                &offsets,
                Utc::now(),
            )
            .await
        {
            Ok(reminders) => tracing::debug!(
                assignment_id = %assignment.id,
                count = reminders.len(),
                "Scheduled reminders"
            ),
            Err(e) => tracing::warn!(
                assignment_id = %assignment.id,
                "Failed to schedule reminders: {:?}", e
            ),
        }
    }
}

fn due_date_changed(current: DateTime<Utc>, requested: Option<DateTime<Utc>>) -> bool {
    requested.map(|due| due != current).unwrap_or(false)
}
