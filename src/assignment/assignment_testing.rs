//! In-memory assignment store mirroring the SQL repository's semantics.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::Result;
use super::{
    assignment_models::{Assignment, AssignmentStatus, AssignmentWithModule},
    assignment_repository::{AssignmentChanges, AssignmentFilters, AssignmentStore, NewAssignment},
};

#[derive(Default)]
struct State {
    assignments: Vec<Assignment>,
    /// (module id, owner id)
    modules: Vec<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct InMemoryAssignmentStore {
    state: Mutex<State>,
}

impl InMemoryAssignmentStore {
    pub fn add_module(&self, user_id: Uuid) -> Uuid {
        let module_id = Uuid::new_v4();
        self.state.lock().unwrap().modules.push((module_id, user_id));
        module_id
    }

    fn with_module(assignment: Assignment) -> AssignmentWithModule {
        AssignmentWithModule {
            assignment,
            module_name: None,
            module_code: None,
        }
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn find_all(
        &self,
        user_id: Uuid,
        filters: AssignmentFilters,
    ) -> Result<Vec<AssignmentWithModule>> {
        let now = Utc::now();
        let state = self.state.lock().unwrap();

        let mut found: Vec<Assignment> = state
            .assignments
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter(|a| filters.status.map_or(true, |s| a.status == s.as_str()))
            .filter(|a| filters.module_id.map_or(true, |m| a.module_id == Some(m)))
            .filter(|a| {
                filters.upcoming_days.map_or(true, |days| {
                    a.due_date >= now && a.due_date <= now + Duration::days(days.into())
                })
            })
            .cloned()
            .collect();
        found.sort_by_key(|a| a.due_date);

        Ok(found.into_iter().map(Self::with_module).collect())
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<AssignmentWithModule>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .assignments
            .iter()
            .find(|a| a.id == id && a.user_id == user_id)
            .cloned()
            .map(Self::with_module))
    }

    async fn module_belongs_to_user(&self, module_id: Uuid, user_id: Uuid) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.modules.contains(&(module_id, user_id)))
    }

    async fn create(&self, user_id: Uuid, new: NewAssignment<'_>) -> Result<Assignment> {
        let now = Utc::now();
        let assignment = Assignment {
            id: Uuid::new_v4(),
            user_id,
            module_id: new.module_id,
            title: new.title.to_string(),
            description: new.description.map(str::to_string),
            due_date: new.due_date,
            weighting_percent: new.weighting_percent,
            estimated_hours: new.estimated_hours,
            status: AssignmentStatus::NotStarted.to_string(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.state.lock().unwrap().assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: AssignmentChanges<'_>,
    ) -> Result<Option<Assignment>> {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        let Some(a) = state
            .assignments
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(module_id) = changes.module_id {
            a.module_id = Some(module_id);
        }
        if let Some(title) = changes.title {
            a.title = title.to_string();
        }
        if let Some(description) = changes.description {
            a.description = Some(description.to_string());
        }
        if let Some(due_date) = changes.due_date {
            a.due_date = due_date;
        }
        if let Some(weighting) = changes.weighting_percent {
            a.weighting_percent = Some(weighting);
        }
        if let Some(hours) = changes.estimated_hours {
            a.estimated_hours = Some(hours);
        }
        if let Some(status) = changes.status {
            if status == AssignmentStatus::Done && a.status != status.as_str() {
                a.completed_at = Some(now);
            } else if status != AssignmentStatus::Done {
                a.completed_at = None;
            }
            a.status = status.to_string();
        }
        a.updated_at = now;

        Ok(Some(a.clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Option<Assignment>> {
        self.update(
            id,
            user_id,
            AssignmentChanges {
                status: Some(status),
                ..AssignmentChanges::default()
            },
        )
        .await
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.assignments.len();
        state
            .assignments
            .retain(|a| !(a.id == id && a.user_id == user_id));
        Ok((before - state.assignments.len()) as u64)
    }
}
