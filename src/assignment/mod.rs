pub mod assignment_dto;
pub mod assignment_handlers;
pub mod assignment_models;
pub mod assignment_repository;
pub mod assignment_service;
#[cfg(test)]
pub mod assignment_testing;

pub use assignment_dto::{CreateAssignmentRequest, UpdateAssignmentRequest, UpdateAssignmentStatusRequest};
pub use assignment_handlers::{
    create_assignment, delete_assignment, get_assignment, get_assignments, update_assignment,
    update_assignment_status,
};
pub use assignment_models::{Assignment, AssignmentStatus, AssignmentWithModule};
pub use assignment_repository::{AssignmentRepository, AssignmentStore};
pub use assignment_service::AssignmentService;
