pub mod preference_dto;
pub mod preference_handlers;
pub mod preference_models;
pub mod preference_repository;
#[cfg(test)]
pub mod preference_testing;

pub use preference_dto::{NotificationPreferencesResponse, UpdateNotificationPreferencesRequest};
pub use preference_handlers::{get_preferences, update_preferences};
pub use preference_repository::{PreferenceRepository, PreferenceStore};
