pub mod module_dto;
pub mod module_handlers;
pub mod module_models;
pub mod module_repository;

pub use module_dto::{
    AssignmentCountResponse, CreateModuleRequest, DeleteModuleResponse, UpdateModuleRequest,
};
pub use module_handlers::{
    count_module_assignments, create_module, delete_module, get_module, get_modules, update_module,
};
pub use module_models::Module;
pub use module_repository::ModuleRepository;
