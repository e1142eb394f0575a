//! Repositories for every entity.
//!
//! Each repository is the generic [`CriteriaRepository`] instantiated with
//! the entity's filter; entity-specific queries are inherent methods on
//! that instantiation.

pub mod action;
pub mod administrator;
pub mod administrator_role;
pub mod base;
mod graph;
pub mod login_history;
pub mod role;
pub mod role_action;
pub mod update;

pub use action::ActionRepository;
pub use administrator::AdministratorRepository;
pub use administrator_role::AdministratorRoleRepository;
pub use base::{CriteriaRepository, RepositoryPolicy};
pub use login_history::LoginHistoryRepository;
pub use role::RoleRepository;
pub use role_action::RoleActionRepository;
pub use update::UpdateSpec;
