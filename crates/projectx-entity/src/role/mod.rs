//! Role domain entities.

pub mod administrator_role;
pub mod model;
pub mod role_type;

pub use administrator_role::AdministratorRole;
pub use model::Role;
pub use role_type::RoleType;
