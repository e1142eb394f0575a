//! # projectx-service
//!
//! Use cases over the admin tables. Each service is built from a
//! [`RepositoryPolicy`](projectx_database::RepositoryPolicy) and borrows the
//! caller's store for every call, so a caller that wants the link rows and
//! the owning row written atomically passes an open transaction.

pub mod action;
pub mod administrator;
pub mod links;
pub mod role;

pub use action::ActionService;
pub use administrator::AdministratorService;
pub use links::LinkChanges;
pub use role::{RoleLinkChanges, RoleService};
