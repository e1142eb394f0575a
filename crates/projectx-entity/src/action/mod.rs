//! Action domain entities.

pub mod action_type;
pub mod model;
pub mod role_action;

pub use action_type::ActionType;
pub use model::Action;
pub use role_action::RoleAction;
