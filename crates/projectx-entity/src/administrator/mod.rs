//! Administrator domain entities.

pub mod login_history;
pub mod model;
pub mod status;

pub use login_history::AdministratorLoginHistory;
pub use model::Administrator;
pub use status::AdministratorStatus;
