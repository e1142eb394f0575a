//! Administrator account status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::base::Value;

/// Account status for an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdministratorStatus {
    /// Account can sign in.
    Active,
    /// Account is blocked by another administrator.
    Suspended,
}

impl AdministratorStatus {
    /// Check if the administrator can sign in with this status.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the stored name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for AdministratorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdministratorStatus {
    type Err = projectx_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "SUSPENDED" => Ok(Self::Suspended),
            _ => Err(projectx_core::AppError::validation(format!(
                "Invalid administrator status: '{s}'. Expected one of: ACTIVE, SUSPENDED"
            ))),
        }
    }
}

impl From<AdministratorStatus> for Value {
    fn from(status: AdministratorStatus) -> Self {
        Value::Text(status.as_str().to_string())
    }
}
