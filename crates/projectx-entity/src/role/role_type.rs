//! Role type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::base::Value;

/// How a role came to exist.
///
/// Stored by name (`SUPERUSER`), presented by label (`super-user`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    /// Grants every action.
    #[serde(rename = "super-user")]
    SuperUser,
    /// Shipped with the application; not editable.
    #[serde(rename = "built-in")]
    BuiltIn,
    /// Created by an administrator.
    #[serde(rename = "custom")]
    Custom,
}

impl RoleType {
    /// Return the stored name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperUser => "SUPERUSER",
            Self::BuiltIn => "BUILT_IN",
            Self::Custom => "CUSTOM",
        }
    }

    /// Return the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuperUser => "super-user",
            Self::BuiltIn => "built-in",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RoleType {
    type Err = projectx_core::AppError;

    /// Accepts either the stored name or the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPERUSER" | "super-user" => Ok(Self::SuperUser),
            "BUILT_IN" | "built-in" => Ok(Self::BuiltIn),
            "CUSTOM" | "custom" => Ok(Self::Custom),
            _ => Err(projectx_core::AppError::validation(format!(
                "Invalid role type: '{s}'. Expected one of: super-user, built-in, custom"
            ))),
        }
    }
}

impl From<RoleType> for Value {
    fn from(role_type: RoleType) -> Self {
        Value::Text(role_type.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_label() {
        assert_eq!("BUILT_IN".parse::<RoleType>().unwrap(), RoleType::BuiltIn);
        assert_eq!("built-in".parse::<RoleType>().unwrap(), RoleType::BuiltIn);
        assert!("builtin".parse::<RoleType>().is_err());
    }

    #[test]
    fn test_serializes_label() {
        assert_eq!(serde_json::to_string(&RoleType::SuperUser).unwrap(), "\"super-user\"");
    }
}
