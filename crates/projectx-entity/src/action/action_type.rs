//! Action type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::base::Value;

/// Whether an action is a page entry point or an operation inside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Main,
    Sub,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Sub => "SUB",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = projectx_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MAIN" => Ok(Self::Main),
            "SUB" => Ok(Self::Sub),
            _ => Err(projectx_core::AppError::validation(format!(
                "Invalid action type: '{s}'. Expected one of: MAIN, SUB"
            ))),
        }
    }
}

impl From<ActionType> for Value {
    fn from(action_type: ActionType) -> Self {
        Value::Text(action_type.as_str().to_string())
    }
}
