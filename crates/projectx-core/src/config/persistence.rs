//! Query engine limits.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Limits applied by the criteria query engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Page size used when the caller asks for a page without a limit.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound for any requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Number of ids per statement in bulk update/delete.
    #[serde(default = "default_bulk_chunk_size")]
    pub bulk_chunk_size: usize,
    /// Largest id list ordered with a positional CASE expression.
    #[serde(default = "default_max_rank_ids")]
    pub max_rank_ids: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            bulk_chunk_size: default_bulk_chunk_size(),
            max_rank_ids: default_max_rank_ids(),
        }
    }
}

impl PersistenceConfig {
    /// Reject limits the engine cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(AppError::configuration("Page sizes must be positive"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(AppError::configuration(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.bulk_chunk_size == 0 {
            return Err(AppError::configuration("bulk_chunk_size must be positive"));
        }
        if self.max_rank_ids < self.max_page_size as usize {
            return Err(AppError::configuration(format!(
                "max_rank_ids ({}) must cover max_page_size ({})",
                self.max_rank_ids, self.max_page_size
            )));
        }
        Ok(())
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_bulk_chunk_size() -> usize {
    1000
}

fn default_max_rank_ids() -> usize {
    200
}
