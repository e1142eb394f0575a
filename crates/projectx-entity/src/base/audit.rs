//! Audit base record shared by every entity.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use projectx_core::AppResult;

use super::record::Record;

/// Surrogate key and audit stamps.
///
/// `created_by`/`created_date` are written once at creation; the `updated_*`
/// pair changes on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    /// Assigned by the store on insert.
    pub id: Option<i64>,
    pub created_by: i64,
    pub created_date: NaiveDateTime,
    pub updated_by: i64,
    pub updated_date: NaiveDateTime,
}

impl AuditFields {
    /// Unsaved audit fields stamped with the current time.
    pub fn new() -> Self {
        let now = now();
        Self {
            id: None,
            created_by: 0,
            created_date: now,
            updated_by: 0,
            updated_date: now,
        }
    }

    /// Stamp creation. Both pairs get the same values.
    pub fn stamp_created(&mut self, by: i64, at: NaiveDateTime) {
        self.created_by = by;
        self.created_date = at;
        self.updated_by = by;
        self.updated_date = at;
    }

    /// Stamp a modification.
    pub fn stamp_updated(&mut self, by: i64, at: NaiveDateTime) {
        self.updated_by = by;
        self.updated_date = at;
    }

    /// Read the audit columns of a row.
    pub fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: Some(record.int("id")?),
            created_by: record.int("created_by")?,
            created_date: record.timestamp("created_date")?,
            updated_by: record.int("updated_by")?,
            updated_date: record.timestamp("updated_date")?,
        })
    }

    /// Write the audit stamps (not the id) into a row.
    pub fn write(&self, record: &mut Record) {
        record.set("created_by", self.created_by);
        record.set("created_date", self.created_date);
        record.set("updated_by", self.updated_by);
        record.set("updated_date", self.updated_date);
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self::new()
    }
}

/// Current UTC time truncated to the microsecond precision of `TIMESTAMP`.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}
