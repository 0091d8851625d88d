// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'module_progress' table in the database.
///
/// Keyed by `(user_id, module_id)`; a missing row means the module is not completed.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub module_id: i64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}
