// src/curriculum/progress.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::progress::ProgressRecord;

/// Per-user, per-module completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    NotStarted,
    Completed,
}

impl CompletionState {
    pub fn of(record: Option<&ProgressRecord>) -> Self {
        if is_completed(record) {
            CompletionState::Completed
        } else {
            CompletionState::NotStarted
        }
    }
}

/// A missing record counts as not completed.
pub fn is_completed(record: Option<&ProgressRecord>) -> bool {
    record.is_some_and(|r| r.is_completed)
}

/// Computes the record a toggle should upsert.
///
/// NotStarted -> Completed stamps `completed_at = now`;
/// Completed -> NotStarted clears it.
pub fn next_record(
    current: Option<&ProgressRecord>,
    user_id: i64,
    module_id: i64,
    now: DateTime<Utc>,
) -> ProgressRecord {
    if is_completed(current) {
        ProgressRecord {
            user_id,
            module_id,
            is_completed: false,
            completed_at: None,
        }
    } else {
        ProgressRecord {
            user_id,
            module_id,
            is_completed: true,
            completed_at: Some(now),
        }
    }
}

/// Percentage of `total_modules` that are completed in `records`.
/// Returns 0 when there is nothing to complete.
pub fn completion_rate<'a>(
    records: impl IntoIterator<Item = &'a ProgressRecord>,
    total_modules: usize,
) -> f64 {
    if total_modules == 0 {
        return 0.0;
    }

    let completed = records.into_iter().filter(|r| r.is_completed).count();
    (completed as f64 / total_modules as f64) * 100.0
}
