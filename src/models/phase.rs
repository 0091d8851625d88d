// src/models/phase.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::curriculum::validation::not_blank;

/// Represents the 'phases' table in the database.
/// Top-level curriculum grouping.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Phase {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// 1-based display position among all phases.
    pub phase_order: i32,
}

/// DTO for creating or editing a phase. Edits replace both fields.
#[derive(Debug, Deserialize, Validate)]
pub struct PhasePayload {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

/// Normalized phase fields handed to the store.
#[derive(Debug, Clone)]
pub struct NewPhase {
    pub title: String,
    pub description: String,
}

impl From<PhasePayload> for NewPhase {
    fn from(payload: PhasePayload) -> Self {
        Self {
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
        }
    }
}
