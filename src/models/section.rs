// src/models/section.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::curriculum::validation::not_blank;

/// Represents the 'sections' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,

    /// Owning phase. Deleting the phase deletes the section.
    pub phase_id: i64,

    pub title: String,
    pub description: String,

    /// 1-based display position within the phase.
    pub section_order: i32,
}

/// DTO for creating or editing a section.
#[derive(Debug, Deserialize, Validate)]
pub struct SectionPayload {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub phase_id: i64,
    pub title: String,
    pub description: String,
}

impl SectionPayload {
    pub fn into_new(self, phase_id: i64) -> NewSection {
        NewSection {
            phase_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}
