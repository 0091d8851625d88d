// src/models/user.rs

use serde::{Deserialize, Serialize};

/// Account role as asserted by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
}

/// The authenticated caller, passed explicitly to every handler that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }
}
