// src/models/profile.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::Role;

/// Represents the 'profiles' table, owned by the external auth service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}
