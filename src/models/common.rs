// src/models/common.rs

use serde::Deserialize;

/// Body of every reorder route: the drag source and destination in the
/// sibling list as the client last rendered it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub moved_id: i64,
    pub from_index: usize,
    pub to_index: usize,
}

/// Query parameters for destructive routes.
/// `confirm` must repeat the entity title exactly.
#[derive(Debug, Deserialize)]
pub struct ConfirmDeleteParams {
    #[serde(default)]
    pub confirm: String,
}
