//! Persistence boundary for curriculum rows.
//!
//! [`PgStore`] talks to Postgres through sqlx; [`MemoryStore`] keeps the same
//! tables in process and backs local runs without `DATABASE_URL` and the
//! integration tests. Both cascade deletes downward and apply order batches
//! atomically.

mod memory;
mod postgres;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::{
    curriculum::ordering::OrderAssignment,
    error::AppError,
    models::{
        module::{Module, ModuleMetadata, NewModule},
        phase::{NewPhase, Phase},
        profile::Profile,
        progress::ProgressRecord,
        section::{NewSection, Section},
        user::Role,
    },
};

#[async_trait]
pub trait CurriculumStore: Send + Sync {
    // Phases
    async fn list_phases(&self) -> Result<Vec<Phase>, AppError>;
    async fn get_phase(&self, id: i64) -> Result<Option<Phase>, AppError>;
    /// Inserts at `max(phase_order) + 1`.
    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, AppError>;
    async fn update_phase(&self, id: i64, phase: NewPhase) -> Result<Option<Phase>, AppError>;
    /// Deletes the phase with its sections, modules and progress. Returns false if absent.
    async fn delete_phase(&self, id: i64) -> Result<bool, AppError>;
    async fn apply_phase_order(&self, assignments: &[OrderAssignment]) -> Result<(), AppError>;

    // Sections
    async fn list_sections(&self) -> Result<Vec<Section>, AppError>;
    /// Sections of one phase sorted by `section_order`.
    async fn list_sections_in_phase(&self, phase_id: i64) -> Result<Vec<Section>, AppError>;
    async fn get_section(&self, id: i64) -> Result<Option<Section>, AppError>;
    async fn create_section(&self, section: NewSection) -> Result<Section, AppError>;
    async fn update_section(
        &self,
        id: i64,
        title: String,
        description: String,
    ) -> Result<Option<Section>, AppError>;
    async fn delete_section(&self, id: i64) -> Result<bool, AppError>;
    async fn apply_section_order(
        &self,
        phase_id: i64,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError>;

    // Modules
    async fn list_modules(&self) -> Result<Vec<Module>, AppError>;
    /// Modules of one section sorted by `module_order`.
    async fn list_modules_in_section(&self, section_id: i64) -> Result<Vec<Module>, AppError>;
    async fn get_module(&self, id: i64) -> Result<Option<Module>, AppError>;
    async fn create_module(&self, module: NewModule) -> Result<Module, AppError>;
    async fn update_module_metadata(
        &self,
        id: i64,
        metadata: ModuleMetadata,
    ) -> Result<Option<Module>, AppError>;
    async fn update_module_content(&self, id: i64, content: String)
    -> Result<Option<Module>, AppError>;
    async fn delete_module(&self, id: i64) -> Result<bool, AppError>;
    async fn apply_module_order(
        &self,
        section_id: i64,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError>;

    // Progress
    async fn get_progress(
        &self,
        user_id: i64,
        module_id: i64,
    ) -> Result<Option<ProgressRecord>, AppError>;
    async fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError>;
    async fn list_completed_progress(&self) -> Result<Vec<ProgressRecord>, AppError>;
    /// Inserts or overwrites the single record for `(user_id, module_id)`.
    async fn upsert_progress(&self, record: ProgressRecord) -> Result<ProgressRecord, AppError>;

    // Profiles
    async fn list_profiles_by_role(&self, role: Role) -> Result<Vec<Profile>, AppError>;
}
