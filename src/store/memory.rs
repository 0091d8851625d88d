// src/store/memory.rs

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    curriculum::ordering::{OrderAssignment, next_order},
    error::AppError,
    models::{
        module::{Module, ModuleMetadata, NewModule},
        phase::{NewPhase, Phase},
        profile::Profile,
        progress::ProgressRecord,
        section::{NewSection, Section},
        user::Role,
    },
    store::CurriculumStore,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    phases: Vec<Phase>,
    sections: Vec<Section>,
    modules: Vec<Module>,
    progress: Vec<ProgressRecord>,
    profiles: Vec<Profile>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn drop_modules(&mut self, module_ids: &[i64]) {
        self.progress.retain(|r| !module_ids.contains(&r.module_id));
        self.modules.retain(|m| !module_ids.contains(&m.id));
    }

    fn drop_sections(&mut self, section_ids: &[i64]) {
        let module_ids: Vec<i64> = self
            .modules
            .iter()
            .filter(|m| section_ids.contains(&m.section_id))
            .map(|m| m.id)
            .collect();
        self.drop_modules(&module_ids);
        self.sections.retain(|s| !section_ids.contains(&s.id));
    }
}

/// Checks that every assignment targets a distinct member of `sibling_ids`.
fn check_batch(sibling_ids: &[i64], assignments: &[OrderAssignment]) -> Result<(), AppError> {
    let mut seen = Vec::with_capacity(assignments.len());
    for a in assignments {
        if !sibling_ids.contains(&a.id) || seen.contains(&a.id) {
            return Err(AppError::Conflict(format!(
                "Item {} is not part of this list",
                a.id
            )));
        }
        seen.push(a.id);
    }
    Ok(())
}

fn sorted<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> i32) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}

/// In-process store with the same semantics as [`super::PgStore`].
/// Cascades are performed explicitly; every method holds the lock for its whole
/// duration, so order batches are all-or-nothing.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile, standing in for the external auth service.
    pub async fn insert_profile(&self, profile: Profile) {
        let mut tables = self.tables.write().await;
        tables.profiles.retain(|p| p.user_id != profile.user_id);
        tables.profiles.push(profile);
    }
}

#[async_trait]
impl CurriculumStore for MemoryStore {
    async fn list_phases(&self) -> Result<Vec<Phase>, AppError> {
        let tables = self.tables.read().await;
        Ok(sorted(tables.phases.iter().cloned(), |p| p.phase_order))
    }

    async fn get_phase(&self, id: i64) -> Result<Option<Phase>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.phases.iter().find(|p| p.id == id).cloned())
    }

    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, AppError> {
        let mut tables = self.tables.write().await;
        let phase = Phase {
            id: tables.allocate_id(),
            title: phase.title,
            description: phase.description,
            phase_order: next_order(tables.phases.iter().map(|p| p.phase_order)),
        };
        tables.phases.push(phase.clone());
        Ok(phase)
    }

    async fn update_phase(&self, id: i64, phase: NewPhase) -> Result<Option<Phase>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.phases.iter_mut().find(|p| p.id == id).map(|existing| {
            existing.title = phase.title;
            existing.description = phase.description;
            existing.clone()
        }))
    }

    async fn delete_phase(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.phases.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        let section_ids: Vec<i64> = tables
            .sections
            .iter()
            .filter(|s| s.phase_id == id)
            .map(|s| s.id)
            .collect();
        tables.drop_sections(&section_ids);
        tables.phases.retain(|p| p.id != id);
        Ok(true)
    }

    async fn apply_phase_order(&self, assignments: &[OrderAssignment]) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let ids: Vec<i64> = tables.phases.iter().map(|p| p.id).collect();
        check_batch(&ids, assignments)?;
        for a in assignments {
            if let Some(phase) = tables.phases.iter_mut().find(|p| p.id == a.id) {
                phase.phase_order = a.order;
            }
        }
        Ok(())
    }

    async fn list_sections(&self) -> Result<Vec<Section>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.sections.clone())
    }

    async fn list_sections_in_phase(&self, phase_id: i64) -> Result<Vec<Section>, AppError> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables.sections.iter().filter(|s| s.phase_id == phase_id).cloned(),
            |s| s.section_order,
        ))
    }

    async fn get_section(&self, id: i64) -> Result<Option<Section>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.sections.iter().find(|s| s.id == id).cloned())
    }

    async fn create_section(&self, section: NewSection) -> Result<Section, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.phases.iter().any(|p| p.id == section.phase_id) {
            return Err(AppError::NotFound("Phase not found".to_string()));
        }
        let section_order = next_order(
            tables
                .sections
                .iter()
                .filter(|s| s.phase_id == section.phase_id)
                .map(|s| s.section_order),
        );
        let section = Section {
            id: tables.allocate_id(),
            phase_id: section.phase_id,
            title: section.title,
            description: section.description,
            section_order,
        };
        tables.sections.push(section.clone());
        Ok(section)
    }

    async fn update_section(
        &self,
        id: i64,
        title: String,
        description: String,
    ) -> Result<Option<Section>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.sections.iter_mut().find(|s| s.id == id).map(|existing| {
            existing.title = title;
            existing.description = description;
            existing.clone()
        }))
    }

    async fn delete_section(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.sections.iter().any(|s| s.id == id) {
            return Ok(false);
        }
        tables.drop_sections(&[id]);
        Ok(true)
    }

    async fn apply_section_order(
        &self,
        phase_id: i64,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let ids: Vec<i64> = tables
            .sections
            .iter()
            .filter(|s| s.phase_id == phase_id)
            .map(|s| s.id)
            .collect();
        check_batch(&ids, assignments)?;
        for a in assignments {
            if let Some(section) = tables.sections.iter_mut().find(|s| s.id == a.id) {
                section.section_order = a.order;
            }
        }
        Ok(())
    }

    async fn list_modules(&self) -> Result<Vec<Module>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.modules.clone())
    }

    async fn list_modules_in_section(&self, section_id: i64) -> Result<Vec<Module>, AppError> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables.modules.iter().filter(|m| m.section_id == section_id).cloned(),
            |m| m.module_order,
        ))
    }

    async fn get_module(&self, id: i64) -> Result<Option<Module>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.modules.iter().find(|m| m.id == id).cloned())
    }

    async fn create_module(&self, module: NewModule) -> Result<Module, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.sections.iter().any(|s| s.id == module.section_id) {
            return Err(AppError::NotFound("Section not found".to_string()));
        }
        let module_order = next_order(
            tables
                .modules
                .iter()
                .filter(|m| m.section_id == module.section_id)
                .map(|m| m.module_order),
        );
        let module = Module {
            id: tables.allocate_id(),
            section_id: module.section_id,
            title: module.title,
            description: module.description,
            content: module.content,
            content_type: module.content_type,
            external_url: module.external_url,
            deadline: module.deadline,
            module_order,
            is_published: module.is_published,
        };
        tables.modules.push(module.clone());
        Ok(module)
    }

    async fn update_module_metadata(
        &self,
        id: i64,
        metadata: ModuleMetadata,
    ) -> Result<Option<Module>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.modules.iter_mut().find(|m| m.id == id).map(|existing| {
            existing.title = metadata.title;
            existing.description = metadata.description;
            existing.content_type = metadata.content_type;
            existing.external_url = metadata.external_url;
            existing.deadline = metadata.deadline;
            if let Some(is_published) = metadata.is_published {
                existing.is_published = is_published;
            }
            existing.clone()
        }))
    }

    async fn update_module_content(
        &self,
        id: i64,
        content: String,
    ) -> Result<Option<Module>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.modules.iter_mut().find(|m| m.id == id).map(|existing| {
            existing.content = content;
            existing.clone()
        }))
    }

    async fn delete_module(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.modules.iter().any(|m| m.id == id) {
            return Ok(false);
        }
        tables.drop_modules(&[id]);
        Ok(true)
    }

    async fn apply_module_order(
        &self,
        section_id: i64,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let ids: Vec<i64> = tables
            .modules
            .iter()
            .filter(|m| m.section_id == section_id)
            .map(|m| m.id)
            .collect();
        check_batch(&ids, assignments)?;
        for a in assignments {
            if let Some(module) = tables.modules.iter_mut().find(|m| m.id == a.id) {
                module.module_order = a.order;
            }
        }
        Ok(())
    }

    async fn get_progress(
        &self,
        user_id: i64,
        module_id: i64,
    ) -> Result<Option<ProgressRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .find(|r| r.user_id == user_id && r.module_id == module_id)
            .cloned())
    }

    async fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_completed_progress(&self) -> Result<Vec<ProgressRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.progress.iter().filter(|r| r.is_completed).cloned().collect())
    }

    async fn upsert_progress(&self, record: ProgressRecord) -> Result<ProgressRecord, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.modules.iter().any(|m| m.id == record.module_id) {
            return Err(AppError::NotFound("Module not found".to_string()));
        }
        let existing = tables
            .progress
            .iter()
            .position(|r| r.user_id == record.user_id && r.module_id == record.module_id);
        match existing {
            Some(index) => tables.progress[index] = record.clone(),
            None => tables.progress.push(record.clone()),
        }
        Ok(record)
    }

    async fn list_profiles_by_role(&self, role: Role) -> Result<Vec<Profile>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect())
    }
}
