// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;

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
    store::CurriculumStore,
};

const PHASE_COLUMNS: &str = "id, title, description, phase_order";
const SECTION_COLUMNS: &str = "id, phase_id, title, description, section_order";
const MODULE_COLUMNS: &str = "id, section_id, title, description, content, content_type, \
                              external_url, deadline, module_order, is_published";
const PROGRESS_COLUMNS: &str = "user_id, module_id, is_completed, completed_at";

/// Postgres-backed store. Relies on the `ON DELETE CASCADE` foreign keys from
/// `migrations/` for deletes and on transactions for order batches.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs one order batch inside a transaction.
    ///
    /// `update_sql` takes the ids as `$1`, the new orders as `$2` and, when
    /// `parent_id` is given, the parent as `$3`. If any id falls outside the
    /// parent the whole batch is rolled back.
    async fn apply_order(
        &self,
        update_sql: &str,
        parent_id: Option<i64>,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError> {
        if assignments.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
        let orders: Vec<i32> = assignments.iter().map(|a| a.order).collect();

        let mut tx = self.pool.begin().await?;

        let mut query = sqlx::query(update_sql).bind(ids).bind(orders);
        if let Some(parent_id) = parent_id {
            query = query.bind(parent_id);
        }

        let result = query.execute(&mut *tx).await.map_err(|e| {
            tracing::error!("Failed to apply order batch: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() != assignments.len() as u64 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "Order batch does not match the stored sibling list".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CurriculumStore for PgStore {
    async fn list_phases(&self) -> Result<Vec<Phase>, AppError> {
        let sql = format!("SELECT {PHASE_COLUMNS} FROM phases ORDER BY phase_order, id");
        let phases = sqlx::query_as::<_, Phase>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list phases: {:?}", e);
                AppError::from(e)
            })?;
        Ok(phases)
    }

    async fn get_phase(&self, id: i64) -> Result<Option<Phase>, AppError> {
        let sql = format!("SELECT {PHASE_COLUMNS} FROM phases WHERE id = $1");
        Ok(sqlx::query_as::<_, Phase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_phase(&self, phase: NewPhase) -> Result<Phase, AppError> {
        let sql = format!(
            r#"
            INSERT INTO phases (title, description, phase_order)
            VALUES ($1, $2, (SELECT COALESCE(MAX(phase_order), 0) + 1 FROM phases))
            RETURNING {PHASE_COLUMNS}
            "#
        );
        let phase = sqlx::query_as::<_, Phase>(&sql)
            .bind(phase.title)
            .bind(phase.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create phase: {:?}", e);
                AppError::from(e)
            })?;
        Ok(phase)
    }

    async fn update_phase(&self, id: i64, phase: NewPhase) -> Result<Option<Phase>, AppError> {
        let sql = format!(
            "UPDATE phases SET title = $1, description = $2 WHERE id = $3 RETURNING {PHASE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Phase>(&sql)
            .bind(phase.title)
            .bind(phase.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_phase(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM phases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete phase: {:?}", e);
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_phase_order(&self, assignments: &[OrderAssignment]) -> Result<(), AppError> {
        self.apply_order(
            r#"
            UPDATE phases AS p SET phase_order = v.new_order
            FROM UNNEST($1::BIGINT[], $2::INT[]) AS v(id, new_order)
            WHERE p.id = v.id
            "#,
            None,
            assignments,
        )
        .await
    }

    async fn list_sections(&self) -> Result<Vec<Section>, AppError> {
        let sql = format!("SELECT {SECTION_COLUMNS} FROM sections ORDER BY phase_id, section_order, id");
        Ok(sqlx::query_as::<_, Section>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_sections_in_phase(&self, phase_id: i64) -> Result<Vec<Section>, AppError> {
        let sql = format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE phase_id = $1 ORDER BY section_order, id"
        );
        Ok(sqlx::query_as::<_, Section>(&sql)
            .bind(phase_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_section(&self, id: i64) -> Result<Option<Section>, AppError> {
        let sql = format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1");
        Ok(sqlx::query_as::<_, Section>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_section(&self, section: NewSection) -> Result<Section, AppError> {
        let sql = format!(
            r#"
            INSERT INTO sections (phase_id, title, description, section_order)
            VALUES (
                $1, $2, $3,
                (SELECT COALESCE(MAX(section_order), 0) + 1 FROM sections WHERE phase_id = $1)
            )
            RETURNING {SECTION_COLUMNS}
            "#
        );
        let section = sqlx::query_as::<_, Section>(&sql)
            .bind(section.phase_id)
            .bind(section.title)
            .bind(section.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create section: {:?}", e);
                AppError::from(e)
            })?;
        Ok(section)
    }

    async fn update_section(
        &self,
        id: i64,
        title: String,
        description: String,
    ) -> Result<Option<Section>, AppError> {
        let sql = format!(
            "UPDATE sections SET title = $1, description = $2 WHERE id = $3 RETURNING {SECTION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Section>(&sql)
            .bind(title)
            .bind(description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_section(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete section: {:?}", e);
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_section_order(
        &self,
        phase_id: i64,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError> {
        self.apply_order(
            r#"
            UPDATE sections AS s SET section_order = v.new_order
            FROM UNNEST($1::BIGINT[], $2::INT[]) AS v(id, new_order)
            WHERE s.id = v.id AND s.phase_id = $3
            "#,
            Some(phase_id),
            assignments,
        )
        .await
    }

    async fn list_modules(&self) -> Result<Vec<Module>, AppError> {
        let sql = format!("SELECT {MODULE_COLUMNS} FROM modules ORDER BY section_id, module_order, id");
        Ok(sqlx::query_as::<_, Module>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_modules_in_section(&self, section_id: i64) -> Result<Vec<Module>, AppError> {
        let sql = format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE section_id = $1 ORDER BY module_order, id"
        );
        Ok(sqlx::query_as::<_, Module>(&sql)
            .bind(section_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_module(&self, id: i64) -> Result<Option<Module>, AppError> {
        let sql = format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1");
        Ok(sqlx::query_as::<_, Module>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_module(&self, module: NewModule) -> Result<Module, AppError> {
        let sql = format!(
            r#"
            INSERT INTO modules
            (section_id, title, description, content, content_type, external_url, deadline,
             is_published, module_order)
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                (SELECT COALESCE(MAX(module_order), 0) + 1 FROM modules WHERE section_id = $1)
            )
            RETURNING {MODULE_COLUMNS}
            "#
        );
        let module = sqlx::query_as::<_, Module>(&sql)
            .bind(module.section_id)
            .bind(module.title)
            .bind(module.description)
            .bind(module.content)
            .bind(module.content_type)
            .bind(module.external_url)
            .bind(module.deadline)
            .bind(module.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create module: {:?}", e);
                AppError::from(e)
            })?;
        Ok(module)
    }

    async fn update_module_metadata(
        &self,
        id: i64,
        metadata: ModuleMetadata,
    ) -> Result<Option<Module>, AppError> {
        let sql = format!(
            r#"
            UPDATE modules SET
                title = $1,
                description = $2,
                content_type = $3,
                external_url = $4,
                deadline = $5,
                is_published = COALESCE($6, is_published)
            WHERE id = $7
            RETURNING {MODULE_COLUMNS}
            "#
        );
        let module = sqlx::query_as::<_, Module>(&sql)
            .bind(metadata.title)
            .bind(metadata.description)
            .bind(metadata.content_type)
            .bind(metadata.external_url)
            .bind(metadata.deadline)
            .bind(metadata.is_published)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update module {}: {:?}", id, e);
                AppError::from(e)
            })?;
        Ok(module)
    }

    async fn update_module_content(
        &self,
        id: i64,
        content: String,
    ) -> Result<Option<Module>, AppError> {
        let sql = format!("UPDATE modules SET content = $1 WHERE id = $2 RETURNING {MODULE_COLUMNS}");
        Ok(sqlx::query_as::<_, Module>(&sql)
            .bind(content)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_module(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete module: {:?}", e);
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_module_order(
        &self,
        section_id: i64,
        assignments: &[OrderAssignment],
    ) -> Result<(), AppError> {
        self.apply_order(
            r#"
            UPDATE modules AS m SET module_order = v.new_order
            FROM UNNEST($1::BIGINT[], $2::INT[]) AS v(id, new_order)
            WHERE m.id = v.id AND m.section_id = $3
            "#,
            Some(section_id),
            assignments,
        )
        .await
    }

    async fn get_progress(
        &self,
        user_id: i64,
        module_id: i64,
    ) -> Result<Option<ProgressRecord>, AppError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM module_progress WHERE user_id = $1 AND module_id = $2"
        );
        Ok(sqlx::query_as::<_, ProgressRecord>(&sql)
            .bind(user_id)
            .bind(module_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_progress_for_user(&self, user_id: i64) -> Result<Vec<ProgressRecord>, AppError> {
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM module_progress WHERE user_id = $1");
        Ok(sqlx::query_as::<_, ProgressRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_completed_progress(&self) -> Result<Vec<ProgressRecord>, AppError> {
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM module_progress WHERE is_completed");
        Ok(sqlx::query_as::<_, ProgressRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn upsert_progress(&self, record: ProgressRecord) -> Result<ProgressRecord, AppError> {
        let sql = format!(
            r#"
            INSERT INTO module_progress (user_id, module_id, is_completed, completed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, module_id) DO UPDATE SET
                is_completed = EXCLUDED.is_completed,
                completed_at = EXCLUDED.completed_at
            RETURNING {PROGRESS_COLUMNS}
            "#
        );
        let record = sqlx::query_as::<_, ProgressRecord>(&sql)
            .bind(record.user_id)
            .bind(record.module_id)
            .bind(record.is_completed)
            .bind(record.completed_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert progress: {:?}", e);
                AppError::from(e)
            })?;
        Ok(record)
    }

    async fn list_profiles_by_role(&self, role: Role) -> Result<Vec<Profile>, AppError> {
        Ok(sqlx::query_as::<_, Profile>(
            "SELECT user_id, full_name, email, role FROM profiles WHERE role = $1 ORDER BY user_id",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?)
    }
}
