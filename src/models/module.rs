// src/models/module.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{config::DEFAULT_MODULE_CONTENT, curriculum::validation::not_blank};

/// How a module's body should be interpreted by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "module_content_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    #[default]
    Markdown,
    ExternalLink,
    Attachment,
}

/// Represents the 'modules' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,

    /// Owning section. Deleting the section deletes the module.
    pub section_id: i64,

    pub title: String,
    pub description: String,

    /// Free-text body; empty for pure external links.
    pub content: String,

    pub content_type: ContentType,

    /// Required for `external_link`, an optional resource link otherwise.
    pub external_url: Option<String>,

    pub deadline: Option<DateTime<Utc>>,

    /// 1-based display position within the section.
    pub module_order: i32,

    /// Unpublished modules are visible to instructors only.
    pub is_published: bool,
}

/// DTO for creating a module inside a section.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    pub content_type: ContentType,
    pub external_url: Option<String>,
    /// Defaults to a starter document, or empty for external links.
    #[validate(length(max = 200000))]
    pub content: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

/// DTO for the metadata editor. Replaces every metadata field;
/// `is_published` is left untouched when omitted.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub content_type: ContentType,
    pub external_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

/// DTO for the content editor.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContentRequest {
    #[validate(length(max = 200000))]
    pub content: String,
}

/// Normalized module fields handed to the store on insert.
#[derive(Debug, Clone)]
pub struct NewModule {
    pub section_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub content_type: ContentType,
    pub external_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_published: bool,
}

/// Normalized metadata handed to the store on update.
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub external_url: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
}

/// Blank or whitespace-only URLs are treated as absent.
pub fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

impl CreateModuleRequest {
    pub fn into_new(self, section_id: i64) -> NewModule {
        let content = self.content.unwrap_or_else(|| match self.content_type {
            ContentType::ExternalLink => String::new(),
            _ => DEFAULT_MODULE_CONTENT.to_string(),
        });

        NewModule {
            section_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            content,
            content_type: self.content_type,
            external_url: normalize_url(self.external_url),
            deadline: self.deadline,
            is_published: self.is_published.unwrap_or(true),
        }
    }
}

impl From<UpdateModuleRequest> for ModuleMetadata {
    fn from(payload: UpdateModuleRequest) -> Self {
        Self {
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            content_type: payload.content_type,
            external_url: normalize_url(payload.external_url),
            deadline: payload.deadline,
            is_published: payload.is_published,
        }
    }
}
