// src/curriculum/validation.rs

use url::Url;
use validator::ValidationError;

use crate::{error::AppError, models::module::ContentType};

/// Checks the content-type / URL pairing of a module.
///
/// `external_link` modules need a URL; any URL that is supplied must parse as
/// an absolute http(s) URL. Expects `external_url` to be normalized already.
pub fn validate_module_content(
    content_type: ContentType,
    external_url: Option<&str>,
) -> Result<(), AppError> {
    match (content_type, external_url) {
        (ContentType::ExternalLink, None) => Err(AppError::BadRequest(
            "External link modules require an external_url".to_string(),
        )),
        (_, Some(url)) => validate_url(url),
        (_, None) => Ok(()),
    }
}

fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url)
        .map_err(|e| AppError::BadRequest(format!("Invalid external_url '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::BadRequest(format!(
            "Unsupported external_url scheme '{}'",
            other
        ))),
    }
}

/// `validator` hook for titles: whitespace-only input counts as missing.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Title must not be blank".into()));
    }
    Ok(())
}

/// The operator must retype the exact title before a delete goes through.
/// Surrounding whitespace in the typed text is ignored.
pub fn is_deletion_confirmed(expected_title: &str, typed: &str) -> bool {
    !expected_title.is_empty() && typed.trim() == expected_title
}

/// Gate for destructive routes; nothing is written when this fails.
pub fn require_confirmation(kind: &str, expected_title: &str, typed: &str) -> Result<(), AppError> {
    if is_deletion_confirmed(expected_title, typed) {
        Ok(())
    } else {
        Err(AppError::PreconditionFailed(format!(
            "Type the exact {} title to confirm deletion",
            kind
        )))
    }
}
