//! Request bodies for the template endpoints and their boundary validation.
//!
//! Every field arrives optional so that a missing field produces a
//! `VALIDATION_ERROR` listing all problems at once instead of a serde rejection.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::template::{NewTemplate, TemplateCategory, TemplateMetadata, TemplatePatch};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataInput {
    pub category: Option<String>,
    pub color: Option<String>,
    pub preview: Option<String>,
    pub thumbnail: Option<String>,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<MetadataInput>,
    pub is_premium: Option<bool>,
    pub is_active: Option<bool>,
}

/// `name` is immutable, so it is rejected along with any other unknown field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTemplateRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<MetadataInput>,
    pub is_premium: Option<bool>,
    pub is_active: Option<bool>,
}

/// Names travel as a single path segment in `POST /templates/usage/:name`.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains('/')
}

fn require_text(field: &str, value: Option<String>, errors: &mut Vec<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) => {
            errors.push(format!("{field} must not be empty"));
            String::new()
        }
        None => {
            errors.push(format!("{field} is required"));
            String::new()
        }
    }
}

fn optional_text(field: &str, value: Option<String>, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            errors.push(format!("{field} must not be empty"));
            None
        }
        other => other,
    }
}

fn validate_metadata(input: MetadataInput, errors: &mut Vec<String>) -> Option<TemplateMetadata> {
    let before = errors.len();

    let category = match input.category.as_deref().map(str::trim) {
        Some("") | None => {
            errors.push("metadata.category is required".to_string());
            None
        }
        Some(raw) => match raw.parse::<TemplateCategory>() {
            Ok(c) => Some(c),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };
    let color = require_text("metadata.color", input.color, errors);
    let preview = require_text("metadata.preview", input.preview, errors);
    let thumbnail = optional_text("metadata.thumbnail", input.thumbnail, errors);
    if let Some(features) = &input.features {
        if features.iter().any(|f| f.trim().is_empty()) {
            errors.push("metadata.features must not contain empty entries".to_string());
        }
    }

    if errors.len() > before {
        return None;
    }
    category.map(|category| TemplateMetadata {
        category,
        color,
        preview,
        thumbnail,
        features: input.features,
    })
}

fn finish<T>(value: T, errors: Vec<String>) -> Result<T, AppError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

impl CreateTemplateRequest {
    pub fn validate(self) -> Result<NewTemplate, AppError> {
        let mut errors = Vec::new();

        let name = require_text("name", self.name, &mut errors);
        if !name.is_empty() && !is_valid_name(&name) {
            errors.push("name must not contain '/'".to_string());
        }
        let display_name = require_text("displayName", self.display_name, &mut errors);
        let description = require_text("description", self.description, &mut errors);
        let metadata = match self.metadata {
            Some(m) => validate_metadata(m, &mut errors),
            None => {
                errors.push("metadata is required".to_string());
                None
            }
        };

        match metadata {
            Some(metadata) => finish(
                NewTemplate {
                    name,
                    display_name,
                    description,
                    metadata,
                    is_premium: self.is_premium.unwrap_or(false),
                    is_active: self.is_active.unwrap_or(true),
                },
                errors,
            ),
            None => Err(AppError::Validation(errors.join("; "))),
        }
    }
}

impl UpdateTemplateRequest {
    pub fn validate(self) -> Result<TemplatePatch, AppError> {
        let mut errors = Vec::new();

        let display_name = optional_text("displayName", self.display_name, &mut errors);
        let description = optional_text("description", self.description, &mut errors);
        let metadata = self.metadata.and_then(|m| validate_metadata(m, &mut errors));

        finish(
            TemplatePatch {
                display_name,
                description,
                metadata,
                is_premium: self.is_premium,
                is_active: self.is_active,
            },
            errors,
        )
    }
}
