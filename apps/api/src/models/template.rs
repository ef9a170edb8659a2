use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Professional,
    Creative,
    Modern,
}

impl FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(TemplateCategory::Professional),
            "creative" => Ok(TemplateCategory::Creative),
            "modern" => Ok(TemplateCategory::Modern),
            other => Err(format!(
                "metadata.category must be one of professional, creative, modern (got '{other}')"
            )),
        }
    }
}

/// Layout metadata, persisted as a single jsonb blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateMetadata {
    pub category: TemplateCategory,
    pub color: String,
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// A named, reusable CV layout in the global catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub metadata: TemplateMetadata,
    pub is_active: bool,
    pub is_premium: bool,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting a template. The id is assigned by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub metadata: TemplateMetadata,
    pub is_premium: bool,
    pub is_active: bool,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplatePatch {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<TemplateMetadata>,
    pub is_premium: Option<bool>,
    pub is_active: Option<bool>,
}

impl TemplatePatch {
    /// Merges the provided fields into `template`. Timestamps are the caller's concern.
    pub fn apply_to(&self, template: &mut Template) {
        if let Some(display_name) = &self.display_name {
            template.display_name = display_name.clone();
        }
        if let Some(description) = &self.description {
            template.description = description.clone();
        }
        if let Some(metadata) = &self.metadata {
            template.metadata = metadata.clone();
        }
        if let Some(is_premium) = self.is_premium {
            template.is_premium = is_premium;
        }
        if let Some(is_active) = self.is_active {
            template.is_active = is_active;
        }
    }
}
