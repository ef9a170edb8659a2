//! Template catalog: the global, shared namespace of CV layouts.
//!
//! All domain rules live here (name uniqueness, not-found reporting, the
//! silent usage no-op, idempotent seeding); the store only persists.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::{NewTemplate, Template, TemplatePatch};
use crate::templates::seed::default_templates;
use crate::templates::store::{TemplateStore, NAME_CONFLICT_MESSAGE};

/// Outcome of a seeding pass, by template name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Clone)]
pub struct TemplateCatalog {
    store: Arc<dyn TemplateStore>,
}

impl TemplateCatalog {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Creates a template after checking the name is free.
    /// The store's own uniqueness check still catches a concurrent create.
    pub async fn create(&self, input: NewTemplate) -> Result<Template, AppError> {
        if self.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(NAME_CONFLICT_MESSAGE.to_string()));
        }

        let template = self.store.insert(Uuid::new_v4(), input).await?;
        info!(
            template_id = %template.id,
            template_name = %template.name,
            "Template created"
        );
        Ok(template)
    }

    /// Active templates, most used first; oldest first among equal usage.
    pub async fn find_all(&self) -> Result<Vec<Template>, AppError> {
        self.store.list_active().await
    }

    /// Looks up by id regardless of `is_active`.
    pub async fn find_one(&self, id: Uuid) -> Result<Template, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Template>, AppError> {
        self.store.get_by_name(name).await
    }

    pub async fn update(&self, id: Uuid, patch: TemplatePatch) -> Result<Template, AppError> {
        self.find_one(id).await?;

        let template = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))?;
        info!(template_id = %id, template_name = %template.name, "Template updated");
        Ok(template)
    }

    /// Permanently deletes the template.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let template = self.find_one(id).await?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Template {id} not found")));
        }
        info!(template_id = %id, template_name = %template.name, "Template removed");
        Ok(())
    }

    /// Records one render/export with the named template.
    /// Unknown names are ignored so a deleted template never fails an export.
    pub async fn increment_usage(&self, name: &str) -> Result<(), AppError> {
        let Some(template) = self.find_by_name(name).await? else {
            debug!(template_name = name, "Usage increment skipped: no such template");
            return Ok(());
        };

        if self.store.increment_usage(template.id).await? {
            debug!(template_name = name, "Template usage incremented");
        } else {
            debug!(template_name = name, "Usage increment skipped: template removed concurrently");
        }
        Ok(())
    }

    /// Creates each canonical template that does not exist yet.
    /// Existing templates are never touched, so this is safe on every startup.
    pub async fn seed_default_templates(&self) -> Result<SeedReport, AppError> {
        let mut report = SeedReport::default();

        for template in default_templates() {
            let name = template.name.clone();
            if self.find_by_name(&name).await?.is_some() {
                report.skipped.push(name);
                continue;
            }
            match self.store.insert(Uuid::new_v4(), template).await {
                Ok(_) => report.created.push(name),
                // Another seeder got there first.
                Err(AppError::Conflict(_)) => report.skipped.push(name),
                Err(e) => return Err(e),
            }
        }

        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            "Default templates seeded"
        );
        Ok(report)
    }
}
