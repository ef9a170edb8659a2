//! Persistence seam for the template catalog.
//!
//! `AppState` carries the catalog, which holds an `Arc<dyn TemplateStore>`
//! chosen at startup (`PgTemplateStore` or `InMemoryTemplateStore`).
//! Implementations own atomicity: `insert` must enforce name uniqueness itself
//! and `increment_usage` must never lose concurrent updates.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::{NewTemplate, Template, TemplatePatch};

/// Message returned whenever a name is already taken.
pub const NAME_CONFLICT_MESSAGE: &str = "Template with this name already exists";

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Inserts a new row with `usage_count = 0`.
    /// Fails with `AppError::Conflict` if the name is already taken.
    async fn insert(&self, id: Uuid, template: NewTemplate) -> Result<Template, AppError>;

    /// Active templates, most used first, oldest first among ties.
    async fn list_active(&self) -> Result<Vec<Template>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Template>, AppError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Template>, AppError>;

    /// Merges the patch and refreshes `updated_at`. `None` if the row is gone.
    async fn update(&self, id: Uuid, patch: &TemplatePatch)
        -> Result<Option<Template>, AppError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Atomically adds one to `usage_count`. Returns `false` if the row is gone.
    async fn increment_usage(&self, id: Uuid) -> Result<bool, AppError>;
}
