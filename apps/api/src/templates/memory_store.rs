use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::{NewTemplate, Template, TemplatePatch};
use crate::templates::store::{TemplateStore, NAME_CONFLICT_MESSAGE};

struct Entry {
    /// Insertion sequence; breaks `created_at` ties in listing order.
    seq: u64,
    template: Template,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    by_id: HashMap<Uuid, Entry>,
}

/// Process-local store for development runs and tests.
/// Every operation holds the lock for its whole check-and-write, so name
/// uniqueness and usage increments are atomic.
#[derive(Default)]
pub struct InMemoryTemplateStore {
    inner: RwLock<Inner>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn insert(&self, id: Uuid, template: NewTemplate) -> Result<Template, AppError> {
        let mut inner = self.inner.write().await;
        if inner
            .by_id
            .values()
            .any(|e| e.template.name == template.name)
        {
            return Err(AppError::Conflict(NAME_CONFLICT_MESSAGE.to_string()));
        }

        let now = Utc::now();
        let created = Template {
            id,
            name: template.name,
            display_name: template.display_name,
            description: template.description,
            metadata: template.metadata,
            is_active: template.is_active,
            is_premium: template.is_premium,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.by_id.insert(
            created.id,
            Entry {
                seq,
                template: created.clone(),
            },
        );
        Ok(created)
    }

    async fn list_active(&self) -> Result<Vec<Template>, AppError> {
        let inner = self.inner.read().await;
        let mut active: Vec<&Entry> = inner
            .by_id
            .values()
            .filter(|e| e.template.is_active)
            .collect();
        active.sort_by(|a, b| {
            b.template
                .usage_count
                .cmp(&a.template.usage_count)
                .then(a.template.created_at.cmp(&b.template.created_at))
                .then(a.seq.cmp(&b.seq))
        });
        Ok(active.into_iter().map(|e| e.template.clone()).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Template>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.by_id.get(&id).map(|e| e.template.clone()))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Template>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_id
            .values()
            .find(|e| e.template.name == name)
            .map(|e| e.template.clone()))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &TemplatePatch,
    ) -> Result<Option<Template>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.by_id.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(&mut entry.template);
        entry.template.updated_at = Utc::now();
        Ok(Some(entry.template.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.by_id.remove(&id).is_some())
    }

    async fn increment_usage(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        match inner.by_id.get_mut(&id) {
            Some(entry) => {
                entry.template.usage_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
