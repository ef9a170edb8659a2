use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::{NewTemplate, Template, TemplateMetadata, TemplatePatch};
use crate::templates::store::{TemplateStore, NAME_CONFLICT_MESSAGE};

/// Column list for `templates` queries.
const COLUMNS: &str = "\
    id, name, display_name, description, metadata, is_active, is_premium, \
    usage_count, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    display_name: String,
    description: String,
    metadata: Json<TemplateMetadata>,
    is_active: bool,
    is_premium: bool,
    usage_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        Template {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            metadata: row.metadata.0,
            is_active: row.is_active,
            is_premium: row.is_premium,
            usage_count: row.usage_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed store. The `templates_name_key` unique constraint is what
/// makes concurrent creates with the same name safe.
#[derive(Clone)]
pub struct PgTemplateStore {
    pool: PgPool,
}

impl PgTemplateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PgTemplateStore {
    async fn insert(&self, id: Uuid, template: NewTemplate) -> Result<Template, AppError> {
        let query = format!(
            "INSERT INTO templates \
                 (id, name, display_name, description, metadata, is_active, is_premium) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(id)
            .bind(&template.name)
            .bind(&template.display_name)
            .bind(&template.description)
            .bind(Json(&template.metadata))
            .bind(template.is_active)
            .bind(template.is_premium)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::Conflict(NAME_CONFLICT_MESSAGE.to_string())
                }
                other => AppError::Database(other),
            })?;
        Ok(row.into())
    }

    async fn list_active(&self) -> Result<Vec<Template>, AppError> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE is_active = TRUE \
             ORDER BY usage_count DESC, created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, TemplateRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Template::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Template>, AppError> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Template::from))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Template>, AppError> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE name = $1");
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Template::from))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &TemplatePatch,
    ) -> Result<Option<Template>, AppError> {
        // COALESCE keeps the stored value for every field left out of the patch.
        let query = format!(
            "UPDATE templates SET \
                 display_name = COALESCE($2, display_name), \
                 description = COALESCE($3, description), \
                 metadata = COALESCE($4, metadata), \
                 is_premium = COALESCE($5, is_premium), \
                 is_active = COALESCE($6, is_active), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(id)
            .bind(patch.display_name.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.metadata.as_ref().map(Json))
            .bind(patch.is_premium)
            .bind(patch.is_active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Template::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_usage(&self, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE templates SET usage_count = usage_count + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::template::TemplateCategory;

    fn new_template(name: &str) -> NewTemplate {
        NewTemplate {
            name: name.to_string(),
            display_name: name.to_uppercase(),
            description: format!("{name} layout"),
            metadata: TemplateMetadata {
                category: TemplateCategory::Modern,
                color: "#0f766e".to_string(),
                preview: "Sidebar".to_string(),
                thumbnail: None,
                features: Some(vec!["Compact".to_string()]),
            },
            is_premium: false,
            is_active: true,
        }
    }

    async fn insert(store: &PgTemplateStore, name: &str) -> Template {
        store.insert(Uuid::new_v4(), new_template(name)).await.unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insert_round_trips_metadata(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let created = insert(&store, "two-column").await;
        assert_eq!(created.usage_count, 0);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        let by_name = store.get_by_name("two-column").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert!(store.get_by_name("missing").await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_insert_is_conflict(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let first = insert(&store, "professional").await;

        let err = store
            .insert(Uuid::new_v4(), new_template("professional"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == NAME_CONFLICT_MESSAGE));

        let active = store.list_active().await.unwrap();
        assert_eq!(active, vec![first]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_inserts_with_same_name_keep_one_row(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.insert(Uuid::new_v4(), new_template("race")).await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::Conflict(_)) => {}
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.list_active().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_increments_are_atomic(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let id = insert(&store, "busy").await.id;

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_usage(id).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.usage_count, 40);
        assert!(!store.increment_usage(Uuid::new_v4()).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_partial_update_keeps_untouched_columns(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let template = insert(&store, "editable").await;
        store.increment_usage(template.id).await.unwrap();
        let before = store.get(template.id).await.unwrap().unwrap();

        let patch = TemplatePatch {
            description: Some("x".to_string()),
            ..Default::default()
        };
        let after = store.update(template.id, &patch).await.unwrap().unwrap();

        assert_eq!(after.description, "x");
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.name, before.name);
        assert_eq!(after.display_name, before.display_name);
        assert_eq!(after.metadata, before.metadata);
        assert_eq!(after.usage_count, 1);
        assert_eq!(after.is_active, before.is_active);
        assert_eq!(after.is_premium, before.is_premium);
        assert_eq!(after.created_at, before.created_at);

        assert!(store
            .update(Uuid::new_v4(), &patch)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_active_orders_by_usage_and_hides_inactive(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let low = insert(&store, "low").await;
        let high = insert(&store, "high").await;
        let idle_a = insert(&store, "idle-a").await;
        let idle_b = insert(&store, "idle-b").await;
        let hidden = insert(&store, "hidden").await;

        for _ in 0..3 {
            store.increment_usage(high.id).await.unwrap();
        }
        store.increment_usage(low.id).await.unwrap();
        for _ in 0..5 {
            store.increment_usage(hidden.id).await.unwrap();
        }
        let deactivate = TemplatePatch {
            is_active: Some(false),
            ..Default::default()
        };
        store.update(hidden.id, &deactivate).await.unwrap();

        let active = store.list_active().await.unwrap();
        let ids: Vec<_> = active.iter().map(|t| t.id).collect();
        assert_eq!(&ids[..2], &[high.id, low.id]);
        assert_eq!(ids.len(), 4);
        assert!(ids.contains(&idle_a.id) && ids.contains(&idle_b.id));
        assert!(!ids.contains(&hidden.id));
        assert!(active[2].created_at <= active[3].created_at);

        // Still addressable by id.
        assert!(!store.get(hidden.id).await.unwrap().unwrap().is_active);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_reports_whether_a_row_was_removed(pool: PgPool) {
        let store = PgTemplateStore::new(pool);
        let template = insert(&store, "doomed").await;

        assert!(store.delete(template.id).await.unwrap());
        assert!(!store.delete(template.id).await.unwrap());
        assert!(store.get(template.id).await.unwrap().is_none());
    }
}
