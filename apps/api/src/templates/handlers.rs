use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::template::Template;
use crate::state::AppState;
use crate::templates::validation::{CreateTemplateRequest, UpdateTemplateRequest};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Ids that are not UUIDs cannot belong to any template.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Template {raw} not found")))
}

/// GET /templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(state.catalog.find_all().await?))
}

/// GET /templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.find_one(id).await?))
}

/// POST /templates
pub async fn handle_create_template(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateTemplateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Template>), AppError> {
    let Json(req) = payload?;
    let template = state.catalog.create(req.validate()?).await?;
    info!(template_id = %template.id, subject = %user.subject, "Create request served");
    Ok((StatusCode::CREATED, Json(template)))
}

/// PUT /templates/:id
pub async fn handle_update_template(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTemplateRequest>, JsonRejection>,
) -> Result<Json<Template>, AppError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let template = state.catalog.update(id, req.validate()?).await?;
    info!(template_id = %id, subject = %user.subject, "Update request served");
    Ok(Json(template))
}

/// DELETE /templates/:id
pub async fn handle_delete_template(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    state.catalog.remove(id).await?;
    info!(template_id = %id, subject = %user.subject, "Delete request served");
    Ok(Json(MessageResponse {
        message: "Template deleted successfully".to_string(),
    }))
}

/// POST /templates/usage/:name
///
/// Called by render/export flows. Unknown names still answer 204.
pub async fn handle_record_usage(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.catalog.increment_usage(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /templates/seed
pub async fn handle_seed_templates(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.catalog.seed_default_templates().await?;
    Ok(Json(MessageResponse {
        message: "Default templates seeded successfully".to_string(),
    }))
}
