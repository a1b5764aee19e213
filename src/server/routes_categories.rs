//! Category routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use recipebox_db::models::{Category, NewCategory};

use super::error::AppError;
use super::AppContext;

pub fn category_routes() -> Router<AppContext> {
    Router::new().route("/categories", post(create_category).get(list_categories))
}

/// POST /api/v1/categories
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Blank name"),
        (status = 409, description = "A category with this name exists"),
    )
)]
pub async fn create_category(
    State(ctx): State<AppContext>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new) = payload?;
    let category = ctx.service.create_category(&new.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories in creation order", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(ctx.service.list_categories().await?))
}
