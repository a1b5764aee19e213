//! Recipe routes: create, list, get, and image upload.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use recipebox_common::{Error, RecipeId};
use recipebox_db::models::{NewRecipe, RecipeDetail, RecipeSummary};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::error::{multipart_error, AppError};
use super::AppContext;
use crate::catalog::{RecipeView, UploadedImage};
use crate::images::ByteStream;

/// Name of the multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// Headroom above `uploads.max_bytes` for multipart framing.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn recipe_routes(max_upload_bytes: u64) -> Router<AppContext> {
    let body_limit = usize::try_from(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/recipes", post(create_recipe).get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
        .route(
            "/recipes/:id/upload",
            post(upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecipesQuery {
    /// Exact, case-sensitive category name
    pub category: Option<String>,
}

/// Multipart body accepted by the upload route.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// POST /api/v1/recipes
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    tag = "recipes",
    request_body = NewRecipe,
    responses(
        (status = 201, description = "Recipe created", body = RecipeDetail),
        (status = 400, description = "Invalid body or unknown category"),
    )
)]
pub async fn create_recipe(
    State(ctx): State<AppContext>,
    payload: Result<Json<NewRecipe>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(new) = payload?;
    let recipe = ctx.service.create_recipe(new).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// GET /api/v1/recipes
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    tag = "recipes",
    params(ListRecipesQuery),
    responses(
        (status = 200, description = "Recipe summaries, each with `image_path` when an image exists", body = Vec<RecipeSummary>)
    )
)]
pub async fn list_recipes(
    State(ctx): State<AppContext>,
    query: Result<Query<ListRecipesQuery>, QueryRejection>,
) -> Result<Json<Vec<RecipeView<RecipeSummary>>>, AppError> {
    let Query(query) = query?;
    let recipes = ctx
        .service
        .list_with_images(query.category.as_deref())
        .await?;
    Ok(Json(recipes))
}

/// GET /api/v1/recipes/:id
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe with ingredients, steps, categories and `image_path` when an image exists", body = RecipeDetail),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Recipe not found"),
    )
)]
pub async fn get_recipe(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<RecipeView<RecipeDetail>>, AppError> {
    let id: RecipeId = id.parse()?;
    let recipe = ctx.service.get_with_image(id).await?;
    Ok(Json(recipe))
}

/// POST /api/v1/recipes/:id/upload
///
/// Streams the `image` field of a multipart body to the blob store. Other
/// fields are skipped.
#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/upload",
    tag = "recipes",
    params(("id" = i64, Path, description = "Recipe ID")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadedImage),
        (status = 400, description = "Malformed ID or missing file"),
        (status = 413, description = "File exceeds the upload limit"),
    )
)]
pub async fn upload_image(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart?;
    let limit = ctx.config.uploads.max_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data: ByteStream<'_> =
            Box::pin(field.map(move |chunk| chunk.map_err(|e| multipart_error(e, limit))));

        let uploaded = ctx.service.upload_image(&id, data, &filename).await?;
        return Ok((StatusCode::CREATED, Json(uploaded)));
    }

    Err(Error::validation(format!("Missing multipart file field {IMAGE_FIELD:?}")).into())
}
