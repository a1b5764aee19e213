//! OpenAPI document for the recipebox API, served as JSON.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use super::AppContext;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "recipebox API",
        version = "0.1.0",
        description = "Recipe catalog with relational recipes and document-stored image metadata",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes_recipes::create_recipe,
        super::routes_recipes::list_recipes,
        super::routes_recipes::get_recipe,
        super::routes_recipes::upload_image,
        super::routes_categories::create_category,
        super::routes_categories::list_categories,
    ),
    components(
        schemas(
            recipebox_db::models::RecipeSummary,
            recipebox_db::models::RecipeDetail,
            recipebox_db::models::Ingredient,
            recipebox_db::models::Step,
            recipebox_db::models::Category,
            recipebox_db::models::NewRecipe,
            recipebox_db::models::NewIngredient,
            recipebox_db::models::NewStep,
            recipebox_db::models::CategoryRef,
            recipebox_db::models::NewCategory,
            crate::catalog::UploadedImage,
            super::routes_recipes::UploadForm,
        )
    ),
    tags(
        (name = "recipes", description = "Recipes and their images"),
        (name = "categories", description = "Recipe categories"),
    )
)]
pub struct ApiDoc;

pub fn openapi_routes() -> Router<AppContext> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/v1/recipes"));
        assert!(paths.iter().any(|p| *p == "/api/v1/recipes/{id}/upload"));
        assert!(paths.iter().any(|p| *p == "/api/v1/categories"));
    }
}
