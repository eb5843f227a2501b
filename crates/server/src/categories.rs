//! Categories API endpoints.

use api_types::{
    ApiResponse,
    category::{CategoryInput, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use engine::Session;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
    }
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<Json<ApiResponse<CategoryView>>, ServerError> {
    let Json(payload) = payload?;
    let category = state
        .engine
        .create_category(session.user_id, &payload.name)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Category created successfully",
        map_category(category),
    )))
}

pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<CategoryView>>>, ServerError> {
    let categories: Vec<CategoryView> = state
        .engine
        .list_categories(session.user_id)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    let message = if categories.is_empty() {
        "No categories found"
    } else {
        "Categories retrieved successfully"
    };
    Ok(Json(ApiResponse::ok(message, categories)))
}

pub async fn update(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    category_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<Json<ApiResponse<CategoryView>>, ServerError> {
    let Path(category_id) = category_id?;
    let Json(payload) = payload?;
    let category = state
        .engine
        .update_category(session.user_id, category_id, &payload.name)
        .await?;
    Ok(Json(ApiResponse::ok(
        "Category updated successfully",
        map_category(category),
    )))
}

pub async fn delete(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    category_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    let Path(category_id) = category_id?;
    let category = state
        .engine
        .delete_category(session.user_id, category_id)
        .await?;
    Ok(Json(ApiResponse::done(format!(
        "Category {} was deleted successfully",
        category.name
    ))))
}
