use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use domain::item::parse_tags;
use domain::{ItemFilter, ItemId, ItemUpdate, Upload};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppState, ItemView, UPLOADS_ROUTE};

use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Multipart field carrying the image file.
pub const IMAGE_FIELD: &str = "itemImage";

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_dir = state.config.public_dir.clone();
    let index = public_dir.join("index.html");

    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route(
            "/api/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/tags", get(list_tags))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config.uploads_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .fallback_service(ServeDir::new(public_dir).fallback(ServeFile::new(index)))
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct ListQuery {
    q: Option<String>,
    /// Comma-separated, every tag must match
    tags: Option<String>,
}

/// Unparseable ids can never name a stored item.
fn parse_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ItemView>>, ApiError> {
    let filter = ItemFilter::new(
        query.q,
        query.tags.as_deref().map(parse_tags).unwrap_or_default(),
    );

    let items = state
        .items
        .list(&filter)
        .await
        .map_err(|e| ApiError::from_domain(e, "Error loading items"))?;

    Ok(Json(items.into_iter().map(|i| state.view(i)).collect()))
}

async fn get_item(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemView>, ApiError> {
    let id = parse_id(&id)?;
    let item = state
        .items
        .get(id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Error loading item"))?;
    Ok(Json(state.view(item)))
}

async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let tags = state
        .items
        .tags()
        .await
        .map_err(|e| ApiError::from_domain(e, "Error loading tags"))?;
    Ok(Json(tags))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_item_form(multipart?).await?;

    let item = state
        .items
        .create(form.fields, form.upload)
        .await
        .map_err(|e| ApiError::from_domain(e, "Error adding item"))?;

    Ok((StatusCode::CREATED, Json(state.view(item))))
}

async fn update_item(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ItemView>, ApiError> {
    let id = parse_id(&id)?;
    let form = read_item_form(multipart?).await?;

    let item = state
        .items
        .update(id, form.fields, form.upload)
        .await
        .map_err(|e| ApiError::from_domain(e, "Error updating item"))?;

    Ok(Json(state.view(item)))
}

async fn delete_item(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state
        .items
        .delete(id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Error deleting item"))?;

    Ok(Json(json!({ "message": "Item deleted successfully" })))
}

/// Item fields and optional image read from a multipart body.
struct ItemForm {
    fields: ItemUpdate,
    upload: Option<Upload>,
}

async fn read_item_form(mut multipart: Multipart) -> Result<ItemForm, ApiError> {
    let mut title = None;
    let mut description = None;
    let mut tags = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            Some("tags") => tags = Some(field.text().await?),
            Some(IMAGE_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                upload = Some(Upload::new(file_name, bytes));
            }
            other => debug!(field = ?other, "Ignoring unknown form field"),
        }
    }

    Ok(ItemForm {
        fields: ItemUpdate::from_form(title, description, tags),
        upload,
    })
}
