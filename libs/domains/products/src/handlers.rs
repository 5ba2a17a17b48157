//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductsList};
use crate::pagination::SearchQuery;
use crate::service::ProductUseCase;

type SharedUseCase = Arc<dyn ProductUseCase>;

/// Products routes, meant to be nested under `/api/v1/products`.
pub fn router(use_case: SharedUseCase) -> Router {
    Router::new()
        .route("/", post(create_product))
        .route("/search", get(search_products))
        .route("/publish", post(publish_create))
        .route("/{id}", get(get_product).put(update_product))
        .route("/{id}/publish", put(publish_update))
        .with_state(use_case)
}

fn parse_id(raw: &str) -> ProductResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| ProductError::Validation(format!("invalid product id '{raw}': {e}")))
}

fn body(payload: Result<Json<Product>, JsonRejection>) -> ProductResult<Product> {
    payload
        .map(|Json(product)| product)
        .map_err(|e| ProductError::Validation(e.body_text()))
}

async fn create_product(
    State(use_case): State<SharedUseCase>,
    payload: Result<Json<Product>, JsonRejection>,
) -> ProductResult<impl IntoResponse> {
    let product = use_case.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// The id in the path wins over any id in the body.
async fn update_product(
    State(use_case): State<SharedUseCase>,
    Path(id): Path<String>,
    payload: Result<Json<Product>, JsonRejection>,
) -> ProductResult<Json<Product>> {
    let id = parse_id(&id)?;
    let product = Product {
        id,
        ..body(payload)?
    };
    Ok(Json(use_case.update(product).await?))
}

async fn get_product(
    State(use_case): State<SharedUseCase>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let id = parse_id(&id)?;
    Ok(Json(use_case.get_by_id(id).await?))
}

async fn search_products(
    State(use_case): State<SharedUseCase>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ProductResult<Json<ProductsList>> {
    let Query(query) = query.map_err(|e| ProductError::Validation(e.body_text()))?;
    let pagination = query.pagination()?;
    Ok(Json(use_case.search(&query.search, pagination).await?))
}

async fn publish_create(
    State(use_case): State<SharedUseCase>,
    payload: Result<Json<Product>, JsonRejection>,
) -> ProductResult<StatusCode> {
    use_case.publish_create(body(payload)?).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn publish_update(
    State(use_case): State<SharedUseCase>,
    Path(id): Path<String>,
    payload: Result<Json<Product>, JsonRejection>,
) -> ProductResult<StatusCode> {
    let id = parse_id(&id)?;
    let product = Product {
        id,
        ..body(payload)?
    };
    use_case.publish_update(product).await?;
    Ok(StatusCode::ACCEPTED)
}
