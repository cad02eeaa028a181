//! HTTP handlers for the books resource.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use shelf_http::error::AppError;

use super::models::{BookListResponse, BookResponse, DeletedResponse};
use super::service::BookService;

type Service = State<Arc<BookService>>;

/// Routes relative to the module mount point (`/books`)
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn create_book(
    State(service): Service,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(payload) = payload?;
    let book = service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

async fn list_books(State(service): Service) -> Result<Json<BookListResponse>, AppError> {
    let books = service.list().await?;
    Ok(Json(BookListResponse { books }))
}

async fn get_book(
    State(service): Service,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.get(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

async fn update_book(
    State(service): Service,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Json(payload) = payload?;
    let book = service.update(&isbn, &payload).await?;
    Ok(Json(BookResponse { book }))
}

async fn delete_book(
    State(service): Service,
    Path(isbn): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    service.delete(&isbn).await?;
    Ok(Json(DeletedResponse::new()))
}
