//! Book collection endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookPayload, BookQuery, BookSummary},
        response::{MessageResponse, ResponseStatus},
    },
    AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookIdData {
    #[serde(rename = "bookId")]
    pub book_id: String,
}

/// Body returned after a book is created
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookCreatedResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub data: BookIdData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookListData {
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookListResponse {
    pub status: ResponseStatus,
    pub data: BookListData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookDetailResponse {
    pub status: ResponseStatus,
    pub data: BookData,
}

/// Add a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookCreatedResponse),
        (status = 400, description = "Missing name or readPage above pageCount", body = MessageResponse),
        (status = 500, description = "Book could not be stored", body = MessageResponse)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookCreatedResponse>)> {
    let Json(payload) = payload?;
    let book_id = state.services.books.add_book(payload)?;

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            status: ResponseStatus::Success,
            message: "Buku berhasil ditambahkan".to_string(),
            data: BookIdData { book_id },
        }),
    ))
}

/// List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books (id, name, publisher)", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> AppResult<Json<BookListResponse>> {
    let books = match query {
        Ok(Query(query)) => state.services.books.list_books(&query)?,
        // A repeated filter key has no single value to compare, so nothing matches
        Err(rejection) => {
            tracing::debug!("Book list: unusable query, no matches: {}", rejection.body_text());
            Vec::new()
        }
    };

    Ok(Json(BookListResponse {
        status: ResponseStatus::Success,
        data: BookListData { books },
    }))
}

/// Get book details by id
#[utoipa::path(
    get,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetailResponse),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<BookDetailResponse>> {
    let book = state.services.books.get_book(&book_id)?;

    Ok(Json(BookDetailResponse {
        status: ResponseStatus::Success,
        data: BookData { book },
    }))
}

/// Replace an existing book
#[utoipa::path(
    put,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Missing name or readPage above pageCount", body = MessageResponse),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn edit_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    state.services.books.edit_book(&book_id, payload)?;
    Ok(Json(MessageResponse::success("Buku berhasil diperbarui")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete_book(&book_id)?;
    Ok(Json(MessageResponse::success("Buku berhasil dihapus")))
}
