//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "1.0.0",
        description = "In-memory book collection REST API"
    ),
    paths(
        // Health
        health::health_check,
        // Books
        books::add_book,
        books::list_books,
        books::get_book,
        books::edit_book,
        books::delete_book,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookPayload,
            crate::models::book::BookQuery,
            books::BookIdData,
            books::BookCreatedResponse,
            books::BookListData,
            books::BookListResponse,
            books::BookData,
            books::BookDetailResponse,
            // Envelope
            crate::models::response::ResponseStatus,
            crate::models::response::MessageResponse,
            // Health
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book collection management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
