//! API integration tests

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookshelf_server::{api, AppConfig, AppState};

fn app() -> Router {
    api::create_router(AppState::new(AppConfig::default()))
}

/// Send a request and return the status with the parsed JSON body
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn book_json(name: &str, page_count: i64, read_page: i64, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

async fn add_book(app: &Router, body: Value) -> String {
    let (status, body) = send(app, Method::POST, "/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["bookId"]
        .as_str()
        .expect("No book id in response")
        .to_string()
}

async fn list_len(app: &Router, uri: &str) -> usize {
    let (status, body) = send(app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["books"].as_array().expect("books is not an array").len()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["books"], 0);
}

#[tokio::test]
async fn test_add_book() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/books", Some(book_json("Buku A", 100, 25, false))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil ditambahkan");
    assert_eq!(body["data"]["bookId"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_add_book_then_get() {
    let app = app();
    let id = add_book(&app, book_json("Buku A", 100, 100, true)).await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let book = &body["data"]["book"];
    assert_eq!(book["id"], id.as_str());
    assert_eq!(book["name"], "Buku A");
    assert_eq!(book["year"], 2010);
    assert_eq!(book["pageCount"], 100);
    assert_eq!(book["readPage"], 100);
    assert_eq!(book["finished"], true);
    assert_eq!(book["reading"], true);
    assert_eq!(book["insertedAt"], book["updatedAt"]);
    assert!(book["insertedAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_add_book_without_name() {
    let app = app();
    let mut payload = book_json("x", 100, 25, false);
    payload.as_object_mut().unwrap().remove("name");

    let (status, body) = send(&app, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");
    assert_eq!(list_len(&app, "/books").await, 0);
}

#[tokio::test]
async fn test_add_book_read_page_over_page_count() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/books", Some(book_json("x", 100, 150, false))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );
    assert_eq!(list_len(&app, "/books").await, 0);
}

#[tokio::test]
async fn test_add_book_malformed_body() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_list_books_projection_and_order() {
    let app = app();
    let first = add_book(&app, book_json("First", 10, 1, false)).await;
    let second = add_book(&app, book_json("Second", 10, 1, false)).await;

    let (status, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["id"], first.as_str());
    assert_eq!(books[1]["id"], second.as_str());
    assert_eq!(
        books[0],
        json!({ "id": first, "name": "First", "publisher": "Dicoding Indonesia" })
    );
}

#[tokio::test]
async fn test_list_books_empty() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books"], json!([]));
}

#[tokio::test]
async fn test_list_books_filters() {
    let app = app();
    add_book(&app, book_json("Charles Dickens", 10, 10, true)).await;
    add_book(&app, book_json("Bleak House", 10, 2, false)).await;
    add_book(&app, book_json("Reading Dickens", 10, 3, true)).await;

    assert_eq!(list_len(&app, "/books?name=dickens").await, 2);
    assert_eq!(list_len(&app, "/books?name=DICKENS").await, 2);
    assert_eq!(list_len(&app, "/books?name=").await, 3);

    assert_eq!(list_len(&app, "/books?reading=1").await, 2);
    assert_eq!(list_len(&app, "/books?reading=true").await, 2);
    assert_eq!(list_len(&app, "/books?reading=0").await, 1);
    assert_eq!(list_len(&app, "/books?reading=false").await, 1);

    assert_eq!(list_len(&app, "/books?finished=1").await, 1);
    assert_eq!(list_len(&app, "/books?finished=0").await, 2);

    assert_eq!(list_len(&app, "/books?name=dickens&reading=1&finished=0").await, 1);
    assert_eq!(list_len(&app, "/books?reading=maybe").await, 0);
}

#[tokio::test]
async fn test_list_books_repeated_filter() {
    let app = app();
    add_book(&app, book_json("Charles Dickens", 10, 10, true)).await;
    add_book(&app, book_json("Bleak House", 10, 2, false)).await;

    for uri in ["/books?reading=1&reading=0", "/books?name=dickens&name=house"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["books"], json!([]));
    }
}

#[tokio::test]
async fn test_list_books_decimal_flag() {
    let app = app();
    add_book(&app, book_json("Charles Dickens", 10, 10, true)).await;
    add_book(&app, book_json("Bleak House", 10, 2, false)).await;

    assert_eq!(list_len(&app, "/books?reading=1.0").await, 1);
    assert_eq!(list_len(&app, "/books?finished=0.0").await, 1);
}

#[tokio::test]
async fn test_add_book_fractional_year() {
    let app = app();
    let mut payload = book_json("Buku A", 100, 25, false);
    payload["year"] = json!(2010.5);
    let id = add_book(&app, payload).await;

    let (status, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["book"]["year"].as_f64(), Some(2010.5));

    let mut update = book_json("Buku A", 100, 25, false);
    update["year"] = json!(1999.25);
    let (status, _) = send(&app, Method::PUT, &format!("/books/{}", id), Some(update)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["year"].as_f64(), Some(1999.25));
}

#[tokio::test]
async fn test_get_unknown_book() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/books/unknown-id", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");
}

#[tokio::test]
async fn test_edit_book() {
    let app = app();
    let id = add_book(&app, book_json("Before", 100, 10, false)).await;
    let (_, before) = send(&app, Method::GET, &format!("/books/{}", id), None).await;

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(book_json("After", 200, 200, true)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil diperbarui");

    let (_, after) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    let before = &before["data"]["book"];
    let after = &after["data"]["book"];
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["insertedAt"], before["insertedAt"]);
    assert_ne!(after["updatedAt"], before["updatedAt"]);
    assert!(after["updatedAt"].as_str().unwrap() > before["updatedAt"].as_str().unwrap());
    assert_eq!(after["name"], "After");
    assert_eq!(after["pageCount"], 200);
    assert_eq!(after["reading"], true);
    assert_eq!(after["finished"], true);
}

#[tokio::test]
async fn test_edit_book_invalid_payload() {
    let app = app();
    let id = add_book(&app, book_json("Keep", 100, 10, false)).await;

    let mut nameless = book_json("x", 100, 10, false);
    nameless.as_object_mut().unwrap().remove("name");
    let (status, body) = send(&app, Method::PUT, &format!("/books/{}", id), Some(nameless)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi nama buku");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/books/{}", id),
        Some(book_json("Keep", 100, 150, false)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
    );

    let (_, body) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(body["data"]["book"]["readPage"], 10);
}

#[tokio::test]
async fn test_edit_unknown_book() {
    let app = app();
    for payload in [book_json("A", 10, 1, false), book_json("B", 50, 50, true)] {
        let (status, body) = send(&app, Method::PUT, "/books/unknown-id", Some(payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");
    }
}

#[tokio::test]
async fn test_delete_book() {
    let app = app();
    let id = add_book(&app, book_json("Gone", 10, 1, false)).await;
    add_book(&app, book_json("Stays", 10, 1, false)).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil dihapus");

    let (status, _) = send(&app, Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(list_len(&app, "/books").await, 1);
}

#[tokio::test]
async fn test_delete_unknown_book() {
    let app = app();
    add_book(&app, book_json("Stays", 10, 1, false)).await;

    let (status, body) = send(&app, Method::DELETE, "/books/unknown-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");
    assert_eq!(list_len(&app, "/books").await, 1);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"].is_object());
    assert!(body["paths"]["/books/{book_id}"].is_object());
}
