//! Book collection service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::book::{generate_book_id, Book, BookPayload, BookQuery, BookSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate and store a new book, returning its id
    pub fn add_book(&self, payload: BookPayload) -> AppResult<String> {
        let fields = payload
            .validate()
            .map_err(|e| AppError::Validation(format!("Gagal menambahkan buku. {}", e)))?;

        let id = generate_book_id();
        let book = Book::new(id.clone(), fields, Utc::now());

        // Should always hold; the id is read back before reporting success
        if !self.repository.books.insert(book)? {
            return Err(AppError::Internal("Buku gagal ditambahkan".to_string()));
        }

        tracing::info!("Book created id={}", id);
        Ok(id)
    }

    /// Search books with filters
    pub fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        let books = self.repository.books.search(query)?;
        tracing::debug!("Book list: {} matches for {:?}", books.len(), query);
        Ok(books)
    }

    /// Get a book by id with full details
    pub fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository.books.find_by_id(id)?.ok_or_else(|| {
            tracing::warn!("Book lookup: id={} not found", id);
            AppError::NotFound("Buku tidak ditemukan".to_string())
        })
    }

    /// Replace every mutable field of an existing book.
    ///
    /// The payload is validated before the id is looked up.
    pub fn edit_book(&self, id: &str, payload: BookPayload) -> AppResult<()> {
        let fields = payload
            .validate()
            .map_err(|e| AppError::Validation(format!("Gagal memperbarui buku. {}", e)))?;

        if !self.repository.books.update_by_id(id, fields, Utc::now())? {
            tracing::warn!("Book update: id={} not found", id);
            return Err(AppError::NotFound(
                "Gagal memperbarui buku. Id tidak ditemukan".to_string(),
            ));
        }

        tracing::info!("Book updated id={}", id);
        Ok(())
    }

    pub fn delete_book(&self, id: &str) -> AppResult<()> {
        if !self.repository.books.delete_by_id(id)? {
            tracing::warn!("Book delete: id={} not found", id);
            return Err(AppError::NotFound(
                "Buku gagal dihapus. Id tidak ditemukan".to_string(),
            ));
        }

        tracing::info!("Book deleted id={}", id);
        Ok(())
    }

    pub fn count(&self) -> AppResult<usize> {
        self.repository.books.count()
    }
}
