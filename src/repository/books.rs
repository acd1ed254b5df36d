//! In-memory book collection

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields, BookQuery, BookSummary},
};

/// Ordered sequence of book records, in insertion order
#[derive(Debug, Default)]
pub struct BookCollection {
    books: Vec<Book>,
}

impl BookCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end of the collection
    pub fn append(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Position of the first record with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Remove the record at `index`, shifting later records down
    pub fn remove_at(&mut self, index: usize) -> Book {
        self.books.remove(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Shared handle to the process-wide collection.
///
/// Every operation takes the lock once, so a lookup and the mutation that
/// follows it cannot interleave with another request.
#[derive(Clone, Default)]
pub struct BooksRepository {
    collection: Arc<RwLock<BookCollection>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, BookCollection>> {
        self.collection
            .read()
            .map_err(|_| AppError::Internal("Book store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, BookCollection>> {
        self.collection
            .write()
            .map_err(|_| AppError::Internal("Book store lock poisoned".to_string()))
    }

    /// Append a new record, then report whether its id is present.
    ///
    /// Both steps happen under the same write guard.
    pub fn insert(&self, book: Book) -> AppResult<bool> {
        let mut collection = self.write()?;
        let id = book.id.clone();
        collection.append(book);
        Ok(collection.contains(&id))
    }

    /// Get a full record by id
    pub fn find_by_id(&self, id: &str) -> AppResult<Option<Book>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Records matching every filter in `query`, projected for listing
    pub fn search(&self, query: &BookQuery) -> AppResult<Vec<BookSummary>> {
        Ok(self
            .read()?
            .iter()
            .filter(|book| query.matches(book))
            .map(BookSummary::from)
            .collect())
    }

    /// Replace the mutable fields of a record. Returns `false` if no record has this id.
    pub fn update_by_id(&self, id: &str, fields: BookFields, now: DateTime<Utc>) -> AppResult<bool> {
        let mut collection = self.write()?;
        match collection.get_mut(id) {
            Some(book) => {
                book.apply(fields, now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a record. Returns `false` if no record has this id.
    pub fn delete_by_id(&self, id: &str) -> AppResult<bool> {
        let mut collection = self.write()?;
        match collection.position(id) {
            Some(index) => {
                collection.remove_at(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> AppResult<usize> {
        Ok(self.read()?.len())
    }
}
