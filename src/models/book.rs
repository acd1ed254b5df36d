//! Book record model and related types.
//!
//! The wire format uses camelCase field names (`pageCount`, `readPage`,
//! `insertedAt`, ...). Optional fields left out by the client stay absent and
//! are omitted when the record is serialized.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

/// Length of generated book ids
pub const BOOK_ID_LENGTH: usize = 16;

/// URL-safe alphabet used for book ids
const BOOK_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a fresh random book id.
///
/// Uniqueness is probabilistic (64^16 possible ids).
pub fn generate_book_id() -> String {
    let mut rng = rand::thread_rng();
    (0..BOOK_ID_LENGTH)
        .map(|_| BOOK_ID_ALPHABET[rng.gen_range(0..BOOK_ID_ALPHABET.len())] as char)
        .collect()
}

/// ISO-8601 with millisecond precision and a `Z` suffix
fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Full book record as stored in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    /// Any JSON number, kept exactly as sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub year: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Total number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i64>,
    /// Pages read so far, never above `page_count`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_page: Option<i64>,
    /// Derived: `read_page == page_count`
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<bool>,
    #[serde(serialize_with = "serialize_timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub inserted_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record; `inserted_at` and `updated_at` both take `now`
    pub fn new(id: String, fields: BookFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            finished: fields.finished(),
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field. `id` and `inserted_at` are kept.
    pub fn apply(&mut self, fields: BookFields, now: DateTime<Utc>) {
        self.finished = fields.finished();
        self.name = fields.name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.reading = fields.reading;
        self.updated_at = now;
    }
}

/// Projection returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Request body for creating or updating a book
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i64>,
    pub read_page: Option<i64>,
    pub reading: Option<bool>,
}

/// Reasons a payload is rejected, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookValidationError {
    #[error("Mohon isi nama buku")]
    MissingName,

    #[error("readPage tidak boleh lebih besar dari pageCount")]
    ReadPageExceedsPageCount,
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub name: String,
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i64>,
    pub read_page: Option<i64>,
    pub reading: Option<bool>,
}

impl BookFields {
    pub fn finished(&self) -> bool {
        self.page_count == self.read_page
    }
}

impl BookPayload {
    /// Check the payload: `name` must be present, then `readPage <= pageCount`.
    ///
    /// The page comparison only applies when both counts were supplied.
    pub fn validate(self) -> Result<BookFields, BookValidationError> {
        let name = self.name.ok_or(BookValidationError::MissingName)?;

        if let (Some(read_page), Some(page_count)) = (self.read_page, self.page_count) {
            if read_page > page_count {
                return Err(BookValidationError::ReadPageExceedsPageCount);
            }
        }

        Ok(BookFields {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// Query parameters for listing books
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1`/`true` or `0`/`false`
    pub reading: Option<String>,
    /// `1`/`true` or `0`/`false`
    pub finished: Option<String>,
}

impl BookQuery {
    /// Whether `book` passes every filter present in the query
    pub fn matches(&self, book: &Book) -> bool {
        let name_matches = match non_empty(self.name.as_deref()) {
            Some(needle) => book.name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        };

        name_matches
            && flag_matches(self.reading.as_deref(), book.reading)
            && flag_matches(self.finished.as_deref(), Some(book.finished))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Coerce a boolean-ish query value to its numeric form.
///
/// `true`/`false` map to 1/0; numbers (`1`, `1.0`, `0e0`) are taken as-is.
/// Anything else is `None`.
pub fn coerce_flag(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        raw.parse().ok()
    }
}

/// An absent or empty filter accepts everything. A filter that does not
/// coerce to a number accepts nothing, as does a record without the field.
fn flag_matches(filter: Option<&str>, value: Option<bool>) -> bool {
    let Some(raw) = non_empty(filter.map(str::trim)) else {
        return true;
    };

    match (coerce_flag(raw), value) {
        (Some(expected), Some(actual)) => expected == f64::from(u8::from(actual)),
        _ => false,
    }
}
