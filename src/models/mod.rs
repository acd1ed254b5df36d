//! Data models for Bookshelf

pub mod book;
pub mod response;

// Re-export commonly used types
pub use book::{Book, BookFields, BookPayload, BookQuery, BookSummary, BookValidationError};
pub use response::{MessageResponse, ResponseStatus};
