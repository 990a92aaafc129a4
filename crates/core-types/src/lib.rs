pub mod enums;
pub mod error;
pub mod isbn;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::SortBy;
pub use error::CoreError;
pub use isbn::clean_isbn;
pub use structs::{Author, Book, CatalogEntry, NewAuthor, NewBook};
