mod book_service;
mod errors;
mod member_service;

pub use book_service::{get_book, list_books, register_book, remove_book, update_book};
pub use errors::{CatalogApplicationError, Result};
pub use member_service::{get_member, list_members, register_member, remove_member, update_member};
