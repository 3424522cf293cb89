mod books;
mod loans;
mod members;
mod stats;

use crate::application::ServiceDependencies;

pub use books::{create_book, delete_book, get_book, list_books, update_book};
pub use loans::{create_loan, get_loan, list_loans, return_loan};
pub use members::{create_member, delete_member, get_member, list_members, update_member};
pub use stats::{get_stats, health_check};

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}
