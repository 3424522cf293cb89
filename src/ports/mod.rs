pub mod book_repository;
pub mod error;
pub mod loan_ledger;
pub mod member_repository;
pub mod stats_reader;

pub use book_repository::BookRepository;
pub use error::StoreError;
pub use loan_ledger::{LoanLedger, LoanQuery, LoanStatusFilter};
pub use member_repository::MemberRepository;
pub use stats_reader::{LibraryStats, StatsReader};
