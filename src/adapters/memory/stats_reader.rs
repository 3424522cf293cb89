use crate::ports::stats_reader::{LibraryStats, Result, StatsReader};
use async_trait::async_trait;

use super::InMemoryLibrary;

#[async_trait]
impl StatsReader for InMemoryLibrary {
    /// All four counts come from one read-locked view of the state.
    async fn snapshot(&self) -> Result<LibraryStats> {
        let state = self.state.read();

        Ok(LibraryStats {
            total_books: state.books.len() as u64,
            available_books: state
                .books
                .values()
                .filter(|b| b.record.is_available)
                .count() as u64,
            total_members: state.members.len() as u64,
            active_loans: state.loans.values().filter(|l| l.record.is_open()).count() as u64,
        })
    }
}
