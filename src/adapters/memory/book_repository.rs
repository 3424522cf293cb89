use crate::domain::{book::Book, value_objects::BookId};
use crate::ports::book_repository::{BookRepository, Result};
use crate::ports::error::StoreError;
use async_trait::async_trait;

use super::{InMemoryLibrary, Sequenced, ordered};

#[async_trait]
impl BookRepository for InMemoryLibrary {
    async fn list(&self) -> Result<Vec<Book>> {
        Ok(ordered(&self.state.read().books))
    }

    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self
            .state
            .read()
            .books
            .get(&book_id)
            .map(|b| b.record.clone()))
    }

    async fn insert(&self, book: Book) -> Result<()> {
        let mut state = self.state.write();
        let seq = state.next_seq();
        state.books.insert(book.book_id, Sequenced { seq, record: book });
        Ok(())
    }

    /// Overwrites bibliographic fields only; availability stays as stored.
    async fn update(&self, book: Book) -> Result<Book> {
        let mut state = self.state.write();
        let stored = state
            .books
            .get_mut(&book.book_id)
            .ok_or(StoreError::BookNotFound(book.book_id))?;

        let is_available = stored.record.is_available;
        stored.record = Book {
            is_available,
            created_at: stored.record.created_at,
            ..book
        };

        Ok(stored.record.clone())
    }

    async fn delete(&self, book_id: BookId) -> Result<()> {
        let mut state = self.state.write();
        if !state.books.contains_key(&book_id) {
            return Err(StoreError::BookNotFound(book_id));
        }
        if state.has_open_loan_for_book(book_id) {
            return Err(StoreError::BookHasOpenLoans(book_id));
        }

        state.loans.retain(|_, l| l.record.book_id != book_id);
        state.books.remove(&book_id);
        Ok(())
    }
}
