mod errors;
mod loan_service;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{create_loan, get_loan, list_loans, return_loan};
