use crate::application::{catalog::CatalogApplicationError, loan::LoanApplicationError};
use crate::domain::ValidationError;
use crate::ports::StoreError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをHTTPレスポンスに変換する。
/// クライアント向けの文言はここでだけ決める。
#[derive(Debug)]
pub enum ApiError {
    Loan(LoanApplicationError),
    Catalog(CatalogApplicationError),
    Store(StoreError),
    Validation(ValidationError),
    /// JSON・クエリ文字列・パスの形式が不正
    BadRequest(String),
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<CatalogApplicationError> for ApiError {
    fn from(err: CatalogApplicationError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

type Mapped = (StatusCode, &'static str, String);

fn not_found(code: &'static str, message: &str) -> Mapped {
    (StatusCode::NOT_FOUND, code, message.to_string())
}

fn conflict(code: &'static str, message: &str) -> Mapped {
    (StatusCode::CONFLICT, code, message.to_string())
}

fn validation(err: &ValidationError) -> Mapped {
    match err {
        ValidationError::MissingField(field) => (
            StatusCode::BAD_REQUEST,
            "MISSING_FIELD",
            format!("Le champ '{}' est requis", field),
        ),
        ValidationError::InvalidEmail(_) => (
            StatusCode::BAD_REQUEST,
            "INVALID_EMAIL",
            "Adresse email invalide".to_string(),
        ),
        ValidationError::DueBeforeLoanDate { .. } => (
            StatusCode::BAD_REQUEST,
            "INVALID_DUE_DATE",
            "La date de retour prévue doit être postérieure à la date d'emprunt".to_string(),
        ),
        ValidationError::InvalidDate(field) => (
            StatusCode::BAD_REQUEST,
            "INVALID_DATE",
            format!("Date invalide pour le champ '{}'", field),
        ),
    }
}

// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal(err: &StoreError) -> Mapped {
    tracing::error!(error = ?err, "store error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Erreur interne du serveur".to_string(),
    )
}

impl ApiError {
    fn mapped(&self) -> Mapped {
        match self {
            ApiError::Loan(err) => match err {
                LoanApplicationError::BookNotFound => not_found("BOOK_NOT_FOUND", "Livre non trouvé"),
                LoanApplicationError::MemberNotFound => {
                    not_found("MEMBER_NOT_FOUND", "Membre non trouvé")
                }
                LoanApplicationError::LoanNotFound => {
                    not_found("LOAN_NOT_FOUND", "Emprunt non trouvé")
                }
                LoanApplicationError::BookNotAvailable => {
                    conflict("BOOK_NOT_AVAILABLE", "Ce livre n'est pas disponible")
                }
                LoanApplicationError::LoanAlreadyReturned => {
                    conflict("LOAN_ALREADY_RETURNED", "Ce livre a déjà été retourné")
                }
                LoanApplicationError::Validation(e) => validation(e),
                LoanApplicationError::StoreError(e) => internal(e),
            },
            ApiError::Catalog(err) => match err {
                CatalogApplicationError::BookNotFound => {
                    not_found("BOOK_NOT_FOUND", "Livre non trouvé")
                }
                CatalogApplicationError::MemberNotFound => {
                    not_found("MEMBER_NOT_FOUND", "Membre non trouvé")
                }
                CatalogApplicationError::EmailAlreadyRegistered(_) => conflict(
                    "EMAIL_ALREADY_REGISTERED",
                    "Cette adresse email est déjà utilisée",
                ),
                CatalogApplicationError::BookHasOpenLoans => {
                    conflict("BOOK_HAS_OPEN_LOANS", "Ce livre a des emprunts en cours")
                }
                CatalogApplicationError::MemberHasOpenLoans => {
                    conflict("MEMBER_HAS_OPEN_LOANS", "Ce membre a des emprunts en cours")
                }
                CatalogApplicationError::Validation(e) => validation(e),
                CatalogApplicationError::StoreError(e) => internal(e),
            },
            ApiError::Store(e) => internal(e),
            ApiError::Validation(e) => validation(e),
            ApiError::BadRequest(detail) => {
                tracing::debug!(%detail, "malformed request");
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    "Requête invalide".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.mapped();
        let body = Json(ErrorResponse::new(code, message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::BookId;

    #[test]
    fn test_book_not_available_maps_to_conflict() {
        let (status, code, message) =
            ApiError::from(LoanApplicationError::BookNotAvailable).mapped();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "BOOK_NOT_AVAILABLE");
        assert_eq!(message, "Ce livre n'est pas disponible");
    }

    #[test]
    fn test_missing_field_message_names_the_field() {
        let (status, _, message) =
            ApiError::from(ValidationError::MissingField("title")).mapped();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Le champ 'title' est requis");
    }

    #[test]
    fn test_invalid_date_is_bad_request() {
        let (status, code, message) =
            ApiError::from(ValidationError::InvalidDate("loan_date")).mapped();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_DATE");
        assert_eq!(message, "Date invalide pour le champ 'loan_date'");
    }

    #[test]
    fn test_store_backend_failure_is_opaque() {
        let err = StoreError::Backend(Box::new(std::io::Error::other("connection reset")));
        let (status, code, message) = ApiError::from(err).mapped();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("connection reset"));
    }

    #[test]
    fn test_catalog_conflicts() {
        let (status, code, _) =
            ApiError::from(CatalogApplicationError::from(StoreError::BookHasOpenLoans(
                BookId::new(),
            )))
            .mapped();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "BOOK_HAS_OPEN_LOANS");
    }
}
