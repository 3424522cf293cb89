use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// 書籍ID - カタログの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 会員ID - 会員管理の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 貸出ID - 貸出台帳の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// メールアドレス
///
/// 不変条件：`local@domain.tld` 形式で空白を含まない。
/// 一意性の比較は `normalized()`（小文字化）で行う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }

        let invalid = || ValidationError::InvalidEmail(candidate.to_string());

        if candidate.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (local, domain) = candidate.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }

        // ドメインは「ラベル.ラベル」で、空のラベルを許さない
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
            return Err(invalid());
        }

        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 一意性判定用の正規化表現
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 必須テキスト項目を検証し、前後の空白を除いた値を返す
pub fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// 任意テキスト項目を正規化する（空文字列は未設定として扱う）
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_creation() {
        let id1 = BookId::new();
        let id2 = BookId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_loan_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = LoanId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_member_id_creation() {
        let id1 = MemberId::new();
        let id2 = MemberId::new();
        assert_ne!(id1, id2);
    }

    // Email のテスト
    #[test]
    fn test_email_accepts_valid_address() {
        let email = Email::parse("  Jeanne.Dupont@example.fr ").unwrap();
        assert_eq!(email.as_str(), "Jeanne.Dupont@example.fr");
        assert_eq!(email.normalized(), "jeanne.dupont@example.fr");
    }

    #[test]
    fn test_email_rejects_blank_as_missing() {
        assert_eq!(
            Email::parse("   ").unwrap_err(),
            ValidationError::MissingField("email")
        );
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for raw in [
            "no-at-sign",
            "@example.com",
            "user@",
            "user@localhost",
            "user@exa mple.com",
            "user@@example.com",
            "user@example..com",
        ] {
            assert!(
                matches!(Email::parse(raw), Err(ValidationError::InvalidEmail(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_email_deserialize_validates() {
        let ok: Result<Email, _> = serde_json::from_str("\"a@b.co\"");
        assert!(ok.is_ok());

        let err: Result<Email, _> = serde_json::from_str("\"not-an-email\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Dune ").unwrap(), "Dune");
        assert_eq!(
            required_text("title", " \t").unwrap_err(),
            ValidationError::MissingField("title")
        );
    }

    #[test]
    fn test_optional_text_drops_blank() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" SF ".to_string())), Some("SF".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
