use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{
    ValidationError,
    book::{Book, BookPatch, NewBook},
    commands::CreateLoan,
    loan::Loan,
    member::{Member, MemberPatch, NewMember},
    value_objects::{BookId, MemberId},
};
use crate::ports::{LibraryStats, LoanQuery, LoanStatusFilter};

// ============================================================================
// Dates
// ============================================================================

/// リクエストの日付文字列を解釈する
///
/// 受け付ける形式：
/// - `YYYY-MM-DD`（UTCの0時）
/// - `YYYY-MM-DDTHH:MM:SS[.f]`（タイムゾーンなしはUTCとみなす）
/// - RFC 3339
pub fn parse_date_input(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// 省略可能な日付項目のデシリアライザ（null・空文字は未指定）
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date_input(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", value))),
    }
}

/// 送られた項目を `Some` で包む（null は `Some(None)`、欠落は `#[serde(default)]` で `None`）
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

// ============================================================================
// Books
// ============================================================================

/// 書籍登録リクエスト（POST /books）
///
/// `is_available` が送られてきても無視する。
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl CreateBookRequest {
    pub fn into_new_book(self) -> Result<NewBook, ValidationError> {
        Ok(NewBook {
            title: required("title", self.title)?,
            author: required("author", self.author)?,
            isbn: self.isbn,
            publication_year: self.publication_year,
            category: self.category,
            description: self.description,
        })
    }
}

/// 書籍更新リクエスト（PUT /books/:id）
///
/// `publication_year` に null を送ると出版年を消去する。
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub publication_year: Option<Option<i32>>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateBookRequest> for BookPatch {
    fn from(req: UpdateBookRequest) -> Self {
        BookPatch {
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            publication_year: req.publication_year,
            category: req.category,
            description: req.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            category: book.category,
            description: book.description,
            is_available: book.is_available,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

// ============================================================================
// Members
// ============================================================================

/// 会員登録リクエスト（POST /members）
#[derive(Debug, Default, Deserialize)]
pub struct CreateMemberRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
}

impl CreateMemberRequest {
    pub fn into_new_member(self) -> Result<NewMember, ValidationError> {
        Ok(NewMember {
            first_name: required("first_name", self.first_name)?,
            last_name: required("last_name", self.last_name)?,
            email: required("email", self.email)?,
            phone: self.phone,
            address: self.address,
            id_card_number: self.id_card_number,
        })
    }
}

/// 会員更新リクエスト（PUT /members/:id）
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMemberRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
}

impl From<UpdateMemberRequest> for MemberPatch {
    fn from(req: UpdateMemberRequest) -> Self {
        MemberPatch {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            id_card_number: req.id_card_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.member_id.value(),
            first_name: member.first_name,
            last_name: member.last_name,
            email: member.email.to_string(),
            phone: member.phone,
            address: member.address,
            id_card_number: member.id_card_number,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

// ============================================================================
// Loans
// ============================================================================

/// 貸出リクエスト（POST /loans）
#[derive(Debug, Default, Deserialize)]
pub struct CreateLoanRequest {
    pub book_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub loan_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateLoanRequest {
    pub fn to_command(self, requested_at: DateTime<Utc>) -> Result<CreateLoan, ValidationError> {
        Ok(CreateLoan {
            book_id: BookId::from_uuid(required("book_id", self.book_id)?),
            member_id: MemberId::from_uuid(required("member_id", self.member_id)?),
            loan_date: self.loan_date,
            due_date: self.due_date,
            requested_at,
        })
    }
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    /// all, active, returned, overdue
    pub status: Option<String>,
    /// 書籍タイトル・会員名の部分一致
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub book_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
}

impl ListLoansQuery {
    /// 検索条件に変換する。ステータスが不正ならエラーメッセージを返す。
    pub fn to_loan_query(self, as_of: DateTime<Utc>) -> Result<LoanQuery, String> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => LoanStatusFilter::All,
            Some(raw) => raw.to_lowercase().parse::<LoanStatusFilter>()?,
        };

        Ok(LoanQuery {
            status,
            search: self.q,
            book_id: self.book_id.map(BookId::from_uuid),
            member_id: self.member_id.map(MemberId::from_uuid),
            as_of,
        })
    }
}

/// 貸出レスポンス（GET /loans/:id と GET /loans）
///
/// `returned` と `is_overdue` は応答時刻を基準に導出する。
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub returned: bool,
    pub is_overdue: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanResponse {
    pub fn from_loan(loan: Loan, now: DateTime<Utc>) -> Self {
        Self {
            id: loan.loan_id.value(),
            book_id: loan.book_id.value(),
            member_id: loan.member_id.value(),
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            returned: loan.is_returned(),
            is_overdue: loan.is_overdue(now),
            status: loan.status(now).as_str().to_string(),
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        }
    }
}

// ============================================================================
// Stats / health / errors
// ============================================================================

/// 集計レスポンス（GET /stats）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_books: u64,
    pub available_books: u64,
    pub total_members: u64,
    pub active_loans: u64,
}

impl From<LibraryStats> for StatsResponse {
    fn from(stats: LibraryStats) -> Self {
        Self {
            total_books: stats.total_books,
            available_books: stats.available_books,
            total_members: stats.total_members,
            active_loans: stats.active_loans,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
        }
    }
}
