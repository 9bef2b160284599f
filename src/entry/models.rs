use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

pub const MAX_CATEGORY_LEN: usize = 100;
/// Decimal places kept by the `amount` column
pub const AMOUNT_SCALE: u32 = 2;

/// Entry kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money received
    Income,
    /// Money spent
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(EntryKind::Income),
            "expense" => Some(EntryKind::Expense),
            _ => None,
        }
    }
}

/// Sortable listing dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Amount,
    Category,
    Kind,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date" => Some(SortKey::Date),
            "amount" => Some(SortKey::Amount),
            "category" => Some(SortKey::Category),
            "type" => Some(SortKey::Kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn validate_kind(kind: &str) -> Result<(), ValidationError> {
    if EntryKind::parse(kind).is_none() {
        return Err(ValidationError::new("invalid_kind"));
    }
    Ok(())
}

/// Amounts must be positive and fit the stored `NUMERIC(15,2)` exactly.
fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(ValidationError::new("amount_too_precise"));
    }
    if *amount >= amount_limit() {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

/// Smallest amount with more integer digits than the column holds (10^13).
fn amount_limit() -> Decimal {
    Decimal::from(10_000_000_000_000_i64)
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(ValidationError::new("category_empty"));
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::new("category_too_long"));
    }
    Ok(())
}

/// Database model for ledger entries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub kind: String,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row carrying the window count of all matches
#[derive(Debug, FromRow)]
pub struct LedgerEntryRow {
    #[sqlx(flatten)]
    pub entry: LedgerEntry,
    pub total_count: i64,
}

/// Ledger entry returned in responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    /// Unique entry identifier
    pub id: Uuid,
    /// Entry kind (income, expense)
    #[schema(example = "expense")]
    pub kind: String,
    /// Entry amount (always positive)
    #[schema(example = 55.50)]
    pub amount: Decimal,
    #[schema(example = "groceries")]
    pub category: String,
    #[schema(example = "Weekly groceries")]
    pub description: Option<String>,
    /// Calendar date of the entry
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(e: LedgerEntry) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            amount: e.amount,
            category: e.category,
            description: e.description,
            date: e.entry_date,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Request body for creating or fully replacing an entry
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EntryDto {
    /// Entry kind: income or expense
    #[validate(custom(function = "validate_kind"))]
    #[schema(example = "expense")]
    pub kind: String,

    /// Entry amount: positive, at most 2 decimal places, below 10^13
    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(example = 55.50)]
    pub amount: Decimal,

    /// Category (1-100 chars)
    #[validate(custom(function = "validate_category"))]
    #[schema(example = "groceries")]
    pub category: String,

    /// Optional description (max 1000 chars)
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    #[schema(example = "Weekly groceries")]
    pub description: Option<String>,

    /// Date of the entry (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// Validated entry values ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub kind: EntryKind,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub entry_date: NaiveDate,
}

impl EntryDto {
    /// Validate the payload, reporting the first failing field as a named error.
    pub fn into_new_entry(self) -> Result<NewEntry, AppError> {
        self.validate().map_err(entry_validation_error)?;

        let kind = EntryKind::parse(&self.kind).ok_or(AppError::InvalidKind)?;

        Ok(NewEntry {
            kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            entry_date: self.date,
        })
    }
}

fn entry_validation_error(errors: ValidationErrors) -> AppError {
    let fields = errors.field_errors();
    if fields.contains_key("kind") {
        AppError::InvalidKind
    } else if fields.contains_key("amount") {
        AppError::InvalidAmount
    } else if fields.contains_key("category") {
        AppError::InvalidCategory
    } else {
        AppError::ValidationError(errors.to_string())
    }
}

/// Query parameters for listing entries (raw, unvalidated)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListingQuery {
    /// Inclusive lower date bound (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Filter by exact category
    pub category: Option<String>,
    /// Filter by kind (income, expense)
    #[serde(alias = "type")]
    #[param(example = "expense")]
    pub kind: Option<String>,
    /// One of: date, amount, category, type
    #[param(example = "date")]
    pub sort_by: Option<String>,
    /// asc or desc (default desc)
    #[param(example = "desc")]
    pub order: Option<String>,
    /// Page size (default 50, max 1000)
    #[param(example = 50)]
    pub limit: Option<i64>,
    /// Number of results to skip (zero or negative means none)
    #[param(example = 0)]
    pub offset: Option<i64>,
}

/// Validated listing criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<String>,
    pub kind: Option<EntryKind>,
    pub sort_by: Option<SortKey>,
    pub order: SortOrder,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Disables pagination entirely (bulk export)
    pub no_limit: bool,
}

/// Empty query-string values count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<ListingQuery> for ListingFilter {
    type Error = AppError;

    fn try_from(query: ListingQuery) -> Result<Self, Self::Error> {
        let kind = match non_empty(query.kind) {
            Some(raw) => Some(EntryKind::parse(&raw).ok_or(AppError::InvalidKind)?),
            None => None,
        };
        let sort_by = match non_empty(query.sort_by) {
            Some(raw) => Some(SortKey::parse(&raw).ok_or(AppError::InvalidSortKey)?),
            None => None,
        };
        let order = match non_empty(query.order) {
            Some(raw) => SortOrder::parse(&raw).ok_or(AppError::InvalidOrder)?,
            None => SortOrder::default(),
        };

        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(AppError::InvalidDateRange);
            }
        }

        Ok(ListingFilter {
            from: query.from,
            to: query.to,
            category: non_empty(query.category),
            kind,
            sort_by,
            order,
            limit: query.limit,
            offset: query.offset,
            no_limit: false,
        })
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryListResponse {
    /// Entries on this page
    pub items: Vec<LedgerEntryResponse>,
    /// Total count matching filters
    #[schema(example = 100)]
    pub total_count: i64,
}

/// Path parameters for entry ID (validated by the service, not the router)
#[derive(Debug, Deserialize, IntoParams)]
pub struct EntryIdPath {
    /// Entry UUID
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compiler::compile_listing;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dto() -> EntryDto {
        EntryDto {
            kind: "income".to_string(),
            amount: Decimal::from_str("55.50").unwrap(),
            category: "salary".to_string(),
            description: Some("monthly salary".to_string()),
            date: date("2024-06-15"),
        }
    }

    #[test]
    fn test_valid_entry_dto() {
        let entry = dto().into_new_entry().expect("valid payload");
        assert_eq!(entry.kind, EntryKind::Income);
        assert_eq!(entry.amount, Decimal::new(5550, 2));
    }

    #[test]
    fn test_entry_dto_rejects_unknown_kind() {
        let mut payload = dto();
        payload.kind = "transfer".to_string();
        assert!(matches!(payload.into_new_entry(), Err(AppError::InvalidKind)));
    }

    #[test]
    fn test_entry_dto_rejects_zero_and_negative_amount() {
        for raw in ["0", "-10.00"] {
            let mut payload = dto();
            payload.amount = Decimal::from_str(raw).unwrap();
            assert!(matches!(
                payload.into_new_entry(),
                Err(AppError::InvalidAmount)
            ));
        }
    }

    #[test]
    fn test_entry_dto_rejects_blank_or_long_category() {
        let mut payload = dto();
        payload.category = "   ".to_string();
        assert!(matches!(
            payload.into_new_entry(),
            Err(AppError::InvalidCategory)
        ));

        let mut payload = dto();
        payload.category = "c".repeat(101);
        assert!(matches!(
            payload.into_new_entry(),
            Err(AppError::InvalidCategory)
        ));
    }

    #[test]
    fn test_entry_dto_rejects_long_description() {
        let mut payload = dto();
        payload.description = Some("d".repeat(1001));
        assert!(matches!(
            payload.into_new_entry(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_listing_filter_defaults() {
        let filter = ListingFilter::try_from(ListingQuery::default()).unwrap();
        assert_eq!(filter.order, SortOrder::Desc);
        assert_eq!(filter.sort_by, None);
        assert!(!filter.no_limit);
    }

    #[test]
    fn test_listing_filter_rejects_invalid_values() {
        let query = ListingQuery {
            kind: Some("refund".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ListingFilter::try_from(query),
            Err(AppError::InvalidKind)
        ));

        let query = ListingQuery {
            sort_by: Some("id; DROP TABLE ledger_entries".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ListingFilter::try_from(query),
            Err(AppError::InvalidSortKey)
        ));

        let query = ListingQuery {
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ListingFilter::try_from(query),
            Err(AppError::InvalidOrder)
        ));
    }

    #[test]
    fn test_listing_filter_date_range() {
        let inverted = ListingQuery {
            from: Some(date("2024-02-01")),
            to: Some(date("2024-01-01")),
            ..Default::default()
        };
        assert!(matches!(
            ListingFilter::try_from(inverted),
            Err(AppError::InvalidDateRange)
        ));

        let same_day = ListingQuery {
            from: Some(date("2024-01-01")),
            to: Some(date("2024-01-01")),
            ..Default::default()
        };
        assert!(ListingFilter::try_from(same_day).is_ok());

        let open_ended = ListingQuery {
            from: Some(date("2024-02-01")),
            ..Default::default()
        };
        assert!(ListingFilter::try_from(open_ended).is_ok());
    }

    #[test]
    fn test_listing_filter_ignores_negative_offset() {
        let query = ListingQuery {
            offset: Some(-5),
            ..Default::default()
        };
        let filter = ListingFilter::try_from(query).unwrap();

        let sql = compile_listing(&filter).sql;
        assert!(sql.ends_with("LIMIT 50"), "unexpected tail: {sql}");
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn test_sort_key_allow_list() {
        assert_eq!(SortKey::parse("type"), Some(SortKey::Kind));
        assert_eq!(SortKey::parse("kind"), None);
        assert_eq!(SortKey::parse("DATE"), None);

        let query = ListingQuery {
            sort_by: Some("kind".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ListingFilter::try_from(query),
            Err(AppError::InvalidSortKey)
        ));
    }

    #[test]
    fn test_amount_must_fit_two_decimal_places() {
        for raw in ["0.001", "55.555"] {
            let mut payload = dto();
            payload.amount = Decimal::from_str(raw).unwrap();
            assert!(
                matches!(payload.into_new_entry(), Err(AppError::InvalidAmount)),
                "{raw} should be rejected"
            );
        }

        // Trailing zeros beyond two places do not change the value
        let mut payload = dto();
        payload.amount = Decimal::from_str("55.5000").unwrap();
        assert!(payload.into_new_entry().is_ok());
    }

    #[test]
    fn test_amount_must_fit_column_width() {
        let mut payload = dto();
        payload.amount = Decimal::from_str("9999999999999.99").unwrap();
        assert!(payload.into_new_entry().is_ok());

        for raw in ["10000000000000", "12345678901234.5"] {
            let mut payload = dto();
            payload.amount = Decimal::from_str(raw).unwrap();
            assert!(
                matches!(payload.into_new_entry(), Err(AppError::InvalidAmount)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_responses_use_snake_case_fields() {
        let json = serde_json::to_value(EntryListResponse {
            items: vec![],
            total_count: 0,
        })
        .unwrap();
        assert!(json.get("total_count").is_some());
        assert!(json.get("totalCount").is_none());
    }
}
