use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::stats::percentile_cont;
use crate::entry::models::EntryKind;
use crate::errors::AppError;

/// Grouping dimension for analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Day,
    Week,
    Month,
    Category,
}

impl GroupKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(GroupKey::Day),
            "week" => Some(GroupKey::Week),
            "month" => Some(GroupKey::Month),
            "category" => Some(GroupKey::Category),
            _ => None,
        }
    }
}

/// Query parameters for analytics (raw, unvalidated)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    /// Inclusive lower date bound (required, YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound (required, YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// One of: day, week, month, category
    #[param(example = "month")]
    pub group_by: Option<String>,
    /// Filter by kind (income, expense)
    #[serde(alias = "type")]
    #[param(example = "expense")]
    pub kind: Option<String>,
}

/// Validated analytics criteria
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub kind: Option<EntryKind>,
    pub group_by: Option<GroupKey>,
}

impl TryFrom<AnalyticsQuery> for AnalyticsFilter {
    type Error = AppError;

    fn try_from(query: AnalyticsQuery) -> Result<Self, Self::Error> {
        let (from, to) = match (query.from, query.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(AppError::InvalidDate),
        };
        if from > to {
            return Err(AppError::InvalidDateRange);
        }

        let group_by = match query.group_by.filter(|v| !v.is_empty()) {
            Some(raw) => Some(GroupKey::parse(&raw).ok_or(AppError::InvalidGroupKey)?),
            None => None,
        };
        let kind = match query.kind.filter(|v| !v.is_empty()) {
            Some(raw) => Some(EntryKind::parse(&raw).ok_or(AppError::InvalidKind)?),
            None => None,
        };

        Ok(AnalyticsFilter {
            from,
            to,
            kind,
            group_by,
        })
    }
}

/// Raw aggregate row: store-side count/sum/mean plus the sorted amounts
#[derive(Debug, FromRow)]
pub struct AggregateRow {
    pub count: i64,
    pub total_sum: Decimal,
    pub avg: Decimal,
    pub amounts: Vec<Decimal>,
}

#[derive(Debug, FromRow)]
pub struct GroupedAggregateRow {
    pub key: String,
    #[sqlx(flatten)]
    pub stats: AggregateRow,
}

/// The five statistics reported for a set of amounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Statistics {
    #[schema(example = 1000.00)]
    pub total_sum: Decimal,
    #[schema(example = 100.00)]
    pub avg: Decimal,
    #[schema(example = 10)]
    pub count: i64,
    #[schema(example = 90.00)]
    pub median: Decimal,
    #[schema(example = 200.00)]
    pub p90: Decimal,
}

impl From<AggregateRow> for Statistics {
    fn from(row: AggregateRow) -> Self {
        Self {
            total_sum: row.total_sum,
            avg: row.avg,
            count: row.count,
            median: percentile_cont(&row.amounts, Decimal::new(5, 1)),
            p90: percentile_cont(&row.amounts, Decimal::new(9, 1)),
        }
    }
}

/// Statistics for one group key
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupedAnalytics {
    /// Group key: date (YYYY-MM-DD) for day/week/month, category name otherwise
    #[schema(example = "2024-01-01")]
    pub key: String,
    #[serde(flatten)]
    pub stats: Statistics,
}

impl From<GroupedAggregateRow> for GroupedAnalytics {
    fn from(row: GroupedAggregateRow) -> Self {
        Self {
            key: row.key,
            stats: row.stats.into(),
        }
    }
}

/// Analytics response
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsResult {
    #[serde(flatten)]
    pub stats: Statistics,
    /// Present only when `group_by` was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupedAnalytics>>,
}
