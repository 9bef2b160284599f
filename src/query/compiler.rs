use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

use super::predicate::{analytics_predicates, listing_predicates, QueryParam};
use crate::analytics::models::{AnalyticsFilter, GroupKey};
use crate::entry::models::{ListingFilter, SortKey};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

const ENTRY_COLUMNS: &str =
    "id, kind, amount, category, description, entry_date, created_at, updated_at";

/// Aggregate columns shared by the scalar and grouped shapes. Amounts come back
/// sorted so percentiles can be interpolated exactly in process.
const STAT_COLUMNS: &str = r#"COUNT(*)                                                 AS count,
            COALESCE(SUM(amount), 0)                                 AS total_sum,
            COALESCE(AVG(amount), 0)                                 AS avg,
            COALESCE(ARRAY_AGG(amount ORDER BY amount), '{}'::numeric[]) AS amounts"#;

/// Query text plus its positional parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl CompiledQuery {
    /// Bind every parameter onto a typed sqlx query.
    pub fn query_as<'q, T>(&'q self) -> QueryAs<'q, Postgres, T, PgArguments>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let mut query = sqlx::query_as::<_, T>(&self.sql);
        for param in &self.params {
            query = match param {
                QueryParam::Text(value) => query.bind(value.clone()),
                QueryParam::Date(value) => query.bind(*value),
            };
        }
        query
    }
}

/// Physical sort column; anything unrecognized or absent sorts by date.
fn sort_column(key: Option<SortKey>) -> &'static str {
    match key {
        Some(SortKey::Amount) => "amount",
        Some(SortKey::Category) => "category",
        Some(SortKey::Kind) => "kind",
        Some(SortKey::Date) | None => "entry_date",
    }
}

/// Key expressions for grouped aggregation.
struct GroupExpr {
    select: &'static str,
    group: &'static str,
}

fn group_expr(key: GroupKey) -> GroupExpr {
    match key {
        GroupKey::Day => GroupExpr {
            select: "entry_date::text",
            group: "entry_date",
        },
        GroupKey::Week => GroupExpr {
            select: "DATE_TRUNC('week', entry_date)::date::text",
            group: "DATE_TRUNC('week', entry_date)",
        },
        GroupKey::Month => GroupExpr {
            select: "DATE_TRUNC('month', entry_date)::date::text",
            group: "DATE_TRUNC('month', entry_date)",
        },
        GroupKey::Category => GroupExpr {
            select: "category",
            group: "category",
        },
    }
}

/// `LIMIT n [OFFSET m]`, or nothing in no-limit mode.
pub fn pagination_clause(filter: &ListingFilter) -> String {
    if filter.no_limit {
        return String::new();
    }

    let limit = match filter.limit {
        Some(limit) if limit > 0 && limit <= MAX_LIMIT => limit,
        _ => DEFAULT_LIMIT,
    };

    match filter.offset {
        Some(offset) if offset > 0 => format!("LIMIT {limit} OFFSET {offset}"),
        _ => format!("LIMIT {limit}"),
    }
}

/// One fetch query returning the page plus `COUNT(*) OVER()` on every row.
pub fn compile_listing(filter: &ListingFilter) -> CompiledQuery {
    let predicates = listing_predicates(filter);

    let mut sql = format!(
        "SELECT {ENTRY_COLUMNS}, COUNT(*) OVER() AS total_count FROM ledger_entries"
    );
    let where_clause = predicates.where_clause();
    if !where_clause.is_empty() {
        sql.push(' ');
        sql.push_str(&where_clause);
    }
    sql.push_str(&format!(
        " ORDER BY {} {}, created_at DESC",
        sort_column(filter.sort_by),
        filter.order.as_sql()
    ));
    let pagination = pagination_clause(filter);
    if !pagination.is_empty() {
        sql.push(' ');
        sql.push_str(&pagination);
    }

    CompiledQuery {
        sql,
        params: predicates.into_params(),
    }
}

/// Count, sum, mean and the sorted amounts over the whole matching set.
pub fn compile_scalar_aggregate(filter: &AnalyticsFilter) -> CompiledQuery {
    let predicates = analytics_predicates(filter);

    let sql = format!(
        r#"SELECT
            {STAT_COLUMNS}
        FROM ledger_entries {}"#,
        predicates.where_clause()
    );

    CompiledQuery {
        sql,
        params: predicates.into_params(),
    }
}

/// Same statistics per group, ordered by the grouping expression.
pub fn compile_grouped_aggregate(filter: &AnalyticsFilter, key: GroupKey) -> CompiledQuery {
    let predicates = analytics_predicates(filter);
    let expr = group_expr(key);

    let sql = format!(
        r#"SELECT
            {}                                                       AS key,
            {STAT_COLUMNS}
        FROM ledger_entries {}
        GROUP BY {}
        ORDER BY {}"#,
        expr.select,
        predicates.where_clause(),
        expr.group,
        expr.group
    );

    CompiledQuery {
        sql,
        params: predicates.into_params(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::models::{EntryKind, SortOrder};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn analytics_filter() -> AnalyticsFilter {
        AnalyticsFilter {
            from: date("2024-01-01"),
            to: date("2024-12-31"),
            kind: None,
            group_by: None,
        }
    }

    #[test]
    fn test_unset_sort_defaults_to_date_desc() {
        let query = compile_listing(&ListingFilter::default());
        assert_eq!(
            query.sql,
            "SELECT id, kind, amount, category, description, entry_date, created_at, updated_at, \
             COUNT(*) OVER() AS total_count FROM ledger_entries \
             ORDER BY entry_date DESC, created_at DESC LIMIT 50"
        );
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_sort_key_maps_to_allow_listed_column() {
        let filter = ListingFilter {
            sort_by: Some(SortKey::Amount),
            order: SortOrder::Asc,
            ..Default::default()
        };
        let query = compile_listing(&filter);
        assert!(query.sql.contains("ORDER BY amount ASC, created_at DESC"));

        let filter = ListingFilter {
            sort_by: Some(SortKey::Kind),
            ..Default::default()
        };
        assert!(compile_listing(&filter).sql.contains("ORDER BY kind DESC"));
    }

    #[test]
    fn test_limit_above_max_falls_back_to_default() {
        let filter = ListingFilter {
            limit: Some(2000),
            ..Default::default()
        };
        assert_eq!(pagination_clause(&filter), "LIMIT 50");
    }

    #[test]
    fn test_limit_within_bounds_and_offset() {
        let filter = ListingFilter {
            limit: Some(1000),
            offset: Some(20),
            ..Default::default()
        };
        assert_eq!(pagination_clause(&filter), "LIMIT 1000 OFFSET 20");

        for limit in [Some(0), Some(-5), None] {
            let filter = ListingFilter {
                limit,
                offset: Some(0),
                ..Default::default()
            };
            assert_eq!(pagination_clause(&filter), "LIMIT 50");
        }
    }

    #[test]
    fn test_no_limit_mode_omits_pagination() {
        let filter = ListingFilter {
            limit: Some(10),
            offset: Some(30),
            no_limit: true,
            ..Default::default()
        };
        let query = compile_listing(&filter);
        assert!(!query.sql.contains("LIMIT"));
        assert!(!query.sql.contains("OFFSET"));
        assert!(query.sql.ends_with("ORDER BY entry_date DESC, created_at DESC"));
    }

    #[test]
    fn test_listing_query_with_filters() {
        let filter = ListingFilter {
            kind: Some(EntryKind::Income),
            from: Some(date("2024-01-01")),
            ..Default::default()
        };
        let query = compile_listing(&filter);
        assert!(query
            .sql
            .contains("FROM ledger_entries WHERE kind = $1 AND entry_date >= $2 ORDER BY"));
        assert_eq!(query.params.len(), 2);
    }

    #[test]
    fn test_scalar_aggregate_coalesces_to_zero() {
        let query = compile_scalar_aggregate(&analytics_filter());
        assert!(query.sql.contains("COALESCE(SUM(amount), 0)"));
        assert!(query.sql.contains("COALESCE(AVG(amount), 0)"));
        assert!(query
            .sql
            .contains("COALESCE(ARRAY_AGG(amount ORDER BY amount), '{}'::numeric[])"));
        assert!(query
            .sql
            .contains("WHERE entry_date >= $1 AND entry_date <= $2"));
        assert!(!query.sql.contains("GROUP BY"));
        assert_eq!(query.params.len(), 2);
    }

    #[test]
    fn test_grouped_aggregate_uses_allow_listed_expression() {
        let mut filter = analytics_filter();
        filter.kind = Some(EntryKind::Expense);

        let query = compile_grouped_aggregate(&filter, GroupKey::Month);
        assert!(query
            .sql
            .contains("DATE_TRUNC('month', entry_date)::date::text"));
        assert!(query
            .sql
            .contains("GROUP BY DATE_TRUNC('month', entry_date)"));
        assert!(query
            .sql
            .contains("ORDER BY DATE_TRUNC('month', entry_date)"));
        assert!(query.sql.contains("AND kind = $3"));
        assert_eq!(query.params.len(), 3);

        let query = compile_grouped_aggregate(&filter, GroupKey::Category);
        assert!(query.sql.contains("GROUP BY category"));
        assert!(query.sql.contains("ORDER BY category"));

        let query = compile_grouped_aggregate(&filter, GroupKey::Week);
        assert!(query.sql.contains("DATE_TRUNC('week', entry_date)::date::text"));

        let query = compile_grouped_aggregate(&filter, GroupKey::Day);
        assert!(query.sql.contains("entry_date::text"));
        assert!(query.sql.contains("GROUP BY entry_date"));
    }
}
