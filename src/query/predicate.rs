use chrono::NaiveDate;

use crate::analytics::models::AnalyticsFilter;
use crate::entry::models::ListingFilter;

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Date(NaiveDate),
}

/// Ordered predicate fragments and their parameters.
///
/// Fragments only ever contain column names and `$n` placeholders; user-supplied
/// values travel in `params`, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates {
    fragments: Vec<String>,
    params: Vec<QueryParam>,
}

impl Predicates {
    /// Append `<column> <op> $n`, where n is the next placeholder position.
    fn push(&mut self, column: &'static str, op: &'static str, param: QueryParam) {
        self.params.push(param);
        self.fragments
            .push(format!("{column} {op} ${}", self.params.len()));
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<QueryParam> {
        self.params
    }

    /// `WHERE a AND b ...`, or an empty string when nothing is filtered.
    pub fn where_clause(&self) -> String {
        if self.fragments.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.fragments.join(" AND "))
        }
    }
}

/// Listing predicates in fixed order: kind, category, from, to.
pub fn listing_predicates(filter: &ListingFilter) -> Predicates {
    let mut preds = Predicates::default();

    if let Some(kind) = filter.kind {
        preds.push("kind", "=", QueryParam::Text(kind.as_str().to_string()));
    }
    if let Some(category) = &filter.category {
        preds.push("category", "=", QueryParam::Text(category.clone()));
    }
    if let Some(from) = filter.from {
        preds.push("entry_date", ">=", QueryParam::Date(from));
    }
    if let Some(to) = filter.to {
        preds.push("entry_date", "<=", QueryParam::Date(to));
    }

    preds
}

/// Analytics predicates: the date bounds are always $1 and $2, kind follows when set.
pub fn analytics_predicates(filter: &AnalyticsFilter) -> Predicates {
    let mut preds = Predicates::default();

    preds.push("entry_date", ">=", QueryParam::Date(filter.from));
    preds.push("entry_date", "<=", QueryParam::Date(filter.to));
    if let Some(kind) = filter.kind {
        preds.push("kind", "=", QueryParam::Text(kind.as_str().to_string()));
    }

    preds
}
