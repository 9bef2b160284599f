use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::entry::models::{ListingFilter, ListingQuery, SortKey, SortOrder};
use crate::entry::service::EntryService;
use crate::errors::{AppError, ErrorResponse};
use crate::store::Store;

use super::writer::write_entries;

/// Query parameters for CSV export (no sorting or pagination)
#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Inclusive lower date bound (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Filter by exact category
    pub category: Option<String>,
    /// Filter by kind (income, expense)
    #[serde(alias = "type")]
    pub kind: Option<String>,
}

impl TryFrom<ExportQuery> for ListingFilter {
    type Error = AppError;

    /// Same validation as listing, then date-descending order over the full set.
    fn try_from(query: ExportQuery) -> Result<Self, Self::Error> {
        let mut filter = ListingFilter::try_from(ListingQuery {
            from: query.from,
            to: query.to,
            category: query.category,
            kind: query.kind,
            ..Default::default()
        })?;
        filter.sort_by = Some(SortKey::Date);
        filter.order = SortOrder::Desc;
        filter.no_limit = true;
        Ok(filter)
    }
}

/// GET /api/export/csv - Download every matching entry as CSV
#[utoipa::path(
    get,
    path = "/api/export/csv",
    tag = "Export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 429, description = "Too many export requests")
    )
)]
#[get("/api/export/csv")]
pub async fn export_csv(
    store: web::Data<Store>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = ListingFilter::try_from(query.into_inner())?;
    let (entries, _) = EntryService::list_filtered(store.get_ref(), &filter).await?;

    let mut body = Vec::new();
    write_entries(&mut body, &entries)
        .map_err(|e| AppError::InternalError(format!("Failed to write CSV: {e}")))?;

    info!(rows = entries.len(), "Exported entries as CSV");

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("entries.csv".to_string())],
        })
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filter_disables_pagination_and_sorts_by_date() {
        let filter = ListingFilter::try_from(ExportQuery {
            from: None,
            to: None,
            category: Some("food".to_string()),
            kind: Some("expense".to_string()),
        })
        .unwrap();

        assert!(filter.no_limit);
        assert_eq!(filter.sort_by, Some(SortKey::Date));
        assert_eq!(filter.order, SortOrder::Desc);
        assert_eq!(filter.category.as_deref(), Some("food"));
    }

    #[test]
    fn test_export_filter_validates_kind() {
        let result = ListingFilter::try_from(ExportQuery {
            from: None,
            to: None,
            category: None,
            kind: Some("both".to_string()),
        });
        assert!(matches!(result, Err(AppError::InvalidKind)));
    }
}
