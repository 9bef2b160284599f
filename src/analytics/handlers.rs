use actix_web::{get, web, HttpResponse};

use crate::errors::{AppError, ErrorResponse};
use crate::store::Store;

use super::models::{AnalyticsQuery, AnalyticsResult};
use super::service::AnalyticsService;

/// GET /api/analytics - Sum, mean, count, median and p90 over a date range
#[utoipa::path(
    get,
    path = "/api/analytics",
    tag = "Analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Statistics, optionally grouped", body = AnalyticsResult),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
#[get("/api/analytics")]
pub async fn get_analytics(
    store: web::Data<Store>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, AppError> {
    let result = AnalyticsService::get_analytics(store.get_ref(), query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(result))
}
