use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::errors::{AppError, ErrorResponse};
use crate::store::Store;

use super::models::{
    EntryDto, EntryIdPath, EntryListResponse, LedgerEntryResponse, ListingQuery,
};
use super::service::EntryService;

/// GET /api/entries - List entries with optional filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/entries",
    tag = "Entries",
    params(ListingQuery),
    responses(
        (status = 200, description = "Page of entries with total match count", body = EntryListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
#[get("/api/entries")]
pub async fn list_entries(
    store: web::Data<Store>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse, AppError> {
    let (entries, total_count) =
        EntryService::list_entries(store.get_ref(), query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(EntryListResponse {
        items: entries.into_iter().map(Into::into).collect(),
        total_count,
    }))
}

/// GET /api/entries/{id} - Get a specific entry by ID
#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    tag = "Entries",
    params(EntryIdPath),
    responses(
        (status = 200, description = "Entry details", body = LedgerEntryResponse),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
#[get("/api/entries/{id}")]
pub async fn get_entry(
    store: web::Data<Store>,
    path: web::Path<EntryIdPath>,
) -> Result<HttpResponse, AppError> {
    let entry = EntryService::get_entry(store.get_ref(), &path.id).await?;

    Ok(HttpResponse::Ok().json(LedgerEntryResponse::from(entry)))
}

/// POST /api/entries - Record a new income or expense entry
#[utoipa::path(
    post,
    path = "/api/entries",
    tag = "Entries",
    request_body = EntryDto,
    responses(
        (status = 201, description = "Entry created", body = LedgerEntryResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    )
)]
#[post("/api/entries")]
pub async fn create_entry(
    store: web::Data<Store>,
    body: web::Json<EntryDto>,
) -> Result<HttpResponse, AppError> {
    let entry = body.into_inner().into_new_entry()?;
    let created = EntryService::create_entry(store.get_ref(), entry).await?;

    Ok(HttpResponse::Created().json(LedgerEntryResponse::from(created)))
}

/// PUT /api/entries/{id} - Replace an entry
#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    tag = "Entries",
    params(EntryIdPath),
    request_body = EntryDto,
    responses(
        (status = 200, description = "Entry replaced", body = LedgerEntryResponse),
        (status = 400, description = "Validation error or malformed identifier", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
#[put("/api/entries/{id}")]
pub async fn replace_entry(
    store: web::Data<Store>,
    path: web::Path<EntryIdPath>,
    body: web::Json<EntryDto>,
) -> Result<HttpResponse, AppError> {
    let entry = body.into_inner().into_new_entry()?;
    let updated = EntryService::replace_entry(store.get_ref(), &path.id, entry).await?;

    Ok(HttpResponse::Ok().json(LedgerEntryResponse::from(updated)))
}

/// DELETE /api/entries/{id} - Delete an entry
#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    tag = "Entries",
    params(EntryIdPath),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
#[delete("/api/entries/{id}")]
pub async fn delete_entry(
    store: web::Data<Store>,
    path: web::Path<EntryIdPath>,
) -> Result<HttpResponse, AppError> {
    EntryService::delete_entry(store.get_ref(), &path.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
