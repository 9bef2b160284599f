use utoipa::OpenApi;

use crate::analytics::models::{AnalyticsResult, GroupedAnalytics, Statistics};
use crate::entry::models::{EntryDto, EntryKind, EntryListResponse, LedgerEntryResponse};
use crate::errors::ErrorResponse;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger API",
        version = "0.1.0",
        description = "Income/expense ledger with filtered listings, statistics and CSV export",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Entries", description = "Ledger entry management and filtered listing"),
        (name = "Analytics", description = "Sum, mean, count, median and p90 over a date range"),
        (name = "Export", description = "Bulk CSV export")
    ),
    paths(
        // Entry endpoints
        crate::entry::handlers::list_entries,
        crate::entry::handlers::get_entry,
        crate::entry::handlers::create_entry,
        crate::entry::handlers::replace_entry,
        crate::entry::handlers::delete_entry,
        // Analytics endpoints
        crate::analytics::handlers::get_analytics,
        // Export endpoints
        crate::export::handlers::export_csv,
    ),
    components(
        schemas(
            // Error response
            ErrorResponse,
            // Entry schemas
            EntryKind,
            EntryDto,
            LedgerEntryResponse,
            EntryListResponse,
            // Analytics schemas
            Statistics,
            GroupedAnalytics,
            AnalyticsResult,
        )
    )
)]
pub struct ApiDoc;
