use tracing::debug;

use super::models::{
    AggregateRow, AnalyticsFilter, AnalyticsQuery, AnalyticsResult, GroupKey, GroupedAggregateRow,
    GroupedAnalytics,
};
use crate::errors::AppError;
use crate::query::compiler::{compile_grouped_aggregate, compile_scalar_aggregate};
use crate::store::Store;

/// Service layer for statistical summaries over ledger entries.
pub struct AnalyticsService;

impl AnalyticsService {
    /// Validate the filter, run the scalar aggregate, then the grouped one if requested.
    /// Store failures propagate unchanged so they stay distinct from validation errors.
    pub async fn get_analytics(
        store: &Store,
        query: AnalyticsQuery,
    ) -> Result<AnalyticsResult, AppError> {
        let filter = AnalyticsFilter::try_from(query)?;

        let stats = Self::aggregate(store, &filter).await?;
        let groups = match filter.group_by {
            Some(key) => Some(Self::aggregate_grouped(store, &filter, key).await?),
            None => None,
        };

        Ok(AnalyticsResult {
            stats: stats.into(),
            groups,
        })
    }

    async fn aggregate(store: &Store, filter: &AnalyticsFilter) -> Result<AggregateRow, AppError> {
        let compiled = compile_scalar_aggregate(filter);
        debug!(sql = %compiled.sql, "Compiled scalar aggregate");

        let pool = store.pool();
        let row = store
            .retry()
            .run("aggregate", || {
                compiled.query_as::<AggregateRow>().fetch_one(pool)
            })
            .await?;

        Ok(row)
    }

    async fn aggregate_grouped(
        store: &Store,
        filter: &AnalyticsFilter,
        key: GroupKey,
    ) -> Result<Vec<GroupedAnalytics>, AppError> {
        let compiled = compile_grouped_aggregate(filter, key);
        debug!(sql = %compiled.sql, group_by = ?key, "Compiled grouped aggregate");

        let pool = store.pool();
        let rows = store
            .retry()
            .run("aggregate_grouped", || {
                compiled.query_as::<GroupedAggregateRow>().fetch_all(pool)
            })
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
