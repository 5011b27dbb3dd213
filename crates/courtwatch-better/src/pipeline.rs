//! End-to-end availability run: days → fetch → normalize.

use courtwatch_core::SearchConfig;

use crate::client::BetterClient;
use crate::dates::next_n_days;
use crate::error::BetterError;
use crate::normalize::{normalize_responses, CoercionPolicy, ColumnSchema};
use crate::types::{AvailabilityQuery, ProcessedRecord};

/// Run the availability pipeline for one search.
///
/// 1. Generate `search.days` days starting now.
/// 2. Fetch one response per day via [`BetterClient::fetch_batch`].
/// 3. Normalize the responses with the standard column schema.
///
/// # Errors
///
/// - [`BetterError::NoData`] when `search.days` is zero.
/// - [`BetterError::EmptyResult`] when no day returned status 200.
/// - Transport, envelope, and coercion errors from the stages above.
pub async fn run_availability(
    client: &BetterClient,
    search: &SearchConfig,
    policy: CoercionPolicy,
) -> Result<Vec<ProcessedRecord>, BetterError> {
    let query = AvailabilityQuery::from_search(search);
    let schema = ColumnSchema::standard();

    let responses = client.fetch_batch(&query, next_n_days(search.days)).await?;
    let records = normalize_responses(responses, &schema, policy)?;

    tracing::info!(
        venue = %search.venue_name,
        activity = %search.activity_name,
        days = search.days,
        records = records.len(),
        "availability run complete"
    );

    Ok(records)
}
