//! Command handlers: run an availability check, show the resolved search.

use std::path::Path;

use courtwatch_better::{run_availability, BetterClient, CoercionPolicy};
use courtwatch_core::{load_search_config, AppConfig, SearchConfig};

use crate::output::{open_sink, write_records};
use crate::CheckArgs;

fn resolve_search(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<SearchConfig> {
    let path = path.unwrap_or(&config.config_path);
    let search = load_search_config(path)?;
    tracing::debug!(path = %path.display(), ?search, "loaded search config");
    Ok(search)
}

/// Fetch, normalize, and write availability for the configured search.
///
/// Configuration problems surface before any request is sent. Every later
/// failure aborts the run; nothing is retried.
pub(crate) async fn run_check(config: &AppConfig, args: CheckArgs) -> anyhow::Result<()> {
    let mut search = resolve_search(config, args.config.as_deref())?;
    if let Some(days) = args.days {
        search.days = days;
    }

    let client = BetterClient::new(
        &config.user_agent,
        config.request_timeout_secs,
        &search.headers,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Better client: {e}"))?
    .with_max_concurrent_requests(config.max_concurrent_requests);

    let policy = if args.skip_invalid {
        CoercionPolicy::Skip
    } else {
        CoercionPolicy::Abort
    };

    tracing::info!(
        venue = %search.venue_name,
        activity = %search.activity_name,
        days = search.days,
        "checking availability"
    );

    let records = run_availability(&client, &search, policy).await?;

    let mut sink = open_sink(args.output.as_deref())?;
    write_records(&mut sink, &records, args.format)?;

    if let Some(path) = &args.output {
        tracing::info!(path = %path.display(), count = records.len(), "wrote availability");
    }

    Ok(())
}

/// Validate the search config and print it. Header values are redacted.
pub(crate) fn run_show_config(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<()> {
    let search = resolve_search(config, path)?;
    println!("{search:#?}");
    Ok(())
}
