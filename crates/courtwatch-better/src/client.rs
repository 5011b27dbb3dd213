//! HTTP client for the Better activity-times endpoint.
//!
//! Every response is returned as received, whatever its status: deciding
//! which days count as successful belongs to [`crate::normalize`]. Only
//! transport failures surface as errors here, and they abort the batch.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};

use crate::dates::format_query_date;
use crate::error::BetterError;
use crate::types::{AvailabilityQuery, RawResponse};

/// Client for the Better availability API.
///
/// Holds the `reqwest::Client` and the fixed header set sent with every
/// request. Requests within a batch run one at a time unless
/// [`BetterClient::with_max_concurrent_requests`] raises the limit.
pub struct BetterClient {
    client: Client,
    headers: HeaderMap,
    max_concurrent_requests: usize,
}

impl BetterClient {
    /// Creates a client sending `headers` verbatim on every request.
    ///
    /// `request_timeout_secs` of `None` keeps `reqwest`'s default (no
    /// overall timeout).
    ///
    /// # Errors
    ///
    /// - [`BetterError::InvalidHeader`] if a header name or value is not
    ///   valid HTTP.
    /// - [`BetterError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        user_agent: &str,
        request_timeout_secs: Option<u64>,
        headers: &BTreeMap<String, String>,
    ) -> Result<Self, BetterError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent);
        if let Some(secs) = request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            headers: build_header_map(headers)?,
            max_concurrent_requests: 1,
        })
    }

    /// Allows up to `limit` requests in flight within a batch. Output order
    /// still follows the day order. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit.max(1);
        self
    }

    /// Fetches availability for a single day.
    ///
    /// # Errors
    ///
    /// - [`BetterError::InvalidUrl`] if the URL template cannot be rendered.
    /// - [`BetterError::Http`] on network failure or if the body cannot be read.
    pub async fn fetch_day(
        &self,
        query: &AvailabilityQuery,
        day: NaiveDateTime,
    ) -> Result<RawResponse, BetterError> {
        let url = render_url(&query.base_url, &query.venue_name, &query.activity_name)?;
        self.fetch_url(&url, day).await
    }

    /// Fetches availability for every day, returning responses in day order.
    ///
    /// Non-200 responses are kept; the first transport error aborts the whole
    /// batch.
    ///
    /// # Errors
    ///
    /// - [`BetterError::NoData`] if `days` is empty.
    /// - [`BetterError::InvalidUrl`] if the URL template cannot be rendered.
    /// - [`BetterError::Http`] on the first network failure.
    pub async fn fetch_batch<I>(
        &self,
        query: &AvailabilityQuery,
        days: I,
    ) -> Result<Vec<RawResponse>, BetterError>
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        let url = render_url(&query.base_url, &query.venue_name, &query.activity_name)?;

        let responses: Vec<RawResponse> = futures::stream::iter(days)
            .map(|day| self.fetch_url(&url, day))
            .buffered(self.max_concurrent_requests)
            .try_collect()
            .await?;

        if responses.is_empty() {
            return Err(BetterError::NoData);
        }

        tracing::info!(
            venue = %query.venue_name,
            activity = %query.activity_name,
            count = responses.len(),
            "fetched availability batch"
        );

        Ok(responses)
    }

    async fn fetch_url(&self, base: &Url, day: NaiveDateTime) -> Result<RawResponse, BetterError> {
        let date = format_query_date(day);
        let mut url = base.clone();
        url.query_pairs_mut().append_pair("date", &date);

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(%date, status, "availability response");

        Ok(RawResponse { day, status, body })
    }
}

/// Substitutes `{venue_name}` and `{activity_name}` into `template` and
/// parses the result as a URL.
///
/// `{{` and `}}` render as literal braces.
///
/// # Errors
///
/// Returns [`BetterError::InvalidUrl`] for any other placeholder, an
/// unbalanced brace, or a result that is not a valid absolute URL.
pub fn render_url(
    template: &str,
    venue_name: &str,
    activity_name: &str,
) -> Result<Url, BetterError> {
    let invalid = |reason: String| BetterError::InvalidUrl {
        url: template.to_owned(),
        reason,
    };

    let mut rendered =
        String::with_capacity(template.len() + venue_name.len() + activity_name.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                rendered.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                rendered.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(invalid("unclosed '{' in template".to_string())),
                    }
                }
                match name.as_str() {
                    "venue_name" => rendered.push_str(venue_name),
                    "activity_name" => rendered.push_str(activity_name),
                    other => return Err(invalid(format!("unknown placeholder {{{other}}}"))),
                }
            }
            '}' => return Err(invalid("unmatched '}' in template".to_string())),
            _ => rendered.push(c),
        }
    }

    Url::parse(&rendered)
        .map_err(|e| invalid(format!("rendered \"{rendered}\" is not a URL: {e}")))
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, BetterError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| BetterError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| BetterError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
