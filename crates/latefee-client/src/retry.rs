//! Retry logic with exponential backoff, shared by both API clients.
//!
//! Transport failures (connection errors, per-attempt timeouts) and
//! transient HTTP statuses (429, 500, 502, 503, 504) are retried with
//! doubling delays. Other non-2xx responses are returned to the
//! caller immediately for status handling.

use std::time::Duration;

use crate::error::ClientError;

/// Total attempt budget per logical request.
const MAX_ATTEMPTS: u32 = 6;

/// Initial backoff delay (doubles each attempt: 500ms, 1s, 2s, ...).
const BASE_DELAY_MS: u64 = 500;

/// Statuses worth retrying: rate limiting and server-side failures.
const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Send an HTTP request with exponential backoff.
///
/// The closure `f` builds and sends one attempt; it is called up to
/// [`MAX_ATTEMPTS`] times. A response with a transient status consumes
/// an attempt like a transport failure does. The final attempt's
/// response is returned whatever its status — the caller converts
/// remaining non-2xx statuses into errors.
pub(crate) async fn send_with_retry<F, Fut>(
    endpoint: &str,
    f: F,
) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delay = Duration::from_millis(BASE_DELAY_MS);

    for attempt in 1..=MAX_ATTEMPTS {
        match f().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if TRANSIENT_STATUSES.contains(&status) && attempt < MAX_ATTEMPTS {
                    tracing::warn!(
                        endpoint,
                        status,
                        attempt,
                        "transient status, retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    continue;
                }
                return Ok(resp);
            }
            Err(e) => {
                if attempt == MAX_ATTEMPTS {
                    return Err(ClientError::Http {
                        endpoint: endpoint.to_string(),
                        source: e,
                    });
                }
                tracing::warn!(endpoint, attempt, "request failed, retrying in {delay:?}: {e}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }

    unreachable!("attempt loop always returns")
}

/// Convert a non-2xx response into [`ClientError::Api`], reading the
/// body for diagnostics.
pub(crate) async fn error_for_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}
