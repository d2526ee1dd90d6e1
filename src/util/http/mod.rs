use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::logging::Logger;

pub mod user_agent;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// The client carries the fixed browser User-Agent and no overall timeout;
/// callers that need a deadline pass one per request.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // reqwest is built with the `rustls-no-provider` feature, so a rustls
        // crypto provider must be installed before the first client is built.
        let _ = rustls::crypto::ring::default_provider().install_default();

        Client::builder()
            .brotli(true)
            .gzip(true)
            .zstd(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent::BROWSER)
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and returns the response body as text.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `headers`: An optional set of headers to include with the request.
/// * `timeout`: An optional deadline for this request; `None` keeps the
///   client's default behavior.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails
///   or the response cannot be read.
pub async fn get(
    url: &str,
    headers: Option<header::HeaderMap>,
    timeout: Option<Duration>,
) -> Result<String> {
    send(Method::GET, url, headers, timeout, None::<fn(_) -> _>)
        .await?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Performs an HTTP POST request with a JSON request body and deserializes
/// the JSON response into the specified type.
///
/// The body is read as text first so a failed deserialization surfaces the
/// raw payload (the messaging API puts its error description there).
pub async fn post_use_json<REQ, RES>(
    url: &str,
    headers: Option<header::HeaderMap>,
    req: Option<&REQ>,
) -> Result<RES>
where
    REQ: Serialize,
    RES: DeserializeOwned,
{
    let res = send(
        Method::POST,
        url,
        headers,
        None,
        Some(|rb: RequestBuilder| {
            if let Some(r) = req {
                rb.json(r)
            } else {
                rb
            }
        }),
    )
    .await?;

    let res_body = res
        .text()
        .await
        .map_err(|e| anyhow!("Error reading response body: {}", e))?;

    serde_json::from_str(&res_body)
        .map_err(|e| anyhow!("Error parsing response JSON({}): {:?}", &res_body, e))
}

/// Sends an HTTP request using the specified method, URL, headers, and body.
///
/// A single attempt only, no retries; a failure is the caller's to handle.
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
    timeout: Option<Duration>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb = client.request(method, url);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(t) = timeout {
        rb = rb.timeout(t);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            LOGGER.info(format!("{} {} ms", visit_log, elapsed));
            Ok(response)
        }
        Err(why) => {
            LOGGER.error(format!("{} failed because {:?}. {} ms", visit_log, why, elapsed));
            Err(anyhow!(
                "Failed to send request to {} because {:?}",
                url,
                why
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_get() {
        dotenv::dotenv().ok();

        match get("https://httpbin.org/ip", None, Some(Duration::from_secs(10))).await {
            Ok(body) => println!("body: {}", body),
            Err(why) => println!("Failed to get because {:?}", why),
        }
    }
}
