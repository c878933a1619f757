use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::api_error::ApiError;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs()))
            .build()
            .context("failed to build http client")
    })
}

/// Base URL of the prediction service. The one piece of configuration the
/// client strictly needs; everything else has workable defaults.
pub fn api_base_url() -> String {
    match std::env::var("API_BASE_URL") {
        Ok(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// Bounded wait for every request, so an unresponsive service surfaces as a
/// `Timeout` failure instead of an indefinite loading state.
pub fn request_timeout_secs() -> u64 {
    std::env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
        .clamp(1, 120)
}

pub(crate) fn get_text(url: &str) -> Result<String, ApiError> {
    let client = client()?;
    let resp = client.get(url).send().map_err(ApiError::from_transport)?;
    read_body(resp)
}

pub(crate) fn post_json(url: &str, body: &Value) -> Result<String, ApiError> {
    let client = client()?;
    let resp = client
        .post(url)
        .json(body)
        .send()
        .map_err(ApiError::from_transport)?;
    read_body(resp)
}

fn client() -> Result<&'static Client, ApiError> {
    http_client().map_err(|err| ApiError::Network(format!("http client init: {err}")))
}

fn read_body(resp: reqwest::blocking::Response) -> Result<String, ApiError> {
    let status = resp.status();
    let body = resp.text().map_err(ApiError::from_transport)?;
    if !status.is_success() {
        return Err(ApiError::from_status(status, &body));
    }
    Ok(body)
}
