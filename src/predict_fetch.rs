use serde_json::{Value, json};

use crate::api_error::ApiError;
use crate::http_client::{api_base_url, post_json};
use crate::state::PredictionResult;

const PREDICT_PATH: &str = "/api/predict";
const INGEST_PATH: &str = "/api/fetch-fbref";

/// Request a match-outcome prediction for two directory ids.
pub fn predict_match(home_team: &str, away_team: &str) -> Result<PredictionResult, ApiError> {
    let url = format!("{}{PREDICT_PATH}", api_base_url());
    let body = json!({ "home_team": home_team, "away_team": away_team });
    let raw = post_json(&url, &body)?;
    parse_prediction_json(&raw)
}

/// All three probability fields are required; a 2xx body missing any of them
/// is a parse failure, not a zero-filled result. Extra fields (the live
/// service also returns a confidence score) are ignored.
pub fn parse_prediction_json(raw: &str) -> Result<PredictionResult, ApiError> {
    serde_json::from_str::<PredictionResult>(raw.trim())
        .map_err(|err| ApiError::Parse(err.to_string()))
}

/// Ask the service to pull fresh data from its upstream source. Returns the
/// ack message; the caller is expected to reload the directory afterwards.
pub fn trigger_ingest() -> Result<String, ApiError> {
    let url = format!("{}{INGEST_PATH}", api_base_url());
    let raw = post_json(&url, &json!({}))?;
    Ok(parse_ingest_ack(&raw))
}

/// The ack body is advisory only; anything unreadable falls back to a
/// generic message rather than failing a request that already succeeded.
pub fn parse_ingest_ack(raw: &str) -> String {
    const FALLBACK: &str = "remote ingestion triggered";
    let Ok(root) = serde_json::from_str::<Value>(raw.trim()) else {
        return FALLBACK.to_string();
    };
    root.get("message")
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK.to_string())
}
