use serde_json::Value;

use crate::api_error::ApiError;
use crate::http_client::{api_base_url, get_text};
use crate::state::{PlayerRef, TeamRef};

const TEAMS_PATH: &str = "/api/teams";
const TEAMS_BY_COMPETITION_PATH: &str = "/api/teams_fd";
const PLAYERS_PATH: &str = "/api/players";

/// Fetch the selectable-team directory. With a competition code the filtered
/// endpoint is used; without one, the service's own team table.
pub fn fetch_teams(competition: Option<&str>) -> Result<Vec<TeamRef>, ApiError> {
    let base = api_base_url();
    let url = match competition.and_then(non_empty) {
        Some(code) => format!("{base}{TEAMS_BY_COMPETITION_PATH}?competition={code}"),
        None => format!("{base}{TEAMS_PATH}"),
    };
    let body = get_text(&url)?;
    parse_teams_json(&body)
}

pub fn fetch_players() -> Result<Vec<PlayerRef>, ApiError> {
    let body = get_text(&format!("{}{PLAYERS_PATH}", api_base_url()))?;
    parse_players_json(&body)
}

/// Directory rows come from two different upstreams with slightly different
/// shapes, so rows are picked apart tolerantly: ids may be strings or
/// numbers, rows missing id or name are skipped, response order is kept.
pub fn parse_teams_json(raw: &str) -> Result<Vec<TeamRef>, ApiError> {
    let rows = parse_rows(raw)?;
    let mut teams = Vec::new();
    for row in rows {
        let Some(id) = pick_string(&row, &["id"]) else {
            continue;
        };
        let Some(name) = pick_string(&row, &["name"]) else {
            continue;
        };
        let crest = pick_string(&row, &["crest"]);
        teams.push(TeamRef { id, name, crest });
    }
    Ok(teams)
}

pub fn parse_players_json(raw: &str) -> Result<Vec<PlayerRef>, ApiError> {
    let rows = parse_rows(raw)?;
    let mut players = Vec::new();
    for row in rows {
        let Some(id) = pick_string(&row, &["id"]) else {
            continue;
        };
        let Some(name) = pick_string(&row, &["name"]) else {
            continue;
        };
        let position = pick_string(&row, &["position", "pos"]).unwrap_or_default();
        let team = pick_string(&row, &["team"]);
        players.push(PlayerRef {
            id,
            name,
            position,
            team,
        });
    }
    Ok(players)
}

fn parse_rows(raw: &str) -> Result<Vec<Value>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value =
        serde_json::from_str(trimmed).map_err(|err| ApiError::Parse(err.to_string()))?;
    match root {
        Value::Array(rows) => Ok(rows),
        _ => Err(ApiError::Parse("expected a json array".to_string())),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key)
            && let Some(s) = as_string(v)
        {
            return Some(s);
        }
    }
    None
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
