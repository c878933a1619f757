use std::fs;
use std::path::PathBuf;

use matchday_terminal::api_error::ApiError;
use matchday_terminal::directory_fetch::{parse_players_json, parse_teams_json};
use matchday_terminal::predict_fetch::{parse_ingest_ack, parse_prediction_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_teams_fixture_in_response_order() {
    let raw = read_fixture("teams.json");
    let teams = parse_teams_json(&raw).expect("fixture should parse");
    // The id-less row is skipped; the rest keep server order.
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[0].id, "57");
    assert_eq!(teams[0].name, "Arsenal");
    assert_eq!(
        teams[0].crest.as_deref(),
        Some("https://crests.football-data.org/57.png")
    );
    assert_eq!(teams[1].id, "402");
    assert!(teams[1].crest.is_none());
    assert_eq!(teams[2].name, "Liverpool");
}

#[test]
fn team_ids_normalize_from_numbers_and_strings() {
    let raw = r#"[{"id": 7, "name": "Seven"}, {"id": "eight", "name": "Eight"}]"#;
    let teams = parse_teams_json(raw).expect("should parse");
    assert_eq!(teams[0].id, "7");
    assert_eq!(teams[1].id, "eight");
}

#[test]
fn teams_null_body_is_empty() {
    assert!(parse_teams_json("null").expect("null should parse").is_empty());
    assert!(parse_teams_json("  ").expect("blank should parse").is_empty());
}

#[test]
fn teams_malformed_body_is_parse_error() {
    assert!(matches!(
        parse_teams_json("{not json"),
        Err(ApiError::Parse(_))
    ));
    // A valid body of the wrong shape is just as unusable.
    assert!(matches!(
        parse_teams_json(r#"{"teams": []}"#),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn parses_players_fixture() {
    let raw = read_fixture("players.json");
    let players = parse_players_json(&raw).expect("fixture should parse");
    assert_eq!(players.len(), 3);
    assert_eq!(players[0].name, "Bukayo Saka");
    assert_eq!(players[0].position, "FW");
    assert_eq!(players[0].team.as_deref(), Some("Arsenal"));
    // Missing position falls back to empty rather than dropping the row.
    assert_eq!(players[2].name, "Trialist");
    assert!(players[2].position.is_empty());
    assert!(players[2].team.is_none());
}

#[test]
fn parses_prediction_fixture_ignoring_extra_fields() {
    let raw = read_fixture("prediction.json");
    let result = parse_prediction_json(&raw).expect("fixture should parse");
    assert!((result.home_win - 0.45).abs() < f64::EPSILON);
    assert!((result.draw - 0.30).abs() < f64::EPSILON);
    assert!((result.away_win - 0.25).abs() < f64::EPSILON);
}

#[test]
fn prediction_missing_field_is_parse_error() {
    assert!(matches!(
        parse_prediction_json(r#"{"home_win": 0.6}"#),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn prediction_non_numeric_field_is_parse_error() {
    assert!(matches!(
        parse_prediction_json(r#"{"home_win": "high", "draw": 0.2, "away_win": 0.2}"#),
        Err(ApiError::Parse(_))
    ));
}

#[test]
fn prediction_degenerate_sum_is_accepted() {
    let result = parse_prediction_json(r#"{"home_win": 0.9, "draw": 0.9, "away_win": 0.9}"#)
        .expect("degenerate sums are the presenter's problem, not a parse failure");
    assert!((result.home_win - 0.9).abs() < f64::EPSILON);
}

#[test]
fn ingest_ack_prefers_the_service_message() {
    let ack = parse_ingest_ack(r#"{"status": "success", "players_added": 512, "message": "FBref data loaded successfully"}"#);
    assert_eq!(ack, "FBref data loaded successfully");
}

#[test]
fn ingest_ack_falls_back_on_unreadable_bodies() {
    assert_eq!(parse_ingest_ack("ok"), "remote ingestion triggered");
    assert_eq!(parse_ingest_ack(r#"{"status": "success"}"#), "remote ingestion triggered");
}
