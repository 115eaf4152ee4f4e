use std::fs;
use std::path::PathBuf;

use matchstats_terminal::api::{
    parse_logs_json, parse_match_detail_json, parse_matches_json, parse_scorers_json,
    parse_standings_json, parse_stats_json,
};
use matchstats_terminal::state::Source;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_fd_matches_fixture() {
    let raw = read_fixture("fd_matches.json");
    let rows = parse_matches_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fd_id, Some(498012));
    assert_eq!(rows[0].home(), "Arsenal FC");
    assert_eq!(rows[0].league_code.as_deref(), Some("PL"));
    assert_eq!(rows[0].score_pair(), Some(("2".to_string(), "1".to_string())));
    assert_eq!(rows[1].score_pair(), None);
    assert_eq!(rows[1].status.as_deref(), Some("TIMED"));
}

#[test]
fn parses_sporttery_matches_through_aliases() {
    let raw = read_fixture("sporttery_matches.json");
    let rows = parse_matches_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].home(), "阿森纳");
    assert_eq!(rows[0].away(), "切尔西");
    assert_eq!(rows[0].league_code.as_deref(), Some("英超"));
    assert_eq!(rows[0].match_date.as_deref(), Some("2024-05-01 19:30:00"));
    assert_eq!(rows[0].fd_id, None);
    assert_eq!(rows[0].score_pair(), Some(("2".to_string(), "1".to_string())));
    assert_eq!(rows[2].score_pair(), None);
    assert_eq!(rows[0].half_score.as_deref(), Some("1:0"));
    assert!(rows.iter().all(|m| m.prediction_text().is_none()));
}

#[test]
fn prediction_payload_renders_when_present() {
    let raw = r#"{"data": [
        {"match_code": "周三001", "group_date": "2024-05-01", "home_team": "阿森纳",
         "away_team": "切尔西", "league": "英超", "match_time": "2024-05-01 19:30:00",
         "status": "pending", "prediction": {"result": "主胜", "confidence": 0.62}},
        {"match_code": "周三002", "group_date": "2024-05-01", "home_team": "A",
         "away_team": "B", "league": "英超", "match_time": "2024-05-01 21:30:00",
         "status": "pending", "prediction": null}
    ]}"#;
    let rows = parse_matches_json(raw).expect("should parse");
    let prediction = rows[0].prediction_text().expect("prediction present");
    assert!(prediction.contains("result: 主胜"));
    assert!(prediction.contains("confidence: 0.62"));
    assert_eq!(rows[1].prediction_text(), None);
}

#[test]
fn secondary_placeholder_splits_actual_score() {
    let raw = read_fixture("sporttery_matches.json");
    let rows = parse_matches_json(&raw).expect("fixture should parse");

    let detail = rows[0].placeholder_detail(Source::Secondary);
    assert_eq!(detail.home_score.as_deref(), Some("2"));
    assert_eq!(detail.away_score.as_deref(), Some("1"));
    assert_eq!(detail.home_team_name.as_deref(), Some("阿森纳"));

    let pending = rows[1].placeholder_detail(Source::Secondary);
    assert_eq!(pending.home_score, None);
    assert_eq!(pending.away_score, None);
}

#[test]
fn primary_placeholder_defaults_scores_to_zero() {
    let raw = read_fixture("fd_matches.json");
    let rows = parse_matches_json(&raw).expect("fixture should parse");
    let detail = rows[1].placeholder_detail(Source::Primary);
    assert_eq!(detail.match_id, Some(498013));
    assert_eq!(detail.home_score.as_deref(), Some("0"));
    assert_eq!(detail.away_score.as_deref(), Some("0"));
    assert!(detail.goals.is_empty());
    assert!(detail.lineup_home.is_empty());
}

#[test]
fn parses_standings_fixture() {
    let raw = read_fixture("standings.json");
    let rows = parse_standings_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team_name, "Arsenal FC");
    assert_eq!(rows[0].position, Some(1));
    assert_eq!(rows[0].goal_difference(), 55);
    // no goal_diff field: derived from goals for/against
    assert_eq!(rows[1].goal_difference(), 53);
}

#[test]
fn parses_scorers_fixture() {
    let raw = read_fixture("scorers.json");
    let rows = parse_scorers_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].player_name, "Erling Haaland");
    assert_eq!(rows[0].goals, Some(25));
    assert_eq!(rows[0].assists, Some(5));
    assert_eq!(rows[0].position, Some(1));
    assert_eq!(rows[1].position, None);
    assert_eq!(rows[1].assists, None);
    assert_eq!(rows[1].penalties, Some(9));
}

#[test]
fn scorer_rank_is_an_integer() {
    let raw = r#"{"success":true,"data":[{"league_code":"PD","season":2023,"player_id":44,
        "player_name":"Jude Bellingham","team_id":86,"team_name":"Real Madrid CF",
        "position":3,"goals":19,"assists":6,"penalties":0,"played_matches":28}],"total":1}"#;
    let rows = parse_scorers_json(raw).expect("integer position should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].position, Some(3));
    assert_eq!(rows[0].goals, Some(19));
}

#[test]
fn parses_match_details_fixture() {
    let raw = read_fixture("match_details.json");
    let detail = parse_match_detail_json(&raw)
        .expect("fixture should parse")
        .expect("success response has data");
    assert_eq!(detail.match_id, Some(498012));
    assert_eq!(detail.venue.as_deref(), Some("Emirates Stadium"));
    assert_eq!(detail.away_red_cards, 1);
    assert_eq!(detail.goals.len(), 3);
    assert_eq!(detail.goals[1].minute_extra, Some(2));
    assert_eq!(detail.goals[1].kind.as_deref(), Some("PENALTY"));
    assert_eq!(detail.lineup_home.len(), 2);
    assert_eq!(detail.lineup_home[0].shirt_number, Some(22));
    assert_eq!(detail.lineup_away[0].shirt_number, Some(20));
    assert_eq!(detail.bench_home.len(), 1);
    assert_eq!(detail.bench_home[0].shirt_number, None);
    assert!(detail.bench_away.is_empty());
    assert_eq!(detail.referee.as_deref(), Some("Michael Oliver"));
    assert_eq!(detail.home_goal_count, 2);
    assert_eq!(detail.goals[2].kind.as_deref(), Some("OWN_GOAL"));
    assert_eq!(detail.goals[0].home_away.as_deref(), Some("home"));
    // team names and kickoff come from the match summary, not this payload
    assert_eq!(detail.home_team_name, None);
}

#[test]
fn unsuccessful_detail_is_none() {
    let raw = r#"{"success": false, "data": null, "message": "not synced"}"#;
    assert!(parse_match_detail_json(raw).expect("should parse").is_none());
    let raw = r#"{"success": false, "data": {"match_id": 1}}"#;
    assert!(parse_match_detail_json(raw).expect("should parse").is_none());
}

#[test]
fn parses_stats_and_logs_fixtures() {
    let stats = parse_stats_json(&read_fixture("stats.json")).expect("stats should parse");
    assert_eq!(stats.fd_matches, 1520);
    assert_eq!(stats.sporttery_matches, 348);
    assert_eq!(stats.last_sync.as_deref(), Some("2024-05-01T10:00:00.123456"));

    let logs = parse_logs_json(&read_fixture("logs.json")).expect("logs should parse");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].source, "football_data");
    assert_eq!(logs[1].error_message.as_deref(), Some("upstream timeout"));
    assert_eq!(logs[1].finished_at, None);
    assert_eq!(logs[1].retry_count, 2);
    assert_eq!(logs[0].id, Some(91));
    assert_eq!(logs[0].records_count, 380);
}

#[test]
fn null_and_empty_bodies_are_empty() {
    assert!(parse_matches_json("null").expect("null should parse").is_empty());
    assert!(parse_standings_json("  ").expect("blank should parse").is_empty());
    assert!(parse_scorers_json("{}").expect("missing data should parse").is_empty());
    assert!(parse_logs_json(r#"{"data": null}"#).expect("null data").is_empty());
    assert_eq!(parse_stats_json("null").expect("null stats").fd_matches, 0);
    assert!(parse_match_detail_json("").expect("blank detail").is_none());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(parse_matches_json("{\"data\": [").is_err());
    assert!(parse_stats_json("<html>").is_err());
}
