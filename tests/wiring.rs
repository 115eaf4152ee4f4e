mod common;

use std::time::Duration;

use common::{config_with, dashboard, drain, endpoints, find, match_query, ok, sorted};
use matchstats_terminal::api::{FetchKind, ScorerOrder};
use matchstats_terminal::config::Config;
use matchstats_terminal::state::{
    DetailPhase, Endpoint, League, MatchSummary, Payload, ScorerRow, Source, StandingsRow,
    StatusFilter, Tab,
};

fn pl_config() -> Config {
    config_with(&[("DEFAULT_LEAGUE", "PL")])
}

#[test]
fn mount_refreshes_overview_once() {
    let (mut dash, _clock) = dashboard(&Config::default());
    assert!(dash.mount());
    assert!(dash.is_mounted());
    let sent = drain(&mut dash);
    assert_eq!(
        endpoints(&sent),
        sorted(vec![Endpoint::Stats, Endpoint::Matches, Endpoint::Logs])
    );
    assert!(dash.state().loading_matches);

    assert!(!dash.mount());
    assert!(drain(&mut dash).is_empty());
}

#[test]
fn mount_with_concrete_league_fetches_tables() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.mount();
    let sent = drain(&mut dash);
    assert_eq!(
        endpoints(&sent),
        sorted(vec![
            Endpoint::Stats,
            Endpoint::Matches,
            Endpoint::Logs,
            Endpoint::Standings,
            Endpoint::Scorers,
        ])
    );
    assert_eq!(match_query(&find(&sent, Endpoint::Matches)).league.as_deref(), Some("PL"));
    assert_eq!(
        find(&sent, Endpoint::Scorers).kind,
        FetchKind::Scorers {
            league: "PL".to_string(),
            order: ScorerOrder::Goals,
            lang: Default::default(),
        }
    );
}

#[test]
fn timer_refreshes_each_interval_until_unmount() {
    let (mut dash, clock) = dashboard(&Config::default());
    dash.mount();
    drain(&mut dash);

    clock.advance(Duration::from_secs(59));
    assert!(!dash.tick());
    clock.advance(Duration::from_secs(1));
    assert!(dash.tick());
    assert_eq!(drain(&mut dash).len(), 3);

    assert!(dash.unmount());
    assert!(!dash.unmount());
    clock.advance(Duration::from_secs(600));
    assert!(!dash.tick());
    assert!(drain(&mut dash).is_empty());
}

#[test]
fn tick_before_mount_does_nothing() {
    let (mut dash, clock) = dashboard(&Config::default());
    clock.advance(Duration::from_secs(120));
    assert!(!dash.tick());
    assert!(drain(&mut dash).is_empty());
}

#[test]
fn switching_to_secondary_refetches_matches_and_drops_tables() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.mount();
    let sent = drain(&mut dash);
    let standings = find(&sent, Endpoint::Standings);
    dash.apply(ok(
        &standings,
        Payload::Standings(vec![StandingsRow {
            team_name: "Arsenal FC".to_string(),
            ..StandingsRow::default()
        }]),
    ));
    assert_eq!(dash.state().standings.len(), 1);

    dash.set_source(Source::Secondary);
    let sent = drain(&mut dash);
    assert_eq!(endpoints(&sent), vec![Endpoint::Matches]);
    let query = match_query(&sent[0]);
    assert_eq!(query.source, Source::Secondary);
    assert_eq!(query.league, None);
    assert!(dash.state().standings.is_empty());
    assert!(dash.state().scorers.is_empty());
    assert_eq!(dash.filters().selected_group_date, None);
}

#[test]
fn switching_back_to_primary_refetches_tables() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.set_source(Source::Secondary);
    drain(&mut dash);

    dash.toggle_source();
    let sent = drain(&mut dash);
    assert_eq!(
        endpoints(&sent),
        sorted(vec![Endpoint::Matches, Endpoint::Standings, Endpoint::Scorers])
    );
}

#[test]
fn setting_the_same_value_is_a_no_op() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.set_source(Source::Primary);
    dash.set_league(League::Code("PL".to_string()));
    dash.set_status_filter(StatusFilter::All);
    dash.set_active_tab(Tab::Standings);
    assert!(drain(&mut dash).is_empty());
}

#[test]
fn league_change_on_primary_refetches_three_endpoints() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.set_league(League::Code("PD".to_string()));
    let sent = drain(&mut dash);
    assert_eq!(
        endpoints(&sent),
        sorted(vec![Endpoint::Matches, Endpoint::Standings, Endpoint::Scorers])
    );
    assert_eq!(match_query(&find(&sent, Endpoint::Matches)).league.as_deref(), Some("PD"));
    assert_eq!(
        find(&sent, Endpoint::Standings).kind,
        FetchKind::Standings {
            league: "PD".to_string(),
            lang: Default::default(),
        }
    );
}

#[test]
fn league_all_short_circuits_tables() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.mount();
    let sent = drain(&mut dash);
    let scorers = find(&sent, Endpoint::Scorers);

    dash.set_league(League::All);
    let sent = drain(&mut dash);
    assert_eq!(endpoints(&sent), vec![Endpoint::Matches]);
    assert_eq!(match_query(&sent[0]).league, None);

    // the in-flight scorers response for PL must not land after the switch
    dash.apply(ok(
        &scorers,
        Payload::Scorers(vec![ScorerRow {
            player_name: "Late".to_string(),
            ..ScorerRow::default()
        }]),
    ));
    assert!(dash.state().scorers.is_empty());
}

#[test]
fn league_change_on_secondary_is_stored_only() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.set_source(Source::Secondary);
    drain(&mut dash);

    dash.set_league(League::Code("SA".to_string()));
    assert!(drain(&mut dash).is_empty());
    assert_eq!(dash.filters().league, League::Code("SA".to_string()));
}

#[test]
fn cycle_league_wraps_through_all() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.cycle_league(true);
    assert_eq!(dash.filters().league, League::Code("PL".to_string()));
    dash.cycle_league(false);
    assert_eq!(dash.filters().league, League::All);
    dash.cycle_league(false);
    assert_eq!(dash.filters().league, League::Code("CL".to_string()));
}

#[test]
fn status_filter_refetches_matches_only() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.set_status_filter(StatusFilter::Finished);
    let sent = drain(&mut dash);
    assert_eq!(endpoints(&sent), vec![Endpoint::Matches]);
    assert_eq!(match_query(&sent[0]).status, StatusFilter::Finished);

    dash.set_source(Source::Secondary);
    drain(&mut dash);
    dash.cycle_status_filter();
    let sent = drain(&mut dash);
    assert_eq!(endpoints(&sent), vec![Endpoint::Matches]);
    assert_eq!(match_query(&sent[0]).status, StatusFilter::All);
}

#[test]
fn tab_change_fetches_the_matching_table() {
    let (mut dash, _clock) = dashboard(&pl_config());
    dash.set_active_tab(Tab::Assists);
    let sent = drain(&mut dash);
    assert_eq!(endpoints(&sent), vec![Endpoint::Scorers]);
    assert!(matches!(
        sent[0].kind,
        FetchKind::Scorers {
            order: ScorerOrder::Assists,
            ..
        }
    ));

    dash.cycle_tab();
    let sent = drain(&mut dash);
    assert_eq!(dash.filters().active_tab, Tab::Standings);
    assert_eq!(endpoints(&sent), vec![Endpoint::Standings]);
}

#[test]
fn tab_change_without_league_sends_nothing() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.set_active_tab(Tab::Scorers);
    assert!(drain(&mut dash).is_empty());
    assert_eq!(dash.filters().active_tab, Tab::Scorers);
}

#[test]
fn group_date_selection_needs_secondary_source() {
    let (mut dash, _clock) = dashboard(&Config::default());
    assert!(!dash.select_group_date("2024-05-01"));

    dash.set_source(Source::Secondary);
    let sent = drain(&mut dash);
    let rows = ["2024-05-01", "2024-05-02", "2024-05-01"]
        .iter()
        .map(|d| MatchSummary {
            group_date: Some(d.to_string()),
            ..MatchSummary::default()
        })
        .collect();
    dash.apply(ok(
        &sent[0],
        Payload::Matches {
            source: Source::Secondary,
            rows,
        },
    ));
    assert_eq!(dash.filters().selected_group_date.as_deref(), Some("2024-05-02"));

    assert!(dash.select_group_date("2024-05-01"));
    assert!(!dash.select_group_date("2023-01-01"));
    assert_eq!(dash.filters().selected_group_date.as_deref(), Some("2024-05-01"));

    dash.step_group_date(false);
    assert_eq!(dash.filters().selected_group_date.as_deref(), Some("2024-05-02"));
    dash.step_group_date(false);
    assert_eq!(dash.filters().selected_group_date.as_deref(), Some("2024-05-02"));
    assert!(drain(&mut dash).is_empty());
}

#[test]
fn primary_detail_shows_placeholder_then_fetches() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.mount();
    let sent = drain(&mut dash);
    let rows = vec![MatchSummary {
        fd_id: Some(42),
        home_team_name: Some("Arsenal".to_string()),
        away_team_name: Some("Chelsea".to_string()),
        home_score: Some(2),
        away_score: Some(1),
        ..MatchSummary::default()
    }];
    dash.apply(ok(
        &find(&sent, Endpoint::Matches),
        Payload::Matches {
            source: Source::Primary,
            rows,
        },
    ));

    dash.open_selected_detail();
    let view = dash.state().detail.as_ref().expect("detail open");
    assert_eq!(view.phase, DetailPhase::Pending);
    assert_eq!(view.detail.home_score.as_deref(), Some("2"));
    let sent = drain(&mut dash);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, FetchKind::Detail { match_id: 42 });
}

#[test]
fn secondary_detail_never_hits_the_network() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.set_source(Source::Secondary);
    drain(&mut dash);

    dash.open_detail(&MatchSummary {
        fd_id: Some(7),
        actual_score: Some("0:3".to_string()),
        ..MatchSummary::default()
    });
    let view = dash.state().detail.as_ref().expect("detail open");
    assert_eq!(view.phase, DetailPhase::SummaryOnly);
    assert_eq!(view.fd_id, None);
    assert_eq!(view.detail.away_score.as_deref(), Some("3"));
    assert!(drain(&mut dash).is_empty());

    dash.close_detail();
    assert!(dash.state().detail.is_none());
}

#[test]
fn opening_with_nothing_selected_logs() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.open_selected_detail();
    assert!(dash.state().detail.is_none());
    assert!(drain(&mut dash).is_empty());
    assert!(dash.state().logs.iter().any(|l| l.contains("No match selected")));
}

#[test]
fn dispatch_failure_is_applied_as_a_fetch_failure() {
    let (mut dash, _clock) = dashboard(&Config::default());
    dash.dispatcher_mut().fail = true;
    dash.mount();
    let state = dash.state();
    assert!(!state.loading_matches);
    assert_eq!(state.logs.len(), 3);
    assert!(state.logs.iter().all(|l| l.starts_with("[WARN]")));
    assert!(state.logs.iter().any(|l| l.contains("matches fetch failed: offline")));
}
