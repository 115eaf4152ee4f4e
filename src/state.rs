use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{FetchFailed, FetchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Source {
    /// football-data.org mirror: matches, standings, scorers.
    #[default]
    Primary,
    /// Sporttery pools: matches bucketed by group date, with predictions.
    Secondary,
}

impl Source {
    pub fn toggled(self) -> Self {
        match self {
            Source::Primary => Source::Secondary,
            Source::Secondary => Source::Primary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum League {
    #[default]
    All,
    Code(String),
}

impl League {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("ALL") {
            League::All
        } else {
            League::Code(trimmed.to_ascii_uppercase())
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            League::All => None,
            League::Code(code) => Some(code.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, League::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Live,
    Finished,
}

impl StatusFilter {
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Live,
            StatusFilter::Live => StatusFilter::Finished,
            StatusFilter::Finished => StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Standings,
    Scorers,
    Assists,
}

impl Tab {
    pub fn cycle(self) -> Self {
        match self {
            Tab::Standings => Tab::Scorers,
            Tab::Scorers => Tab::Assists,
            Tab::Assists => Tab::Standings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub source: Source,
    pub league: League,
    pub status_filter: StatusFilter,
    /// Only meaningful for `Source::Secondary`; cleared on every source switch.
    pub selected_group_date: Option<String>,
    pub active_tab: Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Stats,
    Logs,
    Matches,
    Standings,
    Scorers,
    Detail,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Stats,
        Endpoint::Logs,
        Endpoint::Matches,
        Endpoint::Standings,
        Endpoint::Scorers,
        Endpoint::Detail,
    ];

    fn slot(self) -> usize {
        match self {
            Endpoint::Stats => 0,
            Endpoint::Logs => 1,
            Endpoint::Matches => 2,
            Endpoint::Standings => 3,
            Endpoint::Scorers => 4,
            Endpoint::Detail => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Stats => "stats",
            Endpoint::Logs => "logs",
            Endpoint::Matches => "matches",
            Endpoint::Standings => "standings",
            Endpoint::Scorers => "scorers",
            Endpoint::Detail => "match details",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-endpoint request generations. Only a response carrying the latest
/// issued generation for its endpoint may touch the store.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    issued: [u64; 6],
}

impl RequestTracker {
    pub fn issue(&mut self, endpoint: Endpoint) -> u64 {
        let slot = &mut self.issued[endpoint.slot()];
        *slot += 1;
        *slot
    }

    /// Retires whatever is in flight for `endpoint` without dispatching anything.
    pub fn invalidate(&mut self, endpoint: Endpoint) {
        self.issue(endpoint);
    }

    pub fn latest(&self, endpoint: Endpoint) -> u64 {
        self.issued[endpoint.slot()]
    }

    pub fn is_latest(&self, endpoint: Endpoint, generation: u64) -> bool {
        generation != 0 && self.latest(endpoint) == generation
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub fd_matches: u64,
    #[serde(default)]
    pub sporttery_matches: u64,
    #[serde(default)]
    pub last_sync: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLog {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub records_count: i64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub retry_count: i64,
}

/// One row of either source's match list. Secondary rows use different field
/// names (`home_team`, `match_time`, `league`), accepted through aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(default)]
    pub fd_id: Option<i64>,
    #[serde(default)]
    pub match_code: Option<String>,
    #[serde(default, alias = "league")]
    pub league_code: Option<String>,
    #[serde(default, alias = "home_team")]
    pub home_team_name: Option<String>,
    #[serde(default, alias = "away_team")]
    pub away_team_name: Option<String>,
    #[serde(default)]
    pub home_score: Option<i64>,
    #[serde(default)]
    pub away_score: Option<i64>,
    #[serde(default)]
    pub actual_score: Option<String>,
    #[serde(default)]
    pub half_score: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "match_time")]
    pub match_date: Option<String>,
    #[serde(default)]
    pub group_date: Option<String>,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub prediction: Option<Value>,
}

impl MatchSummary {
    pub fn home(&self) -> &str {
        self.home_team_name.as_deref().unwrap_or("-")
    }

    pub fn away(&self) -> &str {
        self.away_team_name.as_deref().unwrap_or("-")
    }

    /// Score pair as text, `None` when the source has not reported one yet.
    pub fn score_pair(&self) -> Option<(String, String)> {
        if let (Some(home), Some(away)) = (self.home_score, self.away_score) {
            return Some((home.to_string(), away.to_string()));
        }
        self.actual_score.as_deref().and_then(split_score)
    }

    /// Short one-line rendering of the prediction payload, if any.
    pub fn prediction_text(&self) -> Option<String> {
        let prediction = self.prediction.as_ref()?;
        let text = match prediction {
            Value::Null => return None,
            Value::String(s) => s.trim().to_string(),
            Value::Object(map) => map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{k}: {s}"),
                    other => format!("{k}: {other}"),
                })
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        };
        if text.is_empty() { None } else { Some(text) }
    }

    /// The partial record shown while the real detail loads.
    pub fn placeholder_detail(&self, source: Source) -> MatchDetail {
        let (home_score, away_score) = match source {
            Source::Primary => (
                Some(self.home_score.unwrap_or(0).to_string()),
                Some(self.away_score.unwrap_or(0).to_string()),
            ),
            Source::Secondary => match self.actual_score.as_deref().and_then(split_score) {
                Some((home, away)) => (Some(home), Some(away)),
                None => (None, None),
            },
        };
        MatchDetail {
            match_id: self.fd_id,
            home_team_name: self.home_team_name.clone(),
            away_team_name: self.away_team_name.clone(),
            status: self.status.clone(),
            match_date: self.match_date.clone(),
            home_score,
            away_score,
            referee: self.referee.clone(),
            ..MatchDetail::default()
        }
    }
}

fn split_score(raw: &str) -> Option<(String, String)> {
    let (home, away) = raw.split_once(':')?;
    let home = home.trim();
    let away = away.trim();
    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home.to_string(), away.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    #[serde(default)]
    pub league_code: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub season: Option<i64>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub played_games: Option<i64>,
    #[serde(default)]
    pub won: Option<i64>,
    #[serde(default)]
    pub draw: Option<i64>,
    #[serde(default)]
    pub lost: Option<i64>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub goals_for: Option<i64>,
    #[serde(default)]
    pub goals_against: Option<i64>,
    #[serde(default)]
    pub goal_diff: Option<i64>,
}

impl StandingsRow {
    pub fn goal_difference(&self) -> i64 {
        self.goal_diff.unwrap_or_else(|| {
            self.goals_for.unwrap_or(0) - self.goals_against.unwrap_or(0)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorerRow {
    #[serde(default)]
    pub league_code: Option<String>,
    #[serde(default)]
    pub player_id: Option<i64>,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub team_name: String,
    /// Rank in the league's scorer table.
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub goals: Option<i64>,
    #[serde(default)]
    pub assists: Option<i64>,
    #[serde(default)]
    pub penalties: Option<i64>,
    #[serde(default)]
    pub played_matches: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalEvent {
    #[serde(default)]
    pub minute: Option<u32>,
    #[serde(default)]
    pub minute_extra: Option<u32>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub home_away: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineupPlayer {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, alias = "shirtNumber")]
    pub shirt_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(default)]
    pub match_id: Option<i64>,
    #[serde(default)]
    pub home_team_name: Option<String>,
    #[serde(default)]
    pub away_team_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub match_date: Option<String>,
    #[serde(default)]
    pub home_score: Option<String>,
    #[serde(default)]
    pub away_score: Option<String>,
    #[serde(default)]
    pub home_formation: Option<String>,
    #[serde(default)]
    pub away_formation: Option<String>,
    #[serde(default)]
    pub home_coach_name: Option<String>,
    #[serde(default)]
    pub away_coach_name: Option<String>,
    #[serde(default)]
    pub home_goal_count: u32,
    #[serde(default)]
    pub away_goal_count: u32,
    #[serde(default)]
    pub home_yellow_cards: u32,
    #[serde(default)]
    pub away_yellow_cards: u32,
    #[serde(default)]
    pub home_red_cards: u32,
    #[serde(default)]
    pub away_red_cards: u32,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub goals: Vec<GoalEvent>,
    #[serde(default)]
    pub lineup_home: Vec<LineupPlayer>,
    #[serde(default)]
    pub lineup_away: Vec<LineupPlayer>,
    #[serde(default)]
    pub bench_home: Vec<LineupPlayer>,
    #[serde(default)]
    pub bench_away: Vec<LineupPlayer>,
}

impl MatchDetail {
    /// Lays the authoritative record over the placeholder. Team names, status
    /// and kickoff stay as the summary had them; the rest comes from `full`.
    pub fn overlay(placeholder: &MatchDetail, mut full: MatchDetail) -> MatchDetail {
        if placeholder.home_team_name.is_some() {
            full.home_team_name = placeholder.home_team_name.clone();
        }
        if placeholder.away_team_name.is_some() {
            full.away_team_name = placeholder.away_team_name.clone();
        }
        if placeholder.status.is_some() {
            full.status = placeholder.status.clone();
        }
        if placeholder.match_date.is_some() {
            full.match_date = placeholder.match_date.clone();
        }
        if full.home_score.is_none() {
            full.home_score = placeholder.home_score.clone();
        }
        if full.away_score.is_none() {
            full.away_score = placeholder.away_score.clone();
        }
        if full.match_id.is_none() {
            full.match_id = placeholder.match_id;
        }
        if full.referee.is_none() {
            full.referee = placeholder.referee.clone();
        }
        full
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    /// Placeholder on screen, backend detail in flight.
    Pending,
    /// Placeholder is all there is (secondary source, missing or failed detail).
    SummaryOnly,
    Loaded,
}

#[derive(Debug, Clone)]
pub struct DetailView {
    pub source: Source,
    pub fd_id: Option<i64>,
    pub detail: MatchDetail,
    pub phase: DetailPhase,
}

#[derive(Debug, Clone)]
pub enum Payload {
    Stats(Stats),
    Logs(Vec<SyncLog>),
    Matches {
        source: Source,
        rows: Vec<MatchSummary>,
    },
    Standings(Vec<StandingsRow>),
    Scorers(Vec<ScorerRow>),
    Detail {
        match_id: i64,
        detail: Option<MatchDetail>,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    Fetched {
        endpoint: Endpoint,
        generation: u64,
        result: Result<Payload, FetchFailed>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Fetch(FetchRequest),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub filters: FilterState,
    pub stats: Stats,
    pub sync_logs: Vec<SyncLog>,
    pub matches: Vec<MatchSummary>,
    pub standings: Vec<StandingsRow>,
    pub scorers: Vec<ScorerRow>,
    pub loading_matches: bool,
    pub detail: Option<DetailView>,
    pub selected: usize,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub requests: RequestTracker,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_filters(FilterState::default())
    }

    pub fn with_filters(filters: FilterState) -> Self {
        Self {
            filters,
            stats: Stats::default(),
            sync_logs: Vec::new(),
            matches: Vec::with_capacity(128),
            standings: Vec::with_capacity(24),
            scorers: Vec::with_capacity(24),
            loading_matches: false,
            detail: None,
            selected: 0,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
            requests: RequestTracker::default(),
        }
    }

    /// Distinct group dates of the fetched secondary matches, newest first.
    pub fn available_group_dates(&self) -> Vec<String> {
        if self.filters.source != Source::Secondary {
            return Vec::new();
        }
        let mut dates: Vec<String> = self
            .matches
            .iter()
            .filter_map(|m| m.group_date.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }

    pub fn display_matches(&self) -> Vec<&MatchSummary> {
        match (self.filters.source, self.filters.selected_group_date.as_deref()) {
            (Source::Secondary, Some(date)) => self
                .matches
                .iter()
                .filter(|m| m.group_date.as_deref().map(str::trim) == Some(date))
                .collect(),
            _ => self.matches.iter().collect(),
        }
    }

    pub fn selected_match(&self) -> Option<&MatchSummary> {
        self.display_matches().get(self.selected).copied()
    }

    /// Keeps the group date pointing at something that exists, falling back
    /// to the most recent date available.
    pub fn ensure_group_date(&mut self) {
        if self.filters.source != Source::Secondary {
            self.filters.selected_group_date = None;
            return;
        }
        let dates = self.available_group_dates();
        let valid = self
            .filters
            .selected_group_date
            .as_ref()
            .is_some_and(|d| dates.contains(d));
        if !valid {
            self.filters.selected_group_date = dates.into_iter().next();
            self.selected = 0;
        }
    }

    pub fn select_next(&mut self) {
        let total = self.display_matches().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.display_matches().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn clear_endpoint(&mut self, endpoint: Endpoint) {
        match endpoint {
            Endpoint::Stats => self.stats = Stats::default(),
            Endpoint::Logs => self.sync_logs.clear(),
            Endpoint::Matches => {
                self.matches.clear();
                self.clamp_selection();
            }
            Endpoint::Standings => self.standings.clear(),
            Endpoint::Scorers => self.scorers.clear(),
            Endpoint::Detail => {
                if let Some(view) = self.detail.as_mut()
                    && view.phase == DetailPhase::Pending
                {
                    view.phase = DetailPhase::SummaryOnly;
                }
            }
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Fetched {
            endpoint,
            generation,
            result,
        } => {
            if !state.requests.is_latest(endpoint, generation) {
                return;
            }
            if endpoint == Endpoint::Matches {
                state.loading_matches = false;
            }
            match result {
                Ok(payload) => apply_payload(state, payload),
                Err(err) => {
                    state.push_log(format!("[WARN] {err}"));
                    state.clear_endpoint(endpoint);
                }
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn apply_payload(state: &mut AppState, payload: Payload) {
    match payload {
        Payload::Stats(stats) => state.stats = stats,
        Payload::Logs(rows) => state.sync_logs = rows,
        Payload::Matches { source, rows } => {
            if source != state.filters.source {
                return;
            }
            state.matches = rows;
            if source == Source::Secondary {
                state.ensure_group_date();
            }
            state.clamp_selection();
        }
        Payload::Standings(rows) => state.standings = rows,
        Payload::Scorers(rows) => state.scorers = rows,
        Payload::Detail { match_id, detail } => {
            let Some(view) = state.detail.as_mut() else {
                return;
            };
            if view.fd_id != Some(match_id) {
                return;
            }
            match detail {
                Some(full) => {
                    view.detail = MatchDetail::overlay(&view.detail, full);
                    view.phase = DetailPhase::Loaded;
                }
                None => {
                    view.phase = DetailPhase::SummaryOnly;
                    state.push_log(format!("[INFO] No details yet for match {match_id}"));
                }
            }
        }
    }
}
