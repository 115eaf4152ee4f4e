//! Filter transitions and the refresh timer. Every filter change goes through
//! a handler here, which decides which endpoints to refetch.

use crate::api::{FetchFailed, FetchKind, FetchRequest, MatchQuery, ScorerOrder};
use crate::config::Config;
use crate::labels::Lang;
use crate::poller::{Clock, Poller};
use crate::state::{
    AppState, Delta, DetailPhase, DetailView, Endpoint, FilterState, League, MatchSummary, Source,
    StatusFilter, Tab, apply_delta,
};

/// Hands a request to whatever performs the I/O.
pub trait Dispatch {
    fn dispatch(&mut self, request: FetchRequest) -> Result<(), FetchFailed>;
}

#[derive(Debug, Clone)]
struct FetchSettings {
    match_limit: u32,
    logs_limit: u32,
    lang: Lang,
    leagues: Vec<String>,
}

pub struct Dashboard<D: Dispatch, C: Clock> {
    state: AppState,
    settings: FetchSettings,
    dispatcher: D,
    poller: Poller<C>,
}

impl<D: Dispatch, C: Clock> Dashboard<D, C> {
    pub fn new(config: &Config, dispatcher: D, clock: C) -> Self {
        let filters = FilterState {
            league: config.default_league.clone(),
            ..FilterState::default()
        };
        Self {
            state: AppState::with_filters(filters),
            settings: FetchSettings {
                match_limit: config.match_limit,
                logs_limit: config.logs_limit,
                lang: config.lang,
                leagues: config.leagues.clone(),
            },
            dispatcher,
            poller: Poller::new(clock, config.poll_interval),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn filters(&self) -> &FilterState {
        &self.state.filters
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn is_mounted(&self) -> bool {
        self.poller.is_running()
    }

    /// First refresh plus timer start. A second mount is a no-op.
    pub fn mount(&mut self) -> bool {
        if !self.poller.start() {
            return false;
        }
        self.refresh_all();
        true
    }

    /// Stops the timer. Returns false if it was already stopped.
    pub fn unmount(&mut self) -> bool {
        self.poller.stop()
    }

    /// Call once per frame; refreshes everything when the interval has elapsed.
    pub fn tick(&mut self) -> bool {
        if !self.poller.poll_due() {
            return false;
        }
        self.refresh_all();
        true
    }

    pub fn refresh_all(&mut self) {
        self.fetch_stats();
        self.fetch_matches();
        self.fetch_logs();
        if self.state.filters.source == Source::Primary {
            self.fetch_standings();
            self.fetch_scorers();
        }
    }

    pub fn apply(&mut self, delta: Delta) {
        apply_delta(&mut self.state, delta);
    }

    pub fn set_source(&mut self, source: Source) {
        if self.state.filters.source == source {
            return;
        }
        self.state.filters.source = source;
        self.state.filters.selected_group_date = None;
        self.state.selected = 0;
        self.fetch_matches();
        if source == Source::Primary {
            self.fetch_standings();
            self.fetch_scorers();
        } else {
            self.clear_standings();
            self.clear_scorers();
        }
    }

    pub fn toggle_source(&mut self) {
        let next = self.state.filters.source.toggled();
        self.set_source(next);
    }

    pub fn set_league(&mut self, league: League) {
        if self.state.filters.league == league {
            return;
        }
        self.state.filters.league = league;
        if self.state.filters.source != Source::Primary {
            return;
        }
        self.state.selected = 0;
        self.fetch_matches();
        self.fetch_standings();
        self.fetch_scorers();
    }

    /// Steps through `ALL` followed by the configured league codes.
    pub fn cycle_league(&mut self, forward: bool) {
        let mut options = vec![League::All];
        options.extend(self.settings.leagues.iter().cloned().map(League::Code));
        let current = options
            .iter()
            .position(|l| *l == self.state.filters.league)
            .unwrap_or(0);
        let len = options.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        let league = options.swap_remove(next);
        self.set_league(league);
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        if self.state.filters.status_filter == filter {
            return;
        }
        self.state.filters.status_filter = filter;
        self.state.selected = 0;
        self.fetch_matches();
    }

    pub fn cycle_status_filter(&mut self) {
        let next = self.state.filters.status_filter.cycle();
        self.set_status_filter(next);
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        if self.state.filters.active_tab == tab {
            return;
        }
        self.state.filters.active_tab = tab;
        if tab != Tab::Standings {
            self.fetch_scorers();
        } else {
            self.fetch_standings();
        }
    }

    pub fn cycle_tab(&mut self) {
        let next = self.state.filters.active_tab.cycle();
        self.set_active_tab(next);
    }

    /// Picks a group date among the available ones. Ignored for the primary source.
    pub fn select_group_date(&mut self, date: &str) -> bool {
        if self.state.filters.source != Source::Secondary {
            return false;
        }
        if !self.state.available_group_dates().iter().any(|d| d == date) {
            return false;
        }
        self.state.filters.selected_group_date = Some(date.to_string());
        self.state.selected = 0;
        true
    }

    /// `forward` moves toward older dates (the list is newest first).
    pub fn step_group_date(&mut self, forward: bool) {
        let dates = self.state.available_group_dates();
        if dates.is_empty() {
            return;
        }
        let current = self
            .state
            .filters
            .selected_group_date
            .as_ref()
            .and_then(|d| dates.iter().position(|x| x == d));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(idx), true) => (idx + 1).min(dates.len() - 1),
            (Some(idx), false) => idx.saturating_sub(1),
        };
        self.select_group_date(&dates[next]);
    }

    pub fn select_next(&mut self) {
        self.state.select_next();
    }

    pub fn select_prev(&mut self) {
        self.state.select_prev();
    }

    pub fn toggle_help(&mut self) {
        self.state.help_overlay = !self.state.help_overlay;
    }

    pub fn open_selected_detail(&mut self) {
        let Some(summary) = self.state.selected_match().cloned() else {
            self.state.push_log("[INFO] No match selected for details");
            return;
        };
        self.open_detail(&summary);
    }

    /// Shows the summary-derived placeholder at once; for primary matches the
    /// full record is requested and laid over it when it arrives.
    pub fn open_detail(&mut self, summary: &MatchSummary) {
        let source = self.state.filters.source;
        let fd_id = match source {
            Source::Primary => summary.fd_id,
            Source::Secondary => None,
        };
        let phase = if fd_id.is_some() {
            DetailPhase::Pending
        } else {
            DetailPhase::SummaryOnly
        };
        self.state.detail = Some(DetailView {
            source,
            fd_id,
            detail: summary.placeholder_detail(source),
            phase,
        });
        match fd_id {
            Some(match_id) => self.send(FetchKind::Detail { match_id }),
            None => self.state.requests.invalidate(Endpoint::Detail),
        }
    }

    pub fn close_detail(&mut self) {
        self.state.detail = None;
        self.state.requests.invalidate(Endpoint::Detail);
    }

    fn fetch_stats(&mut self) {
        self.send(FetchKind::Stats);
    }

    fn fetch_logs(&mut self) {
        let limit = self.settings.logs_limit;
        self.send(FetchKind::Logs { limit });
    }

    fn fetch_matches(&mut self) {
        let filters = &self.state.filters;
        let league = match filters.source {
            Source::Primary => filters.league.code().map(str::to_string),
            Source::Secondary => None,
        };
        let query = MatchQuery {
            source: filters.source,
            limit: self.settings.match_limit,
            league,
            status: filters.status_filter,
            lang: self.settings.lang,
        };
        self.state.loading_matches = true;
        self.send(FetchKind::Matches(query));
    }

    fn fetch_standings(&mut self) {
        let Some(league) = self.league_scope() else {
            self.clear_standings();
            return;
        };
        let lang = self.settings.lang;
        self.send(FetchKind::Standings { league, lang });
    }

    fn fetch_scorers(&mut self) {
        let Some(league) = self.league_scope() else {
            self.clear_scorers();
            return;
        };
        let order = ScorerOrder::for_tab(self.state.filters.active_tab);
        let lang = self.settings.lang;
        self.send(FetchKind::Scorers {
            league,
            order,
            lang,
        });
    }

    /// League tables exist only for the primary source and a concrete league.
    fn league_scope(&self) -> Option<String> {
        if self.state.filters.source != Source::Primary {
            return None;
        }
        self.state.filters.league.code().map(str::to_string)
    }

    fn clear_standings(&mut self) {
        self.state.standings.clear();
        self.state.requests.invalidate(Endpoint::Standings);
    }

    fn clear_scorers(&mut self) {
        self.state.scorers.clear();
        self.state.requests.invalidate(Endpoint::Scorers);
    }

    fn send(&mut self, kind: FetchKind) {
        let endpoint = kind.endpoint();
        let generation = self.state.requests.issue(endpoint);
        if let Err(err) = self.dispatcher.dispatch(FetchRequest { generation, kind }) {
            apply_delta(
                &mut self.state,
                Delta::Fetched {
                    endpoint,
                    generation,
                    result: Err(err),
                },
            );
        }
    }
}
