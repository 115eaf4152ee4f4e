#![allow(dead_code)]

use matchstats_terminal::api::{FetchFailed, FetchKind, FetchRequest};
use matchstats_terminal::config::Config;
use matchstats_terminal::poller::ManualClock;
use matchstats_terminal::state::{Delta, Endpoint, Payload};
use matchstats_terminal::wiring::{Dashboard, Dispatch};

/// Keeps every request instead of sending it anywhere.
#[derive(Debug, Default)]
pub struct RecordingDispatch {
    pub sent: Vec<FetchRequest>,
    pub fail: bool,
}

impl RecordingDispatch {
    pub fn take(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.sent)
    }
}

impl Dispatch for RecordingDispatch {
    fn dispatch(&mut self, request: FetchRequest) -> Result<(), FetchFailed> {
        if self.fail {
            return Err(FetchFailed::new(request.kind.endpoint(), "offline"));
        }
        self.sent.push(request);
        Ok(())
    }
}

pub type TestDashboard = Dashboard<RecordingDispatch, ManualClock>;

pub fn dashboard(config: &Config) -> (TestDashboard, ManualClock) {
    let clock = ManualClock::new();
    let dash = Dashboard::new(config, RecordingDispatch::default(), clock.clone());
    (dash, clock)
}

pub fn config_with(pairs: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

pub fn drain(dash: &mut TestDashboard) -> Vec<FetchRequest> {
    dash.dispatcher_mut().take()
}

pub fn endpoints(requests: &[FetchRequest]) -> Vec<Endpoint> {
    let mut list: Vec<Endpoint> = requests.iter().map(|r| r.kind.endpoint()).collect();
    list.sort_by_key(|e| e.label());
    list
}

pub fn sorted(mut list: Vec<Endpoint>) -> Vec<Endpoint> {
    list.sort_by_key(|e| e.label());
    list
}

pub fn find(requests: &[FetchRequest], endpoint: Endpoint) -> FetchRequest {
    requests
        .iter()
        .find(|r| r.kind.endpoint() == endpoint)
        .cloned()
        .unwrap_or_else(|| panic!("no {endpoint} request in {requests:?}"))
}

pub fn ok(request: &FetchRequest, payload: Payload) -> Delta {
    Delta::Fetched {
        endpoint: request.kind.endpoint(),
        generation: request.generation,
        result: Ok(payload),
    }
}

pub fn failed(request: &FetchRequest) -> Delta {
    let endpoint = request.kind.endpoint();
    Delta::Fetched {
        endpoint,
        generation: request.generation,
        result: Err(FetchFailed::new(endpoint, "http 502 Bad Gateway")),
    }
}

pub fn match_query(request: &FetchRequest) -> &matchstats_terminal::api::MatchQuery {
    match &request.kind {
        FetchKind::Matches(query) => query,
        other => panic!("not a matches request: {other:?}"),
    }
}
