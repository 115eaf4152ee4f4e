use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::labels::Lang;
use crate::state::{
    Endpoint, MatchDetail, MatchSummary, Payload, ScorerRow, Source, StandingsRow, Stats,
    StatusFilter, SyncLog, Tab,
};

const MAX_ERROR_BODY: usize = 160;

/// Every way a fetch can go wrong collapses into this one type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{endpoint} fetch failed: {reason}")]
pub struct FetchFailed {
    pub endpoint: Endpoint,
    pub reason: String,
}

impl FetchFailed {
    pub fn new(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerOrder {
    Goals,
    Assists,
}

impl ScorerOrder {
    pub fn for_tab(tab: Tab) -> Self {
        match tab {
            Tab::Assists => ScorerOrder::Assists,
            Tab::Standings | Tab::Scorers => ScorerOrder::Goals,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            ScorerOrder::Goals => "goals",
            ScorerOrder::Assists => "assists",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub source: Source,
    pub limit: u32,
    /// Only sent for the primary source.
    pub league: Option<String>,
    pub status: StatusFilter,
    pub lang: Lang,
}

/// Everything a fetch needs, captured from the filter state at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
    Stats,
    Logs {
        limit: u32,
    },
    Matches(MatchQuery),
    Standings {
        league: String,
        lang: Lang,
    },
    Scorers {
        league: String,
        order: ScorerOrder,
        lang: Lang,
    },
    Detail {
        match_id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub kind: FetchKind,
}

impl FetchKind {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchKind::Stats => Endpoint::Stats,
            FetchKind::Logs { .. } => Endpoint::Logs,
            FetchKind::Matches(_) => Endpoint::Matches,
            FetchKind::Standings { .. } => Endpoint::Standings,
            FetchKind::Scorers { .. } => Endpoint::Scorers,
            FetchKind::Detail { .. } => Endpoint::Detail,
        }
    }

    pub fn path(&self) -> String {
        match self {
            FetchKind::Stats => "/api/v1/stats".to_string(),
            FetchKind::Logs { .. } => "/api/v1/logs".to_string(),
            FetchKind::Matches(query) => match query.source {
                Source::Primary => "/api/v1/fd/matches".to_string(),
                Source::Secondary => "/api/v1/sporttery/matches".to_string(),
            },
            FetchKind::Standings { league, .. } => {
                format!("/api/v1/fd/leagues/{league}/standings")
            }
            FetchKind::Scorers { league, .. } => format!("/api/v1/fd/leagues/{league}/scorers"),
            FetchKind::Detail { match_id } => format!("/api/v1/fd/matches/{match_id}/details"),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match self {
            FetchKind::Stats | FetchKind::Detail { .. } => {}
            FetchKind::Logs { limit } => pairs.push(("limit", limit.to_string())),
            FetchKind::Matches(query) => {
                pairs.push(("limit", query.limit.to_string()));
                if query.source == Source::Primary
                    && let Some(league) = query.league.as_deref()
                {
                    pairs.push(("league", league.to_string()));
                }
                if let Some(status) = status_param(query.source, query.status) {
                    pairs.push(("status", status.to_string()));
                }
                if query.source == Source::Secondary {
                    pairs.push(("lang", query.lang.code().to_string()));
                }
            }
            FetchKind::Standings { lang, .. } => pairs.push(("lang", lang.code().to_string())),
            FetchKind::Scorers { order, lang, .. } => {
                pairs.push(("order_by", order.as_param().to_string()));
                pairs.push(("lang", lang.code().to_string()));
            }
        }
        pairs
    }
}

/// UI status filter spelled in the source's own vocabulary. `All` sends nothing.
pub fn status_param(source: Source, filter: StatusFilter) -> Option<&'static str> {
    match (source, filter) {
        (_, StatusFilter::All) => None,
        (Source::Primary, StatusFilter::Live) => Some("LIVE"),
        (Source::Primary, StatusFilter::Finished) => Some("FINISHED"),
        (Source::Secondary, StatusFilter::Finished) => Some("finished"),
        (Source::Secondary, StatusFilter::Live) => Some("pending"),
    }
}

pub fn build_url(base: &str, kind: &FetchKind) -> Result<Url> {
    let raw = format!("{}{}", base.trim().trim_end_matches('/'), kind.path());
    let mut url = Url::parse(&raw).with_context(|| format!("invalid url {raw}"))?;
    let pairs = kind.query_pairs();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

/// Runs one request to completion. Blocking; called from the fetch pool.
pub fn fetch(client: &Client, base: &str, kind: &FetchKind) -> Result<Payload, FetchFailed> {
    let endpoint = kind.endpoint();
    let failed = |err: anyhow::Error| FetchFailed::new(endpoint, format!("{err:#}"));
    let url = build_url(base, kind).map_err(failed)?;
    let body = fetch_body(client, url).map_err(failed)?;
    decode_payload(kind, &body).map_err(failed)
}

fn fetch_body(client: &Client, url: Url) -> Result<String> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(anyhow!("http {}: {}", status, snippet.trim()));
    }
    Ok(body)
}

pub fn decode_payload(kind: &FetchKind, body: &str) -> Result<Payload> {
    let payload = match kind {
        FetchKind::Stats => Payload::Stats(parse_stats_json(body)?),
        FetchKind::Logs { .. } => Payload::Logs(parse_logs_json(body)?),
        FetchKind::Matches(query) => Payload::Matches {
            source: query.source,
            rows: parse_matches_json(body)?,
        },
        FetchKind::Standings { .. } => Payload::Standings(parse_standings_json(body)?),
        FetchKind::Scorers { .. } => Payload::Scorers(parse_scorers_json(body)?),
        FetchKind::Detail { match_id } => Payload::Detail {
            match_id: *match_id,
            detail: parse_match_detail_json(body)?,
        },
    };
    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Option<MatchDetail>,
}

fn default_success() -> bool {
    true
}

fn parse_list_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let envelope: ListEnvelope<T> =
        serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))?;
    Ok(envelope.data.unwrap_or_default())
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<MatchSummary>> {
    parse_list_json(raw, "matches")
}

pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingsRow>> {
    parse_list_json(raw, "standings")
}

pub fn parse_scorers_json(raw: &str) -> Result<Vec<ScorerRow>> {
    parse_list_json(raw, "scorers")
}

pub fn parse_logs_json(raw: &str) -> Result<Vec<SyncLog>> {
    parse_list_json(raw, "logs")
}

pub fn parse_stats_json(raw: &str) -> Result<Stats> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Stats::default());
    }
    serde_json::from_str(trimmed).context("invalid stats json")
}

/// `None` when the backend reports no detail (`success: false` or no data).
pub fn parse_match_detail_json(raw: &str) -> Result<Option<MatchDetail>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let envelope: DetailEnvelope =
        serde_json::from_str(trimmed).context("invalid match details json")?;
    if !envelope.success {
        return Ok(None);
    }
    Ok(envelope.data)
}
