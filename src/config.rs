use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::labels::Lang;
use crate::state::League;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:9999";
pub const DEFAULT_LEAGUES: [&str; 6] = ["PL", "PD", "BL1", "SA", "FL1", "CL"];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub poll_interval: Duration,
    pub match_limit: u32,
    pub logs_limit: u32,
    pub lang: Lang,
    pub default_league: League,
    /// League cycle order for the `l` key, `ALL` always comes first.
    pub leagues: Vec<String>,
    pub request_timeout: Duration,
    pub fetch_parallelism: usize,
    pub display_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| {
            lookup(key).and_then(|val| {
                if val.trim().is_empty() {
                    None
                } else {
                    Some(val)
                }
            })
        };

        let api_base = opt("MATCHSTATS_API_BASE")
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let poll_secs = parsed::<u64>(opt("REFRESH_POLL_SECS")).unwrap_or(60).max(10);
        let match_limit = parsed::<u32>(opt("MATCHES_LIMIT"))
            .unwrap_or(100)
            .clamp(1, 500);
        let logs_limit = parsed::<u32>(opt("LOGS_LIMIT")).unwrap_or(20).clamp(1, 200);
        let lang = opt("MATCHSTATS_LANG")
            .and_then(|val| Lang::parse(&val))
            .unwrap_or_default();
        let default_league = opt("DEFAULT_LEAGUE")
            .map(|val| League::parse(&val))
            .unwrap_or_default();
        let mut leagues = opt("MONITORED_LEAGUES")
            .map(|val| parse_codes(&val))
            .unwrap_or_default();
        if leagues.is_empty() {
            leagues = DEFAULT_LEAGUES.iter().map(|code| code.to_string()).collect();
        }
        if let League::Code(code) = &default_league
            && !leagues.contains(code)
        {
            leagues.push(code.clone());
        }
        let timeout_secs = parsed::<u64>(opt("REQUEST_TIMEOUT_SECS"))
            .unwrap_or(10)
            .clamp(1, 120);
        let fetch_parallelism = parsed::<usize>(opt("FETCH_PARALLELISM"))
            .unwrap_or(6)
            .clamp(2, 32);
        let display_offset_hours = parsed::<i32>(opt("DISPLAY_UTC_OFFSET_HOURS"))
            .unwrap_or(8)
            .clamp(-12, 14);

        Self {
            api_base,
            poll_interval: Duration::from_secs(poll_secs),
            match_limit,
            logs_limit,
            lang,
            default_league,
            leagues,
            request_timeout: Duration::from_secs(timeout_secs),
            fetch_parallelism,
            display_offset_hours,
        }
    }
}

fn parsed<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|val| val.trim().parse::<T>().ok())
}

fn parse_codes(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in raw.split([',', ';', ' ']) {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() || code == "ALL" || codes.contains(&code) {
            continue;
        }
        codes.push(code);
    }
    codes
}
