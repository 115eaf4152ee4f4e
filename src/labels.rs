//! Display strings for statuses, leagues, filters and timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::state::{League, Source, StatusFilter, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Some(Lang::Zh),
            "en" | "en-us" | "en-gb" => Some(Lang::En),
            _ => None,
        }
    }

    /// Value sent as the `lang` query parameter.
    pub fn code(self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }
}

pub fn status_label(lang: Lang, status: &str) -> String {
    let label = match (lang, status) {
        (Lang::Zh, "SCHEDULED" | "TIMED" | "pending") => "未开赛",
        (Lang::Zh, "LIVE" | "IN_PLAY") => "进行中",
        (Lang::Zh, "PAUSED") => "中场",
        (Lang::Zh, "FINISHED" | "finished") => "完场",
        (Lang::Zh, "POSTPONED") => "推迟",
        (Lang::Zh, "SUSPENDED") => "中断",
        (Lang::Zh, "CANCELLED") => "取消",
        (Lang::En, "SCHEDULED" | "TIMED" | "pending") => "Scheduled",
        (Lang::En, "LIVE" | "IN_PLAY") => "Live",
        (Lang::En, "PAUSED") => "Half-time",
        (Lang::En, "FINISHED" | "finished") => "FT",
        (Lang::En, "POSTPONED") => "Postponed",
        (Lang::En, "SUSPENDED") => "Suspended",
        (Lang::En, "CANCELLED") => "Cancelled",
        _ => return status.to_string(),
    };
    label.to_string()
}

pub fn league_name(lang: Lang, code: &str) -> String {
    let name = match (lang, code) {
        (Lang::Zh, "PL") => "英超",
        (Lang::Zh, "PD") => "西甲",
        (Lang::Zh, "BL1") => "德甲",
        (Lang::Zh, "SA") => "意甲",
        (Lang::Zh, "FL1") => "法甲",
        (Lang::Zh, "CL") => "欧冠",
        (Lang::En, "PL") => "Premier League",
        (Lang::En, "PD") => "La Liga",
        (Lang::En, "BL1") => "Bundesliga",
        (Lang::En, "SA") => "Serie A",
        (Lang::En, "FL1") => "Ligue 1",
        (Lang::En, "CL") => "Champions League",
        _ => return code.to_string(),
    };
    name.to_string()
}

pub fn league_label(lang: Lang, league: &League) -> String {
    match league {
        League::All => match lang {
            Lang::Zh => "全部联赛".to_string(),
            Lang::En => "All leagues".to_string(),
        },
        League::Code(code) => league_name(lang, code),
    }
}

pub fn source_label(lang: Lang, source: Source) -> &'static str {
    match (lang, source) {
        (Lang::Zh, Source::Primary) => "欧洲联赛",
        (Lang::Zh, Source::Secondary) => "竞彩官网",
        (Lang::En, Source::Primary) => "Football-Data",
        (Lang::En, Source::Secondary) => "Sporttery",
    }
}

pub fn status_filter_label(lang: Lang, filter: StatusFilter) -> &'static str {
    match (lang, filter) {
        (Lang::Zh, StatusFilter::All) => "全部",
        (Lang::Zh, StatusFilter::Live) => "进行中",
        (Lang::Zh, StatusFilter::Finished) => "完场",
        (Lang::En, StatusFilter::All) => "All",
        (Lang::En, StatusFilter::Live) => "Live",
        (Lang::En, StatusFilter::Finished) => "Finished",
    }
}

pub fn tab_label(lang: Lang, tab: Tab) -> &'static str {
    match (lang, tab) {
        (Lang::Zh, Tab::Standings) => "积分榜",
        (Lang::Zh, Tab::Scorers) => "射手榜",
        (Lang::Zh, Tab::Assists) => "助攻榜",
        (Lang::En, Tab::Standings) => "Standings",
        (Lang::En, Tab::Scorers) => "Scorers",
        (Lang::En, Tab::Assists) => "Assists",
    }
}

pub fn sync_source_label(lang: Lang, source: &str) -> String {
    match (lang, source) {
        (_, "football_data") => "Football-Data".to_string(),
        (Lang::Zh, "sporttery") => "竞彩官网".to_string(),
        (Lang::En, "sporttery") => "Sporttery".to_string(),
        _ => source.to_string(),
    }
}

pub fn task_label(lang: Lang, task: &str) -> String {
    let label = match (lang, task) {
        (Lang::Zh, "matches") => "比赛",
        (Lang::Zh, "standings") => "积分榜",
        (Lang::Zh, "results") => "结果",
        (Lang::Zh, "teams") => "球队",
        (Lang::Zh, "scorers") => "射手榜",
        _ => return task.to_string(),
    };
    label.to_string()
}

pub fn sync_status_label(lang: Lang, status: &str) -> &'static str {
    match (lang, status == "success") {
        (Lang::Zh, true) => "成功",
        (Lang::Zh, false) => "失败",
        (Lang::En, true) => "ok",
        (Lang::En, false) => "failed",
    }
}

pub fn goal_time(minute: Option<u32>, extra: Option<u32>) -> String {
    let Some(minute) = minute else {
        return "-".to_string();
    };
    match extra {
        Some(extra) if extra > 0 => format!("{minute}'+{extra}"),
        _ => format!("{minute}'"),
    }
}

pub fn goal_type_badge(lang: Lang, kind: Option<&str>) -> &'static str {
    match (lang, kind) {
        (Lang::Zh, Some("PENALTY")) => "(点球)",
        (Lang::Zh, Some("OWN_GOAL")) => "(乌龙)",
        (Lang::En, Some("PENALTY")) => "(pen)",
        (Lang::En, Some("OWN_GOAL")) => "(og)",
        _ => "",
    }
}

/// `M/D` in the display timezone, `-` when missing or unparseable.
pub fn format_date(raw: Option<&str>, offset_hours: i32) -> String {
    raw.and_then(|r| parse_local(r, offset_hours))
        .map(|dt| dt.format("%-m/%-d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `HH:MM` in the display timezone, `-` when missing or unparseable.
pub fn format_time(raw: Option<&str>, offset_hours: i32) -> String {
    raw.and_then(|r| parse_local(r, offset_hours))
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_datetime(lang: Lang, raw: Option<&str>, offset_hours: i32) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return match lang {
            Lang::Zh => "从未".to_string(),
            Lang::En => "never".to_string(),
        };
    };
    match parse_local(raw, offset_hours) {
        Some(dt) => dt.format("%Y/%-m/%-d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

/// Timestamps with an offset are shifted into the display timezone; naive
/// ones are taken as already local.
pub fn parse_local(raw: &str, offset_hours: i32) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];

    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        let offset = FixedOffset::east_opt(offset_hours.clamp(-12, 14) * 3600)?;
        return Some(dt.with_timezone(&offset).naive_local());
    }
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
