use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use matchstats_terminal::config::Config;
use matchstats_terminal::feed::{ChannelDispatch, spawn_provider};
use matchstats_terminal::labels::{self, Lang};
use matchstats_terminal::poller::SystemClock;
use matchstats_terminal::state::{
    AppState, Delta, DetailPhase, DetailView, League, LineupPlayer, MatchSummary, Source, Tab,
};
use matchstats_terminal::wiring::Dashboard;

struct App {
    dashboard: Dashboard<ChannelDispatch, SystemClock>,
    lang: Lang,
    offset_hours: i32,
    should_quit: bool,
}

impl App {
    fn new(config: &Config, dispatch: ChannelDispatch) -> Self {
        Self {
            dashboard: Dashboard::new(config, dispatch, SystemClock),
            lang: config.lang,
            offset_hours: config.display_offset_hours,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.dashboard.state().detail.is_some() {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('b') | KeyCode::Char('d') | KeyCode::Esc | KeyCode::Enter => {
                    self.dashboard.close_detail()
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') => self.dashboard.toggle_source(),
            KeyCode::Char('l') => self.dashboard.cycle_league(true),
            KeyCode::Char('L') => self.dashboard.cycle_league(false),
            KeyCode::Char('f') => self.dashboard.cycle_status_filter(),
            KeyCode::Char('t') => self.dashboard.cycle_tab(),
            KeyCode::Char(']') => self.dashboard.step_group_date(true),
            KeyCode::Char('[') => self.dashboard.step_group_date(false),
            KeyCode::Char('j') | KeyCode::Down => self.dashboard.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.dashboard.select_prev(),
            KeyCode::Char('d') | KeyCode::Enter => self.dashboard.open_selected_detail(),
            KeyCode::Char('r') => self.dashboard.refresh_all(),
            KeyCode::Char('?') => self.dashboard.toggle_help(),
            KeyCode::Esc if self.dashboard.state().help_overlay => self.dashboard.toggle_help(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let _provider = spawn_provider(&config, tx, cmd_rx);
    let mut app = App::new(&config, ChannelDispatch::new(cmd_tx));

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to enter alternate screen")?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend).context("failed to create terminal")?;

    app.dashboard.mount();
    let res = run_app(&mut terminal, &mut app, rx);
    app.dashboard.unmount();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.dashboard.apply(delta);
        }

        app.dashboard.tick();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = app.dashboard.state();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state, app.lang, app.offset_hours))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_matches(frame, body[0], app);
    render_league_table(frame, body[1], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    let sync = Paragraph::new(sync_log_text(state, app.lang, app.offset_hours))
        .block(
            Block::default()
                .title(tr(app.lang, "同步日志", "Sync log"))
                .borders(Borders::ALL),
        );
    frame.render_widget(sync, bottom[0]);
    let console = Paragraph::new(console_text(state, app.lang))
        .block(
            Block::default()
                .title(tr(app.lang, "控制台", "Console"))
                .borders(Borders::ALL),
        );
    frame.render_widget(console, bottom[1]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    let full = frame.size();
    if let Some(view) = &state.detail {
        render_detail_overlay(frame, full, view, app.lang, app.offset_hours);
    }
    if state.help_overlay {
        render_help_overlay(frame, full);
    }
}

fn tr(lang: Lang, zh: &'static str, en: &'static str) -> &'static str {
    match lang {
        Lang::Zh => zh,
        Lang::En => en,
    }
}

fn header_text(state: &AppState, lang: Lang, offset_hours: i32) -> String {
    let stats = &state.stats;
    let line1 = format!(
        " MatchStats | FD {} | {} {} | {} {}",
        stats.fd_matches,
        labels::source_label(lang, Source::Secondary),
        stats.sporttery_matches,
        tr(lang, "最近同步:", "Last sync:"),
        labels::format_datetime(lang, stats.last_sync.as_deref(), offset_hours)
    );

    let filters = &state.filters;
    let mut parts = vec![
        labels::source_label(lang, filters.source).to_string(),
        labels::status_filter_label(lang, filters.status_filter).to_string(),
    ];
    match filters.source {
        Source::Primary => {
            parts.insert(1, labels::league_label(lang, &filters.league));
            parts.push(labels::tab_label(lang, filters.active_tab).to_string());
        }
        Source::Secondary => {
            let date = filters
                .selected_group_date
                .clone()
                .unwrap_or_else(|| "-".to_string());
            parts.push(format!("{} {date}", tr(lang, "日期", "Date")));
        }
    }
    let loading = if state.loading_matches {
        tr(lang, "  加载中…", "  loading…")
    } else {
        ""
    };
    format!("{line1}\n [{}]{loading}", parts.join(" | "))
}

fn footer_text(state: &AppState) -> String {
    if state.detail.is_some() {
        return "b/Esc Close | q Quit".to_string();
    }
    match state.filters.source {
        Source::Primary => {
            "s Source | l/L League | f Status | t Tab | j/k Move | Enter Detail | r Refresh | ? Help | q Quit"
                .to_string()
        }
        Source::Secondary => {
            "s Source | f Status | [/] Date | j/k Move | Enter Detail | r Refresh | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_matches(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.dashboard.state();
    let lang = app.lang;
    let title = format!(
        "{} ({})",
        tr(lang, "比赛", "Matches"),
        labels::source_label(lang, state.filters.source)
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    let matches = state.display_matches();
    if matches.is_empty() {
        let text = if state.loading_matches {
            tr(lang, "加载中…", "Loading…")
        } else {
            tr(lang, "暂无比赛", "No matches")
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let secondary = state.filters.source == Source::Secondary;
    let rows: Vec<Row> = matches
        .iter()
        .map(|m| match_row(m, lang, app.offset_hours, secondary))
        .collect();
    let mut widths = vec![
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(8),
    ];
    let mut header = vec![
        tr(lang, "时间", "Kickoff"),
        tr(lang, "联赛", "League"),
        tr(lang, "对阵", "Match"),
        tr(lang, "比分", "Score"),
        tr(lang, "状态", "Status"),
    ];
    if secondary {
        widths.push(Constraint::Min(16));
        header.push(tr(lang, "预测", "Prediction"));
    }

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(block)
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn match_row(m: &MatchSummary, lang: Lang, offset_hours: i32, secondary: bool) -> Row<'static> {
    let kickoff = format!(
        "{} {}",
        labels::format_date(m.match_date.as_deref(), offset_hours),
        labels::format_time(m.match_date.as_deref(), offset_hours)
    );
    let league = m
        .league_code
        .as_deref()
        .map(|code| labels::league_name(lang, code))
        .unwrap_or_else(|| "-".to_string());
    let score = m
        .score_pair()
        .map(|(home, away)| format!("{home}-{away}"))
        .unwrap_or_else(|| "-".to_string());
    let status = m
        .status
        .as_deref()
        .map(|s| labels::status_label(lang, s))
        .unwrap_or_else(|| "-".to_string());
    let status_style = match m.status.as_deref() {
        Some("LIVE" | "IN_PLAY" | "PAUSED") => Style::default().fg(Color::Green),
        Some("POSTPONED" | "SUSPENDED" | "CANCELLED") => Style::default().fg(Color::Red),
        _ => Style::default(),
    };

    let mut cells = vec![
        Cell::from(kickoff),
        Cell::from(league),
        Cell::from(format!("{} vs {}", m.home(), m.away())),
        Cell::from(score).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(status).style(status_style),
    ];
    if secondary {
        cells.push(Cell::from(m.prediction_text().unwrap_or_else(|| "-".to_string())));
    }
    Row::new(cells)
}

fn render_league_table(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.dashboard.state();
    let lang = app.lang;
    let tab = state.filters.active_tab;
    let title = match &state.filters.league {
        League::Code(_) => format!(
            "{} · {}",
            labels::tab_label(lang, tab),
            labels::league_label(lang, &state.filters.league)
        ),
        League::All => labels::tab_label(lang, tab).to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let hint = if state.filters.source != Source::Primary {
        Some(tr(lang, "仅欧洲联赛提供榜单", "Tables are only available for Football-Data"))
    } else if state.filters.league.is_all() {
        Some(tr(lang, "按 l 选择联赛查看榜单", "Press l to pick a league"))
    } else if (tab == Tab::Standings && state.standings.is_empty())
        || (tab != Tab::Standings && state.scorers.is_empty())
    {
        Some(tr(lang, "暂无数据", "No data"))
    } else {
        None
    };
    if let Some(hint) = hint {
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let table = if tab == Tab::Standings {
        let rows: Vec<Row> = state
            .standings
            .iter()
            .map(|s| {
                let pos = s.position.unwrap_or(0);
                Row::new(vec![
                    Cell::from(pos.to_string()).style(position_style(pos)),
                    Cell::from(s.team_name.clone()),
                    Cell::from(opt_num(s.played_games)),
                    Cell::from(format!(
                        "{}/{}/{}",
                        opt_num(s.won),
                        opt_num(s.draw),
                        opt_num(s.lost)
                    )),
                    Cell::from(format!("{:+}", s.goal_difference())),
                    Cell::from(opt_num(s.points)).style(bold),
                ])
            })
            .collect();
        Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Length(4),
                Constraint::Length(4),
            ],
        )
        .header(
            Row::new(vec![
                "#",
                tr(lang, "球队", "Team"),
                "P",
                tr(lang, "胜/平/负", "W/D/L"),
                "GD",
                tr(lang, "积分", "Pts"),
            ])
            .style(bold),
        )
    } else {
        let rows: Vec<Row> = state
            .scorers
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let value = if tab == Tab::Assists { s.assists } else { s.goals };
                Row::new(vec![
                    Cell::from((idx + 1).to_string()),
                    Cell::from(s.player_name.clone()),
                    Cell::from(s.team_name.clone()),
                    Cell::from(opt_num(value)).style(bold),
                    Cell::from(opt_num(s.played_matches)),
                ])
            })
            .collect();
        let value_label = if tab == Tab::Assists {
            tr(lang, "助攻", "A")
        } else {
            tr(lang, "进球", "G")
        };
        Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Min(10),
                Constraint::Length(4),
                Constraint::Length(4),
            ],
        )
        .header(
            Row::new(vec![
                "#",
                tr(lang, "球员", "Player"),
                tr(lang, "球队", "Team"),
                value_label,
                tr(lang, "场次", "MP"),
            ])
            .style(bold),
        )
    };
    frame.render_widget(table.block(block), area);
}

fn position_style(position: i64) -> Style {
    match position {
        1..=4 => Style::default().fg(Color::Green),
        5..=6 => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::DarkGray),
    }
}

fn opt_num(value: Option<i64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn sync_log_text(state: &AppState, lang: Lang, offset_hours: i32) -> String {
    if state.sync_logs.is_empty() {
        return tr(lang, "暂无同步记录", "No sync runs yet").to_string();
    }
    state
        .sync_logs
        .iter()
        .take(6)
        .map(|log| {
            let mut line = format!(
                "{} {} {} {} {}",
                labels::format_datetime(lang, log.started_at.as_deref(), offset_hours),
                labels::sync_source_label(lang, &log.source),
                labels::task_label(lang, &log.task_type),
                labels::sync_status_label(lang, &log.status),
                log.records_count
            );
            if let Some(err) = log.error_message.as_deref().filter(|e| !e.is_empty()) {
                line.push_str(&format!(" ({err})"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn console_text(state: &AppState, lang: Lang) -> String {
    if state.logs.is_empty() {
        let empty = tr(lang, "暂无告警，数据正常刷新中", "Feeds quiet, nothing to report");
        return empty.to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(6)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_detail_overlay(
    frame: &mut Frame,
    area: Rect,
    view: &DetailView,
    lang: Lang,
    offset_hours: i32,
) {
    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let title = match view.phase {
        DetailPhase::Pending => tr(lang, "比赛详情 (加载中…)", "Match detail (loading…)"),
        DetailPhase::SummaryOnly | DetailPhase::Loaded => tr(lang, "比赛详情", "Match detail"),
    };
    let detail = Paragraph::new(detail_text(view, lang, offset_hours))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(detail, popup_area);
}

fn detail_text(view: &DetailView, lang: Lang, offset_hours: i32) -> String {
    let d = &view.detail;
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {} - {} {}",
        d.home_team_name.as_deref().unwrap_or("-"),
        d.home_score.as_deref().unwrap_or("-"),
        d.away_score.as_deref().unwrap_or("-"),
        d.away_team_name.as_deref().unwrap_or("-"),
    ));
    lines.push(format!(
        "{} | {} {}",
        d.status
            .as_deref()
            .map(|s| labels::status_label(lang, s))
            .unwrap_or_else(|| "-".to_string()),
        labels::format_date(d.match_date.as_deref(), offset_hours),
        labels::format_time(d.match_date.as_deref(), offset_hours),
    ));
    if let Some(venue) = &d.venue {
        lines.push(format!("{} {venue}", tr(lang, "场地:", "Venue:")));
    }
    if let Some(referee) = &d.referee {
        lines.push(format!("{} {referee}", tr(lang, "裁判:", "Referee:")));
    }
    if d.home_formation.is_some() || d.away_formation.is_some() {
        lines.push(format!(
            "{} {} / {}",
            tr(lang, "阵型:", "Formation:"),
            d.home_formation.as_deref().unwrap_or("-"),
            d.away_formation.as_deref().unwrap_or("-")
        ));
    }
    if d.home_coach_name.is_some() || d.away_coach_name.is_some() {
        lines.push(format!(
            "{} {} / {}",
            tr(lang, "主教练:", "Coach:"),
            d.home_coach_name.as_deref().unwrap_or("-"),
            d.away_coach_name.as_deref().unwrap_or("-")
        ));
    }
    if view.phase == DetailPhase::Loaded {
        lines.push(format!(
            "{} {}/{} - {}/{}",
            tr(lang, "黄/红牌:", "Cards Y/R:"),
            d.home_yellow_cards,
            d.home_red_cards,
            d.away_yellow_cards,
            d.away_red_cards
        ));
    }

    if !d.goals.is_empty() {
        lines.push(String::new());
        lines.push(tr(lang, "进球", "Goals").to_string());
        for goal in &d.goals {
            let badge = labels::goal_type_badge(lang, goal.kind.as_deref());
            let mut line = format!(
                "  {} {}",
                labels::goal_time(goal.minute, goal.minute_extra),
                goal.player_name.as_deref().unwrap_or("-")
            );
            if let Some(team) = &goal.team_name {
                line.push_str(&format!(" ({team})"));
            }
            if !badge.is_empty() {
                line.push(' ');
                line.push_str(badge);
            }
            lines.push(line);
        }
    }

    push_players(&mut lines, tr(lang, "主队首发", "Home XI"), &d.lineup_home);
    push_players(&mut lines, tr(lang, "客队首发", "Away XI"), &d.lineup_away);
    push_players(&mut lines, tr(lang, "主队替补", "Home bench"), &d.bench_home);
    push_players(&mut lines, tr(lang, "客队替补", "Away bench"), &d.bench_away);

    if view.source == Source::Secondary {
        lines.push(String::new());
        let note = tr(lang, "竞彩比赛暂无详细数据", "No detail feed for Sporttery matches");
        lines.push(note.to_string());
    }
    lines.join("\n")
}

fn push_players(lines: &mut Vec<String>, heading: &str, players: &[LineupPlayer]) {
    if players.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(heading.to_string());
    for player in players {
        lines.push(format_player(player));
    }
}

fn format_player(player: &LineupPlayer) -> String {
    let num = player
        .shirt_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "--".to_string());
    match player.position.as_deref().filter(|p| !p.is_empty()) {
        Some(pos) => format!("  #{num} {} ({pos})", player.name),
        None => format!("  #{num} {}", player.name),
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "MatchStats Terminal - Help",
        "",
        "Filters:",
        "  s            Toggle source (Football-Data / Sporttery)",
        "  l / L        Next / previous league",
        "  f            Status filter (all / live / finished)",
        "  t            Standings / scorers / assists",
        "  [ / ]        Newer / older group date (Sporttery)",
        "",
        "Matches:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Match detail",
        "  b / Esc      Close detail",
        "",
        "  r            Refresh now",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
