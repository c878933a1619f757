use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

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
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use matchday_terminal::api_error::ApiError;
use matchday_terminal::chart::chart_data;
use matchday_terminal::state::{
    AppState, Delta, PredictionResult, ProviderCommand, RequestState, Screen, apply_delta,
};
use matchday_terminal::{fake_provider, provider};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Predict,
            KeyCode::Char('2') => {
                self.state.screen = Screen::Scout;
                if self.state.players.is_empty() && !self.state.players_loading {
                    self.request_players(false);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('h') | KeyCode::Char('H') => self.assign_home(),
            KeyCode::Char('a') | KeyCode::Char('A') => self.assign_away(),
            KeyCode::Char('x') => {
                self.state.selection.clear();
                self.state.push_log("[INFO] Selection cleared");
            }
            KeyCode::Enter | KeyCode::Char('p') => self.submit_prediction(),
            KeyCode::Char('r') => match self.state.screen {
                Screen::Predict => self.request_teams(true),
                Screen::Scout => self.request_players(true),
            },
            KeyCode::Char('f') => self.request_ingest(),
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.state.cycle_competition();
                self.request_teams(false);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn assign_home(&mut self) {
        let Some((id, name)) = self.highlighted_team_info() else {
            self.state.push_log("[INFO] No team highlighted");
            return;
        };
        self.state.selection.set_home(id);
        self.state.push_log(format!("[INFO] Home side: {name}"));
    }

    fn assign_away(&mut self) {
        let Some((id, name)) = self.highlighted_team_info() else {
            self.state.push_log("[INFO] No team highlighted");
            return;
        };
        self.state.selection.set_away(id);
        self.state.push_log(format!("[INFO] Away side: {name}"));
    }

    fn highlighted_team_info(&self) -> Option<(String, String)> {
        self.state
            .highlighted_team()
            .map(|t| (t.id.clone(), t.name.clone()))
    }

    fn submit_prediction(&mut self) {
        let Some(cmd) = self.state.begin_submit() else {
            if !self.state.selection.is_submittable() {
                self.state
                    .push_log("[INFO] Pick two different teams before predicting");
            }
            return;
        };
        if self.cmd_tx.send(cmd).is_err() {
            // The in-flight state must not outlive the request it tracks.
            self.state.request =
                RequestState::Failed(ApiError::Network("provider unavailable".to_string()));
            self.state
                .push_log("[WARN] Provider unavailable, prediction dropped");
        }
    }

    fn request_teams(&mut self, announce: bool) {
        if self.state.teams_loading {
            if announce {
                self.state.push_log("[INFO] Directory load already running");
            }
            return;
        }
        self.state.teams_loading = true;
        let competition = self.state.competition.clone();
        if self
            .cmd_tx
            .send(ProviderCommand::FetchTeams { competition })
            .is_err()
        {
            self.state.teams_loading = false;
            self.state
                .push_log("[WARN] Provider unavailable, directory load dropped");
        } else if announce {
            self.state.push_log("[INFO] Directory reload requested");
        }
    }

    fn request_players(&mut self, announce: bool) {
        if self.state.players_loading {
            if announce {
                self.state.push_log("[INFO] Scout load already running");
            }
            return;
        }
        self.state.players_loading = true;
        if self.cmd_tx.send(ProviderCommand::FetchPlayers).is_err() {
            self.state.players_loading = false;
            self.state
                .push_log("[WARN] Provider unavailable, scout load dropped");
        } else if announce {
            self.state.push_log("[INFO] Scout reload requested");
        }
    }

    fn request_ingest(&mut self) {
        if self.state.ingest_running {
            self.state.push_log("[INFO] Ingestion already running");
            return;
        }
        self.state.ingest_running = true;
        if self.cmd_tx.send(ProviderCommand::TriggerIngest).is_err() {
            self.state.ingest_running = false;
            self.state
                .push_log("[WARN] Provider unavailable, ingestion dropped");
        } else {
            self.state.push_log("[INFO] Remote ingestion requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if offline_mode() {
        fake_provider::spawn_fake_provider(tx, cmd_rx);
    } else {
        provider::spawn_provider(tx, cmd_rx);
    }

    let mut app = App::new(cmd_tx);
    app.state.competition = initial_competition();
    app.request_teams(false);

    let res = run_app(&mut terminal, &mut app, rx);

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

fn offline_mode() -> bool {
    std::env::var("OFFLINE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn initial_competition() -> Option<String> {
    std::env::var("COMPETITION")
        .ok()
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
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
            // The source reloads the whole page after a successful ingestion;
            // a fresh directory load has the same observable effect.
            let reload_directory = matches!(&delta, Delta::IngestFinished(Ok(_)));
            apply_delta(&mut app.state, delta);
            if reload_directory {
                app.request_teams(false);
            }
        }

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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Predict => render_predict(frame, chunks[1], &app.state),
        Screen::Scout => render_scout(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Predict => "PREDICT",
        Screen::Scout => "SCOUT",
    };
    let directory = if state.teams_loading {
        "loading...".to_string()
    } else {
        match state.teams_fetched_at {
            Some(at) => format!("{} teams ({})", state.teams.len(), format_clock(at)),
            None => "not loaded".to_string(),
        }
    };
    let ingest = if state.ingest_running {
        " | Ingestion running"
    } else {
        ""
    };
    format!(
        "MATCHDAY TERMINAL | {screen} | League: {} | Directory: {directory}{ingest}",
        state.competition_label()
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Predict => {
            "1 Predict | 2 Scout | j/k/↑/↓ Move | h Home | a Away | x Clear | Enter Predict | r Reload | f Ingest | l League | ? Help | q Quit"
                .to_string()
        }
        Screen::Scout => {
            "1 Predict | 2 Scout | j/k/↑/↓ Move | r Reload | ? Help | q Quit".to_string()
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_clock(at: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(at)
        .format("%H:%M:%S")
        .to_string()
}

fn render_predict(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(34), Constraint::Length(46)])
        .split(area);

    render_directory(frame, columns[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(8)])
        .split(columns[1]);

    render_matchup(frame, right[0], state);
    render_prediction(frame, right[1], state);
}

fn render_directory(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = format!("Teams ({})", state.competition_label());
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if state.teams.is_empty() {
        let text = if state.teams_loading {
            "Loading teams..."
        } else {
            "No teams loaded (r to reload)"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.directory_cursor, state.teams.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };

        let team = &state.teams[idx];
        let cursor = if idx == state.directory_cursor { "> " } else { "  " };
        let side = if team.id == state.selection.home {
            "[H]"
        } else if team.id == state.selection.away {
            "[A]"
        } else {
            "   "
        };
        let style = if idx == state.directory_cursor {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if side != "   " {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let row = Paragraph::new(format!("{cursor}{side} {}", team.name)).style(style);
        frame.render_widget(row, row_area);
    }
}

fn render_matchup(frame: &mut Frame, area: Rect, state: &AppState) {
    let home = side_label(state, &state.selection.home);
    let away = side_label(state, &state.selection.away);
    let hint = if state.selection.is_submittable() {
        "Enter to predict"
    } else {
        "Pick home (h) and away (a)"
    };
    let text = format!("Home: {home}\nAway: {away}\n\n{hint}");
    let matchup = Paragraph::new(text).block(Block::default().title("Matchup").borders(Borders::ALL));
    frame.render_widget(matchup, area);
}

fn side_label(state: &AppState, id: &str) -> String {
    if id.is_empty() {
        return "-".to_string();
    }
    match state.team_name(id) {
        Some(name) => name.to_string(),
        None => format!("#{id}"),
    }
}

fn render_prediction(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Prediction").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    match &state.request {
        RequestState::Idle => {
            let idle = Paragraph::new("No prediction yet")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(idle, inner);
        }
        RequestState::InFlight { .. } => {
            let loading = Paragraph::new("Predicting...")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(loading, inner);
        }
        RequestState::Failed(err) => {
            let text = format!("Prediction failed\n{err}\n\nEnter to retry");
            let failed = Paragraph::new(text).style(Style::default().fg(Color::Red));
            frame.render_widget(failed, inner);
        }
        RequestState::Succeeded(result) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(1)])
                .split(inner);
            frame.render_widget(outcome_bar_chart(result), rows[0]);
            let summary = Paragraph::new(outcome_summary(result))
                .style(Style::default().add_modifier(Modifier::BOLD));
            frame.render_widget(summary, rows[1]);
        }
    }
}

fn outcome_bar_chart(result: &PredictionResult) -> BarChart<'static> {
    let data = chart_data(result);
    let styles = [
        Style::default().fg(Color::Green),
        Style::default().fg(Color::Yellow),
        Style::default().fg(Color::Red),
    ];

    let bars: Vec<Bar> = data
        .labels
        .iter()
        .zip(data.series.iter())
        .zip(styles.iter())
        .map(|((label, value), style)| {
            Bar::default()
                .label(Line::from(*label))
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{value:.0}%"))
                .style(*style)
        })
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(2)
        .max(100)
}

fn outcome_summary(result: &PredictionResult) -> String {
    let data = chart_data(result);
    data.labels
        .iter()
        .zip(data.series.iter())
        .map(|(label, value)| format!("{label} {value:.0}%"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_scout(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = scout_columns();
    render_scout_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if state.players.is_empty() {
        let text = if state.players_loading {
            "Loading players..."
        } else {
            "No players loaded (r to reload)"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.scout_cursor, state.players.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let player = &state.players[idx];
        let cursor = if idx == state.scout_cursor { "> " } else { "  " };
        let style = if idx == state.scout_cursor {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let sep_style = Style::default().fg(Color::DarkGray);

        let name = Paragraph::new(format!("{cursor}{}", player.name)).style(style);
        frame.render_widget(name, cols[0]);
        render_vseparator(frame, cols[1], sep_style);
        let position = if player.position.is_empty() {
            "-".to_string()
        } else {
            player.position.clone()
        };
        frame.render_widget(Paragraph::new(position).style(style), cols[2]);
        render_vseparator(frame, cols[3], sep_style);
        let team = player.team.clone().unwrap_or_else(|| "-".to_string());
        frame.render_widget(Paragraph::new(team).style(style), cols[4]);
    }
}

fn scout_columns() -> [Constraint; 5] {
    [
        Constraint::Min(26),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Min(18),
    ]
}

fn render_scout_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    let sep_style = Style::default().fg(Color::DarkGray);

    frame.render_widget(Paragraph::new("  Player").style(style), cols[0]);
    render_vseparator(frame, cols[1], sep_style);
    frame.render_widget(Paragraph::new("Pos").style(style), cols[2]);
    render_vseparator(frame, cols[3], sep_style);
    frame.render_widget(Paragraph::new("Team").style(style), cols[4]);
}

fn render_vseparator(frame: &mut Frame, area: Rect, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let mut text = String::new();
    for i in 0..area.height {
        if i > 0 {
            text.push('\n');
        }
        text.push('│');
    }
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Matchday Terminal - Help",
        "",
        "Global:",
        "  1            Predict screen",
        "  2            Scout screen",
        "  j/k or ↑/↓   Move",
        "  r            Reload current directory",
        "  l            Cycle competition filter",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Predict:",
        "  h            Set highlighted team as home",
        "  a            Set highlighted team as away",
        "  x            Clear selection",
        "  Enter / p    Request prediction",
        "  f            Trigger remote data ingestion",
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
