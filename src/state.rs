use std::collections::VecDeque;
use std::time::SystemTime;

use serde::Deserialize;

use crate::api_error::ApiError;

/// A selectable team as served by the directory endpoints.
///
/// Ids are opaque: the wire value may be a JSON string or an integer and is
/// normalized to a string. The directory snapshot is replaced wholesale on
/// every successful load, never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
    pub crest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
    pub position: String,
    pub team: Option<String>,
}

/// Match-outcome probabilities as returned by the predict endpoint.
///
/// The three values are expected to sum to ~1.0 but that is never enforced;
/// degenerate inputs flow through to presentation unchanged. Unknown extra
/// fields on the wire (the live service also sends a confidence score) are
/// ignored, missing ones fail the parse.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PredictionResult {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

/// The user's current home/away choice. An empty string means unset,
/// mirroring the form-value semantics of the selection controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub home: String,
    pub away: String,
}

impl SelectionState {
    pub fn set_home(&mut self, id: impl Into<String>) {
        self.home = id.into();
    }

    pub fn set_away(&mut self, id: impl Into<String>) {
        self.away = id.into();
    }

    pub fn clear(&mut self) {
        self.home.clear();
        self.away.clear();
    }

    /// Both sides chosen, and not the same team against itself.
    pub fn is_submittable(&self) -> bool {
        !self.home.is_empty() && !self.away.is_empty() && self.home != self.away
    }
}

/// Lifecycle of a single prediction request. Terminal states persist until
/// the next submission; the loading indicator is derived from this and
/// nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    InFlight { token: u64 },
    Succeeded(PredictionResult),
    Failed(ApiError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::InFlight { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Predict,
    Scout,
}

/// Competition codes understood by the filtered directory endpoint,
/// in cycle order. `None` selects the unfiltered directory.
pub const COMPETITIONS: [&str; 6] = ["PL", "PD", "BL1", "SA", "FL1", "CL"];

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub competition: Option<String>,
    pub teams: Vec<TeamRef>,
    pub teams_loading: bool,
    pub teams_fetched_at: Option<SystemTime>,
    pub players: Vec<PlayerRef>,
    pub players_loading: bool,
    pub players_fetched_at: Option<SystemTime>,
    pub selection: SelectionState,
    pub request: RequestState,
    pub last_token: u64,
    pub directory_cursor: usize,
    pub scout_cursor: usize,
    pub ingest_running: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Predict,
            competition: None,
            teams: Vec::new(),
            teams_loading: false,
            teams_fetched_at: None,
            players: Vec::new(),
            players_loading: false,
            players_fetched_at: None,
            selection: SelectionState::default(),
            request: RequestState::Idle,
            last_token: 0,
            directory_cursor: 0,
            scout_cursor: 0,
            ingest_running: false,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn select_next(&mut self) {
        let total = self.visible_len();
        let cursor = self.cursor_mut();
        if total == 0 {
            *cursor = 0;
            return;
        }
        *cursor = (*cursor + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_len();
        let cursor = self.cursor_mut();
        if total == 0 {
            *cursor = 0;
            return;
        }
        if *cursor == 0 {
            *cursor = total - 1;
        } else {
            *cursor -= 1;
        }
    }

    pub fn clamp_cursors(&mut self) {
        if self.teams.is_empty() {
            self.directory_cursor = 0;
        } else if self.directory_cursor >= self.teams.len() {
            self.directory_cursor = self.teams.len() - 1;
        }
        if self.players.is_empty() {
            self.scout_cursor = 0;
        } else if self.scout_cursor >= self.players.len() {
            self.scout_cursor = self.players.len() - 1;
        }
    }

    fn visible_len(&self) -> usize {
        match self.screen {
            Screen::Predict => self.teams.len(),
            Screen::Scout => self.players.len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.screen {
            Screen::Predict => &mut self.directory_cursor,
            Screen::Scout => &mut self.scout_cursor,
        }
    }

    pub fn highlighted_team(&self) -> Option<&TeamRef> {
        self.teams.get(self.directory_cursor)
    }

    pub fn has_team(&self, id: &str) -> bool {
        self.teams.iter().any(|t| t.id == id)
    }

    pub fn team_name(&self, id: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    pub fn cycle_competition(&mut self) {
        self.competition = match self.competition.as_deref() {
            None => Some(COMPETITIONS[0].to_string()),
            Some(code) => COMPETITIONS
                .iter()
                .position(|c| *c == code)
                .and_then(|i| COMPETITIONS.get(i + 1))
                .map(|c| c.to_string()),
        };
    }

    pub fn competition_label(&self) -> &str {
        self.competition.as_deref().unwrap_or("ALL")
    }

    /// Start a prediction request for the current selection.
    ///
    /// No-op returning `None` unless the selection is submittable and both
    /// ids still exist in the directory snapshot. Otherwise transitions to
    /// `InFlight` under a fresh token and hands back the command to send.
    /// Submitting while a request is in flight supersedes it: only the
    /// newest token's response will ever be applied.
    pub fn begin_submit(&mut self) -> Option<ProviderCommand> {
        if !self.selection.is_submittable() {
            return None;
        }
        if !self.has_team(&self.selection.home) || !self.has_team(&self.selection.away) {
            self.push_log("[WARN] Selection no longer matches the directory, pick again");
            return None;
        }
        self.last_token += 1;
        let token = self.last_token;
        self.request = RequestState::InFlight { token };
        Some(ProviderCommand::Predict {
            home: self.selection.home.clone(),
            away: self.selection.away.clone(),
            token,
        })
    }
}

/// Work orders from the UI to the provider thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchTeams { competition: Option<String> },
    FetchPlayers,
    Predict { home: String, away: String, token: u64 },
    TriggerIngest,
}

/// State updates from the provider back to the UI thread. Every command is
/// answered with exactly one non-log delta, so in-flight flags always clear.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    SetTeams(Vec<TeamRef>),
    TeamsFailed(ApiError),
    SetPlayers(Vec<PlayerRef>),
    PlayersFailed(ApiError),
    PredictionSettled {
        token: u64,
        outcome: Result<PredictionResult, ApiError>,
    },
    IngestFinished(Result<String, ApiError>),
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetTeams(teams) => {
            state.teams_loading = false;
            state.teams_fetched_at = Some(SystemTime::now());
            state.teams = teams;
            state.clamp_cursors();
            let home_stale =
                !state.selection.home.is_empty() && !state.has_team(&state.selection.home);
            let away_stale =
                !state.selection.away.is_empty() && !state.has_team(&state.selection.away);
            if home_stale {
                state.selection.home.clear();
            }
            if away_stale {
                state.selection.away.clear();
            }
            state.push_log(format!(
                "[INFO] Directory loaded: {} teams",
                state.teams.len()
            ));
            if home_stale || away_stale {
                state.push_log("[WARN] Selection cleared: team no longer in directory");
            }
        }
        Delta::TeamsFailed(err) => {
            // Keep the previous snapshot: stale-but-present beats empty.
            state.teams_loading = false;
            state.push_log(format!("[WARN] Directory load failed: {err}"));
        }
        Delta::SetPlayers(players) => {
            state.players_loading = false;
            state.players_fetched_at = Some(SystemTime::now());
            state.players = players;
            state.clamp_cursors();
            state.push_log(format!(
                "[INFO] Scout loaded: {} players",
                state.players.len()
            ));
        }
        Delta::PlayersFailed(err) => {
            state.players_loading = false;
            state.push_log(format!("[WARN] Scout load failed: {err}"));
        }
        Delta::PredictionSettled { token, outcome } => {
            let RequestState::InFlight { token: current } = state.request else {
                state.push_log("[INFO] Prediction response discarded: no request in flight");
                return;
            };
            if token != current {
                state.push_log("[INFO] Prediction response discarded: superseded");
                return;
            }
            state.request = match outcome {
                Ok(result) => {
                    state.push_log("[INFO] Prediction ready");
                    RequestState::Succeeded(result)
                }
                Err(err) => {
                    state.push_log(format!("[WARN] Prediction failed: {err}"));
                    RequestState::Failed(err)
                }
            };
        }
        Delta::IngestFinished(outcome) => {
            state.ingest_running = false;
            match outcome {
                Ok(msg) => state.push_log(format!("[INFO] Ingestion finished: {msg}")),
                Err(err) => state.push_log(format!("[WARN] Ingestion failed: {err}")),
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
