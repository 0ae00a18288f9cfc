use std::collections::{HashMap, VecDeque};

use chrono::Local;

use crate::api::PlayerRecord;
use crate::leaderboard::{LeaderboardCategory, LeaderboardEntry, LeaderboardView, build_view};
use crate::stats::{PlayerSummary, summarize_player};
use crate::steam::SteamId;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Leaderboard,
    Player,
}

/// Lifecycle of one screen section.
///
/// `Loading` resolves to exactly one of the other three; a selection change
/// puts any of them back to `Loading`.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Loading,
    Error(String),
    Empty,
    Populated(T),
}

impl<T> Section<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Section::Loading)
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Section::Populated(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub input: String,
    pub active: bool,
    pub pending: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchLeaderboard {
        category: LeaderboardCategory,
        sub_key: Option<String>,
        refresh: bool,
    },
    FetchPlayer {
        steam_id: SteamId,
        refresh: bool,
    },
    ProbePlayer {
        steam_id: SteamId,
    },
}

#[derive(Debug)]
pub enum Delta {
    SetLeaderboard {
        category: LeaderboardCategory,
        sub_key: Option<String>,
        entries: Vec<LeaderboardEntry>,
    },
    SetPodiumAvatars {
        category: LeaderboardCategory,
        sub_key: Option<String>,
        avatars: HashMap<SteamId, String>,
    },
    SetPlayer {
        steam_id: SteamId,
        result: Result<Option<PlayerRecord>, String>,
    },
    SetRelatedAvatars {
        steam_id: SteamId,
        avatars: HashMap<SteamId, String>,
    },
    SearchResolved(Result<SteamId, String>),
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub category: LeaderboardCategory,
    pub sub_selection: HashMap<LeaderboardCategory, &'static str>,
    pub leaderboard: Section<LeaderboardView>,
    pub leaderboard_selected: usize,
    pub podium_avatars: HashMap<SteamId, String>,
    pub player_id: Option<SteamId>,
    pub player: Section<PlayerSummary>,
    pub related_avatars: HashMap<SteamId, String>,
    pub player_scroll: u16,
    pub search: SearchState,
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
        let sub_selection = LeaderboardCategory::ALL
            .iter()
            .filter_map(|cat| cat.default_sub_option().map(|sub| (*cat, sub.key)))
            .collect();
        Self {
            screen: Screen::Leaderboard,
            category: LeaderboardCategory::Pvp,
            sub_selection,
            leaderboard: Section::Loading,
            leaderboard_selected: 0,
            podium_avatars: HashMap::new(),
            player_id: None,
            player: Section::Loading,
            related_avatars: HashMap::new(),
            player_scroll: 0,
            search: SearchState::default(),
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", line.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn active_sub_key(&self) -> Option<&'static str> {
        self.sub_selection.get(&self.category).copied()
    }

    fn is_current_leaderboard(&self, category: LeaderboardCategory, sub_key: Option<&str>) -> bool {
        category == self.category && sub_key == self.active_sub_key()
    }

    /// Puts the leaderboard section back to `Loading` and returns the fetch to run.
    pub fn load_leaderboard(&mut self, refresh: bool) -> ProviderCommand {
        self.leaderboard = Section::Loading;
        self.leaderboard_selected = 0;
        self.podium_avatars.clear();
        ProviderCommand::FetchLeaderboard {
            category: self.category,
            sub_key: self.active_sub_key().map(str::to_string),
            refresh,
        }
    }

    pub fn select_category(&mut self, category: LeaderboardCategory) -> ProviderCommand {
        self.category = category;
        self.screen = Screen::Leaderboard;
        self.load_leaderboard(false)
    }

    pub fn cycle_category(&mut self, forward: bool) -> ProviderCommand {
        let next = if forward {
            self.category.next()
        } else {
            self.category.prev()
        };
        self.select_category(next)
    }

    /// `None` when the current category has no sub-categories.
    pub fn cycle_sub_option(&mut self, forward: bool) -> Option<ProviderCommand> {
        let subs = self.category.config().sub_options;
        if subs.len() < 2 {
            return None;
        }
        let current = self.active_sub_key();
        let idx = subs
            .iter()
            .position(|s| Some(s.key) == current)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % subs.len()
        } else {
            (idx + subs.len() - 1) % subs.len()
        };
        self.sub_selection.insert(self.category, subs[next].key);
        Some(self.load_leaderboard(false))
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Leaderboard => {
                let total = self.leaderboard_len();
                if total > 0 {
                    self.leaderboard_selected = (self.leaderboard_selected + 1).min(total - 1);
                }
            }
            Screen::Player => self.player_scroll = self.player_scroll.saturating_add(1),
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Leaderboard => {
                self.leaderboard_selected = self.leaderboard_selected.saturating_sub(1);
            }
            Screen::Player => self.player_scroll = self.player_scroll.saturating_sub(1),
        }
    }

    fn leaderboard_len(&self) -> usize {
        self.leaderboard
            .populated()
            .map(|view| view.podium.len() + view.rows.len())
            .unwrap_or(0)
    }

    pub fn selected_leaderboard_id(&self) -> Option<SteamId> {
        let view = self.leaderboard.populated()?;
        let row = view.all_rows().nth(self.leaderboard_selected)?;
        SteamId::parse(&row.steam_id).ok()
    }

    pub fn open_player(&mut self, steam_id: SteamId) -> ProviderCommand {
        self.screen = Screen::Player;
        self.player_id = Some(steam_id.clone());
        self.player = Section::Loading;
        self.related_avatars.clear();
        self.player_scroll = 0;
        ProviderCommand::FetchPlayer {
            steam_id,
            refresh: false,
        }
    }

    pub fn reload_player(&mut self) -> Option<ProviderCommand> {
        let steam_id = self.player_id.clone()?;
        self.player = Section::Loading;
        self.related_avatars.clear();
        Some(ProviderCommand::FetchPlayer {
            steam_id,
            refresh: true,
        })
    }

    pub fn start_search(&mut self) {
        self.search.active = true;
        self.search.message = None;
    }

    pub fn cancel_search(&mut self) {
        self.search.active = false;
        self.search.input.clear();
    }

    /// Validates the typed id locally. Malformed input never becomes a request.
    pub fn submit_search(&mut self) -> Option<ProviderCommand> {
        if self.search.pending {
            return None;
        }
        match SteamId::parse(&self.search.input) {
            Ok(steam_id) => {
                self.search.pending = true;
                self.search.message = None;
                Some(ProviderCommand::ProbePlayer { steam_id })
            }
            Err(err) => {
                self.search.message = Some(err.to_string());
                None
            }
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetLeaderboard {
            category,
            sub_key,
            entries,
        } => {
            if !state.is_current_leaderboard(category, sub_key.as_deref()) {
                return;
            }
            let view = build_view(&entries, category, sub_key.as_deref());
            state.leaderboard_selected = 0;
            state.leaderboard = if view.is_empty() {
                Section::Empty
            } else {
                Section::Populated(view)
            };
        }
        Delta::SetPodiumAvatars {
            category,
            sub_key,
            avatars,
        } => {
            if state.is_current_leaderboard(category, sub_key.as_deref())
                && state.leaderboard.populated().is_some()
            {
                state.podium_avatars = avatars;
            }
        }
        Delta::SetPlayer { steam_id, result } => {
            if state.player_id.as_ref() != Some(&steam_id) {
                return;
            }
            state.player = match result {
                Ok(Some(record)) => Section::Populated(summarize_player(&record)),
                Ok(None) => Section::Empty,
                Err(message) => Section::Error(message),
            };
        }
        Delta::SetRelatedAvatars { steam_id, avatars } => {
            if state.player_id.as_ref() == Some(&steam_id) {
                state.related_avatars = avatars;
            }
        }
        Delta::SearchResolved(result) => {
            state.search.pending = false;
            match result {
                Ok(steam_id) => {
                    state.search.active = false;
                    state.search.input.clear();
                    state.search.message = None;
                    // The provider follows a successful probe with the player fetch.
                    state.screen = Screen::Player;
                    state.player_id = Some(steam_id);
                    state.player = Section::Loading;
                    state.related_avatars.clear();
                    state.player_scroll = 0;
                }
                Err(message) => {
                    state.search.message = Some(message);
                }
            }
        }
        Delta::Log(line) => state.push_log(line),
    }
}
