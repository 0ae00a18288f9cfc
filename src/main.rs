use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Context;
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
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::info;

use winr8te_terminal::api::PlayerRef;
use winr8te_terminal::config::AppConfig;
use winr8te_terminal::feed;
use winr8te_terminal::fetch_cache::FetchCache;
use winr8te_terminal::http_client::HttpTransport;
use winr8te_terminal::leaderboard::{LeaderboardCategory, LeaderboardRow, LeaderboardView};
use winr8te_terminal::logging;
use winr8te_terminal::state::{self, AppState, ProviderCommand, Screen, Section, apply_delta};
use winr8te_terminal::stats::{PlayerSummary, StatTile, validate_category_tables};
use winr8te_terminal::steam::SteamId;

const MAX_SEARCH_LEN: usize = 32;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Fetch unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider stopped; request dropped");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search.active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('s') => self.state.start_search(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                let cmd = self.state.select_category(LeaderboardCategory::ALL[idx]);
                self.send(cmd);
            }
            KeyCode::Tab | KeyCode::Char('l') => {
                let cmd = self.state.cycle_category(true);
                self.send(cmd);
            }
            KeyCode::BackTab | KeyCode::Char('h') => {
                let cmd = self.state.cycle_category(false);
                self.send(cmd);
            }
            KeyCode::Right | KeyCode::Char(']') => self.cycle_sub(true),
            KeyCode::Left | KeyCode::Char('[') => self.cycle_sub(false),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter | KeyCode::Char('d') => {
                if self.state.screen == Screen::Leaderboard {
                    if let Some(id) = self.state.selected_leaderboard_id() {
                        let cmd = self.state.open_player(id);
                        self.send(cmd);
                    }
                }
            }
            KeyCode::Char('t') => self.open_related(|s| s.favorite_target.as_ref()),
            KeyCode::Char('n') => self.open_related(|s| s.nemesis.as_ref()),
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Leaderboard,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.cancel_search(),
            KeyCode::Enter => {
                if let Some(cmd) = self.state.submit_search() {
                    self.send(cmd);
                }
            }
            KeyCode::Backspace => {
                self.state.search.input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                if self.state.search.input.chars().count() < MAX_SEARCH_LEN {
                    self.state.search.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn cycle_sub(&mut self, forward: bool) {
        if self.state.screen != Screen::Leaderboard {
            return;
        }
        if let Some(cmd) = self.state.cycle_sub_option(forward) {
            self.send(cmd);
        }
    }

    fn open_related(&mut self, pick: impl Fn(&PlayerSummary) -> Option<&PlayerRef>) {
        if self.state.screen != Screen::Player {
            return;
        }
        let Some(target) = self
            .state
            .player
            .populated()
            .and_then(pick)
            .and_then(PlayerRef::steam_id)
        else {
            self.state.push_log("[INFO] No linked player");
            return;
        };
        let cmd = self.state.open_player(target);
        self.send(cmd);
    }

    fn reload(&mut self) {
        match self.state.screen {
            Screen::Leaderboard => {
                let cmd = self.state.load_leaderboard(true);
                self.send(cmd);
            }
            Screen::Player => {
                if let Some(cmd) = self.state.reload_player() {
                    self.send(cmd);
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    if let Some(path) = config.log_file.as_deref() {
        logging::init_file_logging(path)?;
    }
    validate_category_tables().context("stat category tables are inconsistent")?;
    info!(api_url = %config.api_url, ttl_secs = config.cache_ttl.as_secs(), "starting");

    let transport = HttpTransport::new(&config.api_url, config.request_timeout)?;
    let cache = Arc::new(FetchCache::new(
        Arc::new(transport),
        config.cache_ttl,
        config.cache_capacity,
    ));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx, cache, config.fetch_parallelism);

    let mut app = App::new(Some(cmd_tx));
    app.state.push_log(format!("[INFO] API {}", config.api_url));
    let first = app.state.load_leaderboard(false);
    app.send(first);
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

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
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
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Leaderboard => render_leaderboard(frame, chunks[1], &app.state),
        Screen::Player => render_player(frame, chunks[1], &app.state),
    }

    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Leaderboard => {
            let config = state.category.config();
            format!("WINR8TE STATS | Leaderboards | {} - {}", config.title, config.description)
        }
        Screen::Player => match state.player_id.as_ref() {
            Some(id) => format!("WINR8TE STATS | Joueur {id}"),
            None => "WINR8TE STATS | Joueur".to_string(),
        },
    };
    let line1 = format!("  /\\  {title}");
    let line2 = " /__\\".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.search.active {
        return "Enter Rechercher | Esc Annuler".to_string();
    }
    let keys: &[&str] = match state.screen {
        Screen::Leaderboard => &[
            "1-5/Tab Catégorie",
            "←/→ Sous-catégorie",
            "j/k Move",
            "Enter Joueur",
        ],
        Screen::Player => &["b/Esc Back", "j/k Scroll", "t Cible", "n Nemesis"],
    };
    let common = ["/ Recherche", "r Reload", "? Help", "q Quit"];
    keys.iter().chain(common.iter()).copied().collect::<Vec<_>>().join(" | ")
}

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(category_tabs(state)), sections[0]);
    frame.render_widget(Paragraph::new(sub_option_tabs(state)), sections[1]);

    let body = sections[2];
    match &state.leaderboard {
        Section::Loading => render_skeleton(frame, body),
        Section::Error(_) => {
            let msg = Paragraph::new("Erreur de chargement")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red));
            frame.render_widget(msg, body);
        }
        Section::Empty => {
            let msg = Paragraph::new("Aucune donnée disponible")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, body);
        }
        Section::Populated(view) => render_leaderboard_view(frame, body, state, view),
    }
}

fn category_tabs(state: &AppState) -> Line<'static> {
    let mut spans = vec![Span::styled("Catégories ", Style::default().fg(Color::DarkGray))];
    for (idx, cat) in LeaderboardCategory::ALL.iter().enumerate() {
        let label = format!(" {} {} ", idx + 1, cat.config().title);
        let style = if *cat == state.category {
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn sub_option_tabs(state: &AppState) -> Line<'static> {
    let subs = state.category.config().sub_options;
    if subs.is_empty() {
        return Line::from("");
    }
    let active = state.active_sub_key();
    let mut spans = vec![Span::styled(
        "Sous-catégories ",
        Style::default().fg(Color::DarkGray),
    )];
    for sub in subs {
        let style = if Some(sub.key) == active {
            Style::default().fg(Color::White).bg(Color::Blue)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", sub.label), style));
    }
    Line::from(spans)
}

fn render_skeleton(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = std::iter::once(Line::from("Chargement..."))
        .chain((0..5).map(|_| Line::from("░".repeat(area.width.saturating_sub(2) as usize))))
        .collect();
    let skeleton = Paragraph::new(lines).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(skeleton, area);
}

fn render_leaderboard_view(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    view: &LeaderboardView,
) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);

    render_podium(frame, parts[0], state, view);

    let list_area = parts[1];
    if list_area.height == 0 {
        return;
    }
    let rows: Vec<&LeaderboardRow> = view.all_rows().collect();
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.leaderboard_selected, rows.len(), visible);
    let lines: Vec<Line> = rows[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let selected = start + offset == state.leaderboard_selected;
            leaderboard_line(row, selected)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), list_area);
}

fn render_podium(frame: &mut Frame, area: Rect, state: &AppState, view: &LeaderboardView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (idx, row) in view.podium.iter().enumerate() {
        let avatar = SteamId::parse(&row.steam_id)
            .ok()
            .and_then(|id| state.podium_avatars.get(&id));
        let marker = if avatar.is_some() { "[◉]" } else { "[?]" };
        let text = vec![
            Line::from(format!("{marker} {}", row.name)).style(Style::default().fg(Color::White)),
            Line::from(format!("{}: {}", row.main.label, row.main.value))
                .style(Style::default().fg(Color::Yellow)),
        ];
        let block = Block::default()
            .title(format!("#{}", idx + 1))
            .borders(Borders::ALL);
        frame.render_widget(Paragraph::new(text).block(block), cols[idx]);
    }
}

fn leaderboard_line(row: &LeaderboardRow, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let mut spans = vec![
        Span::styled(format!("{:>3}  ", row.rank), style.fg(Color::Cyan)),
        Span::styled(format!("{:<24} ", truncate(&row.name, 24)), style),
        Span::styled(format!("{:<18} ", row.steam_id), style.fg(Color::DarkGray)),
        Span::styled(
            format!("{} {:>10}", row.main.label, row.main.value),
            style.fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ];
    for cell in &row.secondary {
        spans.push(Span::styled(format!("  {} {}", cell.label, cell.value), style));
    }
    Line::from(spans)
}

fn render_player(frame: &mut Frame, area: Rect, state: &AppState) {
    match &state.player {
        Section::Loading => {
            let msg = Paragraph::new("Chargement des statistiques...")
                .alignment(Alignment::Center);
            frame.render_widget(msg, area);
        }
        Section::Error(message) => {
            let msg = Paragraph::new(format!("Erreur lors du chargement\n{message}"))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red));
            frame.render_widget(msg, area);
        }
        Section::Empty => {
            let msg = Paragraph::new("Aucune donnée trouvée pour ce joueur")
                .alignment(Alignment::Center);
            frame.render_widget(msg, area);
        }
        Section::Populated(summary) => {
            let panel = Paragraph::new(player_lines(state, summary))
                .block(Block::default().title(summary.name.clone()).borders(Borders::ALL))
                .wrap(Wrap { trim: false })
                .scroll((state.player_scroll, 0));
            frame.render_widget(panel, area);
        }
    }
}

fn player_lines(state: &AppState, summary: &PlayerSummary) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(format!(
            "{} {}  {}",
            if summary.avatar.is_some() { "[◉]" } else { "[?]" },
            summary.steam_id,
            if summary.is_online { "● en ligne" } else { "○ hors ligne" }
        )),
        Line::from(""),
        Line::styled("Combat", heading),
        tiles_line(&summary.combat[..4]),
        tiles_line(&summary.combat[4..]),
        related_line("Cible", "Aucune", summary.favorite_target.as_ref(), state),
        related_line("Nemesis", "Aucun", summary.nemesis.as_ref(), state),
        Line::from(""),
        Line::styled("Ressources", heading),
        tiles_line(&summary.resources),
        Line::styled("Construction", heading),
        tiles_line(&summary.building),
        Line::from(format!(
            "Structures {}  Déployables {}",
            summary.total_buildings, summary.total_deployables
        )),
        Line::styled("Explosifs", heading),
        tiles_line(&summary.explosives),
        Line::styled("Zones touchées", heading),
        tiles_line(&summary.hit_distribution),
        Line::from(""),
    ];

    if !summary.weapons.is_empty() {
        lines.push(Line::styled("Statistiques des armes", heading));
        lines.push(Line::from(format!(
            "{:<28} {:>8} {:>14} {:>14}",
            "Arme", "Kills", "Distance moy.", "Distance max"
        )));
        for w in &summary.weapons {
            lines.push(Line::from(format!(
                "{:<28} {:>8} {:>14} {:>14}",
                truncate(&w.weapon, 28),
                w.kills,
                w.avg_distance,
                w.max_distance
            )));
        }
        lines.push(Line::from(""));
    }

    if !summary.top_crafted.is_empty() {
        lines.push(Line::styled("Objets Craftés", heading));
        for tile in &summary.top_crafted {
            lines.push(Line::from(format!("  {:<28} {:>10}", tile.label, tile.value)));
        }
        lines.push(Line::from(""));
    }

    if !summary.animal_kills.is_empty() {
        lines.push(Line::styled("Animaux", heading));
        lines.push(tiles_line(&summary.animal_kills));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(format!(
        "Balles tirées {}",
        summary.total_bullets_fired
    )));
    lines
}

fn tiles_line(tiles: &[StatTile]) -> Line<'static> {
    let mut spans = Vec::new();
    for tile in tiles {
        spans.push(Span::styled(
            format!("{} ", tile.label),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            format!("{}   ", tile.value),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn related_line(
    label: &str,
    none: &str,
    target: Option<&PlayerRef>,
    state: &AppState,
) -> Line<'static> {
    let value = match target {
        Some(player) => {
            let has_avatar = player
                .steam_id()
                .is_some_and(|id| state.related_avatars.contains_key(&id));
            let marker = if has_avatar { "[◉]" } else { "[?]" };
            format!("{marker} {} ({})", player.name, player.steam_id)
        }
        None => none.to_string(),
    };
    Line::from(vec![
        Span::styled(format!("{label} "), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines: Vec<Line> = Vec::new();
    if state.search.active || state.search.message.is_some() {
        let prompt = if state.search.pending {
            format!("Steam ID: {} (Recherche...)", state.search.input)
        } else if state.search.active {
            format!("Steam ID: {}_", state.search.input)
        } else {
            "Steam ID:".to_string()
        };
        lines.push(Line::styled(prompt, Style::default().fg(Color::Yellow)));
        if let Some(message) = state.search.message.as_deref() {
            lines.push(Line::styled(message.to_string(), Style::default().fg(Color::Red)));
        }
    }
    let remaining = (area.height.saturating_sub(2) as usize).saturating_sub(lines.len());
    let logs: Vec<&String> = state.logs.iter().rev().take(remaining).collect();
    for line in logs.into_iter().rev() {
        lines.push(Line::from(line.clone()));
    }
    if lines.is_empty() {
        lines.push(Line::from("No alerts yet"));
    }
    let console = Paragraph::new(lines)
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
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
        "WINR8TE Stats - Help",
        "",
        "Global:",
        "  / or s       Search a Steam ID",
        "  r            Reload current section",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Leaderboards:",
        "  1-5 / Tab    Category",
        "  ←/→ or [ ]   Sub-category",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open player",
        "",
        "Player:",
        "  j/k          Scroll",
        "  t / n        Open favorite target / nemesis",
        "  b / Esc      Back",
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
