use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use tracing::{error, warn};

use crate::api::parse_player_record;
use crate::fetch_cache::FetchCache;
use crate::leaderboard::{LeaderboardCategory, parse_leaderboard, request_path};
use crate::profiles::resolve_avatars;
use crate::search::probe_player;
use crate::state::{Delta, ProviderCommand};
use crate::stats::{related_players, unknown_categories};
use crate::steam::SteamId;

/// Runs provider commands off the UI thread and reports results as deltas.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    cache: Arc<FetchCache>,
    parallelism: usize,
) {
    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        while let Ok(cmd) = cmd_rx.recv() {
            let tx = tx.clone();
            let cache = cache.clone();
            let job = move || handle_command(&cache, &tx, cmd);
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
    });
}

pub fn handle_command(cache: &FetchCache, tx: &Sender<Delta>, cmd: ProviderCommand) {
    match cmd {
        ProviderCommand::FetchLeaderboard {
            category,
            sub_key,
            refresh,
        } => load_leaderboard(cache, tx, category, sub_key, refresh),
        ProviderCommand::FetchPlayer { steam_id, refresh } => {
            load_player(cache, tx, &steam_id, refresh);
        }
        ProviderCommand::ProbePlayer { steam_id } => {
            match probe_player(cache.transport().as_ref(), steam_id.as_str()) {
                Ok(found) => {
                    let _ = tx.send(Delta::SearchResolved(Ok(found.clone())));
                    load_player(cache, tx, &found, false);
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Search {steam_id}: {err}")));
                    let _ = tx.send(Delta::SearchResolved(Err(err.to_string())));
                }
            }
        }
    }
}

fn load_leaderboard(
    cache: &FetchCache,
    tx: &Sender<Delta>,
    category: LeaderboardCategory,
    sub_key: Option<String>,
    refresh: bool,
) {
    let path = request_path(category, sub_key.as_deref());
    if refresh {
        cache.expire(&path);
    }
    let entries = parse_leaderboard(&cache.get_or_fetch(&path));
    let podium_ids: Vec<SteamId> = entries
        .iter()
        .take(crate::leaderboard::PODIUM_SIZE)
        .filter_map(|entry| entry.steam_id())
        .collect();
    let _ = tx.send(Delta::Log(format!(
        "[INFO] {} {}: {} rows",
        category.config().title,
        sub_key.as_deref().unwrap_or("-"),
        entries.len()
    )));
    let _ = tx.send(Delta::SetLeaderboard {
        category,
        sub_key: sub_key.clone(),
        entries,
    });

    if podium_ids.is_empty() {
        return;
    }
    let avatars = resolve_avatars(cache, &podium_ids);
    if avatars.len() < podium_ids.len() {
        let _ = tx.send(Delta::Log(format!(
            "[WARN] {}/{} podium avatars resolved",
            avatars.len(),
            podium_ids.len()
        )));
    }
    let _ = tx.send(Delta::SetPodiumAvatars {
        category,
        sub_key,
        avatars,
    });
}

fn load_player(cache: &FetchCache, tx: &Sender<Delta>, steam_id: &SteamId, refresh: bool) {
    let path = steam_id.player_path();
    // Player records are never served stale: a failure must surface as an error.
    let result = cache
        .transport()
        .get_json(&path)
        .and_then(parse_player_record);

    let record = match result {
        Ok(record) => record,
        Err(err) => {
            error!(steam_id = %steam_id, error = %err, "player fetch failed");
            let _ = tx.send(Delta::Log(format!("[WARN] Player {steam_id}: {err}")));
            let _ = tx.send(Delta::SetPlayer {
                steam_id: steam_id.clone(),
                result: Err(format!("Erreur lors du chargement: {err}")),
            });
            return;
        }
    };

    let related: Vec<SteamId> = record
        .as_ref()
        .map(|r| {
            let drift = unknown_categories(r);
            if !drift.is_empty() {
                warn!(steam_id = %steam_id, categories = ?drift, "unknown stat categories");
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] Unknown categories: {}",
                    drift.join(", ")
                )));
            }
            related_players(r)
                .into_iter()
                .filter_map(|p| p.steam_id())
                .collect()
        })
        .unwrap_or_default();

    let _ = tx.send(Delta::SetPlayer {
        steam_id: steam_id.clone(),
        result: Ok(record),
    });

    if related.is_empty() {
        return;
    }
    if refresh {
        for id in &related {
            cache.expire(&id.profile_path());
        }
    }
    let avatars = resolve_avatars(cache, &related);
    let _ = tx.send(Delta::SetRelatedAvatars {
        steam_id: steam_id.clone(),
        avatars,
    });
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("fetch-{idx}"))
        .build()
        .ok()
}
