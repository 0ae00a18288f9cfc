use std::sync::Arc;

use anyhow::{Context, Result, bail};

use winr8te_terminal::api::parse_player_record;
use winr8te_terminal::config::AppConfig;
use winr8te_terminal::fetch_cache::FetchCache;
use winr8te_terminal::http_client::{HttpTransport, Transport};
use winr8te_terminal::logging;
use winr8te_terminal::profiles::resolve_avatars;
use winr8te_terminal::search::probe_player;
use winr8te_terminal::stats::{StatTile, related_players, summarize_player, unknown_categories};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init_stderr_logging();

    let Some(input) = std::env::args().nth(1) else {
        bail!("usage: player_report <steam-id64>");
    };

    let config = AppConfig::from_env();
    let transport = Arc::new(HttpTransport::new(&config.api_url, config.request_timeout)?);
    let steam_id = probe_player(transport.as_ref(), input.trim())
        .with_context(|| format!("search {input}"))?;

    let body = transport
        .get_json(&steam_id.player_path())
        .with_context(|| format!("fetch player {steam_id}"))?;
    let Some(record) = parse_player_record(body)? else {
        println!("No data for {steam_id}.");
        return Ok(());
    };

    let summary = summarize_player(&record);
    println!("{} ({})", summary.name, summary.steam_id);
    println!(
        "status: {}",
        if summary.is_online { "online" } else { "offline" }
    );
    if let Some(avatar) = summary.avatar.as_deref() {
        println!("avatar: {avatar}");
    }
    print_group("Combat", &summary.combat);
    print_group("Ressources", &summary.resources);
    print_group("Construction", &summary.building);
    print_group("Explosifs", &summary.explosives);
    print_group("Zones touchées", &summary.hit_distribution);
    print_group("Objets Craftés", &summary.top_crafted);

    if !summary.weapons.is_empty() {
        println!("Armes:");
        for w in &summary.weapons {
            println!(
                "  {:<28} kills={:<8} avg={:<10} max={}",
                w.weapon, w.kills, w.avg_distance, w.max_distance
            );
        }
    }

    let cache = FetchCache::new(transport, config.cache_ttl, config.cache_capacity);
    let related: Vec<_> = related_players(&record)
        .into_iter()
        .filter_map(|p| p.steam_id())
        .collect();
    let avatars = resolve_avatars(&cache, &related);
    for (label, player) in [
        ("Cible", summary.favorite_target.as_ref()),
        ("Nemesis", summary.nemesis.as_ref()),
    ] {
        match player {
            Some(p) => {
                let avatar = p
                    .steam_id()
                    .and_then(|id| avatars.get(&id).cloned())
                    .unwrap_or_else(|| "-".to_string());
                println!("{label}: {} ({}) avatar={avatar}", p.name, p.steam_id);
            }
            None => println!("{label}: -"),
        }
    }

    let drift = unknown_categories(&record);
    if !drift.is_empty() {
        eprintln!("unknown categories: {}", drift.join(", "));
    }
    Ok(())
}

fn print_group(title: &str, tiles: &[StatTile]) {
    if tiles.is_empty() {
        return;
    }
    let parts: Vec<String> = tiles
        .iter()
        .map(|t| format!("{}={}", t.label, t.value))
        .collect();
    println!("{title}: {}", parts.join("  "));
}
