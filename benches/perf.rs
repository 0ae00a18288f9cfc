use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use serde_json::{Value, json};

use winr8te_terminal::api::parse_player_record_json;
use winr8te_terminal::fetch_cache::unwrap_leaderboard;
use winr8te_terminal::leaderboard::{LeaderboardCategory, build_view, parse_leaderboard};
use winr8te_terminal::state::{AppState, Delta, apply_delta};
use winr8te_terminal::stats::summarize_player;

fn large_leaderboard(rows: usize) -> Value {
    let items: Vec<Value> = (0..rows)
        .map(|i| {
            json!({
                "steamId": format!("{}", 76_561_198_000_000_000u64 + i as u64),
                "name": format!("Player {i}"),
                "kills": 10_000 - i as i64,
                "deaths": (i as i64) * 3,
                "kdRatio": 10.0 / (i as f64 + 1.0),
            })
        })
        .collect();
    json!({ "leaderboard": items })
}

fn bench_player_record_parse(c: &mut Criterion) {
    c.bench_function("player_record_parse", |b| {
        b.iter(|| {
            let record = parse_player_record_json(black_box(PLAYER_JSON)).unwrap();
            black_box(record.is_some());
        })
    });
}

fn bench_summarize_player(c: &mut Criterion) {
    let record = parse_player_record_json(PLAYER_JSON)
        .unwrap()
        .expect("fixture has a player");
    c.bench_function("summarize_player", |b| {
        b.iter(|| {
            let summary = summarize_player(black_box(&record));
            black_box(summary.combat.len());
        })
    });
}

fn bench_leaderboard_view(c: &mut Criterion) {
    let payload = large_leaderboard(500);
    c.bench_function("leaderboard_parse_and_view", |b| {
        b.iter(|| {
            let entries = parse_leaderboard(&unwrap_leaderboard(black_box(payload.clone())));
            let view = build_view(&entries, LeaderboardCategory::Pvp, Some("kills"));
            black_box(view.rows.len());
        })
    });
}

fn bench_apply_leaderboard_delta(c: &mut Criterion) {
    let entries = parse_leaderboard(&unwrap_leaderboard(large_leaderboard(500)));
    c.bench_function("apply_leaderboard_delta", |b| {
        b.iter(|| {
            let mut state = AppState::new();
            apply_delta(
                &mut state,
                Delta::SetLeaderboard {
                    category: LeaderboardCategory::Pvp,
                    sub_key: Some("kills".to_string()),
                    entries: entries.clone(),
                },
            );
            black_box(state.leaderboard.populated().is_some());
        })
    });
}

criterion_group!(
    perf,
    bench_player_record_parse,
    bench_summarize_player,
    bench_leaderboard_view,
    bench_apply_leaderboard_delta
);
criterion_main!(perf);

static PLAYER_JSON: &str = include_str!("../tests/fixtures/player_record.json");
