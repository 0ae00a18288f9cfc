mod common;

use common::fixture_json;
use winr8te_terminal::fetch_cache::unwrap_leaderboard;
use winr8te_terminal::leaderboard::{
    LeaderboardCategory, PODIUM_SIZE, build_view, parse_leaderboard,
};

#[test]
fn wrapped_and_bare_payloads_give_the_same_rows() {
    let bare = parse_leaderboard(&unwrap_leaderboard(fixture_json("leaderboard_pvp.json")));
    let wrapped =
        parse_leaderboard(&unwrap_leaderboard(fixture_json("leaderboard_pvp_wrapped.json")));
    assert_eq!(bare.len(), 5);
    assert_eq!(bare, wrapped);
}

#[test]
fn podium_takes_first_three_and_rows_start_at_four() {
    let entries = parse_leaderboard(&fixture_json("leaderboard_pvp.json"));
    let view = build_view(&entries, LeaderboardCategory::Pvp, Some("kills"));

    assert_eq!(view.podium.len(), PODIUM_SIZE);
    let podium_names: Vec<&str> = view.podium.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(podium_names, vec!["Alpha", "Bravo", "Charlie"]);
    let ranks: Vec<usize> = view.rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![4, 5]);
    assert_eq!(view.podium_ids().len(), 3);
}

#[test]
fn cells_follow_the_category_stats() {
    let entries = parse_leaderboard(&fixture_json("leaderboard_pvp.json"));
    let view = build_view(&entries, LeaderboardCategory::Pvp, Some("kills"));

    let delta = &view.rows[0];
    assert_eq!(delta.main.label, "Kills");
    assert_eq!(delta.main.value, "12,000");
    let secondary: Vec<(&str, &str)> = delta
        .secondary
        .iter()
        .map(|c| (c.label.as_str(), c.value.as_str()))
        .collect();
    assert_eq!(secondary, vec![("Morts", "9,000"), ("KD", "1.3")]);

    let charlie = &view.podium[2];
    assert_eq!(charlie.secondary.len(), 1);
    assert_eq!(view.podium[1].main.value, "402");
}

#[test]
fn short_leaderboard_has_partial_podium_and_no_rows() {
    let entries = parse_leaderboard(&serde_json::json!([
        { "steamId": "76561198000000011", "name": "Solo", "totalPveKills": 3 }
    ]));
    let view = build_view(&entries, LeaderboardCategory::Pve, None);
    assert_eq!(view.podium.len(), 1);
    assert!(view.rows.is_empty());
    assert!(!view.is_empty());
}

#[test]
fn non_array_payload_has_no_rows() {
    assert!(parse_leaderboard(&serde_json::json!({ "error": "down" })).is_empty());
    assert!(parse_leaderboard(&serde_json::Value::Null).is_empty());
}
