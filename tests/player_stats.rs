mod common;

use serde_json::json;

use common::read_fixture;
use winr8te_terminal::api::{parse_player_record, parse_player_record_json};
use winr8te_terminal::stats::{related_players, summarize_player, unknown_categories};

fn fixture_summary() -> winr8te_terminal::stats::PlayerSummary {
    let record = parse_player_record_json(&read_fixture("player_record.json"))
        .expect("fixture should parse")
        .expect("fixture has a player");
    summarize_player(&record)
}

#[test]
fn gathered_resources_read_first_match() {
    let summary = fixture_summary();
    assert_eq!(summary.tile("Bois"), Some("5"));
    assert_eq!(summary.tile("Pierre"), Some("120,000"));
    assert_eq!(summary.tile("Métal"), Some("45,000"));
    assert_eq!(summary.tile("Soufre"), Some("0"));
}

#[test]
fn explosive_rifle_ammo_is_summed() {
    let summary = fixture_summary();
    assert_eq!(summary.tile("Roquette"), Some("22"));
    assert_eq!(summary.tile("C4"), Some("15"));
    assert_eq!(summary.tile("Satchel"), Some("0"));
    assert_eq!(summary.tile("Balle Explo"), Some("7"));
}

#[test]
fn combat_tiles_are_formatted() {
    let summary = fixture_summary();
    assert_eq!(summary.name, "Kraken");
    assert!(summary.is_online);
    assert_eq!(
        summary.avatar.as_deref(),
        Some("https://avatars.example/kraken_full.jpg")
    );
    assert_eq!(summary.tile("Kills"), Some("1,234"));
    assert_eq!(summary.tile("Morts"), Some("502"));
    assert_eq!(summary.tile("Max Distance"), Some("312 m"));
    assert_eq!(summary.tile("Tirs"), Some("98,765"));
    assert_eq!(summary.tile("Tourelles"), Some("6"));
    assert_eq!(summary.tile("Tête"), Some("25.0%"));
    assert_eq!(summary.tile("Torse"), Some("60.0%"));
    assert_eq!(summary.tile("Jambes"), Some("0.0%"));
}

#[test]
fn weapons_and_top_crafted_lists() {
    let summary = fixture_summary();
    assert_eq!(summary.weapons.len(), 2);
    assert_eq!(summary.weapons[1].weapon, "Bolt Action Rifle");
    assert_eq!(summary.weapons[1].kills, "210");
    assert_eq!(summary.weapons[1].max_distance, "312m");

    let crafted: Vec<&str> = summary.top_crafted.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(
        crafted,
        vec!["Wooden Door", "Bandage", "Arrow", "Sheet Metal Door", "Garage Door"]
    );
}

#[test]
fn favorite_target_and_nemesis_shapes_both_resolve() {
    let summary = fixture_summary();
    let target = summary.favorite_target.as_ref().expect("target from array");
    assert_eq!(target.name, "Bambi");
    let nemesis = summary.nemesis.as_ref().expect("nemesis from object");
    assert_eq!(nemesis.steam_id, "76561198000000002");
    assert!(nemesis.steam_id().is_some());
}

#[test]
fn empty_record_reads_zero_everywhere() {
    let record = parse_player_record(json!({}))
        .expect("empty object parses")
        .expect("object is a record");
    let summary = summarize_player(&record);

    assert_eq!(summary.tile("Bois"), Some("0"));
    assert_eq!(summary.tile("Balle Explo"), Some("0"));
    assert_eq!(summary.tile("Kills"), Some("0"));
    assert_eq!(summary.tile("KD"), Some("0.0"));
    assert!(summary.favorite_target.is_none());
    assert!(summary.weapons.is_empty());
    assert!(related_players(&record).is_empty());
}

#[test]
fn null_body_is_no_player() {
    assert!(parse_player_record_json("null").expect("null parses").is_none());
    assert!(parse_player_record_json("  ").expect("blank parses").is_none());
}

#[test]
fn unknown_categories_are_reported() {
    let record = parse_player_record_json(&read_fixture("player_record.json"))
        .expect("fixture should parse")
        .expect("fixture has a player");
    assert_eq!(
        unknown_categories(&record),
        vec!["gathered:Hemp".to_string(), "deployables:Large Wood Box".to_string()]
    );
}

#[test]
fn related_players_are_deduplicated() {
    let record = parse_player_record(json!({
        "combat": {
            "favoriteTarget": { "steamId": "76561198000000001", "name": "Same" },
            "nemesis": [{ "steamId": "76561198000000001", "name": "Same" }]
        }
    }))
    .expect("parses")
    .expect("record");
    let related = related_players(&record);
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].name, "Same");
}

#[test]
fn oversized_explosive_counts_saturate() {
    let ammo = "Explosive 5.56 Rifle Ammo";
    let record = parse_player_record(json!({
        "weapons": {
            "bullets": [
                { "bullet_name": ammo, "total_fired": "99999999999999999999" },
                { "bullet_name": ammo, "total_fired": "4" }
            ]
        }
    }))
    .expect("parses")
    .expect("record");
    let summary = summarize_player(&record);
    assert_eq!(summary.tile("Balle Explo"), Some("9,223,372,036,854,775,807"));
}
