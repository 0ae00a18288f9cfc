mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::MockTransport;
use winr8te_terminal::fetch_cache::FetchCache;
use winr8te_terminal::profiles::resolve_avatars;
use winr8te_terminal::search::{SearchError, probe_player};
use winr8te_terminal::steam::{SteamId, SteamIdError};

fn id(raw: &str) -> SteamId {
    SteamId::parse(raw).expect("valid test id")
}

#[test]
fn avatar_resolution_keeps_successes_when_one_fails() {
    let mock = Arc::new(
        MockTransport::new()
            .with("/steam/76561198000000001", json!({ "avatarFull": "https://a/1.jpg" }))
            .with(
                "/steam/76561198000000002",
                json!({ "profile": { "avatarFull": "https://a/2.jpg" } }),
            ),
    );
    let cache = FetchCache::new(mock.clone(), Duration::from_secs(60), 16);
    let ids = [
        id("76561198000000001"),
        id("76561198000000002"),
        id("76561198000000003"),
    ];

    let avatars = resolve_avatars(&cache, &ids);

    assert_eq!(avatars.len(), 2);
    assert_eq!(avatars.get(&ids[0]).map(String::as_str), Some("https://a/1.jpg"));
    assert_eq!(avatars.get(&ids[1]).map(String::as_str), Some("https://a/2.jpg"));
    assert!(!avatars.contains_key(&ids[2]));
}

#[test]
fn duplicate_ids_are_looked_up_once() {
    let mock = Arc::new(
        MockTransport::new()
            .with("/steam/76561198000000001", json!({ "avatarFull": "https://a/1.jpg" })),
    );
    let cache = FetchCache::new(mock.clone(), Duration::from_secs(60), 16);
    let ids = [id("76561198000000001"), id("76561198000000001")];

    let avatars = resolve_avatars(&cache, &ids);

    assert_eq!(avatars.len(), 1);
    assert_eq!(mock.get_calls(), 1);
}

#[test]
fn malformed_ids_never_reach_the_network() {
    let mock = MockTransport::new();
    for input in ["", "   ", "7656119801234567", "765611980123456789", "7656119801234567a"] {
        let err = probe_player(&mock, input).expect_err("input should be rejected");
        assert!(err.is_validation(), "{input:?} gave {err}");
    }
    assert_eq!(mock.network_calls(), 0);
}

#[test]
fn empty_input_asks_for_an_id() {
    let mock = MockTransport::new();
    let err = probe_player(&mock, "").expect_err("empty input");
    assert!(matches!(err, SearchError::Invalid(SteamIdError::Empty)));
    assert_eq!(err.to_string(), "Veuillez saisir un Steam ID");
}

#[test]
fn existing_player_probe_succeeds() {
    let mock = MockTransport::new().with_status("/player/76561198012345678", 200);
    let found = probe_player(&mock, " 76561198012345678 ").expect("player exists");
    assert_eq!(found.as_str(), "76561198012345678");
    assert_eq!(mock.head_calls(), 1);
    assert_eq!(mock.get_calls(), 0);
}

#[test]
fn missing_player_reports_not_found() {
    let mock = MockTransport::new().with_status("/player/76561198012345678", 404);
    let err = probe_player(&mock, "76561198012345678").expect_err("player missing");
    assert!(matches!(err, SearchError::NotFound { status: 404 }));
    assert_eq!(err.to_string(), "Joueur non trouvé ou erreur du serveur");
}

#[test]
fn unreachable_backend_reports_connection_error() {
    let mock = MockTransport::new();
    let err = probe_player(&mock, "76561198012345678").expect_err("no backend");
    assert!(matches!(err, SearchError::Connection(_)));
    assert_eq!(err.to_string(), "Erreur de connexion au serveur");
}
