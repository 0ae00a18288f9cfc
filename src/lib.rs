pub mod api;
pub mod config;
pub mod feed;
pub mod fetch_cache;
pub mod format;
pub mod http_client;
pub mod leaderboard;
pub mod logging;
pub mod profiles;
pub mod search;
pub mod state;
pub mod stats;
pub mod steam;
