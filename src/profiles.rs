use std::collections::{BTreeSet, HashMap};

use anyhow::{Result, anyhow};
use rayon::prelude::*;
use tracing::warn;

use crate::api::extract_avatar_url;
use crate::fetch_cache::FetchCache;
use crate::steam::SteamId;

/// Looks up the avatar of every id in parallel and waits for all of them.
///
/// A failed lookup is logged and left out of the map; it never cancels the
/// others. Callers show a placeholder for ids that are missing.
pub fn resolve_avatars(cache: &FetchCache, ids: &[SteamId]) -> HashMap<SteamId, String> {
    let unique: Vec<&SteamId> = ids.iter().collect::<BTreeSet<_>>().into_iter().collect();

    let settled: Vec<(&SteamId, Result<String>)> = unique
        .par_iter()
        .map(|id| (*id, fetch_avatar(cache, id)))
        .collect();

    settled
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(url) => Some((id.clone(), url)),
            Err(err) => {
                warn!(steam_id = %id, error = %err, "avatar lookup failed");
                None
            }
        })
        .collect()
}

pub fn fetch_avatar(cache: &FetchCache, id: &SteamId) -> Result<String> {
    let body = cache.get_or_fetch(&id.profile_path());
    extract_avatar_url(&body).ok_or_else(|| anyhow!("no avatar in profile for {id}"))
}
