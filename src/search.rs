use thiserror::Error;
use tracing::{info, warn};

use crate::http_client::Transport;
use crate::steam::{SteamId, SteamIdError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] SteamIdError),
    #[error("Joueur non trouvé ou erreur du serveur")]
    NotFound { status: u16 },
    #[error("Erreur de connexion au serveur")]
    Connection(#[source] anyhow::Error),
}

impl SearchError {
    /// Validation failures never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Invalid(_))
    }
}

/// Validates `input` and asks the backend whether the player exists.
///
/// `Ok` means the caller should open the player's detail view.
pub fn probe_player(transport: &dyn Transport, input: &str) -> Result<SteamId, SearchError> {
    let steam_id = SteamId::parse(input)?;
    let status = transport
        .head(&steam_id.player_path())
        .map_err(SearchError::Connection)?;
    if status.is_success() {
        info!(steam_id = %steam_id, "player found");
        Ok(steam_id)
    } else {
        warn!(steam_id = %steam_id, status = status.as_u16(), "player probe rejected");
        Err(SearchError::NotFound {
            status: status.as_u16(),
        })
    }
}
