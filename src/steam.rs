use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset between a 64-bit Steam id and its 32-bit account id.
pub const STEAM_ID64_BASE: u64 = 76_561_197_960_265_728;
pub const STEAM_ID_LEN: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SteamIdError {
    #[error("Veuillez saisir un Steam ID")]
    Empty,
    #[error("Format Steam ID invalide. Il doit contenir exactement 17 chiffres.")]
    InvalidFormat,
    #[error("Steam ID {0} is below the 64-bit account base")]
    BelowBase(String),
}

/// A validated 17-digit Steam account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SteamId(String);

impl SteamId {
    pub fn parse(raw: &str) -> Result<Self, SteamIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SteamIdError::Empty);
        }
        if trimmed.len() != STEAM_ID_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SteamIdError::InvalidFormat);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn player_path(&self) -> String {
        format!("/player/{}", self.0)
    }

    pub fn profile_path(&self) -> String {
        format!("/steam/{}", self.0)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SteamId {
    type Error = SteamIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SteamId> for String {
    fn from(value: SteamId) -> Self {
        value.0
    }
}

/// Converts a 64-bit Steam id to the 32-bit account id used by in-game tools.
pub fn steam_id64_to_steam_id32(id64: &str) -> Result<String, SteamIdError> {
    let id = SteamId::parse(id64)?;
    let value: u64 = id
        .as_str()
        .parse()
        .map_err(|_| SteamIdError::InvalidFormat)?;
    value
        .checked_sub(STEAM_ID64_BASE)
        .map(|v| v.to_string())
        .ok_or(SteamIdError::BelowBase(id.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_seventeen_digits() {
        let id = SteamId::parse(" 76561198012345678 ").unwrap();
        assert_eq!(id.as_str(), "76561198012345678");
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in [
            "",
            "   ",
            "7656119801234567",
            "765611980123456789",
            "7656119801234567a",
            "７6561198012345678",
        ] {
            assert!(SteamId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
        assert_eq!(SteamId::parse(""), Err(SteamIdError::Empty));
    }

    #[test]
    fn converts_to_account_id() {
        assert_eq!(steam_id64_to_steam_id32("76561197960265729").unwrap(), "1");
        assert_eq!(
            steam_id64_to_steam_id32("76561198012345678").unwrap(),
            "52079950"
        );
    }

    #[test]
    fn ids_below_base_are_rejected() {
        assert!(matches!(
            steam_id64_to_steam_id32("10000000000000000"),
            Err(SteamIdError::BelowBase(_))
        ));
    }

    #[test]
    fn deserializes_through_validation() {
        let id: SteamId = serde_json::from_str("\"76561198012345678\"").unwrap();
        assert_eq!(id.to_string(), "76561198012345678");
        assert!(serde_json::from_str::<SteamId>("\"123\"").is_err());
    }
}
