//! Wire models for the stats backend.
//!
//! Upstream payloads drift between versions: amounts arrive as numbers or as
//! numeric strings, favorite target / nemesis arrive as an object or wrapped in a
//! one-element array, and nested arrays may be missing or `null`. Everything is
//! normalized here so the aggregation code only sees one shape.

use anyhow::{Context, Result};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::parse_int_prefix;
use crate::steam::SteamId;

/// A scalar stat as the backend sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StatValue {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => n
                .as_i64()
                .map(StatValue::Int)
                .or_else(|| n.as_f64().map(StatValue::Float)),
            Value::String(s) => Some(StatValue::Text(s.clone())),
            Value::Bool(b) => Some(StatValue::Int(i64::from(*b))),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Integer view with `parseInt` semantics for strings; garbage counts as 0.
    pub fn as_amount(&self) -> i64 {
        match self {
            StatValue::Int(v) => *v,
            StatValue::Float(v) if v.is_finite() => v.trunc() as i64,
            StatValue::Float(_) => 0,
            StatValue::Text(s) => parse_int_prefix(s).unwrap_or(0),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Int(v) => Some(*v as f64),
            StatValue::Float(v) => Some(*v),
            StatValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        StatValue::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("expected a number or a string"))
    }
}

/// One `{category, amount}` pair from a nested stats array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub key: String,
    /// Whole count; fractional upstream amounts are truncated toward zero.
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
struct RawCategoryAmount {
    #[serde(
        alias = "resource",
        alias = "item",
        alias = "deployable",
        alias = "bullet_name",
        alias = "animal"
    )]
    key: Option<String>,
    #[serde(alias = "total_amount", alias = "total_fired", alias = "kills")]
    amount: Option<StatValue>,
}

/// Reference to another player (favorite target, nemesis).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRef {
    #[serde(deserialize_with = "lenient_string")]
    pub steam_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
}

impl PlayerRef {
    pub fn steam_id(&self) -> Option<SteamId> {
        SteamId::parse(&self.steam_id).ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    pub player: PlayerInfo,
    pub combat: CombatStats,
    pub resources: ResourceStats,
    pub building: BuildingStats,
    pub weapons: WeaponTotals,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub steam_id: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_online: bool,
    pub avatar: Option<String>,
    pub steam: SteamProfile,
}

impl PlayerInfo {
    pub fn avatar_url(&self) -> Option<&str> {
        self.steam
            .avatar_full
            .as_deref()
            .or(self.avatar.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SteamProfile {
    pub avatar_full: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatStats {
    pub kd_ratio: Option<StatValue>,
    pub pvp_kills: Option<StatValue>,
    pub deaths: Option<StatValue>,
    pub avg_distance: Option<StatValue>,
    pub max_distance: Option<StatValue>,
    pub animal_kills: Option<StatValue>,
    #[serde(deserialize_with = "object_or_first")]
    pub favorite_target: Option<PlayerRef>,
    #[serde(deserialize_with = "object_or_first")]
    pub nemesis: Option<PlayerRef>,
    pub hit_distribution: HitDistribution,
    #[serde(deserialize_with = "lenient_list")]
    pub weapon_stats: Vec<WeaponStat>,
    #[serde(deserialize_with = "category_amounts")]
    pub animal_kill_types: Vec<CategoryAmount>,
}

/// Fraction of fatal hits per body region, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct HitDistribution {
    #[serde(deserialize_with = "lenient_f64")]
    pub head: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub body: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub legs: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeaponStat {
    #[serde(deserialize_with = "lenient_string")]
    pub weapon: String,
    pub kills: Option<StatValue>,
    pub avg_distance: Option<StatValue>,
    pub max_distance: Option<StatValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceStats {
    pub total_crafted: Option<StatValue>,
    #[serde(deserialize_with = "category_amounts")]
    pub gathered: Vec<CategoryAmount>,
    #[serde(deserialize_with = "category_amounts")]
    pub crafted: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingStats {
    pub total_buildings: Option<StatValue>,
    pub total_deployables: Option<StatValue>,
    #[serde(deserialize_with = "category_amounts")]
    pub deployables: Vec<CategoryAmount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeaponTotals {
    pub total_bullets_fired: Option<StatValue>,
    #[serde(deserialize_with = "category_amounts")]
    pub bullets: Vec<CategoryAmount>,
}

/// `Ok(None)` for an empty or `null` body, the backend's "no such player".
pub fn parse_player_record(value: Value) -> Result<Option<PlayerRecord>> {
    if value.is_null() {
        return Ok(None);
    }
    let record = serde_json::from_value(value).context("invalid player json")?;
    Ok(Some(record))
}

pub fn parse_player_record_json(raw: &str) -> Result<Option<PlayerRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(trimmed).context("invalid player json")?;
    parse_player_record(value)
}

/// Pulls the full-size avatar URL out of a `/steam/{id}` or `/player/{id}` body.
pub fn extract_avatar_url(value: &Value) -> Option<String> {
    let candidates = [
        value.get("avatarFull"),
        value.get("profile").and_then(|p| p.get("avatarFull")),
        value
            .get("player")
            .and_then(|p| p.get("steam"))
            .and_then(|s| s.get("avatarFull")),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

fn object_or_first<'de, D>(deserializer: D) -> Result<Option<PlayerRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let candidate = match value {
        Some(Value::Array(items)) => items.into_iter().next(),
        Some(obj @ Value::Object(_)) => Some(obj),
        _ => None,
    };
    Ok(candidate
        .and_then(|v| serde_json::from_value::<PlayerRef>(v).ok())
        .filter(|r| !r.steam_id.is_empty() || !r.name.is_empty()))
}

fn category_amounts<'de, D>(deserializer: D) -> Result<Vec<CategoryAmount>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<RawCategoryAmount> = lenient_list(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|item| {
            let key = item.key?;
            Some(CategoryAmount {
                key,
                amount: item.amount.map(|a| a.as_amount()).unwrap_or(0),
            })
        })
        .collect())
}

/// Missing, `null` or non-array becomes empty; malformed elements are skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true"),
        _ => false,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(StatValue::from_json)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0))
}
