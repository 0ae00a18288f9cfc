use serde_json::{Map, Value};

use crate::api::StatValue;
use crate::format::{format_ratio, format_stat};
use crate::steam::SteamId;

pub const PODIUM_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaderboardCategory {
    Pvp,
    Pve,
    Resources,
    Builders,
    Playtime,
}

impl LeaderboardCategory {
    pub const ALL: [LeaderboardCategory; 5] = [
        LeaderboardCategory::Pvp,
        LeaderboardCategory::Pve,
        LeaderboardCategory::Resources,
        LeaderboardCategory::Builders,
        LeaderboardCategory::Playtime,
    ];

    pub fn config(self) -> &'static LeaderboardConfig {
        match self {
            LeaderboardCategory::Pvp => &PVP,
            LeaderboardCategory::Pve => &PVE,
            LeaderboardCategory::Resources => &RESOURCES,
            LeaderboardCategory::Builders => &BUILDERS,
            LeaderboardCategory::Playtime => &PLAYTIME,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Sub-category used when nothing (or something unknown) is selected.
    pub fn default_sub_option(self) -> Option<&'static SubOption> {
        self.config().sub_options.first()
    }

    pub fn sub_option(self, key: Option<&str>) -> Option<&'static SubOption> {
        let subs = self.config().sub_options;
        key.and_then(|k| subs.iter().find(|s| s.key == k))
            .or_else(|| subs.first())
    }
}

#[derive(Debug)]
pub struct LeaderboardConfig {
    pub title: &'static str,
    pub endpoint: &'static str,
    pub description: &'static str,
    pub main_stat: &'static str,
    pub secondary_stats: &'static [&'static str],
    pub sub_options: &'static [SubOption],
}

#[derive(Debug)]
pub struct SubOption {
    pub key: &'static str,
    pub label: &'static str,
    pub main_stat: &'static str,
    pub secondary_stats: &'static [&'static str],
    /// Dedicated endpoint replacing the category one.
    pub endpoint: Option<&'static str>,
    /// Value of the `resource` query parameter.
    pub param: Option<&'static str>,
}

static PVP: LeaderboardConfig = LeaderboardConfig {
    title: "PvP",
    endpoint: "/leaderboard/pvp",
    description: "Classement PvP",
    main_stat: "kills",
    secondary_stats: &["deaths", "kdRatio"],
    sub_options: &[
        SubOption {
            key: "kills",
            label: "Kills",
            main_stat: "kills",
            secondary_stats: &["deaths", "kdRatio"],
            endpoint: None,
            param: None,
        },
        SubOption {
            key: "deaths",
            label: "Deaths",
            main_stat: "totalDeaths",
            secondary_stats: &["totalKills", "kdRatio"],
            endpoint: Some("/leaderboard/deaths"),
            param: None,
        },
    ],
};

static PVE: LeaderboardConfig = LeaderboardConfig {
    title: "PvE",
    endpoint: "/leaderboard/pve",
    description: "Scientifiques, animaux, bradley, heli",
    main_stat: "totalPveKills",
    secondary_stats: &["animalKills", "scientistKills", "bradleyKills", "heliKills"],
    sub_options: &[],
};

static RESOURCES: LeaderboardConfig = LeaderboardConfig {
    title: "Ressources",
    endpoint: "/leaderboard/resources",
    description: "Ressources récoltées",
    main_stat: "amount",
    secondary_stats: &[],
    sub_options: &[
        resource_option("wood", "Bois", "Wood"),
        resource_option("stone", "Pierre", "Stones"),
        resource_option("metal", "Métal", "Metal Ore"),
        resource_option("sulfur", "Soufre", "Sulfur Ore"),
    ],
};

static BUILDERS: LeaderboardConfig = LeaderboardConfig {
    title: "Builders",
    endpoint: "/leaderboard/builders",
    description: "Total des constructions",
    main_stat: "totalConstructions",
    secondary_stats: &["totalBuildings", "totalDeployables"],
    sub_options: &[],
};

static PLAYTIME: LeaderboardConfig = LeaderboardConfig {
    title: "Temps de jeu",
    endpoint: "/leaderboard/playtime",
    description: "Temps de jeu total",
    main_stat: "playTime",
    secondary_stats: &[],
    sub_options: &[],
};

const fn resource_option(key: &'static str, label: &'static str, param: &'static str) -> SubOption {
    SubOption {
        key,
        label,
        main_stat: "amount",
        secondary_stats: &[],
        endpoint: None,
        param: Some(param),
    }
}

pub fn stat_label(stat: &str) -> &str {
    match stat {
        "kills" | "totalKills" => "Kills",
        "deaths" | "totalDeaths" => "Morts",
        "kdRatio" => "KD",
        "avgDistance" => "Avg. Dist",
        "maxDistance" => "Max Dist",
        "totalPveKills" => "Kills PVE",
        "animalKills" => "Animaux",
        "scientistKills" => "Scientifiques",
        "bradleyKills" => "Bradley",
        "heliKills" => "Hélicoptère",
        "amount" => "Quantité",
        "totalConstructions" => "Constructions",
        "totalBuildings" => "Build",
        "totalDeployables" => "Déployables",
        "playTime" => "Temps de jeu",
        other => other,
    }
}

/// Request path (cache key) for a category and its selected sub-category.
pub fn request_path(category: LeaderboardCategory, sub_key: Option<&str>) -> String {
    let config = category.config();
    match category.sub_option(sub_key) {
        Some(SubOption {
            endpoint: Some(endpoint),
            ..
        }) => endpoint.to_string(),
        Some(SubOption {
            param: Some(param), ..
        }) => format!("{}?resource={}", config.endpoint, urlencoding::encode(param)),
        _ => config.endpoint.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub steam_id: String,
    pub name: String,
    pub stats: Map<String, Value>,
}

impl LeaderboardEntry {
    pub fn stat(&self, key: &str) -> Option<StatValue> {
        self.stats.get(key).and_then(StatValue::from_json)
    }

    pub fn steam_id(&self) -> Option<SteamId> {
        SteamId::parse(&self.steam_id).ok()
    }
}

/// Rows of a leaderboard payload in server order. Anything but an array of
/// objects yields no rows.
pub fn parse_leaderboard(value: &Value) -> Vec<LeaderboardEntry> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| LeaderboardEntry {
            steam_id: obj.get("steamId").map(json_text).unwrap_or_default(),
            name: obj.get("name").map(json_text).unwrap_or_default(),
            stats: obj.clone(),
        })
        .collect()
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Formats one leaderboard cell. Playtime strings are already formatted.
pub fn format_leaderboard_value(stat: &str, value: Option<&StatValue>) -> String {
    match (stat, value) {
        ("playTime", Some(StatValue::Text(s))) => s.clone(),
        ("kdRatio", Some(v)) => format_ratio(Some(v)),
        (_, v) => format_stat(v),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCell {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub steam_id: String,
    pub main: StatCell,
    pub secondary: Vec<StatCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardView {
    pub title: String,
    pub description: String,
    pub sub_label: Option<String>,
    pub podium: Vec<LeaderboardRow>,
    pub rows: Vec<LeaderboardRow>,
}

impl LeaderboardView {
    pub fn podium_ids(&self) -> Vec<SteamId> {
        self.podium
            .iter()
            .filter_map(|row| SteamId::parse(&row.steam_id).ok())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.podium.is_empty() && self.rows.is_empty()
    }

    /// Podium then the ranked rows, in display order.
    pub fn all_rows(&self) -> impl Iterator<Item = &LeaderboardRow> {
        self.podium.iter().chain(self.rows.iter())
    }
}

/// Podium for the first three entries, ranked rows from 4 onward.
pub fn build_view(
    entries: &[LeaderboardEntry],
    category: LeaderboardCategory,
    sub_key: Option<&str>,
) -> LeaderboardView {
    let config = category.config();
    let sub = category.sub_option(sub_key);
    let main_stat = sub.map(|s| s.main_stat).unwrap_or(config.main_stat);
    let secondary_stats = match sub {
        Some(s) if !s.secondary_stats.is_empty() => s.secondary_stats,
        _ => config.secondary_stats,
    };

    let mut rows = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| build_row(idx + 1, entry, main_stat, secondary_stats));
    let podium: Vec<LeaderboardRow> = rows.by_ref().take(PODIUM_SIZE).collect();
    let rows: Vec<LeaderboardRow> = rows.collect();

    LeaderboardView {
        title: config.title.to_string(),
        description: config.description.to_string(),
        sub_label: sub.map(|s| s.label.to_string()),
        podium,
        rows,
    }
}

fn build_row(
    rank: usize,
    entry: &LeaderboardEntry,
    main_stat: &str,
    secondary_stats: &[&str],
) -> LeaderboardRow {
    let main = StatCell {
        label: stat_label(main_stat).to_string(),
        value: format_leaderboard_value(main_stat, entry.stat(main_stat).as_ref()),
    };
    let secondary = secondary_stats
        .iter()
        .filter(|stat| entry.stats.contains_key(**stat))
        .map(|stat| StatCell {
            label: stat_label(stat).to_string(),
            value: format_leaderboard_value(stat, entry.stat(stat).as_ref()),
        })
        .collect();
    LeaderboardRow {
        rank,
        name: entry.name.clone(),
        steam_id: entry.steam_id.clone(),
        main,
        secondary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_paths_per_sub_category() {
        use LeaderboardCategory::*;
        assert_eq!(request_path(Pvp, Some("kills")), "/leaderboard/pvp");
        assert_eq!(request_path(Pvp, Some("deaths")), "/leaderboard/deaths");
        assert_eq!(
            request_path(Resources, Some("metal")),
            "/leaderboard/resources?resource=Metal%20Ore"
        );
        assert_eq!(
            request_path(Resources, None),
            "/leaderboard/resources?resource=Wood"
        );
        assert_eq!(
            request_path(Resources, Some("unknown")),
            "/leaderboard/resources?resource=Wood"
        );
        assert_eq!(request_path(Playtime, None), "/leaderboard/playtime");
    }

    #[test]
    fn unknown_sub_key_falls_back_to_first() {
        let sub = LeaderboardCategory::Pvp.sub_option(Some("nope")).unwrap();
        assert_eq!(sub.key, "kills");
        assert!(LeaderboardCategory::Pve.sub_option(Some("kills")).is_none());
    }

    #[test]
    fn category_cycle_wraps() {
        assert_eq!(LeaderboardCategory::Playtime.next(), LeaderboardCategory::Pvp);
        assert_eq!(LeaderboardCategory::Pvp.prev(), LeaderboardCategory::Playtime);
    }

    #[test]
    fn playtime_text_passes_through() {
        let v = StatValue::Text("3j 4h".into());
        assert_eq!(format_leaderboard_value("playTime", Some(&v)), "3j 4h");
        let n = StatValue::Text("12345".into());
        assert_eq!(format_leaderboard_value("amount", Some(&n)), "12,345");
    }
}
