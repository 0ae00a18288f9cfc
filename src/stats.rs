//! Display-ready derivations over a normalized [`PlayerRecord`].
//!
//! Nested stat arrays are looked up through the explicit category tables below
//! instead of ad-hoc string matching. Each table entry says whether duplicate
//! upstream rows are read find-first or summed; the explosive 5.56 ammo is the
//! one summed entry and the others read the first match.

use std::collections::HashSet;

use anyhow::{Result, bail};

use crate::api::{CategoryAmount, PlayerRecord, PlayerRef};
use crate::format::{format_distance, format_percent, format_ratio, format_stat, group_thousands};

const TOP_CRAFTED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    FindFirst,
    SumAll,
}

/// A category table entry: upstream key, on-screen label, duplicate policy.
pub trait Category: Copy + 'static {
    const ALL: &'static [Self];
    const TABLE: &'static str;

    fn key(self) -> &'static str;
    fn label(self) -> &'static str;

    fn tally(self) -> Tally {
        Tally::FindFirst
    }

    fn amount_in(self, items: &[CategoryAmount]) -> i64 {
        let mut matching = items.iter().filter(|item| item.key == self.key());
        match self.tally() {
            Tally::FindFirst => matching.next().map(|item| item.amount).unwrap_or(0),
            Tally::SumAll => matching.fold(0i64, |acc, item| acc.saturating_add(item.amount)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatheredResource {
    Wood,
    Stones,
    MetalOre,
    SulfurOre,
}

impl Category for GatheredResource {
    const ALL: &'static [Self] = &[Self::Wood, Self::Stones, Self::MetalOre, Self::SulfurOre];
    const TABLE: &'static str = "gathered";

    fn key(self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Stones => "Stones",
            Self::MetalOre => "Metal Ore",
            Self::SulfurOre => "Sulfur Ore",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Wood => "Bois",
            Self::Stones => "Pierre",
            Self::MetalOre => "Métal",
            Self::SulfurOre => "Soufre",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployableKind {
    AutoTurret,
}

impl Category for DeployableKind {
    const ALL: &'static [Self] = &[Self::AutoTurret];
    const TABLE: &'static str = "deployables";

    fn key(self) -> &'static str {
        match self {
            Self::AutoTurret => "Auto Turret",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::AutoTurret => "Tourelles",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Explosive {
    Rocket,
    TimedExplosiveCharge,
    SatchelCharge,
    ExplosiveRifleAmmo,
}

impl Category for Explosive {
    const ALL: &'static [Self] = &[
        Self::Rocket,
        Self::TimedExplosiveCharge,
        Self::SatchelCharge,
        Self::ExplosiveRifleAmmo,
    ];
    const TABLE: &'static str = "bullets";

    fn key(self) -> &'static str {
        match self {
            Self::Rocket => "Rocket",
            Self::TimedExplosiveCharge => "Timed Explosive Charge",
            Self::SatchelCharge => "Satchel Charge",
            Self::ExplosiveRifleAmmo => "Explosive 5.56 Rifle Ammo",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Rocket => "Roquette",
            Self::TimedExplosiveCharge => "C4",
            Self::SatchelCharge => "Satchel",
            Self::ExplosiveRifleAmmo => "Balle Explo",
        }
    }

    fn tally(self) -> Tally {
        // Upstream reports this ammo once per weapon that fired it.
        match self {
            Self::ExplosiveRifleAmmo => Tally::SumAll,
            _ => Tally::FindFirst,
        }
    }
}

/// Checks every category table for empty or duplicated keys and labels.
pub fn validate_category_tables() -> Result<()> {
    validate_table::<GatheredResource>()?;
    validate_table::<DeployableKind>()?;
    validate_table::<Explosive>()?;
    Ok(())
}

fn validate_table<C: Category>() -> Result<()> {
    if C::ALL.is_empty() {
        bail!("category table `{}` is empty", C::TABLE);
    }
    let mut keys = HashSet::new();
    let mut labels = HashSet::new();
    for entry in C::ALL {
        let (key, label) = (entry.key(), entry.label());
        if key.trim().is_empty() || label.trim().is_empty() {
            bail!("category table `{}` has a blank key or label", C::TABLE);
        }
        if !keys.insert(key) {
            bail!("category table `{}` repeats key `{key}`", C::TABLE);
        }
        if !labels.insert(label) {
            bail!("category table `{}` repeats label `{label}`", C::TABLE);
        }
    }
    Ok(())
}

/// Upstream category keys no table knows about, as `table:key`.
///
/// Only the arrays that feed a table are checked; crafted items and animal
/// types are listed verbatim and have no fixed set.
pub fn unknown_categories(record: &PlayerRecord) -> Vec<String> {
    let mut out = Vec::new();
    collect_unknown::<GatheredResource>(&record.resources.gathered, &mut out);
    collect_unknown::<DeployableKind>(&record.building.deployables, &mut out);
    collect_unknown::<Explosive>(&record.weapons.bullets, &mut out);
    out
}

fn collect_unknown<C: Category>(items: &[CategoryAmount], out: &mut Vec<String>) {
    let known: HashSet<&str> = C::ALL.iter().map(|c| c.key()).collect();
    let mut seen = HashSet::new();
    for item in items {
        if !known.contains(item.key.as_str()) && seen.insert(item.key.as_str()) {
            out.push(format!("{}:{}", C::TABLE, item.key));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTile {
    pub label: String,
    pub value: String,
}

impl StatTile {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponRow {
    pub weapon: String,
    pub kills: String,
    pub avg_distance: String,
    pub max_distance: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub name: String,
    pub steam_id: String,
    pub is_online: bool,
    pub avatar: Option<String>,
    pub combat: Vec<StatTile>,
    pub favorite_target: Option<PlayerRef>,
    pub nemesis: Option<PlayerRef>,
    pub resources: Vec<StatTile>,
    pub building: Vec<StatTile>,
    pub explosives: Vec<StatTile>,
    pub hit_distribution: Vec<StatTile>,
    pub weapons: Vec<WeaponRow>,
    pub top_crafted: Vec<StatTile>,
    pub animal_kills: Vec<StatTile>,
    pub total_buildings: String,
    pub total_deployables: String,
    pub total_bullets_fired: String,
}

impl PlayerSummary {
    /// First tile with `label` across every tile group.
    pub fn tile(&self, label: &str) -> Option<&str> {
        [
            &self.combat,
            &self.resources,
            &self.building,
            &self.explosives,
            &self.hit_distribution,
        ]
        .into_iter()
        .flatten()
        .find(|tile| tile.label == label)
        .map(|tile| tile.value.as_str())
    }
}

pub fn summarize_player(record: &PlayerRecord) -> PlayerSummary {
    let combat = &record.combat;
    let combat_tiles = vec![
        StatTile::new("KD", format_ratio(combat.kd_ratio.as_ref())),
        StatTile::new("Kills", format_stat(combat.pvp_kills.as_ref())),
        StatTile::new("Morts", format_stat(combat.deaths.as_ref())),
        StatTile::new(
            "Tirs",
            format_stat(record.weapons.total_bullets_fired.as_ref()),
        ),
        StatTile::new("Avg. Distance", format_distance(combat.avg_distance.as_ref())),
        StatTile::new("Max Distance", format_distance(combat.max_distance.as_ref())),
        StatTile::new(
            "Items Craftés",
            format_stat(record.resources.total_crafted.as_ref()),
        ),
        StatTile::new("Animaux Tués", format_stat(combat.animal_kills.as_ref())),
    ];

    let mut building = vec![StatTile::new(
        "Build",
        format_stat(record.building.total_buildings.as_ref()),
    )];
    building.extend(category_tiles::<DeployableKind>(&record.building.deployables));

    let hits = combat.hit_distribution;
    let hit_distribution = vec![
        StatTile::new("Tête", format_percent(hits.head)),
        StatTile::new("Torse", format_percent(hits.body)),
        StatTile::new("Jambes", format_percent(hits.legs)),
    ];

    let weapons = combat
        .weapon_stats
        .iter()
        .map(|w| WeaponRow {
            weapon: w.weapon.clone(),
            kills: format_stat(w.kills.as_ref()),
            avg_distance: format!("{}m", format_stat(w.avg_distance.as_ref())),
            max_distance: format!("{}m", format_stat(w.max_distance.as_ref())),
        })
        .collect();

    let top_crafted = record
        .resources
        .crafted
        .iter()
        .take(TOP_CRAFTED)
        .map(|item| StatTile::new(&item.key, group_thousands(item.amount)))
        .collect();

    let animal_kills = combat
        .animal_kill_types
        .iter()
        .map(|item| StatTile::new(&item.key, group_thousands(item.amount)))
        .collect();

    PlayerSummary {
        name: record.player.name.clone(),
        steam_id: record.player.steam_id.clone(),
        is_online: record.player.is_online,
        avatar: record.player.avatar_url().map(str::to_string),
        combat: combat_tiles,
        favorite_target: combat.favorite_target.clone(),
        nemesis: combat.nemesis.clone(),
        resources: category_tiles::<GatheredResource>(&record.resources.gathered),
        building,
        explosives: category_tiles::<Explosive>(&record.weapons.bullets),
        hit_distribution,
        weapons,
        top_crafted,
        animal_kills,
        total_buildings: format_stat(record.building.total_buildings.as_ref()),
        total_deployables: format_stat(record.building.total_deployables.as_ref()),
        total_bullets_fired: format_stat(record.weapons.total_bullets_fired.as_ref()),
    }
}

fn category_tiles<C: Category>(items: &[CategoryAmount]) -> Vec<StatTile> {
    C::ALL
        .iter()
        .map(|c| StatTile::new(c.label(), group_thousands(c.amount_in(items))))
        .collect()
}

/// Related players whose avatars the detail view wants, favorite target first.
pub fn related_players(record: &PlayerRecord) -> Vec<&PlayerRef> {
    let mut out: Vec<&PlayerRef> = Vec::new();
    for candidate in [&record.combat.favorite_target, &record.combat.nemesis]
        .into_iter()
        .flatten()
    {
        if candidate.steam_id.is_empty() || out.iter().any(|p| p.steam_id == candidate.steam_id) {
            continue;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(pairs: &[(&str, i64)]) -> Vec<CategoryAmount> {
        pairs
            .iter()
            .map(|(k, a)| CategoryAmount {
                key: k.to_string(),
                amount: *a,
            })
            .collect()
    }

    #[test]
    fn tables_are_consistent() {
        validate_category_tables().unwrap();
    }

    #[test]
    fn find_first_ignores_later_duplicates() {
        let items = amounts(&[("Rocket", 2), ("Rocket", 40)]);
        assert_eq!(Explosive::Rocket.amount_in(&items), 2);
    }

    #[test]
    fn sum_all_adds_duplicates() {
        let items = amounts(&[
            ("Explosive 5.56 Rifle Ammo", 3),
            ("Rocket", 1),
            ("Explosive 5.56 Rifle Ammo", 4),
        ]);
        assert_eq!(Explosive::ExplosiveRifleAmmo.amount_in(&items), 7);
    }

    #[test]
    fn sum_all_saturates_on_oversized_counts() {
        let items = amounts(&[
            ("Explosive 5.56 Rifle Ammo", i64::MAX),
            ("Explosive 5.56 Rifle Ammo", 4),
        ]);
        assert_eq!(Explosive::ExplosiveRifleAmmo.amount_in(&items), i64::MAX);
    }

    #[test]
    fn missing_category_is_zero() {
        assert_eq!(GatheredResource::SulfurOre.amount_in(&[]), 0);
        assert_eq!(Explosive::ExplosiveRifleAmmo.amount_in(&[]), 0);
    }
}
