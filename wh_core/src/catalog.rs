//! System catalog and static-connection table, bundled as JSON and indexed
//! for name lookups.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use wh_schema::{PlanetCounts, StaticTarget, SystemEffect, WormholeClass};

pub const BUILTIN_SYSTEMS: &str = include_str!("data/systems.json");
pub const BUILTIN_STATICS: &str = include_str!("data/statics.json");

/// Placeholder used by scan exports when a static could not be identified.
const UNKNOWN_STATIC: &str = "UNKNOWN";

type NameIndex = HashMap<String, usize, ahash::RandomState>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse system catalog: {0}")]
    ParseSystems(#[from] serde_json::Error),
    #[error("failed to parse static table: {0}")]
    ParseStatics(serde_json::Error),
    #[error("duplicate system '{0}' in catalog")]
    DuplicateSystem(String),
    #[error("duplicate static code '{0}' in table")]
    DuplicateStatic(String),
    #[error("system '{system}' has unknown class {class}")]
    InvalidClass { system: String, class: u8 },
    #[error("static '{code}' has invalid destination '{value}'")]
    InvalidDestination { code: String, value: String },
}

/// One kind of static connection: the scan code plus the mass budget the
/// connection opens with. Masses are in kilotonnes.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticLink {
    pub code: String,
    pub destination: StaticTarget,
    pub stable_hours: u32,
    pub max_jump: f64,
    pub max_mass: f64,
    pub note: Option<String>,
}

impl fmt::Display for StaticLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Leads to: {}, Stable Time: {} hrs, Mass/Jump: {} kT, Max Mass: {} kT",
            self.code, self.destination, self.stable_hours, self.max_jump, self.max_mass
        )?;
        if let Some(note) = &self.note {
            write!(f, ", Info: {}", note)?;
        }
        Ok(())
    }
}

/// A static carried by a system, resolved against the static table.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticRef {
    pub code: String,
    pub target: StaticTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemRecord {
    pub id: u32,
    pub name: String,
    pub class: WormholeClass,
    pub effect: SystemEffect,
    pub radius_au: f64,
    pub statics: Vec<StaticRef>,
    pub moons: u32,
    pub planets: PlanetCounts,
    pub note: Option<String>,
}

impl SystemRecord {
    pub fn static_targets(&self) -> impl Iterator<Item = StaticTarget> + '_ {
        self.statics.iter().map(|entry| entry.target)
    }

    pub fn has_static_target(&self, target: StaticTarget) -> bool {
        self.statics.iter().any(|entry| entry.target == target)
    }

    pub fn has_perfect_pi(&self) -> bool {
        self.planets.has_perfect_pi()
    }
}

impl fmt::Display for SystemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}, Radius: {} AU, Moons: {}, Statics: ",
            self.name, self.class, self.effect, self.radius_au, self.moons
        )?;
        if self.statics.is_empty() {
            f.write_str("unknown")?;
        } else {
            for (slot, entry) in self.statics.iter().enumerate() {
                if slot > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(&entry.code)?;
            }
            f.write_str(" (")?;
            for (slot, entry) in self.statics.iter().enumerate() {
                if slot > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", entry.target)?;
            }
            f.write_str(")")?;
        }
        if let Some(note) = &self.note {
            write!(f, ", Other info: {}", note)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Catalog {
    systems: Vec<SystemRecord>,
    statics: Vec<StaticLink>,
    system_index: NameIndex,
    static_index: NameIndex,
}

impl Catalog {
    pub fn load_builtin() -> Result<Self, CatalogError> {
        Self::load_from_str(BUILTIN_SYSTEMS, BUILTIN_STATICS)
    }

    pub fn load_from_str(systems_json: &str, statics_json: &str) -> Result<Self, CatalogError> {
        let systems: SystemCatalogFile = serde_json::from_str(systems_json)?;
        let statics: StaticTableFile =
            serde_json::from_str(statics_json).map_err(CatalogError::ParseStatics)?;
        Self::from_rows(systems.systems, statics.statics)
    }

    /// Builds the catalog from already-decoded rows. The static table is
    /// resolved first so system rows can reference it; names and codes are
    /// folded to uppercase on the way in.
    pub fn from_rows(
        system_rows: Vec<SystemRow>,
        static_rows: Vec<StaticRow>,
    ) -> Result<Self, CatalogError> {
        let mut statics = Vec::with_capacity(static_rows.len());
        let mut static_index = NameIndex::default();
        for row in static_rows {
            let code = row.code.to_uppercase();
            if static_index.contains_key(&code) {
                return Err(CatalogError::DuplicateStatic(code));
            }
            let destination = parse_destination(&code, &row.destination)?;
            static_index.insert(code.clone(), statics.len());
            statics.push(StaticLink {
                code,
                destination,
                stable_hours: row.stable_hours,
                max_jump: row.max_jump,
                max_mass: row.max_mass,
                note: row.note,
            });
        }

        let mut systems = Vec::with_capacity(system_rows.len());
        let mut system_index = NameIndex::default();
        for row in system_rows {
            let name = row.name.to_uppercase();
            if system_index.contains_key(&name) {
                return Err(CatalogError::DuplicateSystem(name));
            }
            let class = WormholeClass::from_number(row.class).ok_or(CatalogError::InvalidClass {
                system: name.clone(),
                class: row.class,
            })?;
            let mut resolved = Vec::with_capacity(row.statics.len());
            for raw in row.statics {
                let code = raw.to_uppercase();
                if code == UNKNOWN_STATIC {
                    continue;
                }
                match static_index.get(&code) {
                    Some(&slot) => resolved.push(StaticRef {
                        code,
                        target: statics[slot].destination,
                    }),
                    None => {
                        tracing::debug!(
                            target: "anoikis::catalog",
                            system = %name,
                            code = %code,
                            "catalog.unresolved_static"
                        );
                    }
                }
            }
            system_index.insert(name.clone(), systems.len());
            systems.push(SystemRecord {
                id: row.id,
                name,
                class,
                effect: row.effect,
                radius_au: row.radius_au,
                statics: resolved,
                moons: row.moons,
                planets: row.planets,
                note: row.note,
            });
        }

        tracing::info!(
            target: "anoikis::catalog",
            systems = systems.len(),
            statics = statics.len(),
            "catalog.loaded"
        );
        Ok(Self {
            systems,
            statics,
            system_index,
            static_index,
        })
    }

    pub fn system(&self, name: &str) -> Option<&SystemRecord> {
        self.system_index
            .get(&name.to_uppercase())
            .map(|&slot| &self.systems[slot])
    }

    pub fn system_id(&self, name: &str) -> Option<u32> {
        self.system(name).map(|record| record.id)
    }

    pub fn system_class(&self, name: &str) -> Option<WormholeClass> {
        self.system(name).map(|record| record.class)
    }

    pub fn contains_system(&self, name: &str) -> bool {
        self.system_index.contains_key(&name.to_uppercase())
    }

    pub fn static_link(&self, code: &str) -> Option<&StaticLink> {
        self.static_index
            .get(&code.to_uppercase())
            .map(|&slot| &self.statics[slot])
    }

    /// Mass budget of a static code as `(max_mass, max_jump)` in kilotonnes.
    /// Unknown codes report `(0.0, 0.0)`.
    pub fn static_mass(&self, code: &str) -> (f64, f64) {
        match self.static_link(code) {
            Some(link) => (link.max_mass, link.max_jump),
            None => (0.0, 0.0),
        }
    }

    /// Systems in catalog load order.
    pub fn systems(&self) -> impl Iterator<Item = &SystemRecord> {
        self.systems.iter()
    }

    pub fn statics(&self) -> impl Iterator<Item = &StaticLink> {
        self.statics.iter()
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn static_count(&self) -> usize {
        self.statics.len()
    }
}

fn parse_destination(code: &str, value: &str) -> Result<StaticTarget, CatalogError> {
    let lowered = value.to_lowercase();
    match lowered.as_str() {
        "hs" => Ok(StaticTarget::HighSec),
        "ls" => Ok(StaticTarget::LowSec),
        "ns" => Ok(StaticTarget::NullSec),
        _ => lowered
            .strip_prefix('c')
            .and_then(|digits| digits.parse::<u8>().ok())
            .filter(|&number| WormholeClass::from_number(number).is_some())
            .map(StaticTarget::Class)
            .ok_or_else(|| CatalogError::InvalidDestination {
                code: code.to_string(),
                value: value.to_string(),
            }),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemRow {
    pub id: u32,
    pub name: String,
    pub class: u8,
    pub effect: SystemEffect,
    #[serde(default)]
    pub radius_au: f64,
    #[serde(default)]
    pub statics: Vec<String>,
    #[serde(default)]
    pub moons: u32,
    #[serde(default)]
    pub planets: PlanetCounts,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticRow {
    pub code: String,
    pub destination: String,
    #[serde(default)]
    pub stable_hours: u32,
    pub max_jump: f64,
    pub max_mass: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize)]
struct SystemCatalogFile {
    systems: Vec<SystemRow>,
}

#[derive(Deserialize)]
struct StaticTableFile {
    statics: Vec<StaticRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_row(name: &str, class: u8, statics: &[&str]) -> SystemRow {
        SystemRow {
            id: 31009999,
            name: name.to_string(),
            class,
            effect: SystemEffect::NoEffect,
            radius_au: 40.0,
            statics: statics.iter().map(|code| code.to_string()).collect(),
            moons: 5,
            planets: PlanetCounts::default(),
            note: None,
        }
    }

    fn static_row(code: &str, destination: &str) -> StaticRow {
        StaticRow {
            code: code.to_string(),
            destination: destination.to_string(),
            stable_hours: 16,
            max_jump: 300.0,
            max_mass: 2000.0,
            note: None,
        }
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::load_builtin().expect("builtin catalog parses");
        assert!(catalog.system_count() > 0);
        assert!(catalog.static_count() > 0);

        let staging = catalog.system("J005299").expect("staging system present");
        assert_eq!(staging.class, WormholeClass::C2);
        assert_eq!(staging.effect, SystemEffect::Pulsar);
        assert!(staging.has_perfect_pi());
    }

    #[test]
    fn lookups_fold_case() {
        let catalog = Catalog::load_builtin().expect("builtin catalog parses");
        assert!(catalog.system("j005299").is_some());
        assert!(catalog.static_link("d382").is_some());
        assert!(catalog.contains_system("j010556"));
    }

    #[test]
    fn lookups_resolve_ids_and_classes() {
        let catalog = Catalog::load_builtin().expect("builtin catalog parses");
        assert_eq!(catalog.system_id("j005299"), Some(31000001));
        assert_eq!(catalog.system_class("J115422"), Some(WormholeClass::C6));
        assert_eq!(catalog.system_id("J999999"), None);
        assert_eq!(catalog.system_class("J999999"), None);
    }

    #[test]
    fn load_order_is_preserved() {
        let catalog = Catalog::load_builtin().expect("builtin catalog parses");
        let first = catalog.systems().next().expect("catalog is not empty");
        assert_eq!(first.name, "J005299");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let error = Catalog::from_rows(
            vec![system_row("J123456", 2, &[]), system_row("j123456", 3, &[])],
            Vec::new(),
        )
        .expect_err("duplicate system must fail");
        assert!(matches!(error, CatalogError::DuplicateSystem(name) if name == "J123456"));

        let error = Catalog::from_rows(
            Vec::new(),
            vec![static_row("D382", "c2"), static_row("d382", "c2")],
        )
        .expect_err("duplicate static must fail");
        assert!(matches!(error, CatalogError::DuplicateStatic(code) if code == "D382"));
    }

    #[test]
    fn unknown_class_is_rejected() {
        let error = Catalog::from_rows(vec![system_row("J123456", 7, &[])], Vec::new())
            .expect_err("class 7 does not exist");
        assert!(matches!(
            error,
            CatalogError::InvalidClass { class: 7, .. }
        ));
    }

    #[test]
    fn bad_destination_is_rejected() {
        let error = Catalog::from_rows(Vec::new(), vec![static_row("Q123", "c9")])
            .expect_err("c9 is not a wormhole class");
        assert!(matches!(
            error,
            CatalogError::InvalidDestination { code, .. } if code == "Q123"
        ));
    }

    #[test]
    fn placeholder_and_unresolved_statics_are_dropped() {
        let catalog = Catalog::from_rows(
            vec![system_row("J123456", 2, &["UNKNOWN", "Q999", "d382"])],
            vec![static_row("D382", "c2")],
        )
        .expect("catalog builds");
        let record = catalog.system("J123456").expect("system present");
        assert_eq!(record.statics.len(), 1);
        assert_eq!(record.statics[0].code, "D382");
        assert_eq!(record.statics[0].target, StaticTarget::Class(2));
    }

    #[test]
    fn static_mass_reports_zero_for_unknown_codes() {
        let catalog = Catalog::load_builtin().expect("builtin catalog parses");
        assert_eq!(catalog.static_mass("D382"), (2000.0, 300.0));
        assert_eq!(catalog.static_mass("Q999"), (0.0, 0.0));
    }

    #[test]
    fn readouts_cover_records_and_links() {
        let catalog = Catalog::load_builtin().expect("builtin catalog parses");

        let staging = catalog.system("J005299").expect("staging system present");
        assert_eq!(
            staging.to_string(),
            "J005299 [C2] Pulsar, Radius: 70.2 AU, Moons: 9, Statics: B274 O477 (HS C3), \
             Other info: Sansha staging ground"
        );

        let hive = catalog.system("J055520").expect("drifter hive present");
        assert!(hive.to_string().contains("Statics: unknown"));

        let link = catalog.static_link("C125").expect("known static");
        assert_eq!(
            link.to_string(),
            "C125 - Leads to: C2, Stable Time: 16 hrs, Mass/Jump: 20 kT, Max Mass: 1000 kT, \
             Info: Small ships only"
        );
        assert!(catalog
            .static_link("D382")
            .expect("known static")
            .note
            .is_none());
    }
}
