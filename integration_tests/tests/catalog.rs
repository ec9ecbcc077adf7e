mod common;

use anyhow::Result;
use serde_json::json;
use wh_core::{Catalog, CatalogError};
use wh_schema::{StaticTarget, SystemEffect};

fn statics_fixture() -> String {
    json!({
        "statics": [
            { "code": "Z647", "destination": "c1", "stable_hours": 16, "max_jump": 20.0, "max_mass": 500.0 },
            { "code": "B274", "destination": "hs", "stable_hours": 24, "max_jump": 300.0, "max_mass": 2000.0 }
        ]
    })
    .to_string()
}

fn systems_fixture(names: &[(&str, u32)], statics: &[&str]) -> String {
    let systems: Vec<serde_json::Value> = names
        .iter()
        .map(|&(name, id)| {
            json!({
                "id": id,
                "name": name,
                "class": 1,
                "effect": "Pulsar",
                "radius_au": 40.0,
                "statics": statics,
                "moons": 3
            })
        })
        .collect();
    json!({ "systems": systems }).to_string()
}

#[test]
fn builtin_catalog_is_complete() {
    common::init_tracing();
    let catalog = Catalog::load_builtin().expect("builtin catalog loads");
    assert_eq!(catalog.system_count(), 32);
    assert_eq!(catalog.static_count(), 22);

    // Lookups fold case on both tables.
    let record = catalog.system("j010556").expect("known system");
    assert_eq!(record.effect, SystemEffect::BlackHole);
    assert!(record.has_static_target(StaticTarget::Class(2)));
    assert_eq!(record.note.as_deref(), Some("Sansha staging ground"));

    let link = catalog.static_link("d382").expect("known static");
    assert_eq!(link.destination, StaticTarget::Class(2));
    assert_eq!((link.max_mass, link.max_jump), (2000.0, 300.0));

    let first = catalog.systems().next().expect("catalog is populated");
    assert_eq!(first.name, "J005299");
}

#[test]
fn unresolved_and_placeholder_codes_are_dropped() -> Result<()> {
    common::init_tracing();
    let systems = systems_fixture(&[("J111111", 31000901)], &["z647", "Q999", "UNKNOWN"]);
    let catalog = Catalog::load_from_str(&systems, &statics_fixture())?;

    let record = catalog.system("J111111").expect("fixture system");
    let targets: Vec<StaticTarget> = record.static_targets().collect();
    assert_eq!(targets, vec![StaticTarget::Class(1)]);
    Ok(())
}

#[test]
fn duplicate_system_names_are_rejected() {
    common::init_tracing();
    let systems = systems_fixture(&[("J111111", 31000901), ("j111111", 31000902)], &[]);
    assert!(matches!(
        Catalog::load_from_str(&systems, &statics_fixture()),
        Err(CatalogError::DuplicateSystem(_))
    ));
}

#[test]
fn out_of_range_classes_and_destinations_are_rejected() {
    common::init_tracing();
    let systems = json!({
        "systems": [
            { "id": 31000903, "name": "J222222", "class": 7, "effect": "Pulsar" }
        ]
    })
    .to_string();
    assert!(matches!(
        Catalog::load_from_str(&systems, &statics_fixture()),
        Err(CatalogError::InvalidClass { .. })
    ));

    let statics = json!({
        "statics": [
            { "code": "Z999", "destination": "c9", "max_jump": 20.0, "max_mass": 500.0 }
        ]
    })
    .to_string();
    let systems = systems_fixture(&[("J111111", 31000901)], &[]);
    assert!(matches!(
        Catalog::load_from_str(&systems, &statics),
        Err(CatalogError::InvalidDestination { .. })
    ));
}

#[test]
fn unknown_codes_resolve_to_a_zero_mass_pair() {
    common::init_tracing();
    let catalog = Catalog::load_builtin().expect("builtin catalog loads");
    assert_eq!(catalog.static_mass("H296"), (3300.0, 1350.0));
    assert_eq!(catalog.static_mass("Q999"), (0.0, 0.0));
}
