//! Applies a compiled [`Filter`] to catalog records. Matching is a pure
//! conjunction over the populated dimensions; records come back in catalog
//! load order.

use crate::catalog::{Catalog, SystemRecord};
use crate::compiler::{Filter, StaticsConstraint};

pub fn select_systems<'a>(filter: &Filter, catalog: &'a Catalog) -> Vec<&'a SystemRecord> {
    catalog
        .systems()
        .filter(|record| matches_record(filter, record))
        .collect()
}

pub fn matches_record(filter: &Filter, record: &SystemRecord) -> bool {
    if !filter.classes.contains(&record.class.number()) {
        return false;
    }
    if let Some(effects) = &filter.effects {
        if !effects.contains(&record.effect) {
            return false;
        }
    }
    if let Some(constraint) = &filter.statics {
        if !statics_match(constraint, record) {
            return false;
        }
    }
    if let Some((min, max)) = filter.radius_au {
        if record.radius_au < min || record.radius_au > max {
            return false;
        }
    }
    if let Some((min, max)) = filter.moons {
        if record.moons < min || record.moons > max {
            return false;
        }
    }
    if let Some((min, max)) = filter.planet_count {
        let total = record.planets.total();
        if total < min || total > max {
            return false;
        }
    }
    if let Some(layouts) = &filter.planet_layouts {
        if !layouts.iter().any(|layout| record.planets.covers(layout)) {
            return false;
        }
    }
    true
}

/// Inclusion: some OR-group is fully contained in the record's targets.
/// Exclusion rejects a record carrying any listed target, no matter which
/// OR-group named it.
fn statics_match(constraint: &StaticsConstraint, record: &SystemRecord) -> bool {
    if constraint.exclude {
        !constraint
            .groups
            .iter()
            .flatten()
            .any(|target| record.has_static_target(*target))
    } else {
        constraint
            .groups
            .iter()
            .any(|group| group.iter().all(|target| record.has_static_target(*target)))
    }
}
