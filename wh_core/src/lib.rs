//! Wormhole-space intelligence core for the Anoikis tracker.
//!
//! Bundles the built-in system catalog, the free-text criteria compiler and
//! matcher behind [`search_catalog`], and the per-channel mass bookkeeping
//! of [`WormholeRegistry`] built on the [`WormholeMass`] simulator.

pub mod catalog;
pub mod compiler;
pub mod masscalc;
pub mod matcher;
pub mod registry;

pub use catalog::{
    Catalog, CatalogError, StaticLink, StaticRef, StaticRow, SystemRecord, SystemRow,
    BUILTIN_STATICS, BUILTIN_SYSTEMS,
};
pub use compiler::{
    compile, CompiledOrder, Filter, Recognized, StaticsConstraint, SANSHA_OVERRIDE_SUMMARY,
    SANSHA_OVERRIDE_SYSTEMS,
};
pub use masscalc::{
    ChanceError, JumpError, JumpReport, ShrinkError, ShrinkReport, SpawnError, Stability,
    WormholeMass,
};
pub use matcher::{matches_record, select_systems};
pub use registry::{
    RegistryEntry, RegistryError, RegistryTelemetry, ShrinkOutcome, SignatureKey, SplashOutcome,
    WormholeRegistry,
};

/// Result of one search order against a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub summary: String,
    pub names: Vec<String>,
    pub recognized: Recognized,
}

/// Compiles `order_text` and runs it against `catalog`, producing the
/// operator-facing summary line plus the matching system names in catalog
/// order.
pub fn search_catalog(order_text: &str, catalog: &Catalog) -> SearchOutcome {
    match compile(order_text) {
        CompiledOrder::SanshaOverride => SearchOutcome {
            summary: SANSHA_OVERRIDE_SUMMARY.to_string(),
            names: SANSHA_OVERRIDE_SYSTEMS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            recognized: Recognized::empty(),
        },
        CompiledOrder::Search { filter, recognized } => {
            let names: Vec<String> = select_systems(&filter, catalog)
                .into_iter()
                .map(|record| record.name.clone())
                .collect();
            let summary = format!(
                "Matches: {}; Processed: {}.",
                names.len(),
                recognized.describe()
            );
            SearchOutcome {
                summary,
                names,
                recognized,
            }
        }
    }
}

/// Mass pair `(max_mass, max_jump)` of a static code, `(0.0, 0.0)` for codes
/// the table does not know.
pub fn resolve_static(code: &str, catalog: &Catalog) -> (f64, f64) {
    catalog.static_mass(code)
}
