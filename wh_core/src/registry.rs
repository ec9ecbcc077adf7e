//! Tracks live wormholes per channel, keyed by scan signature. The registry
//! owns the [`WormholeMass`] simulators and drops entries the moment their
//! hole collapses.

use thiserror::Error;

use crate::catalog::Catalog;
use crate::masscalc::{
    ChanceError, JumpError, JumpReport, ShrinkError, ShrinkReport, SpawnError, Stability,
    WormholeMass,
};

/// Channel plus uppercased scan signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    pub channel: String,
    pub signature: String,
}

impl SignatureKey {
    pub fn new(channel: &str, signature: &str) -> Self {
        SignatureKey {
            channel: channel.to_string(),
            signature: signature.to_uppercase(),
        }
    }
}

impl std::fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.channel, self.signature)
    }
}

#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub key: SignatureKey,
    pub wormhole: WormholeMass,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{0}' is not a wormhole code")]
    UnknownStaticCode(String),
    #[error("'{0}' is not a valid state. Try: new, stable, unstable, critical")]
    InvalidState(String),
    #[error("'{signature}' is already present in channel '{channel}'")]
    DuplicateSignature { channel: String, signature: String },
    #[error("'{signature}' is not tracked in channel '{channel}'")]
    SignatureNotFound { channel: String, signature: String },
    #[error("spawn failed: {0}")]
    Spawn(#[from] SpawnError),
    #[error("jump failed: {0}")]
    Jump(#[from] JumpError),
    #[error("shrink failed: {0}")]
    Shrink(#[from] ShrinkError),
    #[error("collapse chance failed: {0}")]
    Chance(#[from] ChanceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashOutcome {
    pub report: JumpReport,
    /// The jump collapsed the hole and the entry is gone.
    pub removed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkOutcome {
    pub report: ShrinkReport,
    pub removed: bool,
}

/// Lifetime counters over registry operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryTelemetry {
    pub spawned: u64,
    pub rejected_spawns: u64,
    pub jumps_applied: u64,
    pub jumps_rejected: u64,
    pub shrinks_applied: u64,
    pub shrinks_rejected: u64,
    pub collapses: u64,
}

#[derive(Debug, Default, Clone)]
pub struct WormholeRegistry {
    entries: Vec<RegistryEntry>,
    telemetry: RegistryTelemetry,
}

impl WormholeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wormhole under `channel`/`signature`. Mass parameters come
    /// from the catalog's static table via `static_code`; `state_token` is
    /// the operator-supplied stability token.
    pub fn spawn(
        &mut self,
        catalog: &Catalog,
        channel: &str,
        signature: &str,
        static_code: &str,
        state_token: &str,
    ) -> Result<(), RegistryError> {
        let key = SignatureKey::new(channel, signature);
        if self.position(&key).is_some() {
            self.telemetry.rejected_spawns += 1;
            return Err(RegistryError::DuplicateSignature {
                channel: key.channel,
                signature: key.signature,
            });
        }
        let (max_mass, max_jump) = catalog.static_mass(static_code);
        if !(max_mass > 0.0 && max_jump > 0.0) {
            self.telemetry.rejected_spawns += 1;
            return Err(RegistryError::UnknownStaticCode(static_code.to_string()));
        }
        let state = match Stability::parse_token(state_token) {
            Some(state) => state,
            None => {
                self.telemetry.rejected_spawns += 1;
                return Err(RegistryError::InvalidState(state_token.to_string()));
            }
        };
        match WormholeMass::spawn(max_mass, max_jump, state) {
            Ok(wormhole) => {
                self.telemetry.spawned += 1;
                tracing::info!(
                    target: "anoikis::registry",
                    key = %key,
                    code = static_code,
                    state = state.as_str(),
                    "registry.spawned"
                );
                self.entries.push(RegistryEntry { key, wormhole });
                Ok(())
            }
            Err(err) => {
                self.telemetry.rejected_spawns += 1;
                Err(err.into())
            }
        }
    }

    /// Runs a ship of `ship_mass` through the tracked hole. A collapsing
    /// cascade removes the entry.
    pub fn splash(
        &mut self,
        channel: &str,
        signature: &str,
        ship_mass: f64,
    ) -> Result<SplashOutcome, RegistryError> {
        let key = SignatureKey::new(channel, signature);
        let slot = self.position(&key).ok_or_else(|| not_found(&key))?;
        match self.entries[slot].wormhole.apply_jump(ship_mass) {
            Ok(report) => {
                self.telemetry.jumps_applied += 1;
                let removed = self.entries[slot].wormhole.is_collapsed();
                if removed {
                    self.telemetry.collapses += 1;
                    tracing::info!(target: "anoikis::registry", key = %key, "registry.removed_collapsed");
                    self.entries.remove(slot);
                }
                Ok(SplashOutcome { report, removed })
            }
            Err(err) => {
                self.telemetry.jumps_rejected += 1;
                tracing::debug!(target: "anoikis::registry", key = %key, "registry.jump_rejected");
                Err(err.into())
            }
        }
    }

    /// Forces a shrink on the tracked hole, removing the entry when the
    /// transition lands on collapse.
    pub fn shrink(
        &mut self,
        channel: &str,
        signature: &str,
    ) -> Result<ShrinkOutcome, RegistryError> {
        let key = SignatureKey::new(channel, signature);
        let slot = self.position(&key).ok_or_else(|| not_found(&key))?;
        match self.entries[slot].wormhole.shrink() {
            Ok(report) => {
                self.telemetry.shrinks_applied += 1;
                let removed = self.entries[slot].wormhole.is_collapsed();
                if removed {
                    self.telemetry.collapses += 1;
                    tracing::info!(target: "anoikis::registry", key = %key, "registry.removed_collapsed");
                    self.entries.remove(slot);
                }
                Ok(ShrinkOutcome { report, removed })
            }
            Err(err) => {
                self.telemetry.shrinks_rejected += 1;
                Err(err.into())
            }
        }
    }

    pub fn collapse_chance(
        &self,
        channel: &str,
        signature: &str,
        ship_mass: f64,
    ) -> Result<f64, RegistryError> {
        let key = SignatureKey::new(channel, signature);
        let slot = self.position(&key).ok_or_else(|| not_found(&key))?;
        self.entries[slot]
            .wormhole
            .collapse_chance(ship_mass)
            .map_err(Into::into)
    }

    /// Drops the entry without simulating anything, for holes observed gone.
    pub fn collapse(&mut self, channel: &str, signature: &str) -> Result<(), RegistryError> {
        let key = SignatureKey::new(channel, signature);
        let slot = self.position(&key).ok_or_else(|| not_found(&key))?;
        self.entries.remove(slot);
        self.telemetry.collapses += 1;
        tracing::info!(target: "anoikis::registry", key = %key, "registry.collapsed_manually");
        Ok(())
    }

    /// Entries of one channel in spawn order.
    pub fn list(&self, channel: &str) -> Vec<&RegistryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.key.channel == channel)
            .collect()
    }

    pub fn wormhole(&self, channel: &str, signature: &str) -> Option<&WormholeMass> {
        let key = SignatureKey::new(channel, signature);
        self.position(&key)
            .map(|slot| &self.entries[slot].wormhole)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn telemetry(&self) -> RegistryTelemetry {
        self.telemetry
    }

    fn position(&self, key: &SignatureKey) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.key == key)
    }
}

fn not_found(key: &SignatureKey) -> RegistryError {
    RegistryError::SignatureNotFound {
        channel: key.channel.clone(),
        signature: key.signature.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::load_builtin().expect("builtin catalog loads")
    }

    #[test]
    fn spawn_then_list_preserves_spawn_order() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "stable")
            .expect("spawns");
        registry
            .spawn(&catalog, "fleet", "xyz-789", "B274", "new")
            .expect("spawns");

        let listed = registry.list("fleet");
        let signatures: Vec<&str> = listed
            .iter()
            .map(|entry| entry.key.signature.as_str())
            .collect();
        assert_eq!(signatures, vec!["ABC-123", "XYZ-789"]);
        assert!(registry.list("intel").is_empty());

        // D382 feeds the 2000/300 mass pair into the simulator.
        let hole = registry.wormhole("fleet", "ABC-123").expect("tracked");
        assert_eq!(hole.interval(), (900.0, 2200.0));
        assert_eq!(hole.max_jump(), 300.0);
    }

    #[test]
    fn duplicate_signatures_are_rejected_per_channel() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "stable")
            .expect("spawns");

        // Signatures fold case before the duplicate check.
        assert!(matches!(
            registry.spawn(&catalog, "fleet", "ABC-123", "b274", "new"),
            Err(RegistryError::DuplicateSignature { .. })
        ));
        // The same signature is free in another channel.
        registry
            .spawn(&catalog, "intel", "abc-123", "d382", "stable")
            .expect("spawns");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.telemetry().rejected_spawns, 1);
    }

    #[test]
    fn unknown_codes_and_states_are_rejected() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();

        let err = registry
            .spawn(&catalog, "fleet", "abc-123", "Q999", "stable")
            .expect_err("unknown code");
        assert_eq!(err.to_string(), "'Q999' is not a wormhole code");

        let err = registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "collapsed")
            .expect_err("unspawnable state");
        assert_eq!(
            err.to_string(),
            "'collapsed' is not a valid state. Try: new, stable, unstable, critical"
        );

        assert!(registry.is_empty());
        assert_eq!(registry.telemetry().rejected_spawns, 2);
    }

    #[test]
    fn splash_cascade_removes_collapsed_holes() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        // H296 is the 3300/1350 pair.
        registry
            .spawn(&catalog, "fleet", "hjk-001", "h296", "new")
            .expect("spawns");

        let outcome = registry.splash("fleet", "hjk-001", 1350.0).expect("jump fits");
        assert!(!outcome.report.shrunk);
        let outcome = registry.splash("fleet", "hjk-001", 1350.0).expect("jump fits");
        assert!(outcome.report.shrunk);
        assert!(!outcome.removed);
        let outcome = registry.splash("fleet", "hjk-001", 900.0).expect("jump fits");
        assert!(!outcome.removed);
        let outcome = registry.splash("fleet", "hjk-001", 900.0).expect("jump fits");
        assert!(outcome.removed);
        assert!(outcome.report.collapsed);

        assert!(registry.is_empty());
        assert!(matches!(
            registry.splash("fleet", "hjk-001", 100.0),
            Err(RegistryError::SignatureNotFound { .. })
        ));

        let telemetry = registry.telemetry();
        assert_eq!(telemetry.jumps_applied, 4);
        assert_eq!(telemetry.collapses, 1);
    }

    #[test]
    fn shrink_chain_walks_down_to_removal() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "stable")
            .expect("spawns");

        let outcome = registry.shrink("fleet", "abc-123").expect("threshold met");
        assert_eq!(outcome.report.state, Stability::Destab);
        assert!(!outcome.removed);
        let outcome = registry.shrink("fleet", "abc-123").expect("threshold met");
        assert_eq!(outcome.report.state, Stability::Crit);
        let outcome = registry.shrink("fleet", "abc-123").expect("threshold met");
        assert_eq!(outcome.report.state, Stability::Collapsed);
        assert!(outcome.removed);

        assert!(registry.is_empty());
        assert_eq!(registry.telemetry().shrinks_applied, 3);
        assert_eq!(registry.telemetry().collapses, 1);
    }

    #[test]
    fn rejected_jumps_keep_the_entry_and_count() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "stable")
            .expect("spawns");

        assert!(matches!(
            registry.splash("fleet", "abc-123", 301.0),
            Err(RegistryError::Jump(JumpError::ShipMassOutOfRange { .. }))
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.telemetry().jumps_rejected, 1);
    }

    #[test]
    fn manual_collapse_drops_the_entry() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "stable")
            .expect("spawns");

        registry.collapse("fleet", "abc-123").expect("tracked");
        assert!(registry.is_empty());
        assert_eq!(registry.telemetry().collapses, 1);

        assert!(matches!(
            registry.collapse("fleet", "abc-123"),
            Err(RegistryError::SignatureNotFound { .. })
        ));
    }

    #[test]
    fn chance_queries_pass_through() {
        let catalog = catalog();
        let mut registry = WormholeRegistry::new();
        registry
            .spawn(&catalog, "fleet", "abc-123", "d382", "stable")
            .expect("spawns");

        // 300 kT sits far below the 900 kT low bound.
        let chance = registry
            .collapse_chance("fleet", "abc-123", 300.0)
            .expect("plausible");
        assert_eq!(chance, 0.0);

        assert!(matches!(
            registry.collapse_chance("fleet", "abc-123", 301.0),
            Err(RegistryError::Chance(ChanceError::ShipMassOutOfRange { .. }))
        ));
        assert!(matches!(
            registry.collapse_chance("fleet", "zzz-999", 100.0),
            Err(RegistryError::SignatureNotFound { .. })
        ));
    }
}
