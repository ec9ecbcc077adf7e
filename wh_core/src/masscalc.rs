//! Remaining-mass bookkeeping for a single wormhole. The true mass is only
//! ever known as an interval `[low, high]` within the stability band of the
//! current state; jumps deplete the interval and shrink transitions walk the
//! bands down until collapse.

use std::fmt;

use thiserror::Error;

const FRESH_LOW: f64 = 0.9;
const BAND_HIGH: f64 = 1.1;
const STABLE_LOW: f64 = 0.45;
const DESTAB_HIGH: f64 = 0.55;
const DESTAB_LOW: f64 = 0.09;
const CRIT_HIGH: f64 = 0.11;

/// Stability states ordered most to least remaining mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stability {
    Collapsed = 0,
    Crit = 1,
    Destab = 2,
    Stable = 3,
    New = 4,
}

impl Stability {
    /// Operator token, case-insensitive. `collapsed` is not spawnable and is
    /// deliberately absent.
    pub fn parse_token(token: &str) -> Option<Stability> {
        match token.to_lowercase().as_str() {
            "new" => Some(Stability::New),
            "stable" => Some(Stability::Stable),
            "unstable" => Some(Stability::Destab),
            "critical" => Some(Stability::Crit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stability::New => "new",
            Stability::Stable => "stable",
            Stability::Destab => "unstable",
            Stability::Crit => "critical",
            Stability::Collapsed => "collapsed",
        }
    }

    /// Mass band `[floor, ceiling]` of the state as fractions of the total
    /// mass `M`: New/Stable `[0.45M, 1.1M]`, Destab `[0.09M, 0.55M]`, Crit
    /// `[0, 0.11M]`.
    pub fn band(self, ceiling: f64) -> (f64, f64) {
        match self {
            Stability::New | Stability::Stable => (STABLE_LOW * ceiling, BAND_HIGH * ceiling),
            Stability::Destab => (DESTAB_LOW * ceiling, DESTAB_HIGH * ceiling),
            Stability::Crit => (0.0, CRIT_HIGH * ceiling),
            Stability::Collapsed => (0.0, 0.0),
        }
    }

    /// Interval a wormhole opens with. A New hole is known untouched and
    /// starts at `[0.9M, 1.1M]`; every other state starts at its full band.
    pub fn spawn_interval(self, ceiling: f64) -> (f64, f64) {
        match self {
            Stability::New => (FRESH_LOW * ceiling, BAND_HIGH * ceiling),
            _ => self.band(ceiling),
        }
    }

    pub fn next(self) -> Stability {
        match self {
            Stability::New | Stability::Stable => Stability::Destab,
            Stability::Destab => Stability::Crit,
            Stability::Crit | Stability::Collapsed => Stability::Collapsed,
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bound of the mass interval. `Known` when the bound is an exact
/// depletion estimate; `FloorOnly` when depletion has passed below the band
/// floor and only the floor can be displayed. The raw estimate survives in
/// `last_depletion` because a shrink transition re-anchors the interval on it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LowerBound {
    Known(f64),
    FloorOnly { last_depletion: f64 },
}

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("a wormhole cannot spawn collapsed")]
    CollapsedInitialState,
    #[error("mass parameters must be positive: max_mass {max_mass} kT, max_jump {max_jump} kT")]
    NonPositiveMass { max_mass: f64, max_jump: f64 },
}

#[derive(Debug, Error)]
pub enum JumpError {
    #[error("the wormhole has collapsed")]
    Collapsed,
    #[error("ship mass {ship_mass} kT is outside (0, {max_jump}] kT")]
    ShipMassOutOfRange { ship_mass: f64, max_jump: f64 },
}

#[derive(Debug, Error)]
pub enum ShrinkError {
    #[error("the wormhole has collapsed")]
    Collapsed,
    #[error("mass low bound {low} kT is above the {threshold} kT shrink threshold")]
    ThresholdNotReached { low: f64, threshold: f64 },
}

#[derive(Debug, Error)]
pub enum ChanceError {
    #[error("the wormhole has collapsed")]
    Collapsed,
    #[error("ship mass {ship_mass} kT is outside (0, {max_jump}] kT")]
    ShipMassOutOfRange { ship_mass: f64, max_jump: f64 },
}

/// What a jump did beyond depleting the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpReport {
    pub shrunk: bool,
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkReport {
    pub state: Stability,
}

/// Mass simulator for one wormhole, parameterized by the total mass budget
/// `ceiling` and the per-ship `max_jump` limit, both in kilotonnes.
#[derive(Debug, Clone, PartialEq)]
pub struct WormholeMass {
    ceiling: f64,
    max_jump: f64,
    state: Stability,
    high: f64,
    lower: LowerBound,
}

impl WormholeMass {
    pub fn spawn(max_mass: f64, max_jump: f64, state: Stability) -> Result<Self, SpawnError> {
        if state == Stability::Collapsed {
            return Err(SpawnError::CollapsedInitialState);
        }
        if !(max_mass > 0.0 && max_jump > 0.0) {
            return Err(SpawnError::NonPositiveMass { max_mass, max_jump });
        }
        let (low, high) = state.spawn_interval(max_mass);
        let lower = if state == Stability::New {
            LowerBound::Known(low)
        } else {
            LowerBound::FloorOnly { last_depletion: 0.0 }
        };
        Ok(WormholeMass {
            ceiling: max_mass,
            max_jump,
            state,
            high,
            lower,
        })
    }

    pub fn state(&self) -> Stability {
        self.state
    }

    /// Displayed lower bound: the depletion estimate while it stays above
    /// the band floor, the floor itself afterwards.
    pub fn low(&self) -> f64 {
        match self.lower {
            LowerBound::Known(low) => low,
            LowerBound::FloorOnly { .. } => self.state.band(self.ceiling).0,
        }
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn interval(&self) -> (f64, f64) {
        (self.low(), self.high)
    }

    pub fn max_jump(&self) -> f64 {
        self.max_jump
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn is_collapsed(&self) -> bool {
        self.state == Stability::Collapsed
    }

    fn last_depletion(&self) -> f64 {
        match self.lower {
            LowerBound::Known(low) => low,
            LowerBound::FloorOnly { last_depletion } => last_depletion,
        }
    }

    /// Passes `ship_mass` through the hole, depleting both bounds and
    /// cascading shrink transitions while the interval falls out of the
    /// current band.
    pub fn apply_jump(&mut self, ship_mass: f64) -> Result<JumpReport, JumpError> {
        if self.is_collapsed() {
            tracing::debug!(target: "anoikis::masscalc", "masscalc.jump_on_collapsed");
            return Err(JumpError::Collapsed);
        }
        if !(ship_mass > 0.0 && ship_mass <= self.max_jump) {
            tracing::debug!(
                target: "anoikis::masscalc",
                ship_mass,
                max_jump = self.max_jump,
                "masscalc.jump_rejected"
            );
            return Err(JumpError::ShipMassOutOfRange {
                ship_mass,
                max_jump: self.max_jump,
            });
        }
        let depletion = (self.low() - ship_mass).max(0.0);
        self.high -= ship_mass;
        let floor = self.state.band(self.ceiling).0;
        self.lower = if depletion >= floor {
            LowerBound::Known(depletion)
        } else {
            LowerBound::FloorOnly {
                last_depletion: depletion,
            }
        };
        let mut shrunk = false;
        // The loop guard keeps a wedged interval from spinning; in practice
        // a needed shrink always meets its threshold.
        while self.needs_shrink() {
            match self.shrink() {
                Ok(_) => shrunk = true,
                Err(_) => break,
            }
        }
        Ok(JumpReport {
            shrunk,
            collapsed: self.is_collapsed(),
        })
    }

    fn needs_shrink(&self) -> bool {
        if self.is_collapsed() {
            return false;
        }
        let (floor, _) = self.state.band(self.ceiling);
        self.high < self.low() || self.high < floor
    }

    /// Forces the next stability transition. The displayed low bound must
    /// already fit under the target band's ceiling (the current band's for
    /// the final Crit to Collapsed step).
    pub fn shrink(&mut self) -> Result<ShrinkReport, ShrinkError> {
        if self.is_collapsed() {
            return Err(ShrinkError::Collapsed);
        }
        let next = self.state.next();
        let threshold = if next == Stability::Collapsed {
            self.state.band(self.ceiling).1
        } else {
            next.band(self.ceiling).1
        };
        if self.low() > threshold {
            return Err(ShrinkError::ThresholdNotReached {
                low: self.low(),
                threshold,
            });
        }
        let depletion = self.last_depletion();
        self.state = next;
        if next == Stability::Collapsed {
            self.high = 0.0;
            self.lower = LowerBound::Known(0.0);
            tracing::info!(target: "anoikis::masscalc", "masscalc.collapsed");
        } else {
            self.high = self.high.min(next.band(self.ceiling).1);
            self.lower = LowerBound::Known(depletion);
            tracing::info!(
                target: "anoikis::masscalc",
                state = self.state.as_str(),
                low = self.low(),
                high = self.high,
                "masscalc.shrunk"
            );
        }
        Ok(ShrinkReport { state: self.state })
    }

    /// Chance in percent that `ship_mass` collapses the hole, interpolated
    /// linearly across the interval. A degenerate interval gives certainty
    /// one way or the other.
    pub fn collapse_chance(&self, ship_mass: f64) -> Result<f64, ChanceError> {
        if self.is_collapsed() {
            return Err(ChanceError::Collapsed);
        }
        if !(ship_mass > 0.0 && ship_mass <= self.max_jump) {
            return Err(ChanceError::ShipMassOutOfRange {
                ship_mass,
                max_jump: self.max_jump,
            });
        }
        let low = self.low();
        let span = self.high - low;
        if span <= 0.0 {
            return Ok(if ship_mass >= low { 100.0 } else { 0.0 });
        }
        Ok(((ship_mass - low) / span * 100.0).clamp(0.0, 100.0))
    }
}

impl fmt::Display for WormholeMass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mass is between {} kT and {} kT, Maxjump: {} kT, Status: {}",
            self.low(),
            self.high,
            self.max_jump,
            self.state
        )
    }
}
