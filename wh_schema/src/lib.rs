use serde::{Deserialize, Serialize};
use std::fmt;

/// Wormhole system classes as they appear in J-space scan data. C13 covers
/// the shattered frigate holes, C14 through C18 the drifter systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum WormholeClass {
    C1 = 1,
    C2 = 2,
    C3 = 3,
    C4 = 4,
    C5 = 5,
    C6 = 6,
    C13 = 13,
    C14 = 14,
    C15 = 15,
    C16 = 16,
    C17 = 17,
    C18 = 18,
}

impl WormholeClass {
    pub const ALL: [WormholeClass; 12] = [
        WormholeClass::C1,
        WormholeClass::C2,
        WormholeClass::C3,
        WormholeClass::C4,
        WormholeClass::C5,
        WormholeClass::C6,
        WormholeClass::C13,
        WormholeClass::C14,
        WormholeClass::C15,
        WormholeClass::C16,
        WormholeClass::C17,
        WormholeClass::C18,
    ];

    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(WormholeClass::C1),
            2 => Some(WormholeClass::C2),
            3 => Some(WormholeClass::C3),
            4 => Some(WormholeClass::C4),
            5 => Some(WormholeClass::C5),
            6 => Some(WormholeClass::C6),
            13 => Some(WormholeClass::C13),
            14 => Some(WormholeClass::C14),
            15 => Some(WormholeClass::C15),
            16 => Some(WormholeClass::C16),
            17 => Some(WormholeClass::C17),
            18 => Some(WormholeClass::C18),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn is_drifter(self) -> bool {
        self.number() >= 14
    }
}

impl fmt::Display for WormholeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.number())
    }
}

/// Environmental effect of a wormhole system. Serialized with the in-game
/// display names, which is also how the catalog rows spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemEffect {
    #[serde(rename = "Black Hole")]
    BlackHole,
    #[serde(rename = "Cataclysmic Variable")]
    CataclysmicVariable,
    Magnetar,
    #[serde(rename = "No effect")]
    NoEffect,
    Pulsar,
    #[serde(rename = "Red Giant")]
    RedGiant,
    #[serde(rename = "Wolf-Rayet Star")]
    WolfRayet,
}

impl SystemEffect {
    pub const ALL: [SystemEffect; 7] = [
        SystemEffect::BlackHole,
        SystemEffect::CataclysmicVariable,
        SystemEffect::Magnetar,
        SystemEffect::NoEffect,
        SystemEffect::Pulsar,
        SystemEffect::RedGiant,
        SystemEffect::WolfRayet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemEffect::BlackHole => "Black Hole",
            SystemEffect::CataclysmicVariable => "Cataclysmic Variable",
            SystemEffect::Magnetar => "Magnetar",
            SystemEffect::NoEffect => "No effect",
            SystemEffect::Pulsar => "Pulsar",
            SystemEffect::RedGiant => "Red Giant",
            SystemEffect::WolfRayet => "Wolf-Rayet Star",
        }
    }
}

impl fmt::Display for SystemEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlanetType {
    Temperate = 0,
    Ice = 1,
    Gas = 2,
    Oceanic = 3,
    Lava = 4,
    Barren = 5,
    Storm = 6,
    Plasma = 7,
    Shattered = 8,
}

impl PlanetType {
    pub const ALL: [PlanetType; 9] = [
        PlanetType::Temperate,
        PlanetType::Ice,
        PlanetType::Gas,
        PlanetType::Oceanic,
        PlanetType::Lava,
        PlanetType::Barren,
        PlanetType::Storm,
        PlanetType::Plasma,
        PlanetType::Shattered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanetType::Temperate => "Temperate",
            PlanetType::Ice => "Ice",
            PlanetType::Gas => "Gas",
            PlanetType::Oceanic => "Oceanic",
            PlanetType::Lava => "Lava",
            PlanetType::Barren => "Barren",
            PlanetType::Storm => "Storm",
            PlanetType::Plasma => "Plasma",
            PlanetType::Shattered => "Shattered",
        }
    }
}

impl fmt::Display for PlanetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type planet histogram of a wormhole system. Doubles as a requirement
/// vector: a record satisfies a requirement when it covers it component-wise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PlanetCounts {
    pub temperate: u16,
    pub ice: u16,
    pub gas: u16,
    pub oceanic: u16,
    pub lava: u16,
    pub barren: u16,
    pub storm: u16,
    pub plasma: u16,
    pub shattered: u16,
}

impl PlanetCounts {
    /// Planet mixes that allow self-sufficient fuel production, the
    /// so-called perfect P.I. layouts.
    pub const PERFECT_LAYOUTS: [PlanetCounts; 4] = [
        PlanetCounts {
            temperate: 1,
            ice: 1,
            gas: 1,
            oceanic: 0,
            lava: 1,
            barren: 1,
            storm: 0,
            plasma: 0,
            shattered: 0,
        },
        PlanetCounts {
            temperate: 1,
            ice: 1,
            gas: 1,
            oceanic: 0,
            lava: 1,
            barren: 0,
            storm: 0,
            plasma: 1,
            shattered: 0,
        },
        PlanetCounts {
            temperate: 1,
            ice: 0,
            gas: 1,
            oceanic: 1,
            lava: 1,
            barren: 1,
            storm: 0,
            plasma: 0,
            shattered: 0,
        },
        PlanetCounts {
            temperate: 1,
            ice: 0,
            gas: 1,
            oceanic: 1,
            lava: 1,
            barren: 0,
            storm: 0,
            plasma: 1,
            shattered: 0,
        },
    ];

    pub fn from_array(counts: [u16; 9]) -> Self {
        Self {
            temperate: counts[0],
            ice: counts[1],
            gas: counts[2],
            oceanic: counts[3],
            lava: counts[4],
            barren: counts[5],
            storm: counts[6],
            plasma: counts[7],
            shattered: counts[8],
        }
    }

    pub fn as_array(&self) -> [u16; 9] {
        [
            self.temperate,
            self.ice,
            self.gas,
            self.oceanic,
            self.lava,
            self.barren,
            self.storm,
            self.plasma,
            self.shattered,
        ]
    }

    pub fn get(&self, kind: PlanetType) -> u16 {
        self.as_array()[kind as usize]
    }

    pub fn total(&self) -> u32 {
        self.as_array().iter().map(|&count| count as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.as_array().iter().all(|&count| count == 0)
    }

    /// True when every component of `requirement` is available here.
    pub fn covers(&self, requirement: &PlanetCounts) -> bool {
        self.as_array()
            .iter()
            .zip(requirement.as_array().iter())
            .all(|(have, need)| have >= need)
    }

    pub fn has_perfect_pi(&self) -> bool {
        Self::PERFECT_LAYOUTS
            .iter()
            .any(|layout| self.covers(layout))
    }
}

impl fmt::Display for PlanetCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, count) in PlanetType::ALL.iter().zip(self.as_array().iter()) {
            if *count == 0 {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", kind, count)?;
            first = false;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Where a static connection leads. `Class` carries the raw class number so
/// criteria naming a class with no known systems stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticTarget {
    HighSec,
    LowSec,
    NullSec,
    Class(u8),
}

impl StaticTarget {
    pub fn from_class(class: WormholeClass) -> Self {
        StaticTarget::Class(class.number())
    }
}

impl fmt::Display for StaticTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticTarget::HighSec => f.write_str("HS"),
            StaticTarget::LowSec => f.write_str("LS"),
            StaticTarget::NullSec => f.write_str("NS"),
            StaticTarget::Class(number) => write!(f, "C{}", number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_numbers_round_trip() {
        for class in WormholeClass::ALL {
            assert_eq!(WormholeClass::from_number(class.number()), Some(class));
        }
        assert_eq!(WormholeClass::from_number(7), None);
        assert_eq!(WormholeClass::from_number(0), None);
    }

    #[test]
    fn covers_is_component_wise() {
        let record = PlanetCounts::from_array([1, 1, 2, 0, 1, 3, 0, 0, 0]);
        let satisfied = PlanetCounts::from_array([1, 0, 2, 0, 0, 1, 0, 0, 0]);
        let unsatisfied = PlanetCounts::from_array([0, 0, 0, 1, 0, 0, 0, 0, 0]);
        assert!(record.covers(&satisfied));
        assert!(!record.covers(&unsatisfied));
    }

    #[test]
    fn perfect_pi_requires_a_full_layout() {
        let perfect = PlanetCounts::from_array([1, 1, 1, 0, 1, 1, 0, 0, 0]);
        assert!(perfect.has_perfect_pi());

        let missing_lava = PlanetCounts::from_array([2, 2, 2, 2, 0, 2, 2, 2, 0]);
        assert!(!missing_lava.has_perfect_pi());
    }

    #[test]
    fn total_sums_the_histogram() {
        let counts = PlanetCounts::from_array([1, 0, 3, 0, 1, 2, 0, 0, 0]);
        assert_eq!(counts.total(), 7);
        assert!(!counts.is_empty());
        assert!(PlanetCounts::default().is_empty());
    }

    #[test]
    fn effect_names_match_catalog_spelling() {
        assert_eq!(SystemEffect::WolfRayet.as_str(), "Wolf-Rayet Star");
        assert_eq!(SystemEffect::NoEffect.as_str(), "No effect");
        let decoded: SystemEffect =
            serde_json::from_str("\"Cataclysmic Variable\"").expect("effect name parses");
        assert_eq!(decoded, SystemEffect::CataclysmicVariable);
    }
}
