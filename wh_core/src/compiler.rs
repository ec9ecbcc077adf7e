//! Free-text order compiler. Orders are delimiter-split groups: group 0
//! names the wanted classes, later groups are keyword-sniffed into dimension
//! families (effects, statics, radius, planets, moons). Malformed input never
//! errors; it degrades to "no constraint".

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use wh_schema::{PlanetCounts, StaticTarget, SystemEffect, WormholeClass};

const GROUP_DELIMITER: char = ';';

/// Hard-coded override: any order whose class group mentions this literal
/// returns the fixed staging pair below, skipping compilation entirely.
const SANSHA_KEYWORD: &str = "sansha";
pub const SANSHA_OVERRIDE_SYSTEMS: [&str; 2] = ["J005299", "J010556"];
pub const SANSHA_OVERRIDE_SUMMARY: &str = "Matches: 2; Processed: Sansha Override!";

/// Lower-cased sniff phrases paired with the effect they select. The sniff
/// order is also the canonical order effect lists are reported in.
const EFFECT_PHRASES: [(&str, SystemEffect); 7] = [
    ("black hole", SystemEffect::BlackHole),
    ("cataclysmic", SystemEffect::CataclysmicVariable),
    ("magnetar", SystemEffect::Magnetar),
    ("no effect", SystemEffect::NoEffect),
    ("pulsar", SystemEffect::Pulsar),
    ("red giant", SystemEffect::RedGiant),
    ("wolf-rayet", SystemEffect::WolfRayet),
];

/// Long/short count prefixes per planet type, indexed like
/// [`PlanetCounts::as_array`]. The long prefix is tried first.
const PLANET_PREFIXES: [[&str; 2]; 9] = [
    ["temperate-", "t-"],
    ["ice-", "i-"],
    ["gas-", "g-"],
    ["oceanic-", "o-"],
    ["lava-", "l-"],
    ["barren-", "b-"],
    ["storm-", "s-"],
    ["plasma-", "p-"],
    ["shattered-", "sh-"],
];

bitflags::bitflags! {
    /// Dimensions of an order that compiled into an actual constraint, in the
    /// shape reported back to the operator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Recognized: u8 {
        const CLASS = 1;
        const EFFECTS = 1 << 1;
        const STATICS = 1 << 2;
        const RADIUS = 1 << 3;
        const MOONS = 1 << 4;
        const PLANETS = 1 << 5;
        const PLANET_NUMBERS = 1 << 6;
    }
}

impl Recognized {
    const LABELS: [(Recognized, &'static str); 7] = [
        (Recognized::CLASS, "class"),
        (Recognized::EFFECTS, "effects"),
        (Recognized::STATICS, "statics"),
        (Recognized::RADIUS, "radius"),
        (Recognized::MOONS, "moons"),
        (Recognized::PLANETS, "planets"),
        (Recognized::PLANET_NUMBERS, "planet numbers"),
    ];

    /// Operator-facing summary of the recognized dimensions, `none` when the
    /// order had no usable class group.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        let labels: Vec<&str> = Self::LABELS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|&(_, label)| label)
            .collect();
        labels.join(", ")
    }
}

/// Statics constraint: OR-groups of targets. Without `exclude`, a record
/// matches when at least one group is fully contained in its targets. With
/// `exclude`, a record matches only when none of the listed targets are
/// present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticsConstraint {
    pub groups: Vec<Vec<StaticTarget>>,
    pub exclude: bool,
}

/// Conjunction of independently optional constraints. An empty `classes` set
/// matches nothing regardless of the other dimensions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub classes: BTreeSet<u8>,
    pub effects: Option<Vec<SystemEffect>>,
    pub statics: Option<StaticsConstraint>,
    pub radius_au: Option<(f64, f64)>,
    pub moons: Option<(u32, u32)>,
    pub planet_count: Option<(u32, u32)>,
    pub planet_layouts: Option<Vec<PlanetCounts>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompiledOrder {
    /// The literal override short-circuited compilation.
    SanshaOverride,
    Search {
        filter: Filter,
        recognized: Recognized,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupFamily {
    Effects,
    Statics,
    Radius,
    Planets,
    Moons,
}

/// One slot per dimension family. The first group of a family claims its
/// slot even when it parses to no constraint; later groups of the same
/// family are ignored.
#[derive(Debug, Default)]
struct ClaimedFamilies {
    effects: bool,
    statics: bool,
    radius: bool,
    planets: bool,
    moons: bool,
}

impl ClaimedFamilies {
    fn claim(&mut self, family: GroupFamily) -> bool {
        let slot = match family {
            GroupFamily::Effects => &mut self.effects,
            GroupFamily::Statics => &mut self.statics,
            GroupFamily::Radius => &mut self.radius,
            GroupFamily::Planets => &mut self.planets,
            GroupFamily::Moons => &mut self.moons,
        };
        let first = !*slot;
        *slot = true;
        first
    }
}

pub fn compile(order_text: &str) -> CompiledOrder {
    let lowered = order_text.to_lowercase();
    let groups: Vec<&str> = lowered.split(GROUP_DELIMITER).collect();
    let class_group = groups.first().copied().unwrap_or_default();

    if class_group.contains(SANSHA_KEYWORD) {
        tracing::debug!(target: "anoikis::compiler", "compiler.sansha_override");
        return CompiledOrder::SanshaOverride;
    }

    let mut filter = Filter {
        classes: parse_classes(class_group),
        ..Filter::default()
    };
    let mut recognized = Recognized::empty();
    if filter.classes.is_empty() {
        // No class, no search: later groups are not even classified.
        return CompiledOrder::Search { filter, recognized };
    }
    recognized |= Recognized::CLASS;

    let mut claimed = ClaimedFamilies::default();

    // Shattered systems are the ones without moons, so the class group's
    // shorthand claims the moons slot. `non-shattered` first: it contains
    // `shattered` as a substring.
    if class_group.contains("non-shattered") {
        filter.moons = Some((1, 1000));
    } else if class_group.contains("shattered") {
        filter.moons = Some((0, 0));
    }
    if filter.moons.is_some() {
        claimed.claim(GroupFamily::Moons);
        recognized |= Recognized::MOONS;
    }

    for group in &groups[1..] {
        let family = match classify(group) {
            Some(family) => family,
            // Unrecognizable groups are treated as comments.
            None => continue,
        };
        if !claimed.claim(family) {
            continue;
        }
        match family {
            GroupFamily::Effects => {
                let effects = parse_effects(group);
                if !effects.is_empty() {
                    recognized |= Recognized::EFFECTS;
                    filter.effects = Some(effects);
                }
            }
            GroupFamily::Statics => {
                if let Some(constraint) = parse_statics(group) {
                    recognized |= Recognized::STATICS;
                    filter.statics = Some(constraint);
                }
            }
            GroupFamily::Radius => {
                if let Some(range) = parse_float_range(group) {
                    recognized |= Recognized::RADIUS;
                    filter.radius_au = Some(range);
                }
            }
            GroupFamily::Planets => {
                let layouts = parse_planet_layouts(group);
                if !layouts.is_empty() {
                    recognized |= Recognized::PLANETS;
                    filter.planet_layouts = Some(layouts);
                }
                if let Some(range) = parse_int_range(group) {
                    recognized |= Recognized::PLANET_NUMBERS;
                    filter.planet_count = Some(range);
                }
            }
            GroupFamily::Moons => {
                if let Some(range) = parse_int_range(group) {
                    recognized |= Recognized::MOONS;
                    filter.moons = Some(range);
                }
            }
        }
    }

    tracing::debug!(
        target: "anoikis::compiler",
        classes = filter.classes.len(),
        recognized = %recognized.describe(),
        "compiler.compiled"
    );
    CompiledOrder::Search { filter, recognized }
}

fn classify(group: &str) -> Option<GroupFamily> {
    if group.contains("effect") {
        Some(GroupFamily::Effects)
    } else if group.contains("static") {
        Some(GroupFamily::Statics)
    } else if group.contains("radius") || group.contains("size") {
        Some(GroupFamily::Radius)
    } else if group.contains("planet") || group.contains("p.i.") {
        Some(GroupFamily::Planets)
    } else if group.contains("moon") {
        Some(GroupFamily::Moons)
    } else {
        None
    }
}

/// `all` expands to the full class enumeration and wins over everything
/// else. Otherwise named aliases and explicit `c<n>` tokens accumulate;
/// class numbers are kept raw, so `c7` stays representable and simply never
/// matches a record.
fn parse_classes(group: &str) -> BTreeSet<u8> {
    let mut classes = BTreeSet::new();
    if group.contains("all") {
        classes.extend(WormholeClass::ALL.iter().map(|class| class.number()));
        return classes;
    }
    if group.contains("tripnull") {
        classes.insert(13);
    }
    if group.contains("drifter") {
        classes.extend(14..=18);
    }
    for capture in class_token_regex().captures_iter(group) {
        if let Ok(number) = capture[1].parse::<u8>() {
            classes.insert(number);
        }
    }
    classes
}

fn parse_effects(group: &str) -> Vec<SystemEffect> {
    let exclude = group.contains("exclude");
    EFFECT_PHRASES
        .iter()
        .filter(|(phrase, _)| group.contains(phrase) != exclude)
        .map(|&(_, effect)| effect)
        .collect()
}

fn parse_statics(group: &str) -> Option<StaticsConstraint> {
    let exclude = group.contains("exclude");
    let mut groups = Vec::new();
    for part in group.split(" or ") {
        let mut targets = Vec::new();
        if part.contains("hs") || part.contains("high-sec") {
            targets.push(StaticTarget::HighSec);
        }
        if part.contains("ls") || part.contains("low-sec") {
            targets.push(StaticTarget::LowSec);
        }
        if part.contains("ns") || part.contains("null-sec") || part.contains("nul-sec") {
            targets.push(StaticTarget::NullSec);
        }
        for capture in class_token_regex().captures_iter(part) {
            if let Ok(number) = capture[1].parse::<u8>() {
                targets.push(StaticTarget::Class(number));
            }
        }
        if !targets.is_empty() {
            groups.push(targets);
        }
    }
    if groups.is_empty() {
        None
    } else {
        Some(StaticsConstraint { groups, exclude })
    }
}

fn parse_planet_layouts(group: &str) -> Vec<PlanetCounts> {
    if group.contains("perfect") {
        return PlanetCounts::PERFECT_LAYOUTS.to_vec();
    }
    let mut layouts = Vec::new();
    for part in group.split(" or ") {
        let mut counts = [0u16; 9];
        for (slot, prefixes) in PLANET_PREFIXES.iter().enumerate() {
            counts[slot] = planet_count_after(part, prefixes);
        }
        let layout = PlanetCounts::from_array(counts);
        if !layout.is_empty() {
            layouts.push(layout);
        }
    }
    layouts
}

/// Leftmost `<prefix><digits>` occurrence, long prefix shadowing the short
/// one. The short prefixes match inside longer words: `gas-3` also feeds the
/// storm slot through `s-3`.
fn planet_count_after(text: &str, prefixes: &[&str; 2]) -> u16 {
    for prefix in prefixes {
        let mut from = 0;
        while let Some(found) = text[from..].find(prefix) {
            let digits_start = from + found + prefix.len();
            let digits_end = text[digits_start..]
                .find(|ch: char| !ch.is_ascii_digit())
                .map(|offset| digits_start + offset)
                .unwrap_or(text.len());
            if digits_end > digits_start {
                return text[digits_start..digits_end].parse().unwrap_or(u16::MAX);
            }
            from += found + 1;
        }
    }
    0
}

/// First `<int>-<int>` occurrence; valid when min ≤ max. Oversized numbers
/// saturate, keeping the range valid but unsatisfiable, matching how
/// arbitrary-precision input behaved upstream of the catalog bounds.
fn parse_int_range(text: &str) -> Option<(u32, u32)> {
    let captures = int_range_regex().captures(text)?;
    let min = captures[1].parse::<u32>().unwrap_or(u32::MAX);
    let max = captures[2].parse::<u32>().unwrap_or(u32::MAX);
    if min <= max {
        Some((min, max))
    } else {
        None
    }
}

/// First `<float>-<float>` occurrence; valid when both bounds parse, max is
/// positive and min ≤ max.
fn parse_float_range(text: &str) -> Option<(f64, f64)> {
    let captures = float_range_regex().captures(text)?;
    let min = captures[1].parse::<f64>().ok()?;
    let max = captures[2].parse::<f64>().ok()?;
    if max > 0.0 && min <= max {
        Some((min, max))
    } else {
        None
    }
}

fn class_token_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("c([0-9]{1,2})").expect("class token pattern compiles"))
}

fn int_range_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("([0-9]+)-([0-9]+)").expect("integer range pattern compiles"))
}

fn float_range_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([.0-9]+)-([.0-9]+)").expect("float range pattern compiles"))
}
