use crate::core::weather::Weather;
use helpers::general::clamp_percent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const FULL_TIRE_HEALTH: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Inter,
    Wet,
}

impl Default for Compound {
    fn default() -> Self {
        Compound::Medium
    }
}

impl Compound {
    pub const ALL: [Compound; 5] = [
        Compound::Soft,
        Compound::Medium,
        Compound::Hard,
        Compound::Inter,
        Compound::Wet,
    ];

    /// Slick compounds are made for a dry track.
    pub fn is_dry(&self) -> bool {
        matches!(self, Compound::Soft | Compound::Medium | Compound::Hard)
    }

    pub fn is_rain(&self) -> bool {
        !self.is_dry()
    }

    /// is_wrong_for returns true if the compound does not suit the inserted weather condition,
    /// i.e. rain tires on a dry track or slicks on a wet track.
    pub fn is_wrong_for(&self, weather: Weather) -> bool {
        match weather {
            Weather::Clear => self.is_rain(),
            Weather::Rainy | Weather::HeavyRain => self.is_dry(),
        }
    }

    /// parse_or_default parses a compound name and falls back to the default compound (Medium)
    /// if the name is unknown.
    pub fn parse_or_default(name: &str) -> Compound {
        name.parse::<Compound>().unwrap_or_else(|e: UnknownCompound| {
            warn!("{}, falling back to {}", e, Compound::default());
            Compound::default()
        })
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Compound::Soft => "Soft",
            Compound::Medium => "Medium",
            Compound::Hard => "Hard",
            Compound::Inter => "Inter",
            Compound::Wet => "Wet",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unknown tire compound '{0}'")]
pub struct UnknownCompound(pub String);

impl FromStr for Compound {
    type Err = UnknownCompound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "soft" | "s" => Ok(Compound::Soft),
            "medium" | "m" | "slicks" => Ok(Compound::Medium),
            "hard" | "h" => Ok(Compound::Hard),
            "inter" | "intermediate" | "i" => Ok(Compound::Inter),
            "wet" | "wets" | "w" => Ok(Compound::Wet),
            _ => Err(UnknownCompound(s.to_owned())),
        }
    }
}

/// * `wear_soft` .. `wear_wet` - (%/lap) Base tire wear per lap for each compound
/// * `health_penalty_tiers` - List of (health threshold, time loss) pairs: if the tire health is
/// below a threshold, the respective time loss (s) is added to the lap time (the first matching
/// tier is applied, therefore the list must be sorted by ascending threshold)
/// * `t_dry_in_rain` - (s) Time loss of a slick compound in rainy conditions
/// * `t_dry_in_heavy_rain` - (s) Time loss of a slick compound in heavy rain
/// * `t_rain_in_dry` - (s) Time loss of a rain compound on a dry track
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TirePars {
    pub wear_soft: f64,
    pub wear_medium: f64,
    pub wear_hard: f64,
    pub wear_inter: f64,
    pub wear_wet: f64,
    pub health_penalty_tiers: Vec<(f64, f64)>,
    pub t_dry_in_rain: f64,
    pub t_dry_in_heavy_rain: f64,
    pub t_rain_in_dry: f64,
}

impl Default for TirePars {
    fn default() -> Self {
        TirePars {
            wear_soft: 8.0,
            wear_medium: 5.0,
            wear_hard: 3.0,
            wear_inter: 4.0,
            wear_wet: 4.0,
            health_penalty_tiers: vec![(30.0, 2.5), (70.0, 1.0)],
            t_dry_in_rain: 6.0,
            t_dry_in_heavy_rain: 10.0,
            t_rain_in_dry: 5.0,
        }
    }
}

impl TirePars {
    /// base_wear returns the tire wear per lap of the inserted compound without staff modifiers.
    pub fn base_wear(&self, compound: Compound) -> f64 {
        match compound {
            Compound::Soft => self.wear_soft,
            Compound::Medium => self.wear_medium,
            Compound::Hard => self.wear_hard,
            Compound::Inter => self.wear_inter,
            Compound::Wet => self.wear_wet,
        }
    }

    /// t_add_degradation returns the time loss due to worn tires. It is a step function that is
    /// monotonically decreasing with the remaining tire health.
    pub fn t_add_degradation(&self, health: f64) -> f64 {
        let health = clamp_percent(health);

        self.health_penalty_tiers
            .iter()
            .find(|&&(threshold, _)| health < threshold)
            .map_or(0.0, |&(_, t_add)| t_add)
    }

    /// t_add_mismatch returns the time loss if the mounted compound does not suit the weather.
    pub fn t_add_mismatch(&self, compound: Compound, weather: Weather) -> f64 {
        if !compound.is_wrong_for(weather) {
            return 0.0;
        }

        match weather {
            Weather::Clear => self.t_rain_in_dry,
            Weather::Rainy => self.t_dry_in_rain,
            Weather::HeavyRain => self.t_dry_in_heavy_rain,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tireset {
    pub compound: Compound,
    pub health: f64,
    pub age_cur_stint: u32,
}

impl Tireset {
    pub fn new(compound: Compound) -> Tireset {
        Tireset {
            compound,
            health: FULL_TIRE_HEALTH,
            age_cur_stint: 0,
        }
    }

    /// drive_lap reduces the tire health by the inserted wear and increases the stint age. The
    /// health never leaves the range [0, 100].
    pub fn drive_lap(&mut self, wear: f64) {
        self.health = clamp_percent(self.health - wear);
        self.age_cur_stint += 1;
    }

    /// wear_this_lap returns the tire wear of the current lap considering the staff multiplier.
    pub fn wear_this_lap(&self, tire_pars: &TirePars, wear_multiplier: f64) -> f64 {
        (tire_pars.base_wear(self.compound) * wear_multiplier).max(0.0)
    }
}
