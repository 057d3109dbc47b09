use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability that the rain intensity changes within a single tick.
pub const P_INTENSITY_CHANGE: f64 = 0.1;
/// Magnitude of a rain intensity change.
pub const INTENSITY_STEP: i32 = 20;
/// Number of ticks simulated ahead when forecasting rain.
pub const FORECAST_TICKS: usize = 3;

const RAINY_THRESHOLD: u8 = 40;
const HEAVY_RAIN_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Rainy,
    HeavyRain,
}

impl Default for Weather {
    fn default() -> Self {
        Weather::Clear
    }
}

impl Weather {
    pub fn is_wet(&self) -> bool {
        !matches!(self, Weather::Clear)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Weather::Clear => write!(f, "Clear"),
            Weather::Rainy => write!(f, "Rainy"),
            Weather::HeavyRain => write!(f, "Heavy Rain"),
        }
    }
}

/// condition returns the weather tier that belongs to the inserted rain intensity. Intensities
/// above 100 are treated as 100.
pub fn condition(intensity: u8) -> Weather {
    let intensity = intensity.min(100);

    if intensity > HEAVY_RAIN_THRESHOLD {
        Weather::HeavyRain
    } else if intensity > RAINY_THRESHOLD {
        Weather::Rainy
    } else {
        Weather::Clear
    }
}

/// tick advances the rain intensity by one step. With probability P_INTENSITY_CHANGE the
/// intensity jumps by INTENSITY_STEP in a random direction, otherwise it stays unchanged. The
/// result is always within [0, 100].
pub fn tick<R: Rng + ?Sized>(intensity: u8, rng: &mut R) -> (u8, Weather) {
    let cur = i32::from(intensity.min(100));
    let mut next = cur;

    if rng.gen_bool(P_INTENSITY_CHANGE) {
        let direction = if rng.gen_bool(0.5) { -1 } else { 1 };
        next = (cur + direction * INTENSITY_STEP).max(0).min(100);
    }

    let next = next as u8;
    (next, condition(next))
}

/// forecast_rain_soon simulates FORECAST_TICKS ticks ahead and reports whether the track would be
/// wet afterwards. The forecast consumes random numbers from the inserted source.
pub fn forecast_rain_soon<R: Rng + ?Sized>(intensity: u8, rng: &mut R) -> bool {
    let mut sim = intensity;

    for _ in 0..FORECAST_TICKS {
        sim = tick(sim, rng).0;
    }

    condition(sim).is_wet()
}
