use crate::core::tireset::Compound;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rain intensity above which AI drivers on slicks consider switching to wets.
pub const RAIN_PIT_FOR_WETS: u8 = 50;
/// Rain intensity below which AI drivers on rain tires switch back to slicks.
pub const RAIN_PIT_FOR_SLICKS: u8 = 10;
/// Probability of a radio message if an AI driver stays out.
pub const P_STAY_OUT_CHATTER: f64 = 0.15;

/// Compounds mounted by the AI when it decides to switch.
pub const AI_WET_COMPOUND: Compound = Compound::Wet;
pub const AI_SLICK_COMPOUND: Compound = Compound::Medium;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyProfile {
    Aggressive,
    Conservative,
}

impl Default for StrategyProfile {
    fn default() -> Self {
        StrategyProfile::Conservative
    }
}

impl StrategyProfile {
    /// p_pit_for_wets returns the probability of pitting for wets once the track is wet.
    /// Aggressive drivers take the risk and stay out more often.
    pub fn p_pit_for_wets(&self) -> f64 {
        match self {
            StrategyProfile::Aggressive => 0.3,
            StrategyProfile::Conservative => 0.8,
        }
    }
}

impl fmt::Display for StrategyProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StrategyProfile::Aggressive => write!(f, "Aggressive"),
            StrategyProfile::Conservative => write!(f, "Conservative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiDecision {
    Stay,
    PitForWets,
    PitForSlicks,
}

impl AiDecision {
    /// new_compound returns the compound that is mounted as a consequence of the decision.
    pub fn new_compound(&self) -> Option<Compound> {
        match self {
            AiDecision::Stay => None,
            AiDecision::PitForWets => Some(AI_WET_COMPOUND),
            AiDecision::PitForSlicks => Some(AI_SLICK_COMPOUND),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            AiDecision::Stay => "STAY",
            AiDecision::PitForWets => "PIT_FOR_WETS",
            AiDecision::PitForSlicks => "PIT_FOR_SLICKS",
        }
    }
}

/// decide determines the tire strategy of an AI driver for the upcoming lap. The rules are
/// evaluated in order, a later rule overrides an earlier one:
///
/// * rain intensity above RAIN_PIT_FOR_WETS and on slicks: pit for wets with a probability that
/// depends on the strategy profile (one random draw)
/// * rain intensity below RAIN_PIT_FOR_SLICKS and not on slicks: pit for slicks
/// * otherwise: stay out
pub fn decide<R: Rng + ?Sized>(
    compound: Compound,
    profile: StrategyProfile,
    rain_intensity: u8,
    rng: &mut R,
) -> AiDecision {
    let mut decision = AiDecision::Stay;

    if rain_intensity > RAIN_PIT_FOR_WETS
        && compound.is_dry()
        && rng.gen_bool(profile.p_pit_for_wets())
    {
        decision = AiDecision::PitForWets;
    }

    if rain_intensity < RAIN_PIT_FOR_SLICKS && !compound.is_dry() {
        decision = AiDecision::PitForSlicks;
    }

    decision
}

/// chatter returns true if an AI driver who stays out gets on the radio anyway.
pub fn chatter<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(P_STAY_OUT_CHATTER)
}

const AGGRESSIVE_STAY: [&str; 4] = [
    "Negative. Staying out!",
    "No, we stay out, push!",
    "We can survive on these.",
    "Hold position, staying out.",
];
const CONSERVATIVE_STAY: [&str; 4] = [
    "Negative, staying out for now.",
    "We stay out, tyres feel okay.",
    "Holding track position. Staying out.",
    "Copy, staying out.",
];
const WET_CALL: [&str; 4] = [
    "Track is wet, box for wets!",
    "It's coming down hard, wets now!",
    "Grip is gone. We need wets.",
    "This is wet, box for wets.",
];
const SLICK_CALL: [&str; 4] = [
    "Track is drying, box for slicks!",
    "We need slicks now.",
    "Dry line is here, slicks.",
    "Going back to slicks.",
];

/// radio_line picks a random radio message that fits the decision and the driver's profile.
pub fn radio_line<R: Rng + ?Sized>(
    profile: StrategyProfile,
    decision: AiDecision,
    rng: &mut R,
) -> &'static str {
    let pool: &[&'static str] = match (decision, profile) {
        (AiDecision::PitForWets, _) => &WET_CALL,
        (AiDecision::PitForSlicks, _) => &SLICK_CALL,
        (AiDecision::Stay, StrategyProfile::Aggressive) => &AGGRESSIVE_STAY,
        (AiDecision::Stay, StrategyProfile::Conservative) => &CONSERVATIVE_STAY,
    };

    pool.choose(rng).copied().unwrap_or("Copy.")
}
