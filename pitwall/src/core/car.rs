use crate::core::race::RacePars;
use crate::core::staff::{
    critical_error_roll, is_error_prone, pace_bonus, pit_stop_duration, wear_multiplier,
    CriticalError, StaffSelection, ENGINEER_PENALTY_RANGE, PIT_CREW_PENALTY_RANGE,
    P_CROSS_THREADED_NUT, T_CROSS_THREADED_NUT,
};
use crate::core::strategy::StrategyProfile;
use crate::core::tireset::{Compound, TirePars, Tireset};
use crate::core::weather::Weather;
use helpers::general::{clamp_finite, clamp_percent};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FULL_FUEL: f64 = 100.0;
/// Tire health below which the driver complains about the tires.
pub const TIRE_CRITICAL_HEALTH: f64 = 20.0;
/// (s) Time loss of a lap in which a tire fails.
pub const T_PUNCTURE: f64 = 60.0;

/// PitPolicy determines whether a car pits on its own. With the manual policy, a car only pits if
/// a pit stop was requested explicitly.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PitPolicy {
    Manual,
    Threshold { tire_health: f64, fuel: f64 },
}

impl Default for PitPolicy {
    fn default() -> Self {
        PitPolicy::Threshold {
            tire_health: 25.0,
            fuel: 20.0,
        }
    }
}

impl PitPolicy {
    pub fn wants_pit(&self, tire_health: f64, fuel: f64) -> bool {
        match *self {
            PitPolicy::Manual => false,
            PitPolicy::Threshold {
                tire_health: health_min,
                fuel: fuel_min,
            } => tire_health <= health_min || fuel <= fuel_min,
        }
    }
}

/// * `car_no` - Car number, unique within a race
/// * `name` - Driver name
/// * `team` - Team that operates the car
/// * `color` - Hex-code of the team color (used for presentation)
/// * `t_car` - (s) Time loss per lap due to car and driver abilities (negative values are faster)
/// * `strategy` - Strategy profile (only relevant for AI drivers)
/// * `compound` - Compound mounted at the race start
/// * `pit_policy` - Policy that determines whether the car pits on its own
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CarPars {
    pub car_no: u32,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub t_car: f64,
    #[serde(default)]
    pub strategy: StrategyProfile,
    #[serde(default = "default_compound")]
    pub compound: String,
    #[serde(default)]
    pub pit_policy: PitPolicy,
}

fn default_color() -> String {
    "#39ff14".to_owned()
}

fn default_compound() -> String {
    "Medium".to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnfReason {
    OutOfFuel,
    Puncture,
    MechanicalFailure,
}

impl fmt::Display for DnfReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DnfReason::OutOfFuel => write!(f, "Out of fuel"),
            DnfReason::Puncture => write!(f, "Puncture"),
            DnfReason::MechanicalFailure => write!(f, "Mechanical failure"),
        }
    }
}

/// Possible car states:
/// * `Racing` -> car completes a lap per tick
/// * `Pitting` -> car is serviced and rejoins after the remaining service time (s) has elapsed
/// * `Finished` -> terminal
/// * `Dnf` -> terminal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarStatus {
    Racing,
    Pitting { remaining: f64 },
    Finished,
    Dnf(DnfReason),
}

impl CarStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CarStatus::Finished | CarStatus::Dnf(_))
    }

    pub fn is_dnf(&self) -> bool {
        matches!(self, CarStatus::Dnf(_))
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CarStatus::Racing => write!(f, "Racing"),
            CarStatus::Pitting { .. } => write!(f, "Pitting"),
            CarStatus::Finished => write!(f, "Finished"),
            CarStatus::Dnf(reason) => write!(f, "DNF ({})", reason),
        }
    }
}

/// LapEvent contains everything noteworthy that happened to a car within a lap.
#[derive(Debug, Clone, PartialEq)]
pub enum LapEvent {
    Puncture,
    TireCritical,
    PitStop { duration: f64, compound: Compound },
    CriticalError(CriticalError),
    CrossThreadedNut,
    Dnf(DnfReason),
}

impl LapEvent {
    /// tag is a short identifier that is used to build deduplication keys.
    pub fn tag(&self) -> &'static str {
        match self {
            LapEvent::Puncture => "puncture",
            LapEvent::TireCritical => "tire-critical",
            LapEvent::PitStop { .. } => "pit-stop",
            LapEvent::CriticalError(_) => "critical-error",
            LapEvent::CrossThreadedNut => "pit-cross-thread",
            LapEvent::Dnf(_) => "dnf",
        }
    }
}

impl fmt::Display for LapEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LapEvent::Puncture => write!(f, "PUNCTURE: Tire failed! +{:.1}s", T_PUNCTURE),
            LapEvent::TireCritical => write!(f, "[Driver]: I'm losing the rear! I need to box!"),
            LapEvent::PitStop { duration, compound } => {
                write!(f, "Box box: {} fitted, stop {:.1}s", compound, duration)
            }
            LapEvent::CriticalError(e) => {
                write!(f, "CRITICAL ERROR ({}) +{:.1}s", e.label, e.penalty)
            }
            LapEvent::CrossThreadedNut => write!(
                f,
                "ERROR: Cross-threaded nut! +{:.0}s penalty.",
                T_CROSS_THREADED_NUT
            ),
            LapEvent::Dnf(reason) => write!(f, "DNF: {}", reason),
        }
    }
}

/// LapConditions contains everything outside of the car that influences a lap.
#[derive(Debug, Clone, Copy)]
pub struct LapConditions<'a> {
    pub weather: Weather,
    pub race_pars: &'a RacePars,
    pub tire_pars: &'a TirePars,
    pub staff: &'a StaffSelection,
}

/// LapOutcome is the result of advancing a car by a lap. lap_time is only set if the car
/// completed the lap.
#[derive(Debug, Clone)]
pub struct LapOutcome {
    pub car: Car,
    pub events: Vec<LapEvent>,
    pub lap_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub car_no: u32,
    pub name: String,
    pub team: String,
    pub color: String,
    pub is_player: bool,
    pub t_car: f64,
    pub strategy: StrategyProfile,
    pub pit_policy: PitPolicy,
    pub tireset: Tireset,
    pub fuel: f64,
    pub total_distance: f64,
    pub total_time: f64,
    pub last_lap_time: f64,
    pub best_lap_time: Option<f64>,
    pub laps_completed: u32,
    pub pit_stops: u32,
    pub wrong_tire_laps: u32,
    pub pit_requested: bool,
    pub status: CarStatus,
}

impl Car {
    pub fn new(car_pars: &CarPars, is_player: bool) -> Car {
        Car {
            car_no: car_pars.car_no,
            name: car_pars.name.to_owned(),
            team: car_pars.team.to_owned(),
            color: car_pars.color.to_owned(),
            is_player,
            t_car: clamp_finite(car_pars.t_car, -30.0, 30.0, 0.0),
            strategy: car_pars.strategy,
            pit_policy: car_pars.pit_policy,
            tireset: Tireset::new(Compound::parse_or_default(&car_pars.compound)),
            fuel: FULL_FUEL,
            total_distance: 0.0,
            total_time: 0.0,
            last_lap_time: 0.0,
            best_lap_time: None,
            laps_completed: 0,
            pit_stops: 0,
            wrong_tire_laps: 0,
            pit_requested: false,
            status: CarStatus::Racing,
        }
    }

    /// mount_compound changes the compound. This is rejected while the car is in the pits or if
    /// its race is over.
    pub fn mount_compound(&mut self, compound: Compound) -> bool {
        if !matches!(self.status, CarStatus::Racing) {
            return false;
        }
        self.tireset.compound = compound;
        true
    }

    /// request_pit_stop sets or clears the pit request for the next lap.
    pub fn request_pit_stop(&mut self, requested: bool) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.pit_requested = requested;
        true
    }

    /// elapse counts down the pit service time and returns true if the car rejoins the race
    /// within the inserted time span.
    pub fn elapse(&mut self, dt: f64) -> bool {
        if let CarStatus::Pitting { remaining } = self.status {
            let remaining = remaining - dt.max(0.0);

            if remaining <= 0.0 {
                self.status = CarStatus::Racing;
                return true;
            }
            self.status = CarStatus::Pitting { remaining };
        }
        false
    }
}

/// advance_lap simulates one lap of the inserted car and returns its new state together with the
/// events of the lap. Cars that are in the pits or whose race is over are returned unchanged
/// (without drawing random numbers). Execution order:
/// 1. Calculate tire wear and fuel consumption.
/// 2. Check whether the car pits in this lap (request or pit policy).
/// 3. Calculate the lap time: base lap time, car abilities, tire degradation, weather mismatch,
/// fuel mass and a random fluctuation.
/// 4. Roll failures: mechanical failure and critical errors of engineer and pit crew.
/// 5. Perform the pit stop (if any): new tires, full tank, standstill time.
/// 6. Check for DNF: out of fuel, puncture, mechanical failure.
/// 7. Commit the lap.
pub fn advance_lap<R: Rng + ?Sized>(
    car: &Car,
    conditions: &LapConditions,
    rng: &mut R,
) -> LapOutcome {
    let mut next = car.clone();
    let mut events = vec![];

    if !matches!(car.status, CarStatus::Racing) {
        return LapOutcome {
            car: next,
            events,
            lap_time: None,
        };
    }

    let race_pars = conditions.race_pars;
    let engineer = conditions.staff.engineer.as_ref();
    let pit_crew = conditions.staff.pit_crew.as_ref();

    // WEAR AND CONSUMPTION ------------------------------------------------------------------------
    let wear = car
        .tireset
        .wear_this_lap(conditions.tire_pars, wear_multiplier(engineer));
    let fuel_burn = clamp_finite(race_pars.fuel_burn_per_lap, 0.0, FULL_FUEL, 0.0);
    let health_pred = car.tireset.health - wear;

    // PIT DECISION --------------------------------------------------------------------------------
    let pit_this_lap =
        car.pit_requested || car.pit_policy.wants_pit(car.tireset.health, car.fuel);

    // LAP TIME ------------------------------------------------------------------------------------
    let t_base = race_pars.t_base();
    let fuel_missing = FULL_FUEL - clamp_percent(car.fuel);
    let t_fluct = race_pars.t_fluctuation.abs();

    let mut lap_time = t_base + car.t_car - pace_bonus(engineer)
        + conditions.tire_pars.t_add_degradation(health_pred)
        + conditions
            .tire_pars
            .t_add_mismatch(car.tireset.compound, conditions.weather)
        - fuel_missing * race_pars.s_fuel;

    if t_fluct > 0.0 {
        lap_time += rng.gen_range(-t_fluct..=t_fluct);
    }

    lap_time = clamp_finite(lap_time, 0.75 * t_base, 1.5 * t_base, t_base);

    // FAILURES ------------------------------------------------------------------------------------
    let mechanical_failure =
        rng.gen_bool(clamp_finite(race_pars.p_mechanical_failure, 0.0, 1.0, 0.0));
    let mut t_penalty = 0.0;

    if let Some(e) = engineer.filter(|e| is_error_prone(e.skill)) {
        let label = format!("{} (Engineer)", e.name);

        if let Some(err) = critical_error_roll(&label, e.risk_factor, ENGINEER_PENALTY_RANGE, rng) {
            t_penalty += err.penalty;
            events.push(LapEvent::CriticalError(err));
        }
    }

    if pit_this_lap {
        if let Some(c) = pit_crew.filter(|c| is_error_prone(c.skill)) {
            if rng.gen_bool(P_CROSS_THREADED_NUT) {
                t_penalty += T_CROSS_THREADED_NUT;
                events.push(LapEvent::CrossThreadedNut);
            }

            let label = format!("{} (Pit Crew)", c.name);

            if let Some(err) =
                critical_error_roll(&label, c.failure_chance, PIT_CREW_PENALTY_RANGE, rng)
            {
                t_penalty += err.penalty;
                events.push(LapEvent::CriticalError(err));
            }
        }
    }

    if health_pred <= 0.0 {
        t_penalty += T_PUNCTURE;
        events.push(LapEvent::Puncture);
    } else if health_pred < TIRE_CRITICAL_HEALTH {
        events.push(LapEvent::TireCritical);
    }

    lap_time += t_penalty;

    // PIT STOP ------------------------------------------------------------------------------------
    let mut tireset = car.tireset.clone();
    tireset.drive_lap(wear);
    let mut fuel = clamp_percent(car.fuel - fuel_burn);

    if pit_this_lap {
        let t_pit = pit_stop_duration(pit_crew);
        lap_time += t_pit;

        tireset = Tireset::new(car.tireset.compound);
        fuel = FULL_FUEL;

        next.pit_stops += 1;
        next.pit_requested = false;
        next.status = CarStatus::Pitting {
            remaining: race_pars.pit_service_delay.max(0.0),
        };
        events.push(LapEvent::PitStop {
            duration: t_pit,
            compound: tireset.compound,
        });
    }

    next.tireset = tireset;
    next.fuel = fuel;

    // DNF CHECK -----------------------------------------------------------------------------------
    let dnf_reason = if next.fuel <= 0.0 {
        Some(DnfReason::OutOfFuel)
    } else if next.tireset.health <= 0.0 {
        Some(DnfReason::Puncture)
    } else if mechanical_failure {
        Some(DnfReason::MechanicalFailure)
    } else {
        None
    };

    if let Some(reason) = dnf_reason {
        next.status = CarStatus::Dnf(reason);
        next.pit_requested = false;
        events.push(LapEvent::Dnf(reason));

        return LapOutcome {
            car: next,
            events,
            lap_time: None,
        };
    }

    // COMMIT --------------------------------------------------------------------------------------
    // the distance covered within a tick scales with the pace of the car
    next.total_distance += race_pars.lap_length * t_base / lap_time;
    next.total_time += lap_time;
    next.last_lap_time = lap_time;
    next.best_lap_time = Some(car.best_lap_time.map_or(lap_time, |t| t.min(lap_time)));
    next.laps_completed += 1;

    if car.tireset.compound.is_wrong_for(conditions.weather) {
        next.wrong_tire_laps += 1;
    }

    LapOutcome {
        car: next,
        events,
        lap_time: Some(lap_time),
    }
}
