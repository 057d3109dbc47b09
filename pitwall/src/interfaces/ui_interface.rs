use crate::core::car::{Car, CarStatus};
use crate::core::race::RaceState;
use crate::core::radio::RadioEvent;
use crate::core::standings::StandingsEntry;
use crate::core::tireset::Compound;
use crate::post::race_result::RaceResult;
use helpers::general::wrap_progress;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// from_hex converts a hex color code into a rgb color. Malformed codes result in black.
    pub fn from_hex(hex: &str) -> RgbColor {
        match hex.parse::<css_color_parser::Color>() {
            Ok(color) => RgbColor {
                r: color.r,
                g: color.g,
                b: color.b,
            },
            Err(_) => RgbColor::default(),
        }
    }
}

/// CarSnapshot contains the display data of a car.
/// * `race_prog` - Position on the current lap in the range [0, 100)
#[derive(Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub car_no: u32,
    pub name: String,
    pub team: String,
    pub color: RgbColor,
    pub is_player: bool,
    pub compound: Compound,
    pub tire_health: f64,
    pub fuel: f64,
    pub race_prog: f64,
    pub total_distance: f64,
    pub total_time: f64,
    pub last_lap_time: f64,
    pub best_lap_time: Option<f64>,
    pub laps_completed: u32,
    pub pit_stops: u32,
    pub pit_requested: bool,
    pub status: CarStatus,
}

impl CarSnapshot {
    pub fn new(car: &Car, lap_length: f64) -> CarSnapshot {
        let race_prog = if lap_length > 0.0 {
            wrap_progress(car.total_distance / lap_length * 100.0)
        } else {
            0.0
        };

        CarSnapshot {
            car_no: car.car_no,
            name: car.name.to_owned(),
            team: car.team.to_owned(),
            color: RgbColor::from_hex(&car.color),
            is_player: car.is_player,
            compound: car.tireset.compound,
            tire_health: car.tireset.health,
            fuel: car.fuel,
            race_prog,
            total_distance: car.total_distance,
            total_time: car.total_time,
            last_lap_time: car.last_lap_time,
            best_lap_time: car.best_lap_time,
            laps_completed: car.laps_completed,
            pit_stops: car.pit_stops,
            pit_requested: car.pit_requested,
            status: car.status,
        }
    }
}

/// RaceSnapshot is sent to the presentation layer after every state change of the race.
#[derive(Debug, Clone)]
pub struct RaceSnapshot {
    pub race_state: RaceState,
    pub car_states: Vec<CarSnapshot>,
    pub standings: Vec<StandingsEntry>,
    pub last_alert: Option<RadioEvent>,
    pub radio_feed: Vec<RadioEvent>,
    pub running: bool,
    pub final_result: Option<RaceResult>,
}

impl RaceSnapshot {
    pub fn player(&self) -> Option<&CarSnapshot> {
        self.car_states.iter().find(|car| car.is_player)
    }
}

/// Command contains the inputs a presentation layer can send to a running race.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AdvanceLap,
    SetRunning(bool),
    ToggleRunning,
    SetTireCompound(u32, Compound),
    RequestPitStop(u32, bool),
    TogglePitStop(u32),
    Restart,
    Quit,
}
