use crate::core::car::{self, Car, CarPars, CarStatus, LapConditions, LapEvent};
use crate::core::radio::{RadioEvent, RadioFeed};
use crate::core::staff::StaffSelection;
use crate::core::standings::{self, StandingsEntry};
use crate::core::strategy::{self, AiDecision, StrategyProfile};
use crate::core::tireset::{Compound, TirePars};
use crate::core::weather::{self, Weather};
use crate::interfaces::ui_interface::{CarSnapshot, RaceSnapshot};
use crate::post::race_result::{CarInfo, PlayerSummary, RaceResult};
use crate::pre::read_sim_pars::SimPars;
use helpers::general::clamp_finite;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Tire health below which the tires are considered gone (70% wear).
const TIRES_GONE_HEALTH: f64 = 30.0;

/// * `tot_no_laps` - Total number of laps in the race
/// * `tick_interval` - (s) Simulated time between two automatic lap ticks
/// * `pit_service_delay` - (s) Time a car spends in the pits before it rejoins the race
/// * `lap_length` - Distance covered in a lap at base pace (arbitrary unit)
/// * `t_base_lap` - (s) Base lap time
/// * `s_fuel` - (s/%) Time gain per percent of missing fuel
/// * `fuel_burn_per_lap` - (%) Fuel consumption per lap
/// * `t_fluctuation` - (s) Maximum random lap time fluctuation (uniform in +-t_fluctuation)
/// * `p_mechanical_failure` - Probability of a mechanical failure per car and lap
/// * `rain_intensity_start` - Rain intensity in the range [0, 100] at the race start
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RacePars {
    pub tot_no_laps: u32,
    pub tick_interval: f64,
    pub pit_service_delay: f64,
    pub lap_length: f64,
    pub t_base_lap: f64,
    pub s_fuel: f64,
    pub fuel_burn_per_lap: f64,
    pub t_fluctuation: f64,
    pub p_mechanical_failure: f64,
    pub rain_intensity_start: u8,
}

impl Default for RacePars {
    fn default() -> Self {
        RacePars {
            tot_no_laps: 50,
            tick_interval: 3.0,
            pit_service_delay: 5.0,
            lap_length: 100.0,
            t_base_lap: 90.0,
            s_fuel: 0.02,
            fuel_burn_per_lap: 2.2,
            t_fluctuation: 1.0,
            p_mechanical_failure: 0.001,
            rain_intensity_start: 0,
        }
    }
}

impl RacePars {
    /// t_base returns the base lap time restricted to a range that keeps the lap time positive.
    pub fn t_base(&self) -> f64 {
        clamp_finite(self.t_base_lap, 1.0, 1000.0, 90.0)
    }
}

/// RaceState contains the race-wide state.
/// * `lap_number` - Lap that is currently raced (starting at 1)
/// * `rain_intensity` - Rain intensity in the range [0, 100]
/// * `weather` - Weather condition derived from the rain intensity
/// * `race_time_elapsed` - (s) Race time of the player
/// * `is_over` - True as soon as the race is finished, laps are not advanced afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct RaceState {
    pub lap_number: u32,
    pub rain_intensity: u8,
    pub weather: Weather,
    pub race_time_elapsed: f64,
    pub is_over: bool,
}

impl RaceState {
    fn new(rain_intensity: u8) -> RaceState {
        let rain_intensity = rain_intensity.min(100);

        RaceState {
            lap_number: 1,
            rain_intensity,
            weather: weather::condition(rain_intensity),
            race_time_elapsed: 0.0,
            is_over: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observers are notified with a snapshot after every state change of the engine.
pub type Observer = Box<dyn FnMut(&RaceSnapshot)>;

/// Name, team and color of the generated AI opponents.
pub const OPPONENT_SEEDS: [(&str, &str, &str); 10] = [
    ("V. Bottas", "Orion GP", "#00f2ff"),
    ("C. Leclerc", "Crimson Bull", "#ff003c"),
    ("L. Hamilton", "Verdant Racing", "#39ff14"),
    ("M. Verstappen", "Aurora Motorsport", "#a855f7"),
    ("F. Alonso", "Atlas Speedworks", "#fbbf24"),
    ("C. Sainz", "Pulse Performance", "#38bdf8"),
    ("G. Russell", "Silver Arrow", "#e5e7eb"),
    ("L. Norris", "Amber Apex", "#ffaa00"),
    ("O. Piastri", "Vortex Velocity", "#fb7185"),
    ("S. Perez", "Neon Nova", "#84cc16"),
];

/// Probability that a generated opponent follows the aggressive strategy profile.
const P_AGGRESSIVE_OPPONENT: f64 = 0.4;

/// generate_opponents creates the default AI field. Every opponent gets a random base speed in
/// [3, 7) which is converted into a pace offset of 5 - base_speed, i.e. the fastest opponents are
/// two seconds per lap quicker than the base lap time. Car numbers skip the player's number.
pub fn generate_opponents<R: Rng + ?Sized>(player_car_no: u32, rng: &mut R) -> Vec<CarPars> {
    let mut car_no = 0;

    OPPONENT_SEEDS
        .iter()
        .map(|&(name, team, color)| {
            car_no += 1;
            if car_no == player_car_no {
                car_no += 1;
            }

            let base_speed: f64 = rng.gen_range(3.0..7.0);
            let strategy = if rng.gen_bool(P_AGGRESSIVE_OPPONENT) {
                StrategyProfile::Aggressive
            } else {
                StrategyProfile::Conservative
            };

            CarPars {
                car_no,
                name: name.to_owned(),
                team: team.to_owned(),
                color: color.to_owned(),
                t_car: 5.0 - base_speed,
                strategy,
                compound: Compound::Medium.to_string(),
                pit_policy: Default::default(),
            }
        })
        .collect()
}

/// RaceEngine owns the complete race: race state, cars, radio feed and the random source. The
/// player and the AI cars are advanced by the identical lap function.
pub struct RaceEngine {
    race_pars: RacePars,
    tire_pars: TirePars,
    car_pars_all: Vec<CarPars>,
    player_car_no: u32,
    player_staff: StaffSelection,
    ai_staff: StaffSelection,
    state: RaceState,
    cars_list: Vec<Car>,
    radio: RadioFeed,
    standings: Vec<StandingsEntry>,
    laptimes: Vec<Vec<f64>>,
    racetimes: Vec<Vec<f64>>,
    running: bool,
    rng: ChaCha8Rng,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription_id: u64,
}

impl RaceEngine {
    /// new creates a race from the inserted parameters. If the parameters do not contain
    /// opponents, the default AI field is generated from the seeded random source.
    pub fn new(sim_pars: &SimPars, player_staff: StaffSelection, seed: u64) -> RaceEngine {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let player_car_no = sim_pars.player.car_no;

        let opponents = match &sim_pars.opponents {
            Some(opponents) => opponents.to_owned(),
            None => generate_opponents(player_car_no, &mut rng),
        };

        let mut car_pars_all = Vec::with_capacity(opponents.len() + 1);
        car_pars_all.push(sim_pars.player.to_owned());
        car_pars_all.extend(opponents);

        let mut engine = RaceEngine {
            race_pars: sim_pars.race_pars.to_owned(),
            tire_pars: sim_pars.tire_pars.to_owned(),
            car_pars_all,
            player_car_no,
            player_staff,
            ai_staff: StaffSelection::default(),
            state: RaceState::new(sim_pars.race_pars.rain_intensity_start),
            cars_list: vec![],
            radio: RadioFeed::default(),
            standings: vec![],
            laptimes: vec![],
            racetimes: vec![],
            running: false,
            rng,
            observers: vec![],
            next_subscription_id: 0,
        };
        engine.reset_cars();

        info!(
            "Race created with {} cars over {} laps (seed {})",
            engine.cars_list.len(),
            engine.race_pars.tot_no_laps,
            seed
        );

        engine
    }

    fn reset_cars(&mut self) {
        let player_car_no = self.player_car_no;

        self.cars_list = self
            .car_pars_all
            .iter()
            .map(|pars| Car::new(pars, pars.car_no == player_car_no))
            .collect();

        let no_cars = self.cars_list.len();
        let no_laps = self.race_pars.tot_no_laps as usize + 1;
        self.laptimes = vec![vec![0.0; no_laps]; no_cars];
        self.racetimes = vec![vec![0.0; no_laps]; no_cars];
        self.standings = standings::build(&self.cars_list);
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method simulates one lap tick. Execution order:
    /// 1. Forecast rain on the conditions at lap start, then advance the weather.
    /// 2. Let every AI driver decide on its tire strategy.
    /// 3. Advance every car by a lap (player and AI use the same lap function).
    /// 4. Check whether the race is over (lap limit reached or player out of the race).
    /// 5. Update the standings.
    /// 6. Publish radio events and notify the observers.
    pub fn advance_lap(&mut self) {
        if self.state.is_over {
            return;
        }

        let lap = self.state.lap_number;
        let mut radio_msgs: Vec<(String, String)> = vec![];

        // WEATHER ---------------------------------------------------------------------------------
        // the forecast is made on the conditions the lap starts with
        let weather_prev = self.state.weather;

        if !weather_prev.is_wet()
            && weather::forecast_rain_soon(self.state.rain_intensity, &mut self.rng)
        {
            radio_msgs.push((
                format!("rain-soon-{}", lap),
                "[Engineer]: Rain expected soon, check your strategy.".to_owned(),
            ));
        }

        let (rain_intensity, weather) = weather::tick(self.state.rain_intensity, &mut self.rng);
        self.state.rain_intensity = rain_intensity;
        self.state.weather = weather;

        if weather.is_wet() && !weather_prev.is_wet() {
            radio_msgs.push((
                format!("clouds-{}", lap),
                "[Engineer]: Clouds are gathering!".to_owned(),
            ));
        }

        // AI STRATEGY -----------------------------------------------------------------------------
        for car in self.cars_list.iter_mut() {
            if car.is_player || !matches!(car.status, CarStatus::Racing) {
                continue;
            }

            let decision = strategy::decide(
                car.tireset.compound,
                car.strategy,
                rain_intensity,
                &mut self.rng,
            );

            if let Some(compound) = decision.new_compound() {
                car.mount_compound(compound);
                car.request_pit_stop(true);
            } else if !strategy::chatter(&mut self.rng) {
                continue;
            }

            let line = strategy::radio_line(car.strategy, decision, &mut self.rng);
            radio_msgs.push((
                format!("ai-radio-{}-{}-{}", lap, car.name, decision.tag()),
                format!("{}: {}", car.name, line),
            ));

            if decision != AiDecision::Stay {
                debug!(
                    "Lap {}: {} decided {} (rain intensity {})",
                    lap,
                    car.name,
                    decision.tag(),
                    rain_intensity
                );
            }
        }

        // LAPS ------------------------------------------------------------------------------------
        for i in 0..self.cars_list.len() {
            let is_player = self.cars_list[i].is_player;
            let conditions = LapConditions {
                weather,
                race_pars: &self.race_pars,
                tire_pars: &self.tire_pars,
                staff: if is_player {
                    &self.player_staff
                } else {
                    &self.ai_staff
                },
            };

            let health_prev = self.cars_list[i].tireset.health;
            let outcome = car::advance_lap(&self.cars_list[i], &conditions, &mut self.rng);
            let car = outcome.car;

            if let Some(lap_time) = outcome.lap_time {
                let compl_lap = car.laps_completed as usize;

                if compl_lap < self.laptimes[i].len() {
                    self.laptimes[i][compl_lap] = lap_time;
                    self.racetimes[i][compl_lap] = car.total_time;
                }
            }

            for event in outcome.events.iter() {
                if let LapEvent::Dnf(reason) = event {
                    info!("Lap {}: {} is out of the race ({})", lap, car.name, reason);
                }

                if is_player {
                    radio_msgs.push((event_key(event, lap, car.car_no), event.to_string()));
                } else if let LapEvent::Dnf(reason) = event {
                    radio_msgs.push((
                        event_key(event, lap, car.car_no),
                        format!("{}: DNF ({})", car.name, reason),
                    ));
                }
            }

            if is_player
                && health_prev >= TIRES_GONE_HEALTH
                && car.tireset.health < TIRES_GONE_HEALTH
                && !car.status.is_dnf()
            {
                radio_msgs.push((
                    format!("tires-gone-{}-{}", lap, car.car_no),
                    "[Engineer]: Tires are gone, 70% wear!".to_owned(),
                ));
            }

            self.cars_list[i] = car;
        }

        if let Some(t_player) = self.player().map(|car| car.total_time) {
            self.state.race_time_elapsed = t_player;
        }

        // RACE END --------------------------------------------------------------------------------
        let player_out = self.player().map_or(false, |car| car.status.is_dnf());

        if lap >= self.race_pars.tot_no_laps || player_out {
            self.finish_race();
        } else {
            self.state.lap_number += 1;
        }

        // STANDINGS AND RADIO ---------------------------------------------------------------------
        self.standings = standings::build(&self.cars_list);

        for (key, message) in radio_msgs {
            self.push_radio(key, lap, message);
        }

        debug!(
            "Lap {} done: weather {}, rain intensity {}, leader car {}",
            lap,
            self.state.weather,
            self.state.rain_intensity,
            self.standings.first().map_or(0, |entry| entry.car_no)
        );

        self.notify();
    }

    fn finish_race(&mut self) {
        self.state.is_over = true;
        self.running = false;

        for car in self.cars_list.iter_mut() {
            if !car.status.is_terminal() {
                car.status = CarStatus::Finished;
            }
        }

        info!(
            "Race over after lap {} (race time {:.3}s)",
            self.state.lap_number, self.state.race_time_elapsed
        );
    }

    fn push_radio(&mut self, key: String, lap_number: u32, message: String) {
        self.radio.push(RadioEvent {
            key,
            lap_number,
            message,
            timestamp: self.state.race_time_elapsed,
        });
    }

    // ---------------------------------------------------------------------------------------------
    // INPUTS --------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// elapse counts down the pit service time of all cars in the pits. Cars whose service time
    /// has elapsed rejoin the race.
    pub fn elapse(&mut self, dt: f64) {
        let dt = clamp_finite(dt, 0.0, f64::MAX, 0.0);
        let mut released = vec![];

        for car in self.cars_list.iter_mut() {
            if car.elapse(dt) {
                debug!("{} left the pits", car.name);
                if car.is_player {
                    released.push(car.car_no);
                }
            }
        }

        if released.is_empty() {
            return;
        }

        let lap = self.state.lap_number;

        for car_no in released {
            self.push_radio(
                format!("pit-exit-{}-{}", lap, car_no),
                lap,
                "[Engineer]: Out of the pits, push now!".to_owned(),
            );
        }

        self.notify();
    }

    /// set_tire_compound changes the compound of a car. It returns false if the car is unknown,
    /// in the pits or out of the race.
    pub fn set_tire_compound(&mut self, car_no: u32, compound: Compound) -> bool {
        let accepted = match self.car_mut(car_no) {
            Some(car) => car.mount_compound(compound),
            None => false,
        };

        if accepted {
            debug!("Car {} switched to {}", car_no, compound);
            self.notify();
        } else {
            warn!("Rejected compound change of car {} to {}", car_no, compound);
        }

        accepted
    }

    /// request_pit_stop sets or clears the pit request of a car. It returns false if the car is
    /// unknown or out of the race.
    pub fn request_pit_stop(&mut self, car_no: u32, requested: bool) -> bool {
        let accepted = match self.car_mut(car_no) {
            Some(car) => car.request_pit_stop(requested),
            None => false,
        };

        if accepted {
            self.notify();
        } else {
            warn!("Rejected pit request of car {}", car_no);
        }

        accepted
    }

    /// toggle_pit_stop inverts the pit request of a car.
    pub fn toggle_pit_stop(&mut self, car_no: u32) -> bool {
        match self.car(car_no).map(|car| car.pit_requested) {
            Some(requested) => self.request_pit_stop(car_no, !requested),
            None => {
                warn!("Rejected pit request of unknown car {}", car_no);
                false
            }
        }
    }

    /// restart resets race state, cars and radio feed. Pending pit services are discarded. The
    /// random source is not reseeded, i.e. the next race differs from the previous one.
    pub fn restart(&mut self) {
        self.state = RaceState::new(self.race_pars.rain_intensity_start);
        self.radio.clear();
        self.running = false;
        self.reset_cars();

        info!("Race restarted");
        self.notify();
    }

    /// set_player_staff replaces the staff that works for the player's car.
    pub fn set_player_staff(&mut self, selection: StaffSelection) {
        self.player_staff = selection;
        self.notify();
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running && !self.state.is_over;
        self.notify();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ---------------------------------------------------------------------------------------------
    // OBSERVERS -----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// unsubscribe removes an observer and returns false if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let no_observers = self.observers.len();
        self.observers.retain(|(sub_id, _)| *sub_id != id);
        self.observers.len() != no_observers
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }

        let snapshot = self.snapshot();

        for (_, observer) in self.observers.iter_mut() {
            observer(&snapshot);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (GETTERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars_list
    }

    pub fn car(&self, car_no: u32) -> Option<&Car> {
        self.cars_list.iter().find(|car| car.car_no == car_no)
    }

    fn car_mut(&mut self, car_no: u32) -> Option<&mut Car> {
        self.cars_list.iter_mut().find(|car| car.car_no == car_no)
    }

    pub fn player(&self) -> Option<&Car> {
        self.car(self.player_car_no)
    }

    pub fn player_car_no(&self) -> u32 {
        self.player_car_no
    }

    pub fn standings(&self) -> &[StandingsEntry] {
        &self.standings
    }

    pub fn radio(&self) -> &RadioFeed {
        &self.radio
    }

    pub fn race_pars(&self) -> &RacePars {
        &self.race_pars
    }

    /// snapshot returns a copy of everything a presentation layer needs to display the race.
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            race_state: self.state.to_owned(),
            car_states: self
                .cars_list
                .iter()
                .map(|car| CarSnapshot::new(car, self.race_pars.lap_length))
                .collect(),
            standings: self.standings.to_owned(),
            last_alert: self.radio.last_alert().cloned(),
            radio_feed: self.radio.events(),
            running: self.running,
            final_result: if self.state.is_over {
                Some(self.race_result())
            } else {
                None
            },
        }
    }

    /// race_result returns a race result struct of the race.
    pub fn race_result(&self) -> RaceResult {
        let player_summary = self
            .player()
            .map(|player| PlayerSummary::new(player, &self.standings))
            .unwrap_or_default();

        RaceResult {
            tot_no_laps: self.race_pars.tot_no_laps,
            car_infos: self.cars_list.iter().map(CarInfo::new).collect(),
            laptimes: self.laptimes.to_owned(),
            racetimes: self.racetimes.to_owned(),
            standings: self.standings.to_owned(),
            player_summary,
        }
    }
}

/// event_key builds the radio deduplication key of a lap event.
fn event_key(event: &LapEvent, lap: u32, car_no: u32) -> String {
    match event {
        LapEvent::Dnf(_) => format!("{}-{}", event.tag(), car_no),
        LapEvent::CriticalError(e) => format!("{}-{}-{}-{}", event.tag(), lap, car_no, e.label),
        _ => format!("{}-{}-{}", event.tag(), lap, car_no),
    }
}
