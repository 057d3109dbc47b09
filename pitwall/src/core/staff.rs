use helpers::general::clamp_finite;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Skill below which staff members are prone to critical errors.
pub const ERROR_PRONE_SKILL: f64 = 40.0;
/// (s) Penalty range of an engineer's critical error.
pub const ENGINEER_PENALTY_RANGE: [f64; 2] = [1.5, 6.0];
/// (s) Penalty range of a pit crew's critical error.
pub const PIT_CREW_PENALTY_RANGE: [f64; 2] = [2.0, 10.0];
/// Probability of a cross-threaded wheel nut during a pit stop of an error-prone crew.
pub const P_CROSS_THREADED_NUT: f64 = 0.05;
/// (s) Time loss due to a cross-threaded wheel nut.
pub const T_CROSS_THREADED_NUT: f64 = 10.0;

/// * `id` - Unique staff id (unique across engineers and pit crews)
/// * `name` - Name of the engineer
/// * `skill` - Skill level in the range [1, 100]
/// * `cost` - One-off hiring cost
/// * `salary` - Salary per season (informational, the budget is charged with the cost only)
/// * `wear_reduction` - Factor applied to the tire wear (< 1.0 reduces wear)
/// * `risk_factor` - Probability of a critical error per lap (only relevant for low skill)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Engineer {
    pub id: u32,
    pub name: String,
    pub skill: f64,
    pub cost: u64,
    #[serde(default)]
    pub salary: u64,
    pub wear_reduction: f64,
    pub risk_factor: f64,
}

/// * `id` - Unique staff id (unique across engineers and pit crews)
/// * `name` - Name of the pit crew
/// * `skill` - Skill level in the range [1, 100]
/// * `cost` - One-off hiring cost
/// * `pit_time` - (s) Pit stop duration, derived from the skill if not set
/// * `failure_chance` - Probability of a critical error per pit stop (only relevant for low skill)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PitCrew {
    pub id: u32,
    pub name: String,
    pub skill: f64,
    pub cost: u64,
    #[serde(default)]
    pub pit_time: Option<f64>,
    pub failure_chance: f64,
}

/// StaffMarket is the catalogue of engineers and pit crews that can be hired.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StaffMarket {
    pub engineers: Vec<Engineer>,
    pub pit_crews: Vec<PitCrew>,
}

impl Default for StaffMarket {
    fn default() -> Self {
        StaffMarket {
            engineers: vec![
                Engineer {
                    id: 1,
                    name: "Guillaume 'The Brain' Rossi".to_owned(),
                    skill: 95.0,
                    cost: 2_000_000,
                    salary: 500_000,
                    wear_reduction: 0.7,
                    risk_factor: 0.02,
                },
                Engineer {
                    id: 2,
                    name: "Sarah Jenkins".to_owned(),
                    skill: 65.0,
                    cost: 800_000,
                    salary: 150_000,
                    wear_reduction: 0.9,
                    risk_factor: 0.05,
                },
                Engineer {
                    id: 3,
                    name: "Newbie Nick".to_owned(),
                    skill: 30.0,
                    cost: 100_000,
                    salary: 40_000,
                    wear_reduction: 1.1,
                    risk_factor: 0.15,
                },
            ],
            pit_crews: vec![
                PitCrew {
                    id: 4,
                    name: "Elite Crew Alpha".to_owned(),
                    skill: 98.0,
                    cost: 1_500_000,
                    pit_time: Some(2.1),
                    failure_chance: 0.01,
                },
                PitCrew {
                    id: 5,
                    name: "Standard Crew B".to_owned(),
                    skill: 55.0,
                    cost: 500_000,
                    pit_time: Some(3.2),
                    failure_chance: 0.08,
                },
                PitCrew {
                    id: 6,
                    name: "Local Mechanics".to_owned(),
                    skill: 20.0,
                    cost: 50_000,
                    pit_time: Some(5.5),
                    failure_chance: 0.25,
                },
            ],
        }
    }
}

impl StaffMarket {
    pub fn find_engineer(&self, id: u32) -> Option<&Engineer> {
        self.engineers.iter().find(|e| e.id == id)
    }

    pub fn find_pit_crew(&self, id: u32) -> Option<&PitCrew> {
        self.pit_crews.iter().find(|c| c.id == id)
    }
}

/// StaffSelection contains the staff that is currently hired by a team. It is handed to the race
/// engine, which only ever reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffSelection {
    pub engineer: Option<Engineer>,
    pub pit_crew: Option<PitCrew>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StaffError {
    #[error("No engineer with id {0} on the staff market")]
    UnknownEngineer(u32),
    #[error("No pit crew with id {0} on the staff market")]
    UnknownPitCrew(u32),
    #[error("Hiring {name} costs {cost}, but the remaining budget is only {budget}")]
    InsufficientBudget { name: String, cost: u64, budget: u64 },
}

/// Team keeps the budget bookkeeping for hiring staff from the market.
#[derive(Debug, Clone)]
pub struct Team {
    pub budget: u64,
    market: StaffMarket,
    selection: StaffSelection,
}

impl Team {
    pub fn new(budget: u64, market: StaffMarket) -> Team {
        Team {
            budget,
            market,
            selection: StaffSelection::default(),
        }
    }

    pub fn market(&self) -> &StaffMarket {
        &self.market
    }

    pub fn selection(&self) -> &StaffSelection {
        &self.selection
    }

    /// hire_engineer hires the engineer with the inserted id and charges the budget. Hiring the
    /// engineer that is already under contract is free.
    pub fn hire_engineer(&mut self, id: u32) -> Result<(), StaffError> {
        let engineer = self
            .market
            .find_engineer(id)
            .ok_or(StaffError::UnknownEngineer(id))?
            .to_owned();

        let already_hired = matches!(&self.selection.engineer, Some(e) if e.id == id);

        if !already_hired {
            self.charge(&engineer.name, engineer.cost)?;
            self.selection.engineer = Some(engineer);
        }

        Ok(())
    }

    /// hire_pit_crew hires the pit crew with the inserted id and charges the budget. Hiring the
    /// crew that is already under contract is free.
    pub fn hire_pit_crew(&mut self, id: u32) -> Result<(), StaffError> {
        let pit_crew = self
            .market
            .find_pit_crew(id)
            .ok_or(StaffError::UnknownPitCrew(id))?
            .to_owned();

        let already_hired = matches!(&self.selection.pit_crew, Some(c) if c.id == id);

        if !already_hired {
            self.charge(&pit_crew.name, pit_crew.cost)?;
            self.selection.pit_crew = Some(pit_crew);
        }

        Ok(())
    }

    fn charge(&mut self, name: &str, cost: u64) -> Result<(), StaffError> {
        if self.budget < cost {
            return Err(StaffError::InsufficientBudget {
                name: name.to_owned(),
                cost,
                budget: self.budget,
            });
        }
        self.budget -= cost;
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// MODIFIERS ---------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

/// pit_stop_duration returns the standstill time of a pit stop. An explicit pit time of the crew
/// is clamped to [1.8, 8.0]s, otherwise it is derived from the crew's skill. Without a crew the
/// lowest skill is assumed.
pub fn pit_stop_duration(pit_crew: Option<&PitCrew>) -> f64 {
    if let Some(pit_time) = pit_crew.and_then(|c| c.pit_time) {
        return clamp_finite(pit_time, 1.8, 8.0, 8.0);
    }

    let skill = clamp_finite(pit_crew.map_or(1.0, |c| c.skill), 1.0, 100.0, 1.0);
    clamp_finite(4.5 - skill * 0.022, 2.0, 4.5, 4.5)
}

/// wear_multiplier returns the factor that is applied to the tire wear. Skilled engineers reduce
/// the wear by up to 20%, their individual wear reduction is applied on top. Without an engineer
/// the wear is not modified.
pub fn wear_multiplier(engineer: Option<&Engineer>) -> f64 {
    match engineer {
        None => 1.0,
        Some(e) => {
            let skill = clamp_finite(e.skill, 1.0, 100.0, 1.0);
            let skill_multiplier = 1.0 - skill / 100.0 * 0.2;
            let wear_reduction = clamp_finite(e.wear_reduction, 0.6, 1.4, 1.0);
            clamp_finite(skill_multiplier * wear_reduction, 0.5, 1.5, 1.0)
        }
    }
}

/// pace_bonus returns the lap time gain (s) that an engineer achieves by setting up the car.
pub fn pace_bonus(engineer: Option<&Engineer>) -> f64 {
    engineer.map_or(0.0, |e| clamp_finite(e.skill, 0.0, 100.0, 0.0) / 100.0 * 2.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalError {
    pub label: String,
    pub penalty: f64,
}

/// critical_error_roll performs a Bernoulli trial against the inserted risk factor. On success,
/// a penalty is sampled uniformly from penalty_range.
pub fn critical_error_roll<R: Rng + ?Sized>(
    label: &str,
    risk_factor: f64,
    penalty_range: [f64; 2],
    rng: &mut R,
) -> Option<CriticalError> {
    let risk = clamp_finite(risk_factor, 0.0, 1.0, 0.0);

    if !rng.gen_bool(risk) {
        return None;
    }

    let [t_min, t_max] = penalty_range;
    let penalty = t_min + rng.gen::<f64>() * (t_max - t_min);

    Some(CriticalError {
        label: label.to_owned(),
        penalty: clamp_finite(penalty, t_min, t_max, t_min),
    })
}

/// is_error_prone returns true if a staff member with the inserted skill makes critical errors.
pub fn is_error_prone(skill: f64) -> bool {
    skill < ERROR_PRONE_SKILL
}
