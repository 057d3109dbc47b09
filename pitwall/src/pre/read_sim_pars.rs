use crate::core::car::CarPars;
use crate::core::race::RacePars;
use crate::core::staff::{StaffMarket, Team};
use crate::core::tireset::TirePars;
use anyhow::Context;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::warn;

/// * `budget` - Budget available for hiring staff
/// * `engineer_id` - Staff id of the engineer hired before the race (optional)
/// * `pit_crew_id` - Staff id of the pit crew hired before the race (optional)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TeamPars {
    pub budget: u64,
    pub engineer_id: Option<u32>,
    pub pit_crew_id: Option<u32>,
}

impl Default for TeamPars {
    fn default() -> Self {
        TeamPars {
            budget: 5_000_000,
            engineer_id: None,
            pit_crew_id: None,
        }
    }
}

/// SimPars is used to store all other parameter structs. Every section is optional in the
/// parameter file. If `opponents` is not set, the AI field is generated.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimPars {
    pub race_pars: RacePars,
    pub tire_pars: TirePars,
    pub player: CarPars,
    pub opponents: Option<Vec<CarPars>>,
    pub staff_market: StaffMarket,
    pub team: TeamPars,
}

impl Default for SimPars {
    fn default() -> Self {
        SimPars {
            race_pars: RacePars::default(),
            tire_pars: TirePars::default(),
            player: default_player(),
            opponents: None,
            staff_market: StaffMarket::default(),
            team: TeamPars::default(),
        }
    }
}

fn default_player() -> CarPars {
    CarPars {
        car_no: 1,
        name: "Player".to_owned(),
        team: "Pitwall Racing".to_owned(),
        color: "#39ff14".to_owned(),
        t_car: 0.0,
        strategy: Default::default(),
        compound: "Soft".to_owned(),
        pit_policy: Default::default(),
    }
}

impl SimPars {
    /// hire_team creates the player's team and hires the staff that is set in the team
    /// parameters. Staff that is unknown or too expensive is not hired.
    pub fn hire_team(&self) -> Team {
        let mut team = Team::new(self.team.budget, self.staff_market.to_owned());

        if let Some(id) = self.team.engineer_id {
            if let Err(e) = team.hire_engineer(id) {
                warn!("Engineer not hired: {}", e);
            }
        }

        if let Some(id) = self.team.pit_crew_id {
            if let Err(e) = team.hire_pit_crew(id) {
                warn!("Pit crew not hired: {}", e);
            }
        }

        team
    }
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    // open file
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    // read and parse parameter file content
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(pars)
}
