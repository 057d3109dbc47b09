use crate::core::car::{Car, CarStatus, DnfReason};
use crate::core::standings::{self, StandingsEntry};
use anyhow::Context;
use std::fmt::{self, Write};
use std::path::Path;

/// CarInfo is used to store the final data of a car for post-processing the results.
#[derive(Debug, Clone, PartialEq)]
pub struct CarInfo {
    pub car_no: u32,
    pub name: String,
    pub team: String,
    pub status: CarStatus,
    pub laps_completed: u32,
    pub pit_stops: u32,
    pub total_time: f64,
    pub best_lap_time: Option<f64>,
}

impl CarInfo {
    pub fn new(car: &Car) -> CarInfo {
        CarInfo {
            car_no: car.car_no,
            name: car.name.to_owned(),
            team: car.team.to_owned(),
            status: car.status,
            laps_completed: car.laps_completed,
            pit_stops: car.pit_stops,
            total_time: car.total_time,
            best_lap_time: car.best_lap_time,
        }
    }
}

/// PlayerSummary contains the race statistics of the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSummary {
    pub position: Option<u32>,
    pub total_time: f64,
    pub best_lap_time: Option<f64>,
    pub laps_completed: u32,
    pub pit_stops: u32,
    pub wrong_tire_laps: u32,
    pub dnf_reason: Option<DnfReason>,
    pub on_podium: bool,
}

impl PlayerSummary {
    pub fn new(player: &Car, standings: &[StandingsEntry]) -> PlayerSummary {
        let dnf_reason = match player.status {
            CarStatus::Dnf(reason) => Some(reason),
            _ => None,
        };

        PlayerSummary {
            position: standings::position_of(standings, player.car_no),
            total_time: player.total_time,
            best_lap_time: player.best_lap_time,
            laps_completed: player.laps_completed,
            pit_stops: player.pit_stops,
            wrong_tire_laps: player.wrong_tire_laps,
            dnf_reason,
            on_podium: standings::podium(standings)
                .iter()
                .any(|entry| entry.car_no == player.car_no),
        }
    }
}

/// RaceResult contains all race information that is required for post-processing the results.
/// Lap and race times are indexed by car (in the order of car_infos) and completed lap, index 0
/// is unused.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub tot_no_laps: u32,
    pub car_infos: Vec<CarInfo>,
    pub laptimes: Vec<Vec<f64>>,
    pub racetimes: Vec<Vec<f64>>,
    pub standings: Vec<StandingsEntry>,
    pub player_summary: PlayerSummary,
}

impl RaceResult {
    /// podium returns the first three classified cars.
    pub fn podium(&self) -> Vec<&CarInfo> {
        standings::podium(&self.standings)
            .iter()
            .filter_map(|entry| self.car_infos.get(entry.car_idx))
            .collect()
    }

    /// format_lap_and_race_times creates the lap and race time tables (one row per lap, one column
    /// per car).
    pub fn format_lap_and_race_times(&self) -> Result<String, fmt::Error> {
        let mut tmp_string_laptime = String::new();
        let mut tmp_string_racetime = String::new();

        for lap in 1..self.tot_no_laps as usize + 1 {
            write!(&mut tmp_string_laptime, "{:3}, ", lap)?;
            write!(&mut tmp_string_racetime, "{:3}, ", lap)?;

            for i in 0..self.car_infos.len() {
                let laptime = self.laptimes[i].get(lap).copied().unwrap_or(0.0);
                let racetime = self.racetimes[i].get(lap).copied().unwrap_or(0.0);

                if i < self.car_infos.len() - 1 {
                    write!(&mut tmp_string_laptime, "{:8.3}s, ", laptime)?;
                    write!(&mut tmp_string_racetime, "{:8.3}s, ", racetime)?;
                } else {
                    writeln!(&mut tmp_string_laptime, "{:8.3}s", laptime)?;
                    writeln!(&mut tmp_string_racetime, "{:8.3}s", racetime)?;
                }
            }
        }

        // create string with car and driver info
        let mut tmp_string_car_info = String::from("lap, ");

        for (i, car_info) in self.car_infos.iter().enumerate() {
            if i < self.car_infos.len() - 1 {
                write!(
                    &mut tmp_string_car_info,
                    "{:3} ({}), ",
                    car_info.car_no, car_info.name
                )?;
            } else {
                write!(
                    &mut tmp_string_car_info,
                    "{:3} ({})",
                    car_info.car_no, car_info.name
                )?;
            }
        }

        let mut content = String::new();
        writeln!(&mut content, "RESULT: Lap times")?;
        writeln!(&mut content, "{}", tmp_string_car_info)?;
        writeln!(&mut content, "{}", tmp_string_laptime)?;
        writeln!(&mut content, "RESULT: Race times")?;
        writeln!(&mut content, "{}", tmp_string_car_info)?;
        write!(&mut content, "{}", tmp_string_racetime)?;
        Ok(content)
    }

    /// format_final_standings creates the classification table including the podium and the
    /// player summary.
    pub fn format_final_standings(&self) -> Result<String, fmt::Error> {
        let mut content = String::new();
        writeln!(&mut content, "RESULT: Final standings")?;

        for entry in self.standings.iter() {
            let car_info = match self.car_infos.get(entry.car_idx) {
                Some(car_info) => car_info,
                None => continue,
            };

            let gap = if !entry.classified {
                format!("{}", car_info.status)
            } else if entry.position == 1 {
                format!("{:.3}s", car_info.total_time)
            } else {
                format!("{:+.3}s", entry.interval_to_leader)
            };

            writeln!(
                &mut content,
                "{:2}. {:3} {:<15} {:<18} {:3} laps, {} stops, {}",
                entry.position,
                car_info.car_no,
                car_info.name,
                car_info.team,
                car_info.laps_completed,
                car_info.pit_stops,
                gap
            )?;
        }

        let podium: Vec<String> = self.podium().iter().map(|c| c.name.to_owned()).collect();
        writeln!(&mut content, "RESULT: Podium: {}", podium.join(", "))?;

        let summary = &self.player_summary;
        write!(
            &mut content,
            "RESULT: Player finished {} after {} laps ({} pit stops, {} laps on wrong tires",
            summary
                .position
                .map_or_else(|| "unclassified".to_owned(), |p| format!("P{}", p)),
            summary.laps_completed,
            summary.pit_stops,
            summary.wrong_tire_laps
        )?;

        if let Some(t_best) = summary.best_lap_time {
            write!(&mut content, ", best lap {:.3}s", t_best)?;
        }

        match summary.dnf_reason {
            Some(reason) => write!(&mut content, ", DNF: {})", reason)?,
            None => write!(&mut content, ")")?,
        }

        Ok(content)
    }

    /// print_lap_and_race_times prints the resulting lap and race times to the console output.
    pub fn print_lap_and_race_times(&self) -> anyhow::Result<()> {
        let content = self
            .format_lap_and_race_times()
            .context("Failed to format lap and race times!")?;
        println!("{}", content);
        Ok(())
    }

    /// print_final_standings prints the classification to the console output.
    pub fn print_final_standings(&self) -> anyhow::Result<()> {
        let content = self
            .format_final_standings()
            .context("Failed to format final standings!")?;
        println!("{}", content);
        Ok(())
    }

    /// write_csv writes lap and race times to a CSV file (one row per car and completed lap).
    pub fn write_csv(&self, filepath: &Path) -> anyhow::Result<()> {
        let mut csv_writer = csv::Writer::from_path(filepath).context(format!(
            "Failed to create results file {}!",
            filepath.display()
        ))?;

        csv_writer.write_record(&["car_no", "name", "lap", "laptime", "racetime"])?;

        for (i, car_info) in self.car_infos.iter().enumerate() {
            for lap in 1..car_info.laps_completed as usize + 1 {
                let (laptime, racetime) = match (self.laptimes[i].get(lap), self.racetimes[i].get(lap))
                {
                    (Some(laptime), Some(racetime)) => (laptime, racetime),
                    _ => break,
                };

                csv_writer.write_record(&[
                    car_info.car_no.to_string(),
                    car_info.name.to_owned(),
                    lap.to_string(),
                    format!("{:.3}", laptime),
                    format!("{:.3}", racetime),
                ])?;
            }
        }

        csv_writer.flush().context(format!(
            "Failed to write results file {}!",
            filepath.display()
        ))?;
        Ok(())
    }
}
