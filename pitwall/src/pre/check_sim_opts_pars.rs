use crate::pre::read_sim_pars::SimPars;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use helpers::general::InputValueError;
use std::collections::HashSet;

/// check_sim_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_sim_opts_pars(sim_opts: &SimOpts, sim_pars: &SimPars) -> anyhow::Result<()> {
    // PART 1: SIMULATION OPTIONS
    if sim_opts.no_sim_runs < 1 {
        return Err(InputValueError).context(format!(
            "no_sim_runs must be at least equal to one, but is {}!",
            sim_opts.no_sim_runs
        ));
    }

    if sim_opts.interactive && sim_opts.no_sim_runs != 1 {
        return Err(InputValueError)
            .context("If interactive mode is activated, no_sim_runs must be equal to one!");
    }

    if sim_opts.interactive
        && !(0.1 <= sim_opts.realtime_factor && sim_opts.realtime_factor <= 100.0)
    {
        return Err(InputValueError).context(format!(
            "realtime_factor is {:.3}, which is not within the reasonable range of [0.1, 100.0]!",
            sim_opts.realtime_factor
        ));
    }

    if sim_opts.results_csv.is_some() && sim_opts.no_sim_runs != 1 {
        return Err(InputValueError)
            .context("Results can only be written to a CSV file for a single simulation run!");
    }

    // PART 2: SIMULATION PARAMETERS
    check_sim_pars(sim_pars)
}

/// check_sim_pars checks the simulation parameters on their own. It is also used if a race is
/// created without command line options.
pub fn check_sim_pars(sim_pars: &SimPars) -> anyhow::Result<()> {
    // RACE ----------------------------------------------------------------------------------------
    let race_pars = &sim_pars.race_pars;

    if !(1..=500).contains(&race_pars.tot_no_laps) {
        return Err(InputValueError).context(format!(
            "tot_no_laps is {}, which is not within the reasonable range of [1, 500]!",
            race_pars.tot_no_laps
        ));
    }

    if !(0.1 <= race_pars.tick_interval && race_pars.tick_interval <= 60.0) {
        return Err(InputValueError).context(format!(
            "tick_interval is {:.3}s, which is not within the reasonable range of [0.1, 60.0]s!",
            race_pars.tick_interval
        ));
    }

    if !(0.0 <= race_pars.pit_service_delay && race_pars.pit_service_delay <= 60.0) {
        return Err(InputValueError).context(format!(
            "pit_service_delay is {:.3}s, which is not within the reasonable range of [0.0, 60.0]s!",
            race_pars.pit_service_delay
        ));
    }

    if !(race_pars.lap_length > 0.0 && race_pars.lap_length.is_finite()) {
        return Err(InputValueError).context("lap_length must be positive and finite!");
    }

    if !(10.0 <= race_pars.t_base_lap && race_pars.t_base_lap <= 1000.0) {
        return Err(InputValueError).context(format!(
            "t_base_lap is {:.3}s, which is not within the reasonable range of [10.0, 1000.0]s!",
            race_pars.t_base_lap
        ));
    }

    if !(0.0 <= race_pars.fuel_burn_per_lap && race_pars.fuel_burn_per_lap <= 100.0) {
        return Err(InputValueError)
            .context("fuel_burn_per_lap is not within the required range [0.0, 100.0]!");
    }

    if !(0.0 <= race_pars.s_fuel && race_pars.s_fuel <= 1.0) {
        return Err(InputValueError).context("s_fuel is not within the required range [0.0, 1.0]!");
    }

    if !(0.0 <= race_pars.t_fluctuation && race_pars.t_fluctuation <= 10.0) {
        return Err(InputValueError)
            .context("t_fluctuation is not within the required range [0.0, 10.0]s!");
    }

    if !(0.0 <= race_pars.p_mechanical_failure && race_pars.p_mechanical_failure <= 1.0) {
        return Err(InputValueError)
            .context("p_mechanical_failure is not within the required range [0.0, 1.0]!");
    }

    if race_pars.rain_intensity_start > 100 {
        return Err(InputValueError)
            .context("rain_intensity_start is not within the required range [0, 100]!");
    }

    // TIRES ---------------------------------------------------------------------------------------
    let tire_pars = &sim_pars.tire_pars;

    if [
        tire_pars.wear_soft,
        tire_pars.wear_medium,
        tire_pars.wear_hard,
        tire_pars.wear_inter,
        tire_pars.wear_wet,
    ]
    .iter()
    .any(|&wear| !(0.0..=100.0).contains(&wear))
    {
        return Err(InputValueError)
            .context("A compound wear rate is not within the required range [0.0, 100.0]!");
    }

    if tire_pars
        .health_penalty_tiers
        .windows(2)
        .any(|tiers| tiers[1].0 <= tiers[0].0)
    {
        return Err(InputValueError).context(
            "The health penalty tiers must be sorted by strictly ascending health threshold!",
        );
    }

    // CARS ----------------------------------------------------------------------------------------
    let mut car_nos = HashSet::new();
    car_nos.insert(sim_pars.player.car_no);

    for car_pars in sim_pars.opponents.iter().flatten() {
        if !car_nos.insert(car_pars.car_no) {
            return Err(InputValueError).context(format!(
                "Car number {} is used more than once!",
                car_pars.car_no
            ));
        }
    }

    Ok(())
}
