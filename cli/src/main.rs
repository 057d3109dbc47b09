use anyhow::{anyhow, bail, Context};
use clap::Parser;
use pitwall::core::handle_race::handle_race;
use pitwall::core::race::OPPONENT_SEEDS;
use pitwall::core::tireset::Compound;
use pitwall::interfaces::ui_interface::{Command, RaceSnapshot};
use pitwall::post::race_result::RaceResult;
use pitwall::pre::check_sim_opts_pars::check_sim_opts_pars;
use pitwall::pre::read_sim_pars::{read_sim_pars, SimPars};
use pitwall::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::cmp::min;
use std::collections::HashSet;
use std::io::{self, BufRead};
use std::thread;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// set maximum number of concurrently running jobs in case of running more than a single simulation
const MAX_NO_CONCURRENT_JOBS: u32 = 200;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments and read simulation parameters
    let sim_opts: SimOpts = SimOpts::parse();

    let log_level = match sim_opts.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pitwall={0},pitwall_cli={0}", log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let sim_pars = match &sim_opts.parfile_path {
        Some(parfile_path) => read_sim_pars(parfile_path.as_path())?,
        None => {
            println!("INFO: No parameter file set, using the default parameters");
            SimPars::default()
        }
    };

    // check simulation options and parameters
    check_sim_opts_pars(&sim_opts, &sim_pars)?;

    // create vector for the race result and simulate race(s)
    let mut race_results: Vec<RaceResult> = Vec::with_capacity(sim_opts.no_sim_runs as usize);

    // print race details
    println!(
        "INFO: Simulating {} laps with {} cars (seed {})",
        sim_pars.race_pars.tot_no_laps,
        sim_pars
            .opponents
            .as_ref()
            .map_or(OPPONENT_SEEDS.len(), |opponents| opponents.len())
            + 1,
        sim_opts.seed
    );

    // EXECUTION -----------------------------------------------------------------------------------
    if !sim_opts.interactive {
        // HEADLESS CASE ---------------------------------------------------------------------------
        let t_start = Instant::now();

        if sim_opts.no_sim_runs == 1 {
            // SINGLE THREAD -----------------------------------------------------------------------
            race_results.push(handle_race(
                &sim_pars,
                sim_opts.seed,
                sim_opts.debug,
                None,
                None,
                1.0,
            )?);
        } else {
            // MULTIPLE THREADS --------------------------------------------------------------------
            let mut no_races_done = 0;

            while no_races_done < sim_opts.no_sim_runs {
                // calculate number of simulation runs to execute in current loop
                let tmp_no_sim_runs = min(sim_opts.no_sim_runs - no_races_done, MAX_NO_CONCURRENT_JOBS);

                // simulate the races and save the results
                let tmp_results: anyhow::Result<Vec<RaceResult>> = (no_races_done
                    ..no_races_done + tmp_no_sim_runs)
                    .into_par_iter()
                    .map(|i| {
                        handle_race(
                            &sim_pars,
                            sim_opts.seed.wrapping_add(u64::from(i)),
                            false,
                            None,
                            None,
                            1.0,
                        )
                    })
                    .collect();
                race_results.par_extend(tmp_results?);

                no_races_done += tmp_no_sim_runs;
            }
        }

        println!(
            "INFO: Execution time (total): {}ms",
            t_start.elapsed().as_millis()
        );
    } else {
        // INTERACTIVE CASE ------------------------------------------------------------------------
        race_results.push(run_interactive(&sim_opts, &sim_pars)?);
    }

    // POST-PROCESSING -----------------------------------------------------------------------------
    if race_results.len() == 1 {
        race_results[0].print_lap_and_race_times()?;
        race_results[0].print_final_standings()?;

        if let Some(results_csv) = &sim_opts.results_csv {
            race_results[0].write_csv(results_csv.as_path())?;
            println!("INFO: Lap and race times written to {}", results_csv.display());
        }
    } else {
        print_monte_carlo_summary(&race_results);
    }

    Ok(())
}

/// print_monte_carlo_summary prints the aggregated player statistics of several simulation runs.
fn print_monte_carlo_summary(race_results: &[RaceResult]) {
    let no_runs = race_results.len() as f64;
    let summaries = race_results.iter().map(|result| &result.player_summary);

    let positions: Vec<u32> = summaries.clone().filter_map(|s| s.position).collect();
    let avg_position = positions.iter().sum::<u32>() as f64 / positions.len().max(1) as f64;
    let no_podiums = summaries.clone().filter(|s| s.on_podium).count();
    let no_dnfs = summaries.clone().filter(|s| s.dnf_reason.is_some()).count();
    let avg_pit_stops = summaries.map(|s| s.pit_stops).sum::<u32>() as f64 / no_runs;

    println!("RESULT: Player statistics over {} runs", race_results.len());
    println!("average position: {:.2}", avg_position);
    println!("podium rate:      {:.1}%", no_podiums as f64 / no_runs * 100.0);
    println!("DNF rate:         {:.1}%", no_dnfs as f64 / no_runs * 100.0);
    println!("average stops:    {:.2}", avg_pit_stops);
}

/// run_interactive simulates the race in real-time in a separate thread. The race is controlled
/// by commands read from stdin, snapshots are printed by a third thread.
fn run_interactive(sim_opts: &SimOpts, sim_pars: &SimPars) -> anyhow::Result<RaceResult> {
    // create channels for communication between the console and the race
    let (tx_snapshot, rx_snapshot) = flume::unbounded::<RaceSnapshot>();
    let (tx_command, rx_command) = flume::unbounded::<Command>();

    // sim_pars gets moved into the thread and must therefore be copied
    let sim_pars_thread = sim_pars.clone();
    let seed = sim_opts.seed;
    let realtime_factor = sim_opts.realtime_factor;

    let race_thread = thread::spawn(move || {
        handle_race(
            &sim_pars_thread,
            seed,
            false,
            Some(&tx_snapshot),
            Some(&rx_command),
            realtime_factor,
        )
    });
    let print_thread = thread::spawn(move || print_snapshots(rx_snapshot));

    print_help();
    let player_car_no = sim_pars.player.car_no;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read command from stdin!")?;

        let command = match parse_command(&line, player_car_no) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("WARNING: {}", e);
                continue;
            }
        };

        let quit = command == Command::Quit;

        // the race thread is gone if sending fails, its result is evaluated below
        if tx_command.send(command).is_err() || quit {
            break;
        }
    }

    // dropping the sender stops the race thread if stdin was closed
    drop(tx_command);

    let race_result = race_thread
        .join()
        .map_err(|_| anyhow!("Race thread panicked!"))??;
    print_thread
        .join()
        .map_err(|_| anyhow!("Print thread panicked!"))?;

    info!("Interactive session finished");
    Ok(race_result)
}

fn print_help() {
    println!("INFO: Commands:");
    println!("  go | pause | p       start, pause or toggle the automatic lap ticks");
    println!("  n                    advance a single lap");
    println!("  tire <compound>      mount soft, medium, hard, inter or wet");
    println!("  box                  request or cancel a pit stop for the next lap");
    println!("  restart              restart the race");
    println!("  quit                 stop the simulation and print the results");
}

/// parse_command converts a console line into a race command. Empty lines and help requests
/// result in None.
fn parse_command(line: &str, player_car_no: u32) -> anyhow::Result<Option<Command>> {
    let mut parts = line.split_whitespace();

    let keyword = match parts.next() {
        Some(keyword) => keyword.to_lowercase(),
        None => return Ok(None),
    };

    let command = match keyword.as_str() {
        "go" | "start" => Command::SetRunning(true),
        "pause" | "stop" => Command::SetRunning(false),
        "p" | "toggle" => Command::ToggleRunning,
        "n" | "next" | "lap" => Command::AdvanceLap,
        "t" | "tire" | "tyre" => {
            let name = parts
                .next()
                .ok_or_else(|| anyhow!("Missing compound, e.g. 'tire soft'"))?;
            Command::SetTireCompound(player_car_no, name.parse::<Compound>()?)
        }
        "b" | "box" => Command::TogglePitStop(player_car_no),
        "r" | "restart" => Command::Restart,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" => {
            print_help();
            return Ok(None);
        }
        other => bail!("Unknown command '{}', type 'help' for a list", other),
    };

    Ok(Some(command))
}

/// print_snapshots prints lap progress and new radio messages until the race thread hangs up.
fn print_snapshots(rx: flume::Receiver<RaceSnapshot>) {
    let mut lap_printed = 0;
    let mut keys_printed: HashSet<String> = HashSet::new();
    let mut over_printed = false;

    for snapshot in rx.iter() {
        let state = &snapshot.race_state;

        // the lap number only decreases if the race was restarted
        if state.lap_number < lap_printed {
            lap_printed = 0;
            keys_printed.clear();
            over_printed = false;
        }

        // radio keys are unique within a race
        for event in snapshot.radio_feed.iter() {
            if keys_printed.insert(event.key.to_owned()) {
                println!("RADIO (lap {}): {}", event.lap_number, event.message);
            }
        }

        if state.lap_number != lap_printed {
            if let Some(player) = snapshot.player() {
                let position = snapshot
                    .standings
                    .iter()
                    .find(|entry| entry.car_no == player.car_no)
                    .map_or(0, |entry| entry.position);

                println!(
                    "INFO: Lap {:2} | {:<10} (rain {:3}%) | P{:<2} | {} {:5.1}% | fuel {:5.1}% | {}{}",
                    state.lap_number,
                    state.weather.to_string(),
                    state.rain_intensity,
                    position,
                    player.compound,
                    player.tire_health,
                    player.fuel,
                    player.status,
                    if player.pit_requested { " | box requested" } else { "" }
                );
            }
            lap_printed = state.lap_number;
        }

        if snapshot.final_result.is_some() && !over_printed {
            println!("INFO: Race over, type 'quit' for the results or 'restart' for a new race");
            over_printed = true;
        }
    }
}
