use crate::core::race::RaceEngine;
use crate::core::standings::position_of;
use crate::interfaces::ui_interface::{Command, RaceSnapshot};
use crate::post::race_result::RaceResult;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::{Receiver, Sender, TryRecvError};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// (s) Simulated time per iteration of the real-time loop.
const LOOP_STEP: f64 = 0.1;

/// handle_race creates and simulates a race on the basis of the inserted parameters, and returns
/// the results for post-processing. If a snapshot sender and a command receiver are inserted, the
/// race is simulated in real-time and controlled by the commands (it starts paused). Otherwise,
/// the race is simulated as fast as possible.
pub fn handle_race(
    sim_pars: &SimPars,
    seed: u64,
    print_debug: bool,
    tx: Option<&Sender<RaceSnapshot>>,
    rx: Option<&Receiver<Command>>,
    realtime_factor: f64,
) -> anyhow::Result<RaceResult> {
    // create the race
    let team = sim_pars.hire_team();
    let mut engine = RaceEngine::new(sim_pars, team.selection().to_owned(), seed);

    match (tx, rx) {
        (Some(tx), Some(rx)) => run_realtime(&mut engine, tx, rx, realtime_factor)?,
        _ => run_headless(&mut engine, print_debug),
    }

    Ok(engine.race_result())
}

/// run_headless simulates the race until it is over. Every tick elapses the tick interval of
/// simulated time such that pit services end as they would in real-time.
fn run_headless(engine: &mut RaceEngine, print_debug: bool) {
    let tick_interval = engine.race_pars().tick_interval;

    while !engine.state().is_over {
        engine.advance_lap();
        engine.elapse(tick_interval);

        if print_debug {
            let leader = engine
                .standings()
                .first()
                .and_then(|entry| engine.cars().get(entry.car_idx));
            let player = engine.player();

            println!(
                "DEBUG: Lap {:2}, {:<10}, leader {}, player P{} ({:.1}% tires, {:.1}% fuel)",
                engine.state().lap_number,
                engine.state().weather.to_string(),
                leader.map_or("-", |car| car.name.as_str()),
                position_of(engine.standings(), engine.player_car_no()).unwrap_or(0),
                player.map_or(0.0, |car| car.tireset.health),
                player.map_or(0.0, |car| car.fuel),
            );
        }
    }
}

/// run_realtime drives the race with the real wall clock. Commands are handled between two
/// iterations, i.e. they are never interleaved with a lap tick. The loop ends on a quit command
/// or if the command sender is dropped.
fn run_realtime(
    engine: &mut RaceEngine,
    tx: &Sender<RaceSnapshot>,
    rx: &Receiver<Command>,
    realtime_factor: f64,
) -> anyhow::Result<()> {
    let tx_observer = tx.to_owned();
    let subscription = engine.subscribe(Box::new(move |snapshot: &RaceSnapshot| {
        if tx_observer.send(snapshot.to_owned()).is_err() {
            debug!("Snapshot receiver is gone");
        }
    }));

    tx.send(engine.snapshot())
        .context("Failed to send initial race snapshot!")?;

    let tick_interval = engine.race_pars().tick_interval;
    let mut t_since_tick = 0.0;

    'race: loop {
        let t_start = Instant::now();

        // handle inputs
        loop {
            let command = match rx.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'race,
            };

            debug!("Received command {:?}", command);

            match command {
                Command::AdvanceLap => {
                    engine.advance_lap();
                    t_since_tick = 0.0;
                }
                Command::SetRunning(running) => engine.set_running(running),
                Command::ToggleRunning => {
                    let running = !engine.is_running();
                    engine.set_running(running)
                }
                Command::SetTireCompound(car_no, compound) => {
                    engine.set_tire_compound(car_no, compound);
                }
                Command::RequestPitStop(car_no, requested) => {
                    engine.request_pit_stop(car_no, requested);
                }
                Command::TogglePitStop(car_no) => {
                    engine.toggle_pit_stop(car_no);
                }
                Command::Restart => {
                    engine.restart();
                    t_since_tick = 0.0;
                }
                Command::Quit => break 'race,
            }
        }

        // pit services elapse even if the race is paused
        engine.elapse(LOOP_STEP);

        if engine.is_running() {
            t_since_tick += LOOP_STEP;

            if t_since_tick >= tick_interval - 1e-9 {
                engine.advance_lap();
                t_since_tick = 0.0;
            }
        }

        // sleep until the loop step is finished in real-time as well (calculation in ms)
        let t_sleep = (LOOP_STEP * 1000.0 / realtime_factor) as i64
            - t_start.elapsed().as_millis() as i64;

        if t_sleep > 0 {
            sleep(Duration::from_millis(t_sleep as u64));
        } else {
            warn!("Could not keep up with real-time!")
        }
    }

    engine.unsubscribe(subscription);
    info!("Real-time simulation stopped");
    Ok(())
}
