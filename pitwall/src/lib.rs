pub mod core {
    pub mod car;
    pub mod handle_race;
    pub mod race;
    pub mod radio;
    pub mod staff;
    pub mod standings;
    pub mod strategy;
    pub mod tireset;
    pub mod weather;
}

pub mod interfaces {
    pub mod ui_interface;
}

pub mod post {
    pub mod race_result;
}

pub mod pre {
    pub mod check_sim_opts_pars;
    pub mod read_sim_pars;
    pub mod sim_opts;
}


#[cfg(test)]
mod weather_tests {
    use crate::core::weather::{condition, forecast_rain_soon, tick, Weather, INTENSITY_STEP};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_condition_thresholds() {
        assert_eq!(condition(0), Weather::Clear);
        assert_eq!(condition(40), Weather::Clear);
        assert_eq!(condition(41), Weather::Rainy);
        assert_eq!(condition(70), Weather::Rainy);
        assert_eq!(condition(71), Weather::HeavyRain);
        assert_eq!(condition(100), Weather::HeavyRain);
        assert_eq!(condition(255), Weather::HeavyRain);
    }
    #[test]
    fn test_condition_monotonic() {
        for intensity in 0..100u8 {
            assert!(condition(intensity) <= condition(intensity + 1));
        }
    }
    #[test]
    fn test_tick_steps() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut intensity = 50;
        let mut no_changes = 0;

        for _ in 0..2000 {
            let (next, weather) = tick(intensity, &mut rng);
            let delta = (i32::from(next) - i32::from(intensity)).abs();

            assert!(next <= 100);
            assert!(delta == 0 || delta == INTENSITY_STEP || next == 0 || next == 100);
            assert_eq!(weather, condition(next));

            if delta != 0 {
                no_changes += 1;
            }
            intensity = next;
        }

        // intensity changes in roughly 10% of the ticks
        assert!(no_changes > 100 && no_changes < 300);
    }
    #[test]
    fn test_forecast_heavy_rain() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // only three drops in a row would reach the dry tier
        assert!(forecast_rain_soon(100, &mut rng));
    }
    #[test]
    fn test_forecast_dry() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // only three rises in a row would reach the wet tiers
        assert!(!forecast_rain_soon(0, &mut rng));
    }
}



#[cfg(test)]
mod strategy_tests {
    use crate::core::strategy::{decide, radio_line, AiDecision, StrategyProfile};
    use crate::core::tireset::Compound;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn share_pit_for_wets(profile: StrategyProfile) -> f64 {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let no_samples = 10_000;

        let no_pits = (0..no_samples)
            .filter(|_| decide(Compound::Medium, profile, 80, &mut rng) == AiDecision::PitForWets)
            .count();

        no_pits as f64 / no_samples as f64
    }

    #[test]
    fn test_aggressive_pit_for_wets() {
        let share = share_pit_for_wets(StrategyProfile::Aggressive);
        assert!((share - 0.3).abs() < 0.03, "share was {}", share);
    }
    #[test]
    fn test_conservative_pit_for_wets() {
        let share = share_pit_for_wets(StrategyProfile::Conservative);
        assert!((share - 0.8).abs() < 0.03, "share was {}", share);
    }
    #[test]
    fn test_pit_for_slicks() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for profile in [StrategyProfile::Aggressive, StrategyProfile::Conservative].iter() {
            assert_eq!(
                decide(Compound::Wet, *profile, 5, &mut rng),
                AiDecision::PitForSlicks
            );
            assert_eq!(decide(Compound::Wet, *profile, 30, &mut rng), AiDecision::Stay);
            assert_eq!(decide(Compound::Hard, *profile, 50, &mut rng), AiDecision::Stay);
        }
    }
    #[test]
    fn test_radio_line() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let line = radio_line(StrategyProfile::Aggressive, AiDecision::PitForWets, &mut rng);
        assert!(!line.is_empty());
    }
}

#[cfg(test)]
mod car_tests {
    use crate::core::car::{
        advance_lap, CarStatus, DnfReason, LapConditions, LapEvent, PitPolicy, T_PUNCTURE,
    };
    use crate::core::staff::{pit_stop_duration, StaffSelection};
    use crate::core::tireset::{Compound, TirePars};
    use crate::core::weather::Weather;
    use crate::test_utils;
    use approx::{assert_abs_diff_eq, assert_ulps_eq};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fuel_burn() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Medium, 2.5, 100.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);

        assert_abs_diff_eq!(outcome.car.fuel, 0.3, epsilon = 1e-9);
        assert_eq!(outcome.car.status, CarStatus::Racing);
        assert_eq!(outcome.car.laps_completed, 1);
        assert!(outcome.lap_time.is_some());
    }
    #[test]
    fn test_out_of_fuel() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Medium, 2.0, 100.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);

        assert_ulps_eq!(outcome.car.fuel, 0.0);
        assert_eq!(outcome.car.status, CarStatus::Dnf(DnfReason::OutOfFuel));
        assert_eq!(outcome.car.status.to_string(), "DNF (Out of fuel)");
        assert_eq!(outcome.car.laps_completed, 0);
        assert!(outcome.lap_time.is_none());
        assert!(outcome
            .events
            .contains(&LapEvent::Dnf(DnfReason::OutOfFuel)));
    }
    #[test]
    fn test_tire_wear_soft() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Soft, 100.0, 100.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);

        assert_ulps_eq!(outcome.car.tireset.health, 92.0);
        assert_eq!(outcome.car.tireset.age_cur_stint, 1);
        assert_eq!(outcome.car.wrong_tire_laps, 0);
    }
    #[test]
    fn test_lap_time_and_distance() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::HeavyRain,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Hard, 100.0, 100.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);
        let lap_time = outcome.lap_time.unwrap();

        // base lap plus heavy rain mismatch, the fluctuation is within +-1s
        assert!((lap_time - 100.0).abs() <= 1.0 + 1e-9);
        assert_ulps_eq!(outcome.car.total_time, lap_time);
        assert_ulps_eq!(outcome.car.total_distance, 100.0 * 90.0 / lap_time);
        assert_eq!(outcome.car.best_lap_time, Some(lap_time));
        assert_eq!(outcome.car.wrong_tire_laps, 1);
    }
    #[test]
    fn test_puncture() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Soft, 100.0, 5.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);

        assert_ulps_eq!(outcome.car.tireset.health, 0.0);
        assert_eq!(outcome.car.status, CarStatus::Dnf(DnfReason::Puncture));
        assert!(outcome.events.contains(&LapEvent::Puncture));
        assert!(outcome.events.contains(&LapEvent::Dnf(DnfReason::Puncture)));
    }
    #[test]
    fn test_puncture_on_pit_lap() {
        let mut race_pars = test_utils::race_pars();
        race_pars.t_fluctuation = 0.0;
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut car = test_utils::car(Compound::Soft, 100.0, 5.0);
        car.pit_requested = true;
        let outcome = advance_lap(&car, &conditions, &mut rng);

        // new tires are fitted before the tire failure ends the race
        assert_eq!(outcome.car.status, CarStatus::Pitting { remaining: 5.0 });
        assert_ulps_eq!(outcome.car.tireset.health, 100.0);
        assert_eq!(outcome.car.pit_stops, 1);
        assert!(outcome.events.contains(&LapEvent::Puncture));
        assert!(!outcome.events.contains(&LapEvent::Dnf(DnfReason::Puncture)));

        // base + worn tire tier + puncture + standstill
        let lap_time = outcome.lap_time.unwrap();
        assert_abs_diff_eq!(
            lap_time,
            90.0 + 2.5 + T_PUNCTURE + pit_stop_duration(None),
            epsilon = 1e-9
        );
        assert_ulps_eq!(outcome.car.total_time, lap_time);
        assert_eq!(
            LapEvent::Puncture.to_string(),
            "PUNCTURE: Tire failed! +60.0s"
        );
    }
    #[test]
    fn test_mechanical_failure() {
        let mut race_pars = test_utils::race_pars();
        race_pars.p_mechanical_failure = 1.0;
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Medium, 100.0, 100.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);

        assert_eq!(
            outcome.car.status,
            CarStatus::Dnf(DnfReason::MechanicalFailure)
        );
    }
    #[test]
    fn test_pit_stop() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut car = test_utils::car(Compound::Medium, 50.0, 40.0);
        car.pit_requested = true;
        let outcome = advance_lap(&car, &conditions, &mut rng);
        let mut car = outcome.car;

        assert_ulps_eq!(car.tireset.health, 100.0);
        assert_ulps_eq!(car.fuel, 100.0);
        assert_eq!(car.tireset.age_cur_stint, 0);
        assert_eq!(car.pit_stops, 1);
        assert!(!car.pit_requested);
        assert_eq!(car.status, CarStatus::Pitting { remaining: 5.0 });
        assert!(outcome.lap_time.unwrap() > 90.0 + 4.0 - 1.0);
        assert!(matches!(outcome.events[0], LapEvent::PitStop { .. }));

        // no compound changes while being serviced
        assert!(!car.mount_compound(Compound::Wet));
        assert_eq!(car.tireset.compound, Compound::Medium);

        // a car in the pits does not race
        let outcome = advance_lap(&car, &conditions, &mut rng);
        assert_eq!(outcome.car, car);
        assert!(outcome.lap_time.is_none());

        assert!(!car.elapse(3.0));
        assert!(car.elapse(2.0));
        assert_eq!(car.status, CarStatus::Racing);
        assert!(car.mount_compound(Compound::Wet));
    }
    #[test]
    fn test_pit_policy_threshold() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut car = test_utils::car(Compound::Medium, 80.0, 25.0);
        car.pit_policy = PitPolicy::default();
        assert_eq!(advance_lap(&car, &conditions, &mut rng).car.pit_stops, 1);

        car.tireset.health = 26.0;
        assert_eq!(advance_lap(&car, &conditions, &mut rng).car.pit_stops, 0);

        car.pit_policy = PitPolicy::Manual;
        car.tireset.health = 25.0;
        assert_eq!(advance_lap(&car, &conditions, &mut rng).car.pit_stops, 0);
    }
    #[test]
    fn test_terminal_car_unchanged() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };

        for status in [
            CarStatus::Finished,
            CarStatus::Dnf(DnfReason::MechanicalFailure),
        ]
        .iter()
        {
            let mut car = test_utils::car(Compound::Soft, 40.0, 40.0);
            car.status = *status;

            let mut rng = ChaCha8Rng::seed_from_u64(9);
            let mut rng_ref = rng.clone();
            let outcome = advance_lap(&car, &conditions, &mut rng);

            assert_eq!(outcome.car, car);
            assert!(outcome.events.is_empty());
            // no random numbers were drawn
            assert_eq!(rng.gen::<u64>(), rng_ref.gen::<u64>());
        }
    }
    #[test]
    fn test_advance_lap_deterministic() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let staff = StaffSelection::default();
        let conditions = LapConditions {
            weather: Weather::Rainy,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };

        let car = test_utils::car(Compound::Soft, 60.0, 60.0);
        let outcome_a = advance_lap(&car, &conditions, &mut ChaCha8Rng::seed_from_u64(5));
        let outcome_b = advance_lap(&car, &conditions, &mut ChaCha8Rng::seed_from_u64(5));

        assert_eq!(outcome_a.car, outcome_b.car);
        assert_eq!(outcome_a.events, outcome_b.events);
        assert_eq!(outcome_a.lap_time, outcome_b.lap_time);
    }
    #[test]
    fn test_error_prone_engineer() {
        let race_pars = test_utils::race_pars();
        let tire_pars = TirePars::default();
        let mut engineer = crate::core::staff::StaffMarket::default()
            .find_engineer(3)
            .unwrap()
            .to_owned();
        engineer.risk_factor = 1.0;
        let staff = StaffSelection {
            engineer: Some(engineer),
            pit_crew: None,
        };
        let conditions = LapConditions {
            weather: Weather::Clear,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let car = test_utils::car(Compound::Medium, 100.0, 100.0);
        let outcome = advance_lap(&car, &conditions, &mut rng);

        let penalty = outcome
            .events
            .iter()
            .find_map(|event| match event {
                LapEvent::CriticalError(e) => Some(e.penalty),
                _ => None,
            })
            .unwrap();
        assert!((1.5..=6.0).contains(&penalty));
        // skill 30 gives a pace bonus of 0.6s, the fluctuation is within +-1s
        assert!(outcome.lap_time.unwrap() >= 90.0 - 0.6 - 1.0 + 1.5 - 1e-9);
    }
}

#[cfg(test)]
mod standings_tests {
    use crate::core::car::{CarStatus, DnfReason};
    use crate::core::standings::{build, podium};
    use crate::core::tireset::Compound;
    use crate::test_utils;
    use approx::assert_ulps_eq;

    #[test]
    fn test_build_by_distance() {
        let mut car_a = test_utils::car(Compound::Medium, 100.0, 100.0);
        car_a.car_no = 1;
        car_a.total_distance = 120.5;
        car_a.total_time = 180.0;
        let mut car_b = test_utils::car(Compound::Medium, 100.0, 100.0);
        car_b.car_no = 2;
        car_b.total_distance = 95.0;
        car_b.total_time = 181.5;

        let standings = build(&[car_b.clone(), car_a.clone()]);

        assert_eq!(standings[0].car_no, 1);
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[0].car_idx, 1);
        assert_ulps_eq!(standings[0].interval_to_leader, 0.0);
        assert_eq!(standings[1].car_no, 2);
        assert_eq!(standings[1].position, 2);
        assert_ulps_eq!(standings[1].interval_to_leader, 1.5);
    }
    #[test]
    fn test_build_tie_break_and_dnf() {
        let mut cars = vec![];
        for (car_no, distance, time) in [(1, 200.0, 181.0), (2, 200.0, 180.0), (3, 300.0, 270.0)].iter()
        {
            let mut car = test_utils::car(Compound::Medium, 100.0, 100.0);
            car.car_no = *car_no;
            car.total_distance = *distance;
            car.total_time = *time;
            cars.push(car);
        }
        cars[2].status = CarStatus::Dnf(DnfReason::Puncture);

        let standings = build(&cars);
        let car_nos: Vec<u32> = standings.iter().map(|entry| entry.car_no).collect();

        assert_eq!(car_nos, vec![2, 1, 3]);
        assert!(!standings[2].classified);
        assert_ulps_eq!(standings[2].interval_to_leader, 90.0);

        // same cars result in the same standings
        assert_eq!(build(&cars), standings);

        let podium = podium(&standings);
        assert_eq!(podium.len(), 2);
        assert_eq!(podium[0].car_no, 2);
    }
    #[test]
    fn test_build_empty() {
        assert!(build(&[]).is_empty());
    }
}

#[cfg(test)]
mod radio_tests {
    use crate::core::radio::{RadioEvent, RadioFeed, RADIO_FEED_CAPACITY};

    fn event(key: &str) -> RadioEvent {
        RadioEvent {
            key: key.to_owned(),
            lap_number: 1,
            message: format!("message {}", key),
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_dedupe() {
        let mut feed = RadioFeed::default();
        assert!(feed.push(event("pit-1")));
        assert!(!feed.push(event("pit-1")));
        assert!(feed.push(event("pit-2")));
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.last_alert().unwrap().key, "pit-2");
    }
    #[test]
    fn test_bounded() {
        let mut feed = RadioFeed::default();
        for i in 0..RADIO_FEED_CAPACITY + 10 {
            feed.push(event(&format!("key-{}", i)));
        }

        let events = feed.events();
        assert_eq!(events.len(), RADIO_FEED_CAPACITY);
        assert_eq!(events[0].key, "key-10");
        assert_eq!(feed.last_alert().unwrap().key, format!("key-{}", RADIO_FEED_CAPACITY + 9));

        // keys that already left the history are still known
        assert!(!feed.push(event("key-0")));

        feed.clear();
        assert!(feed.is_empty());
        assert!(feed.push(event("key-0")));
    }
}
