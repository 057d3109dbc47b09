use helpers::general::{clamp_percent, wrap_progress};
use pitwall::core::car::{advance_lap, Car, CarPars, CarStatus, LapConditions, PitPolicy};
use pitwall::core::race::RacePars;
use pitwall::core::staff::{StaffMarket, StaffSelection};
use pitwall::core::standings::build;
use pitwall::core::strategy::StrategyProfile;
use pitwall::core::tireset::{Compound, TirePars};
use pitwall::core::weather::{condition, tick, Weather};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn compound_strategy() -> impl Strategy<Value = Compound> {
    prop::sample::select(Compound::ALL.to_vec())
}

fn weather_strategy() -> impl Strategy<Value = Weather> {
    prop::sample::select(vec![Weather::Clear, Weather::Rainy, Weather::HeavyRain])
}

fn new_car(car_no: u32, compound: Compound) -> Car {
    let pars = CarPars {
        car_no,
        name: format!("Driver {}", car_no),
        team: "Prop Racing".to_owned(),
        color: "#e5e7eb".to_owned(),
        t_car: 0.0,
        strategy: StrategyProfile::Aggressive,
        compound: compound.to_string(),
        pit_policy: PitPolicy::Manual,
    };
    Car::new(&pars, false)
}

proptest! {
    #[test]
    fn weather_tick_stays_in_range(intensity in 0u8..=100, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cur = intensity;

        for _ in 0..50 {
            let (next, weather) = tick(cur, &mut rng);
            prop_assert!(next <= 100);
            prop_assert_eq!(weather, condition(next));
            cur = next;
        }
    }

    #[test]
    fn condition_is_monotonic(a in 0u8..=100, b in 0u8..=100) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(condition(low) <= condition(high));
    }

    #[test]
    fn lap_keeps_fuel_and_health_in_range(
        compound in compound_strategy(),
        weather in weather_strategy(),
        fuel in -50.0f64..150.0,
        health in -50.0f64..150.0,
        pit_requested in any::<bool>(),
        with_staff in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let race_pars = RacePars::default();
        let tire_pars = TirePars::default();
        let market = StaffMarket::default();
        let staff = if with_staff {
            StaffSelection {
                engineer: market.find_engineer(3).cloned(),
                pit_crew: market.find_pit_crew(6).cloned(),
            }
        } else {
            StaffSelection::default()
        };
        let conditions = LapConditions {
            weather,
            race_pars: &race_pars,
            tire_pars: &tire_pars,
            staff: &staff,
        };

        let mut car = new_car(1, compound);
        car.fuel = fuel;
        car.tireset.health = health;
        car.pit_requested = pit_requested;

        let outcome = advance_lap(&car, &conditions, &mut ChaCha8Rng::seed_from_u64(seed));

        prop_assert!(outcome.car.fuel >= 0.0 && outcome.car.fuel <= 100.0);
        prop_assert!(outcome.car.tireset.health >= 0.0 && outcome.car.tireset.health <= 100.0);

        if outcome.car.fuel <= 0.0 || outcome.car.tireset.health <= 0.0 {
            prop_assert!(outcome.car.status.is_dnf());
        }

        if let Some(lap_time) = outcome.lap_time {
            prop_assert!(lap_time > 0.0 && lap_time.is_finite());
            prop_assert!(outcome.car.total_distance > 0.0);
        } else {
            prop_assert!(outcome.car.status.is_dnf());
            prop_assert_eq!(outcome.car.laps_completed, 0);
        }
    }

    #[test]
    fn standings_are_a_stable_ranking(
        progress in prop::collection::vec((0.0f64..1000.0, 0.0f64..5000.0, any::<bool>()), 1..15)
    ) {
        let cars: Vec<Car> = progress
            .iter()
            .enumerate()
            .map(|(i, &(distance, time, dnf))| {
                let mut car = new_car(i as u32 + 1, Compound::Medium);
                car.total_distance = distance;
                car.total_time = time;
                if dnf {
                    car.status = CarStatus::Dnf(pitwall::core::car::DnfReason::MechanicalFailure);
                }
                car
            })
            .collect();

        let standings = build(&cars);
        prop_assert_eq!(standings.len(), cars.len());
        prop_assert_eq!(&build(&cars), &standings);

        let mut positions: Vec<u32> = standings.iter().map(|entry| entry.position).collect();
        positions.sort_unstable();
        prop_assert_eq!(positions, (1..=cars.len() as u32).collect::<Vec<u32>>());

        for pair in standings.windows(2) {
            let (front, rear) = (&cars[pair[0].car_idx], &cars[pair[1].car_idx]);

            if front.status.is_dnf() == rear.status.is_dnf() {
                prop_assert!(front.total_distance >= rear.total_distance);
            } else {
                prop_assert!(!front.status.is_dnf());
            }
        }
    }

    #[test]
    fn clamp_percent_stays_in_range(x in any::<f64>()) {
        let y = clamp_percent(x);
        prop_assert!((0.0..=100.0).contains(&y));
    }

    #[test]
    fn wrap_progress_stays_on_lap(x in any::<f64>()) {
        let y = wrap_progress(x);
        prop_assert!((0.0..100.0).contains(&y));
    }
}
