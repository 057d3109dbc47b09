use crate::core::car::Car;
use std::cmp::Ordering;

/// Number of classified cars on the podium.
pub const PODIUM_SIZE: usize = 3;

/// * `position` - Position in the race (starting at 1)
/// * `car_idx` - Index of the car in the cars list of the race
/// * `car_no` - Car number
/// * `interval_to_leader` - (s) Race time difference to the leader (0.0 for the leader, can be
/// negative if the leader needed more time to cover a greater distance)
/// * `classified` - False if the car did not finish the race
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    pub position: u32,
    pub car_idx: usize,
    pub car_no: u32,
    pub interval_to_leader: f64,
    pub classified: bool,
}

/// compare_progress orders two cars by descending distance, ties are broken by ascending race
/// time. DNF cars are placed behind all other cars.
fn compare_progress(a: &Car, b: &Car) -> Ordering {
    a.status
        .is_dnf()
        .cmp(&b.status.is_dnf())
        .then_with(|| {
            b.total_distance
                .partial_cmp(&a.total_distance)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| {
            a.total_time
                .partial_cmp(&b.total_time)
                .unwrap_or(Ordering::Equal)
        })
}

/// build ranks the inserted cars. The function is pure, i.e. building the standings twice from
/// the same cars results in the same standings.
pub fn build(cars: &[Car]) -> Vec<StandingsEntry> {
    let mut idxs: Vec<usize> = (0..cars.len()).collect();
    idxs.sort_by(|&a, &b| compare_progress(&cars[a], &cars[b]));

    let t_leader = match idxs.first() {
        Some(&idx) => cars[idx].total_time,
        None => return vec![],
    };

    idxs.iter()
        .enumerate()
        .map(|(i, &idx)| StandingsEntry {
            position: i as u32 + 1,
            car_idx: idx,
            car_no: cars[idx].car_no,
            interval_to_leader: if i == 0 {
                0.0
            } else {
                cars[idx].total_time - t_leader
            },
            classified: !cars[idx].status.is_dnf(),
        })
        .collect()
}

/// podium returns the first three classified entries of the standings.
pub fn podium(standings: &[StandingsEntry]) -> Vec<StandingsEntry> {
    standings
        .iter()
        .filter(|entry| entry.classified)
        .take(PODIUM_SIZE)
        .cloned()
        .collect()
}

/// position_of returns the position of the car with the inserted car number.
pub fn position_of(standings: &[StandingsEntry], car_no: u32) -> Option<u32> {
    standings
        .iter()
        .find(|entry| entry.car_no == car_no)
        .map(|entry| entry.position)
}
