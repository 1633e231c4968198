//! Component D: neighborhood primitives shared by every `ext*`
//! placement routine (component E) and every per-species move routine
//! (component F).

use crate::catalogue::PhaseId;
use crate::lattice::{Coord, Lattice};
use crate::prng::Prng;

/// Primes encoding the six axis directions, in the fixed order
/// `(-x, +x, -y, +y, -z, +z)` — spec.md §4.D.
pub const DIRECTION_PRIMES: [u64; 6] = [2, 3, 5, 7, 11, 13];

/// Product of the first six primes: the "all six directions have been
/// tried at least once" sentinel spec.md §4.D calls out explicitly.
pub const ALL_TRIED: u64 = 2 * 3 * 5 * 7 * 11 * 13;

#[derive(Debug, Clone, Copy)]
pub struct MoveOneResult {
    pub coord: Coord,
    /// 1..=6, one per axis direction.
    pub direction: u8,
    /// The prime for the chosen direction if `sumold` was not already
    /// divisible by it, else `1` (spec.md §4.D).
    pub prime: u64,
}

/// Pick one of the six axis-aligned neighbors of `c` uniformly at
/// random and apply periodic wrap. This is the prime-sieve primitive:
/// repeated calls accumulating `prime` into a running product let
/// `ext*` routines try up to six distinct neighbors without
/// maintaining an explicit visited set (spec.md §4.D).
pub fn move_one(lat: &Lattice, c: Coord, sumold: u64, rng: &mut Prng) -> MoveOneResult {
    let neighbors = lat.axis_neighbors(c);
    let dir_idx = rng.next_below(6);
    let prime = DIRECTION_PRIMES[dir_idx];
    let returned_prime = if sumold % prime != 0 { prime } else { 1 };
    MoveOneResult {
        coord: neighbors[dir_idx],
        direction: (dir_idx + 1) as u8,
        prime: returned_prime,
    }
}

/// Step `c` by one voxel in axis `direction` (1..=6, same encoding as
/// [`move_one`]), with periodic wrap. Used by the hydration scheduler
/// to advance a registry node's coordinates after a diffusion step.
pub fn step_direction(lat: &Lattice, c: Coord, direction: u8) -> Coord {
    let (x, y, z) = (c.x as i64, c.y as i64, c.z as i64);
    match direction {
        1 => lat.wrap_coord(x - 1, y, z),
        2 => lat.wrap_coord(x + 1, y, z),
        3 => lat.wrap_coord(x, y - 1, z),
        4 => lat.wrap_coord(x, y + 1, z),
        5 => lat.wrap_coord(x, y, z - 1),
        6 => lat.wrap_coord(x, y, z + 1),
        _ => c,
    }
}

/// Count the neighbors in the 3×3×3 box around `c` (excluding the
/// center, periodic wrap) whose phase is *not* any of `excluded`.
/// Callers answer "is a neighbor of the required kind present?" by
/// checking whether the result is less than 26 (spec.md §4.D).
pub fn edgecnt(lat: &Lattice, c: Coord, excluded: &[PhaseId]) -> u8 {
    lat.box_neighbors(c)
        .iter()
        .filter(|&&n| !excluded.contains(&lat.get(n)))
        .count() as u8
}

/// Count neighbors among `wanted`, used by the `extettr` contact
/// probability blend and by growth-on-contact heuristics.
pub fn count_among(lat: &Lattice, c: Coord, wanted: &[PhaseId]) -> u8 {
    lat.box_neighbors(c)
        .iter()
        .filter(|&&n| wanted.contains(&lat.get(n)))
        .count() as u8
}

/// Majority vote among the 26 neighbors of `c` between `POROSITY` and
/// `CRACKP`; ties (including "no neighbor is either kind") go to
/// `POROSITY`. Only meaningful once `cyccnt > crackcycle`; before
/// that, `POROSITY` is returned unconditionally (spec.md §4.D).
pub fn get_porenv(lat: &Lattice, c: Coord, cyccnt: i64, crackcycle: i64) -> PhaseId {
    if cyccnt <= crackcycle {
        return PhaseId::Porosity;
    }
    let mut porosity = 0u32;
    let mut crack = 0u32;
    for n in lat.box_neighbors(c) {
        match lat.get(n) {
            PhaseId::Porosity => porosity += 1,
            PhaseId::Crackp => crack += 1,
            _ => {}
        }
    }
    if crack > porosity {
        PhaseId::Crackp
    } else {
        PhaseId::Porosity
    }
}

/// `true` if `p` is any saturated-porosity kind (`POROSITY` or
/// `CRACKP`, but not the desaturated `EMPTYP`) — the test every `ext*`
/// local-phase attempt and every diffusion step uses to decide whether
/// a neighbor is "open."
pub fn is_saturated_porosity(p: PhaseId) -> bool {
    matches!(p, PhaseId::Porosity | PhaseId::Crackp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::Lattice;

    #[test]
    fn move_one_wraps_at_every_face() {
        let lat = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        let mut rng = Prng::new(1);
        // Exhaustively drive the six directions by brute-forcing seeds
        // until we observe each one at least once, then check the
        // wrap from the origin corner is periodic.
        let mut seen = [false; 6];
        for seed in 0..200u64 {
            let mut r = Prng::new(seed);
            let res = move_one(&lat, Coord::new(0, 0, 0), 1, &mut r);
            seen[(res.direction - 1) as usize] = true;
            let _ = rng.next_f64(); // keep `rng` alive/used
        }
        assert!(seen.iter().all(|&s| s), "not all directions observed: {seen:?}");
    }

    #[test]
    fn move_one_returns_1_once_prime_already_in_product() {
        let lat = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        // Drive until we get direction 1 (prime 2) twice in a row by
        // brute force, then confirm the second draw returns prime=1
        // once folded into sumold.
        for seed in 0..5000u64 {
            let mut r = Prng::new(seed);
            let first = move_one(&lat, Coord::new(0, 0, 0), 1, &mut r);
            let sumold = first.prime;
            let second = move_one(&lat, Coord::new(0, 0, 0), sumold, &mut r);
            if second.direction == first.direction {
                assert_eq!(second.prime, 1);
                return;
            }
        }
        panic!("never observed a repeated direction in 5000 seeds");
    }

    #[test]
    fn edgecnt_counts_non_matching_neighbors() {
        let mut lat = Lattice::filled(5, 5, 5, PhaseId::Porosity);
        let c = Coord::new(2, 2, 2);
        for n in lat.box_neighbors(c) {
            lat.set(n, PhaseId::C3S);
        }
        assert_eq!(edgecnt(&lat, c, &[PhaseId::C3S]), 0);
        assert_eq!(edgecnt(&lat, c, &[PhaseId::Porosity]), 26);
    }

    #[test]
    fn get_porenv_ties_go_to_porosity() {
        let lat = Lattice::filled(5, 5, 5, PhaseId::C3S);
        let c = Coord::new(2, 2, 2);
        // No neighbor is POROSITY or CRACKP at all: 0-0 tie.
        assert_eq!(get_porenv(&lat, c, 10, 0), PhaseId::Porosity);
    }

    #[test]
    fn get_porenv_before_crack_cycle_is_always_porosity() {
        let mut lat = Lattice::filled(5, 5, 5, PhaseId::Porosity);
        let c = Coord::new(2, 2, 2);
        for n in lat.box_neighbors(c) {
            lat.set(n, PhaseId::Crackp);
        }
        assert_eq!(get_porenv(&lat, c, 3, 10), PhaseId::Porosity);
        assert_eq!(get_porenv(&lat, c, 11, 10), PhaseId::Crackp);
    }
}
