//! Component I: percolation and set-point detectors (spec.md §4.I).
//! `burn3d` answers "does phase {ph1, ph2} connect one face of the box
//! to the opposite face," periodic in the two axes perpendicular to
//! the burn direction and non-periodic along it. `burnset` answers the
//! same question for the hydration-product/clinker network that
//! defines setting, gating clinker-to-clinker steps by shared particle
//! origin so two unrelated grains that merely touch don't count as
//! connected.

use std::collections::VecDeque;

use crate::catalogue::PhaseId;
use crate::lattice::{Coord, Lattice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Fraction of the solid network that must belong to the percolating
/// cluster before `burnset` calls the paste "set." spec.md names this
/// constant without spelling out the exact normalization; this crate
/// takes it as the percolating cluster's share of all bridge-eligible
/// (non-porosity, non-diffusing) solid voxels.
pub const BURNSET_THRESHOLD: f64 = 0.985;

fn linear_index(lattice: &Lattice, c: Coord) -> usize {
    let xs = lattice.xsize();
    let ys = lattice.ysize();
    c.z * ys * xs + c.y * xs + c.x
}

fn axis_neighbors_wrapped(lattice: &Lattice, c: Coord, axis: Axis) -> Vec<Coord> {
    let xs = lattice.xsize() as i64;
    let ys = lattice.ysize() as i64;
    let zs = lattice.zsize() as i64;
    let (wrap_x, wrap_y, wrap_z) = match axis {
        Axis::X => (false, true, true),
        Axis::Y => (true, false, true),
        Axis::Z => (true, true, false),
    };
    let deltas = [(-1i64, 0, 0), (1, 0, 0), (0, -1, 0), (0, 1, 0), (0, 0, -1), (0, 0, 1)];
    let mut out = Vec::with_capacity(6);
    for (dx, dy, dz) in deltas {
        let mut nx = c.x as i64 + dx;
        let mut ny = c.y as i64 + dy;
        let mut nz = c.z as i64 + dz;
        if wrap_x {
            nx = nx.rem_euclid(xs);
        }
        if wrap_y {
            ny = ny.rem_euclid(ys);
        }
        if wrap_z {
            nz = nz.rem_euclid(zs);
        }
        if nx < 0 || nx >= xs || ny < 0 || ny >= ys || nz < 0 || nz >= zs {
            continue;
        }
        out.push(Coord::new(nx as usize, ny as usize, nz as usize));
    }
    out
}

fn seed_face(lattice: &Lattice, axis: Axis) -> Vec<Coord> {
    let xs = lattice.xsize();
    let ys = lattice.ysize();
    let zs = lattice.zsize();
    let mut out = Vec::new();
    match axis {
        Axis::X => {
            for y in 0..ys {
                for z in 0..zs {
                    out.push(Coord::new(0, y, z));
                }
            }
        }
        Axis::Y => {
            for x in 0..xs {
                for z in 0..zs {
                    out.push(Coord::new(x, 0, z));
                }
            }
        }
        Axis::Z => {
            for x in 0..xs {
                for y in 0..ys {
                    out.push(Coord::new(x, y, 0));
                }
            }
        }
    }
    out
}

fn at_far_face(lattice: &Lattice, c: Coord, axis: Axis) -> bool {
    match axis {
        Axis::X => c.x == lattice.xsize() - 1,
        Axis::Y => c.y == lattice.ysize() - 1,
        Axis::Z => c.z == lattice.zsize() - 1,
    }
}

/// Shared two-queue BFS core: `frontier` drains fully into `next`
/// before the queues swap, so the search proceeds layer by layer as
/// spec.md's burn description calls for. `is_member` gates which
/// voxels the burn can occupy at all; `can_step` additionally gates
/// transitions between two member voxels (used by `burnset` to forbid
/// crossing between unrelated clinker grains).
fn burn(
    lattice: &Lattice,
    axis: Axis,
    is_member: impl Fn(Coord) -> bool,
    can_step: impl Fn(Coord, Coord) -> bool,
) -> (bool, usize) {
    let mut visited = vec![false; lattice.voxel_count()];
    let mut frontier: VecDeque<Coord> = VecDeque::new();
    let mut next: VecDeque<Coord> = VecDeque::new();
    let mut reached_far_face = false;
    let mut visited_count = 0usize;

    for c in seed_face(lattice, axis) {
        if is_member(c) {
            let idx = linear_index(lattice, c);
            if !visited[idx] {
                visited[idx] = true;
                visited_count += 1;
                frontier.push_back(c);
            }
        }
    }

    while !frontier.is_empty() {
        while let Some(c) = frontier.pop_front() {
            if at_far_face(lattice, c, axis) {
                reached_far_face = true;
            }
            for n in axis_neighbors_wrapped(lattice, c, axis) {
                if !is_member(n) || !can_step(c, n) {
                    continue;
                }
                let idx = linear_index(lattice, n);
                if !visited[idx] {
                    visited[idx] = true;
                    visited_count += 1;
                    next.push_back(n);
                }
            }
        }
        std::mem::swap(&mut frontier, &mut next);
    }

    (reached_far_face, visited_count)
}

/// Result of a [`burn3d`] call: whether the target phase(s) connect
/// one face of the lattice to the opposite face along the burn axis,
/// the through-path voxel count (`nthrough`), and that count's share
/// of all voxels carrying the target phase(s) — spec.md §6's
/// `Con_fracp[axis]`/`Con_fracs[axis]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnReport {
    pub percolates: bool,
    pub nthrough: usize,
    pub fraction: f64,
}

/// Result of a [`burnset`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnsetReport {
    pub has_set: bool,
    pub nthrough: usize,
    pub fraction: f64,
}

/// Does `ph1`/`ph2` form a connected path from one face of the lattice
/// to the opposite face along `axis`? Periodic in the two lateral
/// axes, non-periodic along `axis` itself (spec.md §4.I).
pub fn burn3d(lattice: &Lattice, ph1: PhaseId, ph2: PhaseId, axis: Axis) -> BurnReport {
    let is_member = |c: Coord| {
        let p = lattice.get(c);
        p == ph1 || p == ph2
    };
    let total = lattice.count().get(ph1) + if ph2 == ph1 { 0 } else { lattice.count().get(ph2) };
    let (percolates, nthrough) = burn(lattice, axis, is_member, |_, _| true);
    let fraction = if total == 0 { 0.0 } else { nthrough as f64 / total as f64 };
    BurnReport { percolates, nthrough, fraction }
}

/// Reactive clinker/pozzolan phases and solid hydration-bridge phases
/// that `burnset` treats as fuel (spec.md §4.I).
const CLINKER_FUEL: &[PhaseId] = &[
    PhaseId::C3S,
    PhaseId::C2S,
    PhaseId::C3A,
    PhaseId::C4AF,
    PhaseId::Slag,
    PhaseId::Sfume,
    PhaseId::Amsil,
    PhaseId::Asg,
    PhaseId::Cas2,
    PhaseId::K2SO4,
    PhaseId::NA2SO4,
];

const BRIDGE_FUEL: &[PhaseId] = &[
    PhaseId::Csh,
    PhaseId::Pozzcsh,
    PhaseId::Slagcsh,
    PhaseId::Ettr,
    PhaseId::Ettrc4af,
    PhaseId::C3ah6,
];

fn is_clinker_fuel(p: PhaseId) -> bool {
    CLINKER_FUEL.contains(&p)
}

fn is_bridge_fuel(p: PhaseId) -> bool {
    BRIDGE_FUEL.contains(&p)
}

fn is_fuel(p: PhaseId) -> bool {
    is_clinker_fuel(p) || is_bridge_fuel(p)
}

/// Does the hydration-product/clinker network percolate along `axis`,
/// and does the percolating cluster cover at least
/// [`BURNSET_THRESHOLD`] of the fuel-eligible solid? Two clinker
/// voxels only connect if [`Lattice::micpart`] agrees and that label
/// is nonzero — touching by chance doesn't count, only belonging to
/// the same original grain does. Clinker-bridge and bridge-bridge
/// contacts always connect.
pub fn burnset(lattice: &Lattice, axis: Axis) -> BurnsetReport {
    let total_fuel = PhaseId::ALL.iter().copied().filter(|&p| is_fuel(p)).map(|p| lattice.count().get(p)).sum::<u64>();
    if total_fuel == 0 {
        return BurnsetReport { has_set: false, nthrough: 0, fraction: 0.0 };
    }

    let is_member = |c: Coord| is_fuel(lattice.get(c));
    let can_step = |from: Coord, to: Coord| {
        let (pf, pt) = (lattice.get(from), lattice.get(to));
        if is_clinker_fuel(pf) && is_clinker_fuel(pt) {
            let label = lattice.micpart(from);
            label != 0 && label == lattice.micpart(to)
        } else {
            true
        }
    };

    let (connects, nthrough) = burn(lattice, axis, is_member, can_step);
    let fraction = nthrough as f64 / total_fuel as f64;
    let has_set = connects && fraction > BURNSET_THRESHOLD;
    BurnsetReport { has_set, nthrough, fraction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::lattice::Lattice;

    #[test]
    fn burn3d_sees_a_straight_corridor_of_the_target_phase() {
        let mut lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        for x in 0..4 {
            lattice.set(Coord::new(x, 0, 0), PhaseId::Ch);
        }
        let report = burn3d(&lattice, PhaseId::Ch, PhaseId::Ch, Axis::X);
        assert!(report.percolates);
        assert_eq!(report.nthrough, 4);
        assert_eq!(report.fraction, 1.0);
    }

    #[test]
    fn burn3d_fails_when_the_corridor_is_broken() {
        let mut lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        lattice.set(Coord::new(0, 0, 0), PhaseId::Ch);
        lattice.set(Coord::new(1, 0, 0), PhaseId::Ch);
        // Gap at x = 2.
        lattice.set(Coord::new(3, 0, 0), PhaseId::Ch);
        let report = burn3d(&lattice, PhaseId::Ch, PhaseId::Ch, Axis::X);
        assert!(!report.percolates);
        assert_eq!(report.nthrough, 2);
    }

    #[test]
    fn burn3d_wraps_periodically_on_the_lateral_axes() {
        let mut lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        for x in 0..4 {
            lattice.set(Coord::new(x, 3, 0), PhaseId::Ch);
        }
        assert!(burn3d(&lattice, PhaseId::Ch, PhaseId::Ch, Axis::X).percolates);
    }

    #[test]
    fn burnset_rejects_unrelated_clinker_grains_touching_by_chance() {
        let _config = SimulationConfig::default();
        let mut lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        for x in 0..4 {
            lattice.set(Coord::new(x, 0, 0), PhaseId::C3S);
        }
        // Every voxel defaults to micpart 0, so unless two grains are
        // explicitly relabeled this reads as one connected particle —
        // but label 0 is also the "no particle" sentinel, so it never
        // connects either.
        lattice.set_micpart(Coord::new(2, 0, 0), 7);
        lattice.set_micpart(Coord::new(3, 0, 0), 7);
        assert!(!burnset(&lattice, Axis::X).has_set);
    }

    #[test]
    fn burnset_connects_clinker_sharing_a_nonzero_micpart_label() {
        let mut lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        for x in 0..4 {
            lattice.set(Coord::new(x, 0, 0), PhaseId::C3S);
            lattice.set_micpart(Coord::new(x, 0, 0), 1);
        }
        let report = burnset(&lattice, Axis::X);
        assert!(report.has_set);
        assert_eq!(report.nthrough, 4);
    }

    #[test]
    fn burnset_empty_lattice_does_not_percolate() {
        let lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        assert!(!burnset(&lattice, Axis::Z).has_set);
    }
}
