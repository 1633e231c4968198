//! Component A (part 2): the 3D periodic voxel lattice and its
//! parallel lattices (spec.md §3).
//!
//! `Mic` and friends are stored as flat `Vec`s in row-major
//! `z`-outer, `y`-middle, `x`-inner order — the same order spec.md §6
//! specifies for the on-disk raster, so a caller that already parsed
//! an image file can hand this crate the raw bytes with one copy and
//! no re-layout.

use crate::catalogue::{PhaseId, PHASE_COUNT};

/// Voxel coordinate. Always held non-negative and in-bounds; wrapping
/// arithmetic lives in [`Lattice::wrap`] and in `neighbor::move_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Coord { x, y, z }
    }
}

/// Per-phase voxel population. The hard invariant of spec.md §3
/// ("sum equals the total voxel count") is maintained by routing every
/// mutation through [`Lattice::set`], which is the only place a
/// `Count` is touched after construction.
#[derive(Debug, Clone)]
pub struct Count {
    counts: [u64; PHASE_COUNT],
}

impl Count {
    fn zero() -> Self {
        Count {
            counts: [0; PHASE_COUNT],
        }
    }

    #[inline]
    pub fn get(&self, p: PhaseId) -> u64 {
        self.counts[p.index()]
    }

    #[inline]
    fn incr(&mut self, p: PhaseId) {
        self.counts[p.index()] += 1;
    }

    #[inline]
    fn decr(&mut self, p: PhaseId) {
        debug_assert!(self.counts[p.index()] > 0, "Count underflow for {p:?}");
        self.counts[p.index()] = self.counts[p.index()].saturating_sub(1);
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn pooled(&self, phases: &[PhaseId]) -> u64 {
        phases.iter().map(|&p| self.get(p)).sum()
    }
}

/// CSH plate orientation, spec.md §3 `Faces`. `Random` is the
/// catch-all "no orientation chosen yet / `Cshgeom == RANDOM`" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Random,
    Yz,
    Xz,
    Xy,
}

impl Face {
    pub fn as_u8(self) -> u8 {
        match self {
            Face::Random => 0,
            Face::Yz => 1,
            Face::Xz => 2,
            Face::Xy => 3,
        }
    }

    pub fn from_u8(v: u8) -> Face {
        match v {
            1 => Face::Yz,
            2 => Face::Xz,
            3 => Face::Xy,
            _ => Face::Random,
        }
    }
}

/// The 3D periodic voxel grid plus its parallel lattices.
#[derive(Debug, Clone)]
pub struct Lattice {
    xsize: usize,
    ysize: usize,
    zsize: usize,
    mic: Vec<PhaseId>,
    faces: Vec<u8>,
    cshage: Vec<i64>,
    micpart: Vec<u32>,
    micorig: Vec<PhaseId>,
    count: Count,
}

impl Lattice {
    /// Build a lattice from an already-decoded phase raster (row-major
    /// `z`-outer, `y`-middle, `x`-inner, per spec.md §6) and an
    /// optional particle-label raster. `Micorig` is a snapshot of
    /// `mic` taken here, at construction time, matching spec.md §3
    /// ("snapshot of `Mic` at simulation start").
    pub fn from_raster(
        xsize: usize,
        ysize: usize,
        zsize: usize,
        mic: Vec<PhaseId>,
        micpart: Option<Vec<u32>>,
    ) -> Self {
        assert_eq!(mic.len(), xsize * ysize * zsize, "raster size mismatch");
        let n = mic.len();
        let mut count = Count::zero();
        for &p in &mic {
            count.incr(p);
        }
        let micorig = mic.clone();
        Lattice {
            xsize,
            ysize,
            zsize,
            mic,
            faces: vec![0u8; n],
            cshage: vec![0i64; n],
            micpart: micpart.unwrap_or_else(|| vec![0u32; n]),
            micorig,
            count,
        }
    }

    /// All-porosity lattice of the given shape — the common scenario
    /// fixture (spec.md §8 end-to-end scenarios open with "all
    /// POROSITY except...").
    pub fn filled(xsize: usize, ysize: usize, zsize: usize, phase: PhaseId) -> Self {
        let n = xsize * ysize * zsize;
        Self::from_raster(xsize, ysize, zsize, vec![phase; n], None)
    }

    pub fn xsize(&self) -> usize {
        self.xsize
    }
    pub fn ysize(&self) -> usize {
        self.ysize
    }
    pub fn zsize(&self) -> usize {
        self.zsize
    }
    pub fn voxel_count(&self) -> usize {
        self.mic.len()
    }
    pub fn count(&self) -> &Count {
        &self.count
    }

    #[inline]
    fn linear(&self, c: Coord) -> usize {
        (c.z * self.ysize + c.y) * self.xsize + c.x
    }

    /// Wrap a (possibly negative or overflowing) signed offset into
    /// `[0, size)` — periodic boundary correction, spec.md §4.D.
    #[inline]
    pub fn wrap(v: i64, size: usize) -> usize {
        v.rem_euclid(size as i64) as usize
    }

    #[inline]
    pub fn wrap_coord(&self, x: i64, y: i64, z: i64) -> Coord {
        Coord::new(
            Self::wrap(x, self.xsize),
            Self::wrap(y, self.ysize),
            Self::wrap(z, self.zsize),
        )
    }

    #[inline]
    pub fn get(&self, c: Coord) -> PhaseId {
        self.mic[self.linear(c)]
    }

    /// Write a new phase at `c`, keeping `Count` consistent. This is
    /// the *only* way `Mic` is mutated; every move routine and every
    /// `ext*` placement routine goes through here.
    pub fn set(&mut self, c: Coord, new_phase: PhaseId) {
        let idx = self.linear(c);
        let old = self.mic[idx];
        if old == new_phase {
            return;
        }
        self.count.decr(old);
        self.count.incr(new_phase);
        self.mic[idx] = new_phase;
    }

    #[inline]
    pub fn face(&self, c: Coord) -> Face {
        Face::from_u8(self.faces[self.linear(c)])
    }

    #[inline]
    pub fn set_face(&mut self, c: Coord, f: Face) {
        let idx = self.linear(c);
        self.faces[idx] = f.as_u8();
    }

    #[inline]
    pub fn cshage(&self, c: Coord) -> i64 {
        self.cshage[self.linear(c)]
    }

    #[inline]
    pub fn set_cshage(&mut self, c: Coord, cycle: i64) {
        let idx = self.linear(c);
        self.cshage[idx] = cycle;
    }

    #[inline]
    pub fn micpart(&self, c: Coord) -> u32 {
        self.micpart[self.linear(c)]
    }

    #[inline]
    pub fn set_micpart(&mut self, c: Coord, label: u32) {
        let idx = self.linear(c);
        self.micpart[idx] = label;
    }

    #[inline]
    pub fn micorig(&self, c: Coord) -> PhaseId {
        self.micorig[self.linear(c)]
    }

    /// The six axis-aligned periodic neighbors of `c`, in the fixed
    /// order `(-x, +x, -y, +y, -z, +z)` matching the prime assignment
    /// of spec.md §4.D (`2, 3, 5, 7, 11, 13`).
    pub fn axis_neighbors(&self, c: Coord) -> [Coord; 6] {
        let (x, y, z) = (c.x as i64, c.y as i64, c.z as i64);
        [
            self.wrap_coord(x - 1, y, z),
            self.wrap_coord(x + 1, y, z),
            self.wrap_coord(x, y - 1, z),
            self.wrap_coord(x, y + 1, z),
            self.wrap_coord(x, y, z - 1),
            self.wrap_coord(x, y, z + 1),
        ]
    }

    /// Convert a linear index (as used by the flat storage vectors)
    /// back into a `Coord`. Used by non-local placement fallbacks that
    /// need a deterministic full scan of the lattice.
    pub fn coord_from_linear(&self, i: usize) -> Coord {
        let x = i % self.xsize;
        let y = (i / self.xsize) % self.ysize;
        let z = i / (self.xsize * self.ysize);
        Coord::new(x, y, z)
    }

    /// Uniformly random voxel coordinate, used by the `ext*`
    /// non-local placement fallback of spec.md §4.E.
    pub fn random_coord(&self, rng: &mut crate::prng::Prng) -> Coord {
        Coord::new(
            rng.next_below(self.xsize),
            rng.next_below(self.ysize),
            rng.next_below(self.zsize),
        )
    }

    /// The 26 neighbors in the 3×3×3 box around `c`, excluding the
    /// center, with periodic wrap.
    pub fn box_neighbors(&self, c: Coord) -> [Coord; 26] {
        let mut out = [Coord::new(0, 0, 0); 26];
        let mut n = 0;
        for dz in -1i64..=1 {
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    out[n] = self.wrap_coord(c.x as i64 + dx, c.y as i64 + dy, c.z as i64 + dz);
                    n += 1;
                }
            }
        }
        debug_assert_eq!(n, 26);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::PhaseId;

    #[test]
    fn count_sum_matches_voxel_count() {
        let lat = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        assert_eq!(lat.count().total() as usize, lat.voxel_count());
        assert_eq!(lat.count().get(PhaseId::Porosity), 64);
    }

    #[test]
    fn set_keeps_count_invariant() {
        let mut lat = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let c = Coord::new(1, 1, 1);
        lat.set(c, PhaseId::Csh);
        assert_eq!(lat.get(c), PhaseId::Csh);
        assert_eq!(lat.count().get(PhaseId::Csh), 1);
        assert_eq!(lat.count().get(PhaseId::Porosity), 26);
        assert_eq!(lat.count().total() as usize, 27);
    }

    #[test]
    fn periodic_wrap_at_every_face() {
        let lat = Lattice::filled(5, 5, 5, PhaseId::Porosity);
        assert_eq!(Lattice::wrap(-1, 5), 4);
        assert_eq!(Lattice::wrap(5, 5), 0);
        let neighbors = lat.axis_neighbors(Coord::new(0, 0, 0));
        assert_eq!(neighbors[0], Coord::new(4, 0, 0)); // -x wraps
        assert_eq!(neighbors[2], Coord::new(0, 4, 0)); // -y wraps
        assert_eq!(neighbors[4], Coord::new(0, 0, 4)); // -z wraps
    }

    #[test]
    fn box_neighbors_has_26_distinct_entries_excluding_center() {
        let lat = Lattice::filled(5, 5, 5, PhaseId::Porosity);
        let c = Coord::new(2, 2, 2);
        let neighbors = lat.box_neighbors(c);
        assert_eq!(neighbors.len(), 26);
        assert!(neighbors.iter().all(|&n| n != c));
    }

    #[test]
    fn micorig_is_a_start_of_simulation_snapshot() {
        let mut lat = Lattice::filled(2, 2, 2, PhaseId::C3S);
        let c = Coord::new(0, 0, 0);
        lat.set(c, PhaseId::Diffc3a);
        assert_eq!(lat.micorig(c), PhaseId::C3S);
        assert_eq!(lat.get(c), PhaseId::Diffc3a);
    }
}
