//! Component F: per-species move routines, the dominant share of this
//! crate (spec.md §2 budgets 45% of the core here).
//!
//! Every diffusing species shares the canonical shape spec.md §4.F
//! lays out: try to nucleate, otherwise pick a neighbor via
//! [`crate::neighbor::move_one`], dispatch on that neighbor's phase to
//! a reaction branch, and fall back to diffusion or staying put if no
//! branch fires. [`step_common`] is that shared skeleton; each
//! species module supplies only its own neighbor-dispatch closure.
//!
//! Reading spec.md §4.F's stoichiometry table literally: "one
//! deterministic product pixel at the current location" next to a
//! per-row "first-pixel accept" probability is a contradiction (a
//! deterministic pixel cannot also carry an acceptance probability).
//! This module resolves it the way a kinetic Monte Carlo model
//! normally works: "first-pixel accept" is the probability the whole
//! branch fires on this contact; once it fires, the product pixel at
//! the current voxel is unconditional, and only the *extra* pixels
//! (`nexp` plus the probabilistic remainder) carry their own separate
//! rolls. This is recorded as an Open-Question resolution in
//! DESIGN.md.

pub mod aluminate;
pub mod ch;
pub mod csh;
pub mod fh3;
pub mod sulfoaluminate;

use crate::catalogue::PhaseId;
use crate::config::SimulationConfig;
use crate::diagnostics::Sink;
use crate::lattice::{Coord, Lattice};
use crate::neighbor::{is_saturated_porosity, move_one};
use crate::placement::{self, EttrType, Placement};
use crate::prng::Prng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The diffusing voxel reacted, precipitated, or was otherwise
    /// consumed — drop its registry node.
    Reacted,
    /// The voxel diffused in this axis direction (1..=6).
    Diffused(u8),
    /// Neither reacted nor diffused this step.
    Stayed,
}

/// Per-cycle nucleation probabilities computed by the scheduler
/// (spec.md §4.G) from pooled diffusing-species counts, handed to
/// every move routine that has a spontaneous-precipitation branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NucleationProbs {
    pub ch: f64,
    pub c3ah6: f64,
    pub fh3: f64,
    pub gypsum: f64,
}

/// Which `ext*` placement routine a reaction branch calls, bundled so
/// [`MoveCtx::place`] can dispatch without every species module
/// importing all ten `placement::ext*` functions directly.
#[derive(Debug, Clone, Copy)]
pub enum ExtKind {
    Ettr(EttrType),
    Gyps,
    Friedel,
    Strat,
    Afm,
    Pozz,
    C3ah6,
    Csh,
    Ch,
    Fh3,
}

/// Everything a move routine needs, bundled the way spec.md §9
/// ("Design Notes — Global mutable state") directs: an explicit
/// context passed by `&mut` instead of file-scope globals.
pub struct MoveCtx<'a> {
    pub lattice: &'a mut Lattice,
    pub rng: &'a mut Prng,
    pub sink: &'a mut dyn Sink,
    pub config: &'a SimulationConfig,
    pub cyccnt: i64,
    pub final_step: bool,
    pub nucleation: &'a NucleationProbs,
    /// Cycle this ant's voxel dissolved (`Ant::cycbirth`), the
    /// "origin-cycle" input spec.md §4.F's routine signature names —
    /// used by `movecsh`'s molar-volume ratio.
    pub cycorig: i64,
}

impl<'a> MoveCtx<'a> {
    pub fn place(&mut self, kind: ExtKind, origin: Coord) -> Placement {
        let crackcycle = self.config.crackcycle;
        match kind {
            ExtKind::Ettr(etype) => placement::extettr(
                self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle, etype,
            ),
            ExtKind::Gyps => {
                placement::extgyps(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Friedel => {
                placement::extfriedel(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Strat => {
                placement::extstrat(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Afm => {
                placement::extafm(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Pozz => {
                placement::extpozz(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::C3ah6 => {
                placement::extc3ah6(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Csh => {
                placement::extcsh(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Ch => {
                placement::extch(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
            ExtKind::Fh3 => {
                placement::extfh3(self.lattice, self.rng, self.sink, origin, self.cyccnt, crackcycle)
            }
        }
    }

    /// Place `nexp` deterministic extra pixels, each one originating
    /// from the previous placement's coordinate rather than always
    /// from the reacting voxel, then roll once more for the
    /// fractional remainder — spec.md §4.F's "following the direction
    /// returned by each previous `ext*` call to maintain an acicular
    /// shape," realized here as chaining placement origin rather than
    /// direction bias (see DESIGN.md).
    pub fn place_chain(&mut self, kind: ExtKind, origin: Coord, nexp: u32, remainder: f64) {
        let mut from = origin;
        for _ in 0..nexp {
            from = self.place(kind, from).coord;
        }
        if self.rng.bernoulli(remainder) {
            self.place(kind, from);
        }
    }
}

/// Place a fractional number of extra pixels: `floor(amount)`
/// deterministic pixels plus one probabilistic pixel at the
/// fractional remainder. A non-positive `amount` places nothing.
/// Used by `movecsh`'s cycle-dependent molar-volume ratio.
pub fn place_fractional(ctx: &mut MoveCtx, kind: ExtKind, origin: Coord, amount: f64) {
    if amount <= 0.0 {
        return;
    }
    let nexp = amount.floor() as u32;
    let remainder = amount - nexp as f64;
    ctx.place_chain(kind, origin, nexp, remainder);
}

/// The shared skeleton of every move routine (spec.md §4.F steps
/// 2-3-4-5-6, minus each species' own nucleation pre-check): pick a
/// neighbor, hand its coordinate/phase/direction to `react`, and on a
/// miss either diffuse into saturated porosity or stay — reverting to
/// the species' solid analog if this is the final hydration step.
pub fn step_common(
    ctx: &mut MoveCtx,
    coord: Coord,
    phase: PhaseId,
    react: impl FnOnce(&mut MoveCtx, Coord, Coord, PhaseId, u8) -> bool,
) -> Action {
    let mv = move_one(ctx.lattice, coord, 1, ctx.rng);
    let neighbor_phase = ctx.lattice.get(mv.coord);
    if react(ctx, coord, mv.coord, neighbor_phase, mv.direction) {
        return Action::Reacted;
    }
    if is_saturated_porosity(neighbor_phase) {
        ctx.lattice.set(mv.coord, phase);
        ctx.lattice.set(coord, neighbor_phase);
        return Action::Diffused(mv.direction);
    }
    if ctx.final_step {
        if let Some(analog) = phase.solid_analog() {
            ctx.lattice.set(coord, analog);
            return Action::Reacted;
        }
    }
    Action::Stayed
}

/// Phase-id-keyed function-pointer table (spec.md §9's "Polymorphism"
/// design note: "represent phases as an enumeration and use a table
/// of function pointers keyed by phase id").
pub fn dispatch(phase: PhaseId) -> Option<fn(&mut MoveCtx, Coord) -> Action> {
    use PhaseId::*;
    Some(match phase {
        Diffgyp => sulfoaluminate::move_diffgyp,
        Diffhem => sulfoaluminate::move_diffhem,
        Diffanh => sulfoaluminate::move_diffanh,
        Diffcacl2 => sulfoaluminate::move_diffcacl2,
        Diffcas2 => sulfoaluminate::move_diffcas2,
        Diffas => sulfoaluminate::move_diffas,
        Diffso4 => sulfoaluminate::move_diffso4,
        Diffc3a => aluminate::move_diffc3a,
        Diffc4a => aluminate::move_diffc4a,
        Diffettr => aluminate::move_diffettr,
        Diffcaco3 => aluminate::move_diffcaco3,
        Diffcsh => csh::move_diffcsh,
        Diffch => ch::move_diffch,
        Difffh3 => fh3::move_difffh3,
        _ => return None,
    })
}
