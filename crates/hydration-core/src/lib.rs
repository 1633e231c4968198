//! `hydration-core`: a cellular-automaton model of Portland cement
//! hydration kinetics (spec.md §1-§2). A `SimulationContext` owns the
//! voxel lattice, the phase catalogue, run configuration, the
//! diffusing-species registry, and a seeded PRNG, and drives them
//! through the hydration-cycle loop spec.md §4.G describes: one
//! species-dispatch pass over the registry, then one pore-solution
//! chemistry solve, repeated until the caller stops asking for cycles.
//!
//! spec.md §9 ("Design Notes") is explicit that this core has no
//! concurrency of its own — a single `SimulationContext` is driven
//! from one thread, and a caller that wants several independent runs
//! spins up one `SimulationContext` per thread rather than sharing
//! one behind a lock.

pub mod catalogue;
pub mod chemistry;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lattice;
pub mod neighbor;
pub mod percolation;
pub mod placement;
pub mod prng;
pub mod registry;
pub mod scheduler;
pub mod species;

pub use catalogue::PhaseId;
pub use chemistry::ChemistryOutput;
pub use config::SimulationConfig;
pub use diagnostics::{CollectingSink, LogSink, Severity, Sink};
pub use error::{CoreError, CoreResult};
pub use lattice::{Coord, Lattice};
pub use percolation::Axis;
pub use registry::Ant;

use prng::Prng;
use registry::Registry;

/// Observable summary of one completed hydration cycle, handed back
/// to the caller driving the simulation (spec.md §6, "per-cycle output
/// stream").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleObservables {
    pub cyccnt: i64,
    pub registry_len: usize,
    pub chemistry: ChemistryOutput,
}

/// Owns everything one hydration run needs. Built once from a seed
/// lattice and a [`SimulationConfig`], then advanced one cycle at a
/// time by [`SimulationContext::run_cycle`].
#[derive(Debug)]
pub struct SimulationContext {
    lattice: Lattice,
    config: SimulationConfig,
    registry: Registry,
    rng: Prng,
    sink: Box<dyn Sink>,
    cyccnt: i64,
    moles_syn_precip: f64,
}

impl SimulationContext {
    /// Build a context from a caller-supplied lattice already
    /// populated with the starting microstructure (spec.md §6's
    /// lattice-image input). The registry starts empty; a caller
    /// seeds it via [`SimulationContext::enlist`] for every voxel that
    /// starts out as a diffusing species, or leaves it empty and lets
    /// dissolution populate it externally.
    pub fn new(lattice: Lattice, config: SimulationConfig) -> CoreResult<Self> {
        if lattice.voxel_count() == 0 {
            return Err(CoreError::InvalidState("lattice has zero voxels".into()));
        }
        let seed = config.seed;
        Ok(SimulationContext {
            lattice,
            config,
            registry: Registry::new(),
            rng: Prng::new(seed),
            sink: Box::new(LogSink),
            cyccnt: 0,
            moles_syn_precip: 0.0,
        })
    }

    /// Install a caller-supplied diagnostics sink (tests typically use
    /// [`CollectingSink`]) in place of the default [`LogSink`].
    pub fn with_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn cyccnt(&self) -> i64 {
        self.cyccnt
    }

    pub fn registry_len(&self) -> usize {
        self.registry.len()
    }

    /// Enlist a voxel that just dissolved into a diffusing species
    /// (spec.md §4.C). The caller is responsible for having already
    /// set the voxel's phase on the lattice to the matching `DIFF*`
    /// id; this only adds the registry bookkeeping.
    pub fn enlist(&mut self, coord: Coord, phase: PhaseId) {
        self.registry.append(Ant { coord, phase, cycbirth: self.cyccnt });
    }

    /// Advance one hydration cycle: dispatch at most `stepmax`
    /// registry entries through their species' move routine, then
    /// solve pore-solution chemistry for the resulting composition.
    /// `final_cycle` forces unconditional nucleation/reversion on
    /// every dispatched species, per spec.md §4.G.
    pub fn run_cycle(&mut self, stepmax: usize, final_cycle: bool) -> CycleObservables {
        scheduler::run_cycle(
            &mut self.registry,
            &mut self.lattice,
            &mut self.rng,
            self.sink.as_mut(),
            &self.config,
            self.cyccnt,
            stepmax,
            final_cycle,
        );
        let chemistry = chemistry::solve(
            &self.config,
            &self.lattice,
            self.cyccnt,
            self.moles_syn_precip,
            self.sink.as_mut(),
        );
        self.moles_syn_precip = chemistry.moles_syn_precip;
        let observables = CycleObservables {
            cyccnt: self.cyccnt,
            registry_len: self.registry.len(),
            chemistry,
        };
        self.cyccnt += 1;
        observables
    }

    /// Does phase `ph1`/`ph2` percolate from one face of the lattice
    /// to the opposite face along `axis` (spec.md §4.I)? `true` iff
    /// the through-path reaches the far face at all; see
    /// [`SimulationContext::percolation_report`] for the voxel counts
    /// behind that verdict.
    pub fn percolates(&self, ph1: PhaseId, ph2: PhaseId, axis: Axis) -> bool {
        percolation::burn3d(&self.lattice, ph1, ph2, axis).percolates
    }

    /// Full percolation report for the porosity network (`ph1`/`ph2`),
    /// including `Con_fracp[axis]`-style through-fraction (spec.md
    /// §4.I, §6).
    pub fn percolation_report(&self, ph1: PhaseId, ph2: PhaseId, axis: Axis) -> percolation::BurnReport {
        percolation::burn3d(&self.lattice, ph1, ph2, axis)
    }

    /// Has the paste reached its percolation-defined set point along
    /// `axis` (spec.md §4.I)?
    pub fn has_set(&self, axis: Axis) -> bool {
        percolation::burnset(&self.lattice, axis).has_set
    }

    /// Full solid-bridge percolation report, including `Con_fracs[axis]`
    /// (spec.md §6).
    pub fn set_report(&self, axis: Axis) -> percolation::BurnsetReport {
        percolation::burnset(&self.lattice, axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_lattice_is_rejected_at_construction() {
        let lattice = Lattice::filled(0, 0, 0, PhaseId::Porosity);
        let err = SimulationContext::new(lattice, SimulationConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn run_cycle_advances_cyccnt_and_drains_a_finished_ant() {
        let mut lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let coord = Coord::new(1, 1, 1);
        lattice.set(coord, PhaseId::Difffh3);
        let config = SimulationConfig::default();
        let mut ctx = SimulationContext::new(lattice, config)
            .unwrap()
            .with_sink(Box::new(CollectingSink::default()));
        ctx.enlist(coord, PhaseId::Difffh3);
        assert_eq!(ctx.registry_len(), 1);
        let obs = ctx.run_cycle(10, true);
        assert_eq!(obs.cyccnt, 0);
        assert_eq!(ctx.cyccnt(), 1);
        assert_eq!(ctx.registry_len(), 0);
        assert_eq!(ctx.lattice().get(coord), PhaseId::Fh3);
    }

    #[test]
    fn empty_registry_cycle_is_a_no_op_on_the_lattice() {
        let lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let config = SimulationConfig::default();
        let mut ctx = SimulationContext::new(lattice, config).unwrap();
        let before = ctx.lattice().count().total();
        ctx.run_cycle(100, false);
        assert_eq!(ctx.lattice().count().total(), before);
    }

    #[test]
    fn fresh_lattice_does_not_percolate_any_solid_phase() {
        let lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        let config = SimulationConfig::default();
        let ctx = SimulationContext::new(lattice, config).unwrap();
        assert!(!ctx.percolates(PhaseId::Ch, PhaseId::Ch, Axis::Z));
        assert!(!ctx.has_set(Axis::Z));
    }
}
