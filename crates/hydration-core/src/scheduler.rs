//! Component G: the hydration scheduler. Computes the cycle's four
//! nucleation probabilities once (spec.md §4.G), then drives the
//! registry through the Component F dispatch table for at most
//! `stepmax` iterations.

use crate::catalogue::PhaseId;
use crate::config::SimulationConfig;
use crate::diagnostics::{Severity, Sink};
use crate::lattice::Lattice;
use crate::neighbor::step_direction;
use crate::prng::Prng;
use crate::registry::{Registry, StepOutcome};
use crate::species::{self, Action, MoveCtx, NucleationProbs};

/// `p_X = X_cap * (1 - exp(-pool / X_scale))` for each of the four
/// pools spec.md §4.G names. CH and FH3 pool on their own diffusing
/// count; C3AH6 pools DIFFC3A and DIFFC4A since both nucleate into it
/// (`species::aluminate`); gypsum pools DIFFANH+DIFFHEM+DIFFSO4 exactly
/// as spec.md's parenthetical spells out.
pub fn compute_nucleation_probs(lattice: &Lattice, config: &SimulationConfig) -> NucleationProbs {
    let count = lattice.count();
    let ch_pool = count.get(PhaseId::Diffch);
    let c3ah6_pool = count.pooled(&[PhaseId::Diffc3a, PhaseId::Diffc4a]);
    let fh3_pool = count.get(PhaseId::Difffh3);
    let gypsum_pool = count.pooled(&[PhaseId::Diffanh, PhaseId::Diffhem, PhaseId::Diffso4]);
    NucleationProbs {
        ch: config.nucleation.ch.probability(ch_pool),
        c3ah6: config.nucleation.c3ah6.probability(c3ah6_pool),
        fh3: config.nucleation.fh3.probability(fh3_pool),
        gypsum: config.nucleation.gypsum.probability(gypsum_pool),
    }
}

/// Run one hydration cycle over `registry` (spec.md §4.G): stale nodes
/// are silently unlinked, live nodes dispatch to their species' move
/// routine, and the registry's own `drive` loop bounds the pass to
/// `stepmax` steps. `final_step` is true only for the last diffusion
/// pass of the last hydration cycle, and forces every dispatched
/// species to nucleate/revert unconditionally.
pub fn run_cycle(
    registry: &mut Registry,
    lattice: &mut Lattice,
    rng: &mut Prng,
    sink: &mut dyn Sink,
    config: &SimulationConfig,
    cyccnt: i64,
    stepmax: usize,
    final_step: bool,
) {
    let nucleation = compute_nucleation_probs(lattice, config);
    registry.drive(stepmax, |ant| {
        if lattice.get(ant.coord) != ant.phase {
            return StepOutcome::Remove;
        }
        let Some(move_fn) = species::dispatch(ant.phase) else {
            sink.emit(
                Severity::Warn,
                &format!("unknown phase id {:?} in dispatch", ant.phase),
            );
            return StepOutcome::Remove;
        };
        let outcome = {
            let mut ctx = MoveCtx {
                lattice: &mut *lattice,
                rng: &mut *rng,
                sink: &mut *sink,
                config,
                cyccnt,
                final_step,
                nucleation: &nucleation,
                cycorig: ant.cycbirth,
            };
            move_fn(&mut ctx, ant.coord)
        };
        match outcome {
            Action::Reacted => StepOutcome::Remove,
            Action::Diffused(direction) => {
                ant.coord = step_direction(lattice, ant.coord, direction);
                StepOutcome::Keep
            }
            Action::Stayed => StepOutcome::Keep,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::lattice::Coord;
    use crate::registry::Ant;

    #[test]
    fn stale_node_is_unlinked_with_no_lattice_change() {
        let mut lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let coord = Coord::new(1, 1, 1);
        lattice.set(coord, PhaseId::Diffch);
        // Overwrite externally, simulating another reaction clobbering
        // the voxel before this ant's turn (spec.md §8, scenario 3).
        lattice.set(coord, PhaseId::Porosity);
        let mut registry = Registry::new();
        registry.append(Ant { coord, phase: PhaseId::Diffch, cycbirth: 0 });
        let config = SimulationConfig::default();
        let mut rng = Prng::new(1);
        let mut sink = CollectingSink::default();
        run_cycle(&mut registry, &mut lattice, &mut rng, &mut sink, &config, 0, 10, false);
        assert!(registry.is_empty());
        assert_eq!(lattice.get(coord), PhaseId::Porosity);
    }

    #[test]
    fn final_step_empties_the_registry() {
        let mut lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        let coord = Coord::new(1, 1, 1);
        lattice.set(coord, PhaseId::Difffh3);
        let mut registry = Registry::new();
        registry.append(Ant { coord, phase: PhaseId::Difffh3, cycbirth: 0 });
        let config = SimulationConfig::default();
        let mut rng = Prng::new(3);
        let mut sink = CollectingSink::default();
        run_cycle(&mut registry, &mut lattice, &mut rng, &mut sink, &config, 5, 10, true);
        assert!(registry.is_empty());
        assert_eq!(lattice.get(coord), PhaseId::Fh3);
    }

    #[test]
    fn nucleation_probability_is_zero_for_an_empty_pool() {
        let lattice = Lattice::filled(4, 4, 4, PhaseId::Porosity);
        let config = SimulationConfig::default();
        let probs = compute_nucleation_probs(&lattice, &config);
        assert_eq!(probs.ch, 0.0);
        assert_eq!(probs.gypsum, 0.0);
    }
}
