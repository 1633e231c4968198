//! Move routine for DIFFCH, calcium-hydroxide diffusing species.

use super::{step_common, Action, ExtKind, MoveCtx};
use crate::catalogue::PhaseId;
use crate::lattice::Coord;

/// Probability a pozzolanic contact places one extra pixel beyond the
/// first `extpozz` call — spec.md §4.F's DIFFCH/SFUME and DIFFCH/AMSIL
/// rows both cite `0.05466` for this second roll.
const POZZ_SECOND_ROLL: f64 = 0.05466;

pub fn move_diffch(ctx: &mut MoveCtx, coord: Coord) -> Action {
    step_common(ctx, coord, PhaseId::Diffch, |ctx, origin, _nc, nphase, _dir| {
        match nphase {
            PhaseId::Ch if ctx.rng.bernoulli(ctx.config.chgrow) => {
                ctx.lattice.set(origin, PhaseId::Ch);
                true
            }
            PhaseId::Inertagg | PhaseId::Caco3
                if ctx.config.chflag && ctx.rng.bernoulli(ctx.config.chgrowagg) =>
            {
                ctx.lattice.set(origin, PhaseId::Ch);
                true
            }
            PhaseId::Sfume => {
                let p = ctx.config.phfactor.at(ctx.cyccnt) * ctx.config.psfume;
                if ctx.rng.bernoulli(p) {
                    ctx.lattice.set(origin, PhaseId::Pozzcsh);
                    ctx.place(ExtKind::Pozz, origin);
                    if ctx.rng.bernoulli(POZZ_SECOND_ROLL) {
                        ctx.place(ExtKind::Pozz, origin);
                    }
                    true
                } else {
                    false
                }
            }
            PhaseId::Amsil => {
                let p = ctx.config.phfactor.at(ctx.cyccnt) * ctx.config.pamsil;
                if ctx.rng.bernoulli(p) {
                    ctx.lattice.set(origin, PhaseId::Pozzcsh);
                    ctx.place(ExtKind::Pozz, origin);
                    if ctx.rng.bernoulli(POZZ_SECOND_ROLL) {
                        ctx.place(ExtKind::Pozz, origin);
                    }
                    true
                } else {
                    false
                }
            }
            PhaseId::Diffas => {
                ctx.lattice.set(origin, PhaseId::Strat);
                ctx.place(ExtKind::Strat, origin);
                if ctx.rng.bernoulli(0.5035) {
                    ctx.place(ExtKind::Strat, origin);
                }
                true
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::diagnostics::CollectingSink;
    use crate::lattice::Lattice;
    use crate::prng::Prng;
    use crate::species::NucleationProbs;

    fn run(seed: u64, neighbor: PhaseId, config: &SimulationConfig) -> (Action, Lattice) {
        let mut lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let origin = Coord::new(1, 1, 1);
        lattice.set(origin, PhaseId::Diffch);
        for n in lattice.axis_neighbors(origin) {
            lattice.set(n, neighbor);
        }
        let nucleation = NucleationProbs::default();
        let mut rng = Prng::new(seed);
        let mut sink = CollectingSink::default();
        let mut ctx = MoveCtx {
            lattice: &mut lattice,
            rng: &mut rng,
            sink: &mut sink,
            config,
            cyccnt: 0,
            final_step: false,
            nucleation: &nucleation,
            cycorig: 0,
        };
        let action = move_diffch(&mut ctx, origin);
        (action, lattice)
    }

    #[test]
    fn grows_onto_ch_contact_under_some_seed() {
        let config = SimulationConfig::default();
        for seed in 0..200u64 {
            let (action, lattice) = run(seed, PhaseId::Ch, &config);
            if action == Action::Reacted {
                assert_eq!(lattice.get(Coord::new(1, 1, 1)), PhaseId::Ch);
                return;
            }
        }
        panic!("never observed ch growth in 200 seeds");
    }

    #[test]
    fn aggregate_growth_requires_chflag() {
        let mut config = SimulationConfig::default();
        config.chflag = false;
        config.chgrowagg = 1.0;
        let (action, _) = run(1, PhaseId::Inertagg, &config);
        assert_eq!(action, Action::Stayed);
    }

    #[test]
    fn diffas_contact_always_produces_strat() {
        let config = SimulationConfig::default();
        let (action, lattice) = run(1, PhaseId::Diffas, &config);
        assert_eq!(action, Action::Reacted);
        assert_eq!(lattice.get(Coord::new(1, 1, 1)), PhaseId::Strat);
    }
}
