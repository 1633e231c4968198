//! Move routine for DIFFCSH, the calcium-silicate-hydrate diffusing
//! species — the one species whose growth amount is a continuous
//! cycle-dependent molar-volume ratio rather than a fixed `nexp`.

use super::{place_fractional, step_common, Action, ExtKind, MoveCtx};
use crate::catalogue::PhaseId;
use crate::config::CshGeom;
use crate::lattice::{Coord, Face};

/// Two admissible `Faces` values for a CSH plate precipitating in
/// `direction` (1..=6, the `move_one` encoding). Not specified exactly
/// by spec.md beyond "two admissible plate faces from the move
/// direction"; this picks the two plate orientations whose normal is
/// not the move axis, which is the natural reading of "the crystal
/// plate lies across the direction it grew in." Recorded as an
/// invented-but-plausible mapping in DESIGN.md.
fn admissible_faces(direction: u8) -> (Face, Face) {
    match direction {
        1 | 2 => (Face::Yz, Face::Xy),
        3 | 4 => (Face::Xz, Face::Xy),
        5 | 6 => (Face::Xy, Face::Yz),
        _ => (Face::Random, Face::Random),
    }
}

pub fn move_diffcsh(ctx: &mut MoveCtx, coord: Coord) -> Action {
    step_common(ctx, coord, PhaseId::Diffcsh, |ctx, origin, ncoord, nphase, direction| {
        let ratio = {
            let cur = ctx.config.molarvcsh.at(ctx.cyccnt);
            let orig = ctx.config.molarvcsh.at(ctx.cycorig).max(1e-9);
            cur / orig
        };
        match nphase {
            PhaseId::Csh => {
                if ctx.config.cshgeom == CshGeom::Plate {
                    let (f1, f2) = admissible_faces(direction);
                    let existing = ctx.lattice.face(ncoord);
                    if !(existing == Face::Random || existing == f1 || existing == f2) {
                        return false;
                    }
                }
                ctx.lattice.set(origin, PhaseId::Csh);
                ctx.lattice.set_cshage(origin, ctx.cyccnt);
                if ctx.config.cshgeom == CshGeom::Plate {
                    let (f1, f2) = admissible_faces(direction);
                    let chosen = if ctx.rng.bernoulli(0.5) { f1 } else { f2 };
                    ctx.lattice.set_face(origin, chosen);
                }
                place_fractional(ctx, ExtKind::Csh, origin, ratio - 1.0);
                true
            }
            PhaseId::Sfume => {
                ctx.lattice.set(origin, PhaseId::Pozzcsh);
                let consumed = ctx.rng.bernoulli(0.136);
                if consumed {
                    ctx.lattice.set(ncoord, PhaseId::Pozzcsh);
                    place_fractional(ctx, ExtKind::Pozz, origin, 0.46 - 0.136);
                } else {
                    place_fractional(ctx, ExtKind::Pozz, origin, 0.46);
                }
                true
            }
            PhaseId::Slagcsh | PhaseId::Pozzcsh | PhaseId::Ch => {
                ctx.lattice.set(origin, PhaseId::Csh);
                ctx.lattice.set_cshage(origin, ctx.cyccnt);
                place_fractional(ctx, ExtKind::Csh, origin, ratio - 1.0);
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

    #[test]
    fn growth_against_csh_neighbor_sets_cshage() {
        let mut lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let origin = Coord::new(1, 1, 1);
        lattice.set(origin, PhaseId::Diffcsh);
        for n in lattice.axis_neighbors(origin) {
            lattice.set(n, PhaseId::Csh);
        }
        let config = SimulationConfig::default();
        let nucleation = NucleationProbs::default();
        let mut rng = Prng::new(5);
        let mut sink = CollectingSink::default();
        let mut ctx = MoveCtx {
            lattice: &mut lattice,
            rng: &mut rng,
            sink: &mut sink,
            config: &config,
            cyccnt: 7,
            final_step: false,
            nucleation: &nucleation,
            cycorig: 0,
        };
        let action = move_diffcsh(&mut ctx, origin);
        assert_eq!(action, Action::Reacted);
        assert_eq!(ctx.lattice.get(origin), PhaseId::Csh);
        assert_eq!(ctx.lattice.cshage(origin), 7);
    }

    #[test]
    fn plate_mode_assigns_a_nonzero_face() {
        let mut lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let origin = Coord::new(1, 1, 1);
        lattice.set(origin, PhaseId::Diffcsh);
        for n in lattice.axis_neighbors(origin) {
            lattice.set(n, PhaseId::Csh);
        }
        let mut config = SimulationConfig::default();
        config.cshgeom = CshGeom::Plate;
        let nucleation = NucleationProbs::default();
        let mut rng = Prng::new(9);
        let mut sink = CollectingSink::default();
        let mut ctx = MoveCtx {
            lattice: &mut lattice,
            rng: &mut rng,
            sink: &mut sink,
            config: &config,
            cyccnt: 3,
            final_step: false,
            nucleation: &nucleation,
            cycorig: 0,
        };
        if move_diffcsh(&mut ctx, origin) == Action::Reacted {
            assert_ne!(ctx.lattice.face(origin), Face::Random);
        }
    }

    #[test]
    fn sfume_contact_always_converts_to_pozzcsh() {
        let mut lattice = Lattice::filled(3, 3, 3, PhaseId::Porosity);
        let origin = Coord::new(1, 1, 1);
        lattice.set(origin, PhaseId::Diffcsh);
        for n in lattice.axis_neighbors(origin) {
            lattice.set(n, PhaseId::Sfume);
        }
        let config = SimulationConfig::default();
        let nucleation = NucleationProbs::default();
        let mut rng = Prng::new(11);
        let mut sink = CollectingSink::default();
        let mut ctx = MoveCtx {
            lattice: &mut lattice,
            rng: &mut rng,
            sink: &mut sink,
            config: &config,
            cyccnt: 0,
            final_step: false,
            nucleation: &nucleation,
            cycorig: 0,
        };
        let action = move_diffcsh(&mut ctx, origin);
        assert_eq!(action, Action::Reacted);
        assert_eq!(ctx.lattice.get(origin), PhaseId::Pozzcsh);
    }
}
