//! Move routine for DIFFFH3, the hydrous-iron-oxide diffusing species
//! — the simplest of the ten: grow on contact, or nucleate.

use super::{step_common, Action, MoveCtx};
use crate::catalogue::PhaseId;
use crate::lattice::Coord;

pub fn move_difffh3(ctx: &mut MoveCtx, coord: Coord) -> Action {
    if ctx.final_step || ctx.rng.bernoulli(ctx.nucleation.fh3) {
        ctx.lattice.set(coord, PhaseId::Fh3);
        return Action::Reacted;
    }
    step_common(ctx, coord, PhaseId::Difffh3, |ctx, origin, _nc, nphase, _dir| {
        if nphase == PhaseId::Fh3 {
            ctx.lattice.set(origin, PhaseId::Fh3);
            true
        } else {
            false
        }
    })
}
