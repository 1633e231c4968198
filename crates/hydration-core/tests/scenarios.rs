//! End-to-end scenarios exercised through the public
//! `SimulationContext` API, one per spec.md §8 scenario group.

use hydration_core::{
    Axis, CollectingSink, Coord, Lattice, PhaseId, SimulationConfig, SimulationContext,
};

fn empty_lattice(n: usize) -> Lattice {
    Lattice::filled(n, n, n, PhaseId::Porosity)
}

#[test]
fn single_voxel_gypsum_c3a_contact_forms_ettringite() {
    let mut lattice = empty_lattice(5);
    let c3a = Coord::new(2, 2, 2);
    let gyp = Coord::new(3, 2, 2);
    lattice.set(c3a, PhaseId::Diffc3a);
    lattice.set(gyp, PhaseId::Diffgyp);

    let mut config = SimulationConfig::default();
    config.c3a_gyp = 1.0;
    let mut ctx = SimulationContext::new(lattice, config)
        .unwrap()
        .with_sink(Box::new(CollectingSink::default()));
    ctx.enlist(c3a, PhaseId::Diffc3a);

    let mut formed_ettringite = false;
    for _ in 0..50 {
        ctx.run_cycle(10, false);
        if ctx.registry_len() == 0 {
            formed_ettringite = matches!(
                ctx.lattice().get(c3a),
                PhaseId::Ettr | PhaseId::C3ah6
            );
            break;
        }
    }
    assert!(formed_ettringite, "C3A never resolved against an adjacent DIFFGYP contact");
}

#[test]
fn pure_diffusion_wraps_across_the_periodic_boundary() {
    let mut lattice = empty_lattice(4);
    let edge = Coord::new(0, 1, 1);
    lattice.set(edge, PhaseId::Difffh3);
    let mut config = SimulationConfig::default();
    config.nucleation.fh3.cap = 0.0;
    let mut ctx = SimulationContext::new(lattice, config).unwrap();
    ctx.enlist(edge, PhaseId::Difffh3);
    for _ in 0..20 {
        ctx.run_cycle(1, false);
        if ctx.registry_len() == 0 {
            break;
        }
    }
    // Either it's still diffusing somewhere on the lattice, or it grew
    // on self-contact; both keep the total DIFFFH3+FH3 population at 1.
    let total = ctx.lattice().count().get(PhaseId::Difffh3) + ctx.lattice().count().get(PhaseId::Fh3);
    assert_eq!(total, 1);
}

#[test]
fn a_stale_registry_node_is_dropped_without_touching_the_lattice() {
    let mut lattice = empty_lattice(3);
    let coord = Coord::new(1, 1, 1);
    lattice.set(coord, PhaseId::Diffch);
    // Something external already overwrote the voxel before the
    // registry got a turn.
    lattice.set(coord, PhaseId::Ch);
    let config = SimulationConfig::default();
    let mut ctx = SimulationContext::new(lattice, config).unwrap();
    ctx.enlist(coord, PhaseId::Diffch);
    ctx.run_cycle(10, false);
    assert_eq!(ctx.registry_len(), 0);
    assert_eq!(ctx.lattice().get(coord), PhaseId::Ch);
}

#[test]
fn a_solid_corridor_percolates_and_a_broken_one_does_not() {
    let mut connected = empty_lattice(4);
    for x in 0..4 {
        connected.set(Coord::new(x, 0, 0), PhaseId::Ch);
    }
    let config = SimulationConfig::default();
    let ctx = SimulationContext::new(connected, config.clone()).unwrap();
    assert!(ctx.percolates(PhaseId::Ch, PhaseId::Ch, Axis::X));

    let mut broken = empty_lattice(4);
    broken.set(Coord::new(0, 0, 0), PhaseId::Ch);
    broken.set(Coord::new(1, 0, 0), PhaseId::Ch);
    broken.set(Coord::new(3, 0, 0), PhaseId::Ch);
    let ctx = SimulationContext::new(broken, config).unwrap();
    assert!(!ctx.percolates(PhaseId::Ch, PhaseId::Ch, Axis::X));
}

#[test]
fn chemistry_reaches_a_steady_state_pH_over_repeated_cycles() {
    let lattice = empty_lattice(3);
    let config = SimulationConfig::default();
    let mut ctx = SimulationContext::new(lattice, config).unwrap();
    let mut last_ph = None;
    for _ in 0..30 {
        let obs = ctx.run_cycle(0, false);
        assert!(obs.chemistry.ph.is_finite());
        last_ph = Some(obs.chemistry.ph);
    }
    assert!(last_ph.unwrap() > 0.0);
}
